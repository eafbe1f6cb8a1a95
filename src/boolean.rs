//! Boolean schema.

use serde_json::Value;

use crate::context::Context;
use crate::schema::{impl_rule_chain, RuleChain, Schema};
use crate::value::values_equal;

/// Generates a schema that matches boolean values.
pub fn boolean() -> BooleanSchema {
    BooleanSchema {
        chain: RuleChain::default(),
    }
}

/// Matches boolean values.
#[derive(Clone)]
pub struct BooleanSchema {
    chain: RuleChain,
}

impl_rule_chain!(BooleanSchema);

impl BooleanSchema {
    /// Substitute `value` when the value is absent.
    pub fn default(mut self, value: bool) -> Self {
        self.chain.default_value(Value::Bool(value));
        self
    }

    /// Replace the value with `value`.
    pub fn set(self, value: bool) -> Self {
        self.transform(move |ctx| ctx.set_value(value))
    }

    /// Require the value to equal `value`.
    pub fn equal(self, value: bool) -> Self {
        self.check(move |b| {
            if b == value {
                Ok(())
            } else {
                Err(format!("is not {}", value))
            }
        })
    }

    /// Validate the boolean with `f`; an `Err` carries the rejection reason.
    /// Aborts with a type mismatch when the value is not a boolean.
    pub fn check<F>(self, f: F) -> Self
    where
        F: Fn(bool) -> Result<(), String> + Send + Sync + 'static,
    {
        self.transform(move |ctx| {
            let Some(b) = ctx.value().as_bool() else {
                let err = ctx.type_mismatch("boolean");
                ctx.abort(err);
                return;
            };
            if let Err(reason) = f(b) {
                let err = ctx.constraint(reason);
                ctx.abort(err);
            }
        })
    }

    /// Turn any value equal to one of `values` into `true`.
    pub fn truthy<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.replace_matching(values, true)
    }

    /// Turn any value equal to one of `values` into `false`.
    pub fn falsy<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.replace_matching(values, false)
    }

    fn replace_matching<I, V>(self, values: I, replacement: bool) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.transform(move |ctx| {
            if values.iter().any(|v| values_equal(v, ctx.value())) {
                ctx.set_value(replacement);
            }
        })
    }
}

impl Schema for BooleanSchema {
    fn priority(&self) -> i32 {
        self.chain.priority()
    }

    fn validate(&self, ctx: &mut Context) {
        if self.chain.run(ctx) && !ctx.value().is_boolean() {
            let err = ctx.type_mismatch("boolean");
            ctx.abort(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use serde_json::json;

    fn run(schema: &BooleanSchema, value: Value) -> Context {
        let mut ctx = Context::new(value);
        schema.validate(&mut ctx);
        ctx
    }

    #[test]
    fn set_priority() {
        for priority in [-1, 0, 100] {
            assert_eq!(boolean().set_priority(priority).priority(), priority);
        }
    }

    #[test]
    fn required_optional_default() {
        let ctx = run(&boolean().required(), Value::Null);
        assert!(matches!(ctx.err(), Some(ValidationError::Required { .. })));

        assert!(run(&boolean().optional(), Value::Null).err().is_none());

        let ctx = run(&boolean().default(true), Value::Null);
        assert_eq!(ctx.value(), &json!(true));
    }

    #[test]
    fn set_and_equal() {
        assert_eq!(run(&boolean().set(false), json!("x")).value(), &json!(false));
        assert!(run(&boolean().equal(true), json!(true)).err().is_none());
        assert!(run(&boolean().equal(true), json!(false)).err().is_some());
    }

    #[test]
    fn truthy() {
        let schema = boolean().truthy(["yes"]);
        assert_eq!(run(&schema, json!("yes")).value(), &json!(true));
        assert_eq!(run(&schema, json!(false)).value(), &json!(false));
        assert!(run(&schema, json!("no")).err().is_some());
    }

    #[test]
    fn falsy() {
        let schema = boolean().falsy([json!("no"), json!(0)]);
        assert_eq!(run(&schema, json!("no")).value(), &json!(false));
        assert_eq!(run(&schema, json!(0.0)).value(), &json!(false));
        assert_eq!(run(&schema, json!(true)).value(), &json!(true));
        assert!(run(&schema, json!("yes")).err().is_some());
    }

    #[test]
    fn trailing_type_check() {
        let ctx = run(&boolean(), json!("true"));
        assert_eq!(
            ctx.err().unwrap().to_string(),
            "field `` value \"true\" is not boolean"
        );
    }

    #[test]
    fn when_switches_requirement() {
        let schema = boolean().when("strict", true, boolean().required());

        let mut ctx = Context::new(json!({"strict": true}));
        ctx.set_value(Value::Null);
        schema.validate(&mut ctx);
        assert!(ctx.err().is_none(), "absent value is skipped before `when` runs");

        let schema = boolean().when("strict", true, boolean().truthy(["on"]));
        let mut ctx = Context::new(json!({"strict": true}));
        ctx.set_value("on");
        schema.validate(&mut ctx);
        assert!(ctx.err().is_none());
        assert_eq!(ctx.value(), &json!(true));
    }
}
