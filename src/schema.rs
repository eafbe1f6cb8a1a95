//! The schema trait and the rule chain shared by every schema kind.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::error::ValidationError;
use crate::value::{is_absent, values_equal};

/// Anything that can validate the value held by a [`Context`].
pub trait Schema: Send + Sync {
    /// Evaluation priority among object siblings; higher runs first.
    fn priority(&self) -> i32;

    /// Run the schema against the context's current value.
    fn validate(&self, ctx: &mut Context);
}

/// One step of a rule chain.
pub type Rule = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// What a `when` rule tests the referenced value against.
#[derive(Clone)]
pub enum Condition {
    /// Satisfied when the referenced value validates without error.
    Schema(Arc<dyn Schema>),
    /// Satisfied when the referenced value equals this one.
    Equals(Value),
}

impl Condition {
    fn is_satisfied_by(&self, referenced: &Value) -> bool {
        match self {
            Condition::Schema(schema) => {
                let mut probe = Context::new(referenced.clone());
                schema.validate(&mut probe);
                probe.err().is_none()
            }
            Condition::Equals(expected) => values_equal(referenced, expected),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Schema(schema) => f
                .debug_struct("Schema")
                .field("priority", &schema.priority())
                .finish(),
            Condition::Equals(value) => f.debug_tuple("Equals").field(value).finish(),
        }
    }
}

impl From<Value> for Condition {
    fn from(value: Value) -> Self {
        Condition::Equals(value)
    }
}

impl From<&str> for Condition {
    fn from(value: &str) -> Self {
        Condition::Equals(Value::from(value))
    }
}

impl From<String> for Condition {
    fn from(value: String) -> Self {
        Condition::Equals(Value::from(value))
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        Condition::Equals(Value::from(value))
    }
}

impl From<i32> for Condition {
    fn from(value: i32) -> Self {
        Condition::Equals(Value::from(value))
    }
}

impl From<i64> for Condition {
    fn from(value: i64) -> Self {
        Condition::Equals(Value::from(value))
    }
}

impl From<f64> for Condition {
    fn from(value: f64) -> Self {
        Condition::Equals(Value::from(value))
    }
}

/// Ordered rules plus the bookkeeping every schema kind shares.
#[derive(Clone, Default)]
pub(crate) struct RuleChain {
    priority: i32,
    guarded: bool,
    rules: Vec<Rule>,
}

impl RuleChain {
    pub(crate) fn priority(&self) -> i32 {
        self.priority
    }

    pub(crate) fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub(crate) fn append(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub(crate) fn prepend(&mut self, rule: Rule) {
        self.rules.insert(0, rule);
    }

    /// Prepend a rule that runs ahead of the rest and replaces the implicit
    /// optional.
    pub(crate) fn guard(&mut self, rule: Rule) {
        self.guarded = true;
        self.prepend(rule);
    }

    pub(crate) fn required(&mut self) {
        self.guard(Arc::new(|ctx: &mut Context| {
            if is_absent(ctx.value()) {
                ctx.abort(ValidationError::Required {
                    field: ctx.field_path(),
                });
            }
        }));
    }

    pub(crate) fn optional(&mut self) {
        self.guard(Arc::new(optional_rule));
    }

    pub(crate) fn default_value(&mut self, value: Value) {
        self.guard(Arc::new(move |ctx: &mut Context| {
            if is_absent(ctx.value()) {
                ctx.set_value(value.clone());
            }
        }));
    }

    pub(crate) fn when(&mut self, path: String, condition: Condition, then: Arc<dyn Schema>) {
        self.append(Arc::new(move |ctx: &mut Context| {
            let Some(referenced) = ctx.reference(&path) else {
                return;
            };
            if condition.is_satisfied_by(referenced) {
                then.validate(ctx);
            }
        }));
    }

    /// Run every rule in order. Returns true when the chain ran to the end
    /// without being skipped or aborted.
    pub(crate) fn run(&self, ctx: &mut Context) -> bool {
        if !self.guarded {
            optional_rule(ctx);
            if ctx.skip {
                return false;
            }
        }
        for rule in &self.rules {
            rule(ctx);
            if ctx.skip {
                return false;
            }
        }
        ctx.err().is_none()
    }

    #[cfg(test)]
    pub(crate) fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

fn optional_rule(ctx: &mut Context) {
    if is_absent(ctx.value()) {
        ctx.skip();
    }
}

/// Builder methods every schema kind exposes, plus its conversions into
/// `Condition` and `Arc<dyn Schema>`.
macro_rules! impl_rule_chain {
    ($kind:ident) => {
        impl $kind {
            /// Set the evaluation priority among object siblings.
            pub fn set_priority(mut self, priority: i32) -> Self {
                self.chain.set_priority(priority);
                self
            }

            /// Append a rule to the chain.
            pub fn transform<F>(mut self, rule: F) -> Self
            where
                F: Fn(&mut $crate::Context) + Send + Sync + 'static,
            {
                self.chain.append(::std::sync::Arc::new(rule));
                self
            }

            /// Insert a rule at the front of the chain.
            pub fn prepend_transform<F>(mut self, rule: F) -> Self
            where
                F: Fn(&mut $crate::Context) + Send + Sync + 'static,
            {
                self.chain.prepend(::std::sync::Arc::new(rule));
                self
            }

            /// Abort when the value is absent.
            pub fn required(mut self) -> Self {
                self.chain.required();
                self
            }

            /// Accept an absent value and stop the chain. This is the
            /// behavior when no guard is configured.
            pub fn optional(mut self) -> Self {
                self.chain.optional();
                self
            }

            /// When the value at `path` (resolved against the root document)
            /// satisfies `condition`, run `then` against the current field.
            pub fn when<C, S>(mut self, path: impl Into<String>, condition: C, then: S) -> Self
            where
                C: Into<$crate::Condition>,
                S: $crate::Schema + 'static,
            {
                self.chain.when(
                    path.into(),
                    condition.into(),
                    ::std::sync::Arc::new(then),
                );
                self
            }
        }

        impl From<$kind> for $crate::Condition {
            fn from(schema: $kind) -> Self {
                $crate::Condition::Schema(::std::sync::Arc::new(schema))
            }
        }

        impl From<$kind> for ::std::sync::Arc<dyn $crate::Schema> {
            fn from(schema: $kind) -> Self {
                ::std::sync::Arc::new(schema)
            }
        }
    };
}

pub(crate) use impl_rule_chain;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn aborting(message: &'static str) -> Rule {
        Arc::new(move |ctx: &mut Context| ctx.abort(ValidationError::custom(message)))
    }

    #[test]
    fn prepend_and_append_order() {
        let mut chain = RuleChain::default();
        chain.append(aborting("2"));
        chain.append(aborting("3"));
        chain.prepend(aborting("1"));
        chain.prepend(aborting("0"));
        assert_eq!(chain.rules().len(), 4);

        for (i, rule) in chain.rules().iter().enumerate() {
            let mut ctx = Context::new(Value::Null);
            rule(&mut ctx);
            assert_eq!(ctx.err().unwrap().to_string(), i.to_string());
        }
    }

    #[test]
    fn unguarded_chain_skips_absent() {
        let mut chain = RuleChain::default();
        chain.append(aborting("should not run"));
        let mut ctx = Context::new(Value::Null);
        assert!(!chain.run(&mut ctx));
        assert!(ctx.err().is_none());
        assert!(ctx.is_skipped());
    }

    #[test]
    fn last_guard_runs_first() {
        let mut chain = RuleChain::default();
        chain.default_value(json!("x"));
        chain.required();
        let mut ctx = Context::new(Value::Null);
        chain.run(&mut ctx);
        assert!(matches!(ctx.err(), Some(ValidationError::Required { .. })));

        let mut chain = RuleChain::default();
        chain.required();
        chain.default_value(json!("x"));
        let mut ctx = Context::new(Value::Null);
        assert!(chain.run(&mut ctx));
        assert_eq!(ctx.value(), &json!("x"));
    }

    #[test]
    fn run_stops_at_skip() {
        let mut chain = RuleChain::default();
        chain.append(Arc::new(|ctx: &mut Context| ctx.skip()));
        chain.append(aborting("unreachable"));
        let mut ctx = Context::new(json!(1));
        assert!(!chain.run(&mut ctx));
        assert!(ctx.err().is_none());
    }

    #[test]
    fn condition_equality_is_numeric() {
        assert!(Condition::from(1i64).is_satisfied_by(&json!(1.0)));
        assert!(Condition::from("a").is_satisfied_by(&json!("a")));
        assert!(!Condition::from(true).is_satisfied_by(&json!("true")));
    }
}
