//! Schema accepting any kind of value.

use serde_json::Value;

use crate::context::Context;
use crate::schema::{impl_rule_chain, RuleChain, Schema};
use crate::value::{render_list, values_equal};

/// Generates a schema that matches any value.
pub fn any() -> AnySchema {
    AnySchema {
        chain: RuleChain::default(),
    }
}

/// Matches any value; no trailing type assertion.
#[derive(Clone)]
pub struct AnySchema {
    chain: RuleChain,
}

impl_rule_chain!(AnySchema);

impl AnySchema {
    /// Substitute `value` when the value is absent.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.chain.default_value(value.into());
        self
    }

    /// Replace the value with `value`.
    pub fn set(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.transform(move |ctx| ctx.set_value(value.clone()))
    }

    /// Require the value to equal `value`.
    pub fn equal(self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.transform(move |ctx| {
            if !values_equal(ctx.value(), &value) {
                let err = ctx.constraint(format!("is not {}", value));
                ctx.abort(err);
            }
        })
    }

    /// Require the value to be one of `values`.
    pub fn valid<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.transform(move |ctx| {
            if !values.iter().any(|v| values_equal(v, ctx.value())) {
                let err = ctx.constraint(format!("is not in {}", render_list(&values)));
                ctx.abort(err);
            }
        })
    }
}

impl Schema for AnySchema {
    fn priority(&self) -> i32 {
        self.chain.priority()
    }

    fn validate(&self, ctx: &mut Context) {
        self.chain.run(ctx);
    }
}
