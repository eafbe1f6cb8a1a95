//! Array schema.

use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::error::ValidationError;
use crate::schema::{impl_rule_chain, RuleChain, Schema};
use crate::value::{render_list, values_equal};

/// Generates a schema that matches array values.
pub fn array() -> ArraySchema {
    ArraySchema {
        chain: RuleChain::default(),
    }
}

/// Matches array values.
#[derive(Clone)]
pub struct ArraySchema {
    chain: RuleChain,
}

impl_rule_chain!(ArraySchema);

impl ArraySchema {
    /// Substitute `value` when the value is absent.
    pub fn default(mut self, value: Vec<Value>) -> Self {
        self.chain.default_value(Value::Array(value));
        self
    }

    /// Validate the elements with `f`; an `Err` carries the rejection reason.
    /// Aborts with a type mismatch when the value is not an array.
    pub fn check<F>(self, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<(), String> + Send + Sync + 'static,
    {
        self.transform(move |ctx| {
            let Some(elements) = ctx.value().as_array() else {
                let err = ctx.type_mismatch("array");
                ctx.abort(err);
                return;
            };
            if let Err(reason) = f(elements) {
                let err = ctx.constraint(reason);
                ctx.abort(err);
            }
        })
    }

    /// Every element must validate against at least one of `schemas`.
    ///
    /// Each attempt runs in its own context over a copy of the element, so
    /// transforms made by the element schemas are not kept.
    pub fn items(self, schemas: Vec<Arc<dyn Schema>>) -> Self {
        self.transform(move |ctx| {
            let Some(elements) = ctx.value().as_array() else {
                let err = ctx.shape("array");
                ctx.abort(err);
                return;
            };
            let rejected = elements.iter().find(|element| {
                !schemas.iter().any(|schema| {
                    let mut attempt = Context::new((*element).clone());
                    schema.validate(&mut attempt);
                    attempt.err().is_none()
                })
            });
            if let Some(element) = rejected {
                let err = ValidationError::Constraint {
                    field: ctx.field_path(),
                    value: element.to_string(),
                    reason: "is not a valid type".to_string(),
                };
                ctx.abort(err);
            }
        })
    }

    /// Every element must be one of `values`.
    pub fn valid<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.check(move |elements| {
            match elements
                .iter()
                .find(|e| !values.iter().any(|v| values_equal(v, e)))
            {
                Some(e) => Err(format!("element {} is not in {}", e, render_list(&values))),
                None => Ok(()),
            }
        })
    }

    /// Require at least `min` elements.
    pub fn min(self, min: usize) -> Self {
        self.check(move |elements| {
            if elements.len() < min {
                Err(format!("length less than {}", min))
            } else {
                Ok(())
            }
        })
    }

    /// Require at most `max` elements.
    pub fn max(self, max: usize) -> Self {
        self.check(move |elements| {
            if elements.len() > max {
                Err(format!("length exceeded {}", max))
            } else {
                Ok(())
            }
        })
    }

    /// Require exactly `length` elements.
    pub fn length(self, length: usize) -> Self {
        self.check(move |elements| {
            if elements.len() != length {
                Err(format!("length not equal to {}", length))
            } else {
                Ok(())
            }
        })
    }
}

impl Schema for ArraySchema {
    fn priority(&self) -> i32 {
        self.chain.priority()
    }

    fn validate(&self, ctx: &mut Context) {
        if self.chain.run(ctx) && !ctx.value().is_array() {
            let err = ctx.type_mismatch("array");
            ctx.abort(err);
        }
    }
}
