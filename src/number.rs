//! Number schema.
//!
//! Numbers are handled as `f64`. Integer JSON numbers are converted to their
//! float representation before the chain runs, so `10` and `10.0` go through
//! the same rules (and come out as `10.0`).

use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::error::ValidationError;
use crate::schema::{impl_rule_chain, RuleChain, Schema};
use crate::value::{float_value, is_absent};

/// Generates a schema that matches number values.
pub fn number() -> NumberSchema {
    NumberSchema {
        chain: RuleChain::default(),
    }
}

/// Matches number values.
#[derive(Clone)]
pub struct NumberSchema {
    chain: RuleChain,
}

impl_rule_chain!(NumberSchema);

impl NumberSchema {
    /// Substitute `value` when the value is absent.
    ///
    /// A non-finite default cannot be represented; an absent value then
    /// aborts naming the default.
    pub fn default(mut self, value: f64) -> Self {
        match float_value(value) {
            Some(default) => self.chain.default_value(default),
            None => {
                let message = format!("invalid default {}", value);
                self.chain.guard(Arc::new(move |ctx: &mut Context| {
                    if is_absent(ctx.value()) {
                        ctx.abort(ValidationError::custom(message.clone()));
                    }
                }));
            }
        }
        self
    }

    /// Replace the value with `value`.
    ///
    /// A non-finite `value` turns into a rule rejecting every value.
    pub fn set(self, value: f64) -> Self {
        match float_value(value) {
            Some(value) => self.transform(move |ctx| ctx.set_value(value.clone())),
            None => {
                let message = format!("invalid value {}", value);
                self.transform(move |ctx| ctx.abort(ValidationError::custom(message.clone())))
            }
        }
    }

    /// Require the value to equal `value`.
    pub fn equal(self, value: f64) -> Self {
        self.check(move |n| {
            if n == value {
                Ok(())
            } else {
                Err(format!("is not {}", value))
            }
        })
    }

    /// Validate the number with `f`; an `Err` carries the rejection reason.
    /// Aborts with a type mismatch when the value is not a number.
    pub fn check<F>(self, f: F) -> Self
    where
        F: Fn(f64) -> Result<(), String> + Send + Sync + 'static,
    {
        self.transform(move |ctx| {
            let Some(n) = ctx.value().as_f64() else {
                let err = ctx.type_mismatch("number");
                ctx.abort(err);
                return;
            };
            if let Err(reason) = f(n) {
                let err = ctx.constraint(reason);
                ctx.abort(err);
            }
        })
    }

    /// Require the value to be one of `values`.
    pub fn valid<I>(self, values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let values: Vec<f64> = values.into_iter().collect();
        self.check(move |n| {
            if values.contains(&n) {
                Ok(())
            } else {
                Err(format!("is not in {:?}", values))
            }
        })
    }

    /// Require the value to be greater than or equal to `min`.
    pub fn min(self, min: f64) -> Self {
        self.check(move |n| {
            if n < min {
                Err(format!("less than {}", min))
            } else {
                Ok(())
            }
        })
    }

    /// Require the value to be less than or equal to `max`.
    pub fn max(self, max: f64) -> Self {
        self.check(move |n| {
            if n > max {
                Err(format!("exceeded {}", max))
            } else {
                Ok(())
            }
        })
    }

    /// Require a value without fractional part.
    pub fn integer(self) -> Self {
        self.check(|n| {
            if n == n.trunc() {
                Ok(())
            } else {
                Err("is not integer".to_string())
            }
        })
    }

    /// Replace the number with `f(value)`.
    /// Aborts with a type mismatch when the value is not a number, and with a
    /// constraint error when the result is not finite.
    pub fn convert<F>(self, f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.transform(move |ctx| {
            let Some(n) = ctx.value().as_f64() else {
                let err = ctx.type_mismatch("number");
                ctx.abort(err);
                return;
            };
            match float_value(f(n)) {
                Some(converted) => ctx.set_value(converted),
                None => {
                    let err = ctx.constraint("converts to a non-finite number");
                    ctx.abort(err);
                }
            }
        })
    }

    pub fn ceil(self) -> Self {
        self.convert(f64::ceil)
    }

    pub fn floor(self) -> Self {
        self.convert(f64::floor)
    }

    /// Round to the nearest integer, half away from zero.
    pub fn round(self) -> Self {
        self.convert(f64::round)
    }

    /// Parse a string value as a number.
    ///
    /// Values that are not strings are left for the other rules; a string
    /// that does not parse aborts.
    pub fn parse_string(self) -> Self {
        self.transform(|ctx| {
            let Some(s) = ctx.value().as_str() else {
                return;
            };
            match s.trim().parse::<f64>().ok().and_then(float_value) {
                Some(parsed) => ctx.set_value(parsed),
                None => {
                    let err = ctx.constraint("convert to number failed");
                    ctx.abort(err);
                }
            }
        })
    }
}

impl Schema for NumberSchema {
    fn priority(&self) -> i32 {
        self.chain.priority()
    }

    fn validate(&self, ctx: &mut Context) {
        if let Value::Number(n) = ctx.value() {
            if !n.is_f64() {
                if let Some(coerced) = n.as_f64().and_then(float_value) {
                    ctx.set_value(coerced);
                }
            }
        }
        if self.chain.run(ctx) && !ctx.value().is_number() {
            let err = ctx.type_mismatch("number");
            ctx.abort(err);
        }
    }
}
