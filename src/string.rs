//! String schema.

use regex::Regex;
use serde_json::Value;

use crate::context::Context;
use crate::error::ValidationError;
use crate::schema::{impl_rule_chain, RuleChain, Schema};

/// Generates a schema that matches string values.
pub fn string() -> StringSchema {
    StringSchema {
        chain: RuleChain::default(),
    }
}

/// Matches string values.
#[derive(Clone)]
pub struct StringSchema {
    chain: RuleChain,
}

impl_rule_chain!(StringSchema);

impl StringSchema {
    /// Substitute `value` when the value is absent.
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.chain.default_value(Value::String(value.into()));
        self
    }

    /// Replace the value with `value`.
    pub fn set(self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.transform(move |ctx| ctx.set_value(value.as_str()))
    }

    /// Require the value to equal `value`.
    pub fn equal(self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.check(move |s| {
            if s == value {
                Ok(())
            } else {
                Err(format!("is not {:?}", value))
            }
        })
    }

    /// Validate the string with `f`; an `Err` carries the rejection reason.
    /// Aborts with a type mismatch when the value is not a string.
    pub fn check<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.transform(move |ctx| {
            let Some(s) = ctx.value().as_str() else {
                let err = ctx.type_mismatch("string");
                ctx.abort(err);
                return;
            };
            if let Err(reason) = f(s) {
                let err = ctx.constraint(reason);
                ctx.abort(err);
            }
        })
    }

    /// Require the value to be one of `values`.
    pub fn valid<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        self.check(move |s| {
            if values.iter().any(|v| v == s) {
                Ok(())
            } else {
                Err(format!("is not in {:?}", values))
            }
        })
    }

    /// Require at least `min` bytes.
    pub fn min(self, min: usize) -> Self {
        self.check(move |s| {
            if s.len() < min {
                Err(format!("length less than {}", min))
            } else {
                Ok(())
            }
        })
    }

    /// Require at most `max` bytes.
    pub fn max(self, max: usize) -> Self {
        self.check(move |s| {
            if s.len() > max {
                Err(format!("length exceeded {}", max))
            } else {
                Ok(())
            }
        })
    }

    /// Require exactly `length` bytes.
    pub fn length(self, length: usize) -> Self {
        self.check(move |s| {
            if s.len() != length {
                Err(format!("length not equal to {}", length))
            } else {
                Ok(())
            }
        })
    }

    /// Require the value to match `pattern`.
    ///
    /// The pattern is compiled once, here. A pattern that does not compile
    /// turns into a rule rejecting every value.
    pub fn regex(self, pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(re) => self.check(move |s| {
                if re.is_match(s) {
                    Ok(())
                } else {
                    Err(format!("not match with {}", re.as_str()))
                }
            }),
            Err(e) => {
                let message = format!("invalid pattern {}: {}", pattern, e);
                self.transform(move |ctx| ctx.abort(ValidationError::custom(message.clone())))
            }
        }
    }

    /// Only a-z, A-Z and 0-9.
    pub fn alphanum(self) -> Self {
        self.regex("^[a-zA-Z0-9]+$")
    }

    /// Only a-z, A-Z, 0-9 and underscore.
    pub fn token(self) -> Self {
        self.regex("^[a-zA-Z0-9_]+$")
    }

    /// Replace the string with `f(value)`.
    /// Aborts with a type mismatch when the value is not a string.
    pub fn convert<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.transform(move |ctx| {
            let converted = match ctx.value().as_str() {
                Some(s) => f(s),
                None => {
                    let err = ctx.type_mismatch("string");
                    ctx.abort(err);
                    return;
                }
            };
            ctx.set_value(converted);
        })
    }

    pub fn lowercase(self) -> Self {
        self.convert(str::to_lowercase)
    }

    pub fn uppercase(self) -> Self {
        self.convert(str::to_uppercase)
    }

    /// Strip leading and trailing whitespace.
    pub fn trim(self) -> Self {
        self.convert(|s| s.trim().to_string())
    }
}

impl Schema for StringSchema {
    fn priority(&self) -> i32 {
        self.chain.priority()
    }

    fn validate(&self, ctx: &mut Context) {
        if self.chain.run(ctx) && !ctx.value().is_string() {
            let err = ctx.type_mismatch("string");
            ctx.abort(err);
        }
    }
}
