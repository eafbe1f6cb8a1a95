//! JSON validation and coercion
//!
//! Declarative schemas that check a JSON document and transform it on the
//! way through: defaults are filled in, values are converted, and the first
//! rule violation aborts the run with an error naming the offending field.
//!
//! # Example
//!
//! ```
//! use jio::{array, boolean, number, object, string, validate, Keys};
//! use serde_json::json;
//!
//! let schema = object().keys(
//!     Keys::new()
//!         .key(
//!             "debug",
//!             string().valid(["on", "off"]).convert(|s| {
//!                 if s == "on" { "off".to_string() } else { s.to_string() }
//!             }),
//!         )
//!         .key("title", string().default("t"))
//!         .key("list", array().items(vec![number().into(), string().into()]))
//!         .key("is", boolean().truthy(["yes"]).required()),
//! );
//!
//! let document = json!({"debug": "on", "list": [1, "hi"], "is": "yes"});
//! let validated = validate(&schema, document).unwrap();
//!
//! assert_eq!(
//!     validated,
//!     json!({"debug": "off", "list": [1, "hi"], "is": true, "title": "t"})
//! );
//! ```
//!
//! # Rule chains
//!
//! Every schema kind is a chain of rules built with consuming builder calls.
//!
//! | Call | Effect |
//! |------|--------|
//! | `required()` | Abort when the value is absent |
//! | `optional()` | Accept an absent value and stop |
//! | `default(v)` | Substitute `v` when the value is absent |
//! | `transform(f)` | Append an arbitrary rule |
//! | `when(path, cond, then)` | Run `then` when the root value at `path` matches `cond` |
//!
//! Guards (`required`, `optional`, `default`) always run before the other
//! rules, most recently added first. A chain without a guard behaves as
//! `optional()`. `null` and a missing key are both absent.
//!
//! Object keys are evaluated in descending priority order (`set_priority`);
//! keys with equal priority keep their declaration order.

mod any;
mod array;
mod boolean;
mod context;
mod error;
#[cfg(feature = "http")]
pub mod http;
mod loader;
mod number;
mod object;
mod schema;
mod string;
mod validator;
mod value;

pub use any::{any, AnySchema};
pub use array::{array, ArraySchema};
pub use boolean::{boolean, BooleanSchema};
pub use context::Context;
pub use error::{Error, ValidationError};
pub use loader::{load_document, load_document_str};
pub use number::{number, NumberSchema};
pub use object::{object, Keys, ObjectSchema};
pub use schema::{Condition, Rule, Schema};
pub use string::{string, StringSchema};
pub use validator::{validate, validate_json};
pub use value::{is_absent, values_equal};
