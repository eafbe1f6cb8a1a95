//! Validation entry points.

use serde_json::Value;

use crate::context::Context;
use crate::error::{Error, ValidationError};
use crate::loader::load_document_slice;
use crate::schema::Schema;

/// Validate a document against a schema.
///
/// Returns the transformed document (defaults filled in, conversions
/// applied), or the first error encountered anywhere in the tree.
///
/// # Errors
///
/// Returns the `ValidationError` that aborted the run.
pub fn validate(schema: &dyn Schema, document: Value) -> Result<Value, ValidationError> {
    let mut ctx = Context::new(document);
    schema.validate(&mut ctx);
    ctx.into_result()
}

/// Decode a JSON document, validate it, and encode the transformed document.
///
/// # Errors
///
/// Returns `Error::InvalidJson` if the input is not JSON and
/// `Error::Invalid` if the document does not match the schema.
pub fn validate_json(data: &[u8], schema: &dyn Schema) -> Result<Vec<u8>, Error> {
    let document = load_document_slice(data)?;
    let validated = validate(schema, document)?;
    serde_json::to_vec(&validated).map_err(|source| Error::Encode { source })
}
