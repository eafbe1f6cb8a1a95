//! Per-run validation state.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::ValidationError;

/// Mutable state threaded through one validation run.
///
/// A context is created for the document at the entry point and then
/// narrowed in place by the object traversal: the field path grows and the
/// current value is swapped for each child key. The root document stays
/// available for [`Context::reference`] lookups.
#[derive(Debug, Clone)]
pub struct Context {
    root: Value,
    pub(crate) fields: Vec<String>,
    value: Value,
    err: Option<ValidationError>,
    pub(crate) skip: bool,
    storage: HashMap<String, Value>,
}

impl Context {
    /// Create a context whose root and current value are both `document`.
    pub fn new(document: Value) -> Self {
        Self {
            root: document.clone(),
            fields: Vec::with_capacity(3),
            value: document,
            err: None,
            skip: false,
            storage: HashMap::new(),
        }
    }

    /// The value under inspection.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Mutable access to the value under inspection, for rules that edit it
    /// in place.
    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    /// Replace the value under inspection.
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
    }

    /// Move the value out, leaving the absent marker behind.
    pub fn take_value(&mut self) -> Value {
        std::mem::take(&mut self.value)
    }

    /// Path segments from the root to the current value.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Path segments joined with `.`.
    pub fn field_path(&self) -> String {
        self.fields.join(".")
    }

    /// Resolve a dotted path against the root document.
    ///
    /// Every segment must name a key of a mapping; anything else resolves to
    /// `None`. Sequences are not indexed.
    pub fn reference(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Record an error and stop the current chain. The first error wins.
    pub fn abort(&mut self, err: ValidationError) {
        if self.err.is_none() {
            self.err = Some(err);
        }
        self.skip = true;
    }

    /// Stop the current chain without an error, accepting the value as is.
    pub fn skip(&mut self) {
        self.skip = true;
    }

    /// Whether the current chain has been stopped, by a skip or an abort.
    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    /// The error recorded by the first abort of the run, if any.
    pub fn err(&self) -> Option<&ValidationError> {
        self.err.as_ref()
    }

    /// Store a value in the run's scratch storage.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.storage.insert(key.into(), value.into());
    }

    /// Read a value from the run's scratch storage.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.storage.get(key)
    }

    /// Finish the run: the transformed value, or the first error.
    pub fn into_result(self) -> Result<Value, ValidationError> {
        match self.err {
            Some(err) => Err(err),
            None => Ok(self.value),
        }
    }

    /// Type mismatch error for the current field and value.
    pub fn type_mismatch(&self, expected: &'static str) -> ValidationError {
        ValidationError::TypeMismatch {
            field: self.field_path(),
            value: self.value.to_string(),
            expected,
        }
    }

    /// Constraint error for the current field and value.
    pub fn constraint(&self, reason: impl Into<String>) -> ValidationError {
        ValidationError::Constraint {
            field: self.field_path(),
            value: self.value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn shape(&self, expected: &'static str) -> ValidationError {
        ValidationError::Shape {
            field: self.field_path(),
            value: self.value.to_string(),
            expected,
        }
    }

    /// Mirror the current value into the root at the current path.
    ///
    /// Only paths that resolve through existing mappings are written; a
    /// parent created by a default is written by its own traversal level.
    pub(crate) fn write_back(&mut self) {
        let Some((last, parents)) = self.fields.split_last() else {
            return;
        };
        let mut current = &mut self.root;
        for segment in parents {
            match current.as_object_mut().and_then(|map| map.get_mut(segment)) {
                Some(next) => current = next,
                None => return,
            }
        }
        if let Some(map) = current.as_object_mut() {
            map.insert(last.clone(), self.value.clone());
        }
    }
}
