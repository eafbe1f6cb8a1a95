//! Object schema and key traversal.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::context::Context;
use crate::schema::{impl_rule_chain, RuleChain, Schema};

/// Named child schemas of an object, in declaration order.
#[derive(Clone, Default)]
pub struct Keys {
    entries: Vec<(String, Arc<dyn Schema>)>,
}

impl Keys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name` with its schema. Declaring a name twice replaces the
    /// earlier schema but keeps its position.
    pub fn key(mut self, name: impl Into<String>, schema: impl Schema + 'static) -> Self {
        self.insert(name.into(), Arc::new(schema));
        self
    }

    fn insert(&mut self, name: String, schema: Arc<dyn Schema>) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = schema,
            None => self.entries.push((name, schema)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by descending priority; ties keep declaration order.
    fn into_sorted(mut self) -> Vec<(String, Arc<dyn Schema>)> {
        self.entries
            .sort_by_key(|(_, schema)| std::cmp::Reverse(schema.priority()));
        self.entries
    }
}

impl<K: Into<String>> FromIterator<(K, Arc<dyn Schema>)> for Keys {
    fn from_iter<I: IntoIterator<Item = (K, Arc<dyn Schema>)>>(iter: I) -> Self {
        let mut keys = Keys::new();
        for (name, schema) in iter {
            keys.insert(name.into(), schema);
        }
        keys
    }
}

/// Generates a schema that matches object values.
pub fn object() -> ObjectSchema {
    ObjectSchema {
        chain: RuleChain::default(),
    }
}

/// Matches object values.
#[derive(Clone)]
pub struct ObjectSchema {
    chain: RuleChain,
}

impl_rule_chain!(ObjectSchema);

impl ObjectSchema {
    /// Substitute `value` when the value is absent.
    pub fn default(mut self, value: Map<String, Value>) -> Self {
        self.chain.default_value(Value::Object(value));
        self
    }

    /// Validate the object with `f`; an `Err` carries the rejection reason.
    /// Aborts with a type mismatch when the value is not an object.
    pub fn check<F>(self, f: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Result<(), String> + Send + Sync + 'static,
    {
        self.transform(move |ctx| {
            let Some(map) = ctx.value().as_object() else {
                let err = ctx.type_mismatch("object");
                ctx.abort(err);
                return;
            };
            if let Err(reason) = f(map) {
                let err = ctx.constraint(reason);
                ctx.abort(err);
            }
        })
    }

    /// Require every one of `keys` to be present.
    pub fn with<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        self.check(move |map| match keys.iter().find(|key| !map.contains_key(*key)) {
            Some(missing) => Err(format!("is missing key `{}`", missing)),
            None => Ok(()),
        })
    }

    /// Treat `keys` as mutually exclusive: abort when two or more of them are
    /// present.
    pub fn without<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        self.check(move |map| {
            let present: Vec<&str> = keys
                .iter()
                .filter(|key| map.contains_key(*key))
                .map(String::as_str)
                .collect();
            if present.len() > 1 {
                Err(format!("contains exclusive keys {}", present.join(",")))
            } else {
                Ok(())
            }
        })
    }

    /// Validate each declared key against its schema.
    ///
    /// Keys run in descending priority order. The first failing key aborts
    /// the whole object; keys whose schema skipped are left untouched.
    pub fn keys(self, keys: Keys) -> Self {
        let children = keys.into_sorted();
        self.transform(move |ctx| traverse(ctx, &children))
    }
}

fn traverse(ctx: &mut Context, children: &[(String, Arc<dyn Schema>)]) {
    let mut map = match ctx.take_value() {
        Value::Object(map) => map,
        other => {
            ctx.set_value(other);
            let err = ctx.shape("object");
            ctx.abort(err);
            return;
        }
    };

    let depth = ctx.fields.len();
    for (key, schema) in children {
        ctx.fields.truncate(depth);
        ctx.fields.push(key.clone());
        tracing::trace!(
            field = %ctx.field_path(),
            priority = schema.priority(),
            "validating key"
        );

        ctx.skip = false;
        ctx.set_value(map.get(key).cloned().unwrap_or(Value::Null));
        schema.validate(ctx);
        if ctx.err().is_some() {
            break;
        }
        if !ctx.skip {
            ctx.write_back();
            map.insert(key.clone(), ctx.take_value());
        }
    }

    ctx.fields.truncate(depth);
    ctx.set_value(Value::Object(map));
    if ctx.err().is_none() {
        ctx.skip = false;
    }
}

impl Schema for ObjectSchema {
    fn priority(&self) -> i32 {
        self.chain.priority()
    }

    fn validate(&self, ctx: &mut Context) {
        if self.chain.run(ctx) && !ctx.value().is_object() {
            let err = ctx.type_mismatch("object");
            ctx.abort(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::{any, boolean, number, string};
    use serde_json::json;

    fn run(schema: &ObjectSchema, value: Value) -> Context {
        let mut ctx = Context::new(value);
        schema.validate(&mut ctx);
        ctx
    }

    /// Appends the current field path to the `order` scratch entry.
    fn record_order(ctx: &mut Context) {
        let mut order = ctx.get("order").cloned().unwrap_or_else(|| json!([]));
        if let Some(list) = order.as_array_mut() {
            list.push(Value::from(ctx.field_path()));
        }
        ctx.set("order", order);
    }

    #[test]
    fn keys_sort_by_descending_priority() {
        let sorted = Keys::new()
            .key("2", any().set_priority(2))
            .key("0", any().set_priority(0))
            .key("1", any().set_priority(1))
            .key("3", any().set_priority(3))
            .into_sorted();
        let names: Vec<&str> = sorted.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["3", "2", "1", "0"]);
    }

    #[test]
    fn equal_priorities_keep_declaration_order() {
        let sorted = Keys::new()
            .key("b", any())
            .key("a", any())
            .key("top", any().set_priority(1))
            .key("c", any())
            .into_sorted();
        let names: Vec<&str> = sorted.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["top", "b", "a", "c"]);
    }

    #[test]
    fn redeclared_key_replaces_schema() {
        let keys = Keys::new()
            .key("a", any().required())
            .key("b", any())
            .key("a", any());
        assert_eq!(keys.len(), 2);

        let ctx = run(&object().keys(keys), json!({}));
        assert!(ctx.err().is_none());
    }

    #[test]
    fn keys_from_iterator() {
        let keys: Keys = [
            ("a", Arc::new(string().required()) as Arc<dyn Schema>),
            ("b", Arc::new(number()) as Arc<dyn Schema>),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys.len(), 2);
        assert!(!keys.is_empty());
    }

    #[test]
    fn set_priority() {
        for priority in [-1, 0, 100] {
            assert_eq!(object().set_priority(priority).priority(), priority);
        }
    }

    #[test]
    fn required() {
        let ctx = run(&object().required(), Value::Null);
        assert!(matches!(ctx.err(), Some(ValidationError::Required { .. })));
    }

    #[test]
    fn optional_keys_are_not_written() {
        assert!(run(&object().optional(), Value::Null).err().is_none());

        let schema = object().keys(Keys::new().key("hi", string()));
        let ctx = run(&schema, json!({}));
        assert!(ctx.err().is_none());
        assert_eq!(ctx.value(), &json!({}));
    }

    #[test]
    fn default_value() {
        let mut value = Map::new();
        value.insert("1".into(), json!("2"));
        let ctx = run(&object().default(value), Value::Null);
        assert_eq!(ctx.value(), &json!({"1": "2"}));
    }

    #[test]
    fn with_keys() {
        let schema = object().with(["hi", "faceair"]);
        assert!(run(&schema, json!({"hi": "11", "faceair": "111"})).err().is_none());
        assert!(run(&schema, json!({"hi": "11", "other": "111"})).err().is_some());

        let ctx = run(&schema, json!("hhh"));
        assert!(matches!(ctx.err(), Some(ValidationError::TypeMismatch { .. })));
    }

    #[test]
    fn without_keys() {
        let schema = object().without(["hi", "faceair"]);
        assert!(run(&schema, json!({"hi": "11", "faceair": "111"})).err().is_some());
        assert!(run(&schema, json!({"hi": "11", "other": "111"})).err().is_none());
        assert!(run(&schema, json!("hhh")).err().is_some());
    }

    #[test]
    fn when_on_sibling() {
        let schema = object().keys(
            Keys::new().key("exist", boolean().required()).key(
                "object",
                object()
                    .when("exist", true, object().required())
                    .when("exist", false, object().optional()),
            ),
        );

        let ctx = run(&schema, json!({"exist": true, "object": {"1": "2"}}));
        assert!(ctx.err().is_none());

        let ctx = run(&schema, json!({"exist": false, "object": null}));
        assert!(ctx.err().is_none());

        let ctx = run(&schema, json!({"exist": "badcase", "age": -3}));
        assert!(ctx.err().is_some());
    }

    #[test]
    fn keys_on_non_object() {
        let schema = object().keys(Keys::new().key("exist", boolean().required()));
        assert!(run(&schema, json!({"exist": true})).err().is_none());

        let ctx = run(&schema, json!("???"));
        assert!(matches!(ctx.err(), Some(ValidationError::Shape { .. })));
    }

    #[test]
    fn plain_object_type_check() {
        assert!(run(&object(), Value::Null).err().is_none());
        assert!(run(&object(), json!("hhh")).err().is_some());
    }

    #[test]
    fn priority_controls_evaluation_order() {
        let schema = object().keys(
            Keys::new()
                .key("low", any().transform(record_order))
                .key("high", any().set_priority(10).transform(record_order))
                .key("mid", any().set_priority(5).transform(record_order)),
        );
        let ctx = run(&schema, json!({"low": 1, "high": 2, "mid": 3}));
        assert!(ctx.err().is_none());
        assert_eq!(ctx.get("order"), Some(&json!(["high", "mid", "low"])));
    }

    #[test]
    fn first_child_error_stops_siblings() {
        let schema = object().keys(
            Keys::new()
                .key("a", any().required())
                .key("b", any().required().transform(record_order)),
        );
        let ctx = run(&schema, json!({"a": null, "b": 1}));
        assert_eq!(ctx.err().and_then(ValidationError::field), Some("a"));
        assert_eq!(ctx.get("order"), None);
    }

    #[test]
    fn nested_paths_in_errors() {
        let schema = object().keys(Keys::new().key(
            "user",
            object().keys(Keys::new().key("age", number().max(150.0))),
        ));
        let ctx = run(&schema, json!({"user": {"age": 200}}));
        assert_eq!(ctx.err().and_then(ValidationError::field), Some("user.age"));
    }

    #[test]
    fn nested_transforms_are_written_back() {
        let schema = object().keys(
            Keys::new()
                .key(
                    "user",
                    object().keys(
                        Keys::new()
                            .key("name", string().trim())
                            .key("role", string().default("member")),
                    ),
                )
                .key("tail", string()),
        );
        let ctx = run(&schema, json!({"user": {"name": " ann "}}));
        assert!(ctx.err().is_none());
        assert!(!ctx.is_skipped());
        assert_eq!(
            ctx.value(),
            &json!({"user": {"name": "ann", "role": "member"}})
        );
    }

    #[test]
    fn defaults_are_visible_to_later_references() {
        let schema = object().keys(
            Keys::new()
                .key(
                    "target",
                    string().when("kind", "a", string().regex(r"^\d+(\.\d+){3}$")),
                )
                .key("kind", string().default("a").set_priority(1)),
        );
        let ctx = run(&schema, json!({"target": "nodot"}));
        assert_eq!(ctx.err().and_then(ValidationError::field), Some("target"));

        let ctx = run(&schema, json!({"target": "10.0.0.1"}));
        assert_eq!(ctx.value(), &json!({"target": "10.0.0.1", "kind": "a"}));
    }

    #[test]
    fn object_key_order_is_preserved() {
        let schema = object().keys(
            Keys::new()
                .key("b", number().set_priority(1))
                .key("a", string().uppercase()),
        );
        let ctx = run(&schema, json!({"a": "x", "b": 1, "c": true}));
        let keys: Vec<&String> = ctx.value().as_object().unwrap().keys().collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(ctx.value(), &json!({"a": "X", "b": 1.0, "c": true}));
    }
}
