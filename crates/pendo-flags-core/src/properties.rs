// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Builder for tracked-event properties.

use serde::Serialize;
use serde_json::{Map, Value};

/// Properties attached to a tracked event.
///
/// ```
/// use pendo_flags_core::Properties;
///
/// let props = Properties::new()
///     .insert("plan", "enterprise")
///     .insert("seats", 25)
///     .insert("trial", false);
/// assert_eq!(props.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Properties {
	inner: Map<String, Value>,
}

impl Properties {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a key-value pair. Later inserts of the same key win.
	pub fn insert<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<Value>,
	{
		self.inner.insert(key.into(), value.into());
		self
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.inner.get(key)
	}
}

impl From<Properties> for Value {
	fn from(props: Properties) -> Self {
		Value::Object(props.inner)
	}
}

/// Non-object values produce empty properties.
impl From<Value> for Properties {
	fn from(value: Value) -> Self {
		match value {
			Value::Object(inner) => Self { inner },
			_ => Self::new(),
		}
	}
}

impl From<Map<String, Value>> for Properties {
	fn from(inner: Map<String, Value>) -> Self {
		Self { inner }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn insert_various_types() {
		let props = Properties::new()
			.insert("name", "checkout")
			.insert("count", 3)
			.insert("ratio", 0.5)
			.insert("enabled", true)
			.insert("nested", json!({"a": [1, 2]}));

		assert_eq!(props.get("name"), Some(&json!("checkout")));
		assert_eq!(props.get("count"), Some(&json!(3)));
		assert_eq!(props.get("enabled"), Some(&json!(true)));
		assert_eq!(props.get("nested"), Some(&json!({"a": [1, 2]})));
		assert_eq!(props.len(), 5);
	}

	#[test]
	fn from_non_object_value_is_empty() {
		assert!(Properties::from(json!([1, 2, 3])).is_empty());
		assert!(Properties::from(Value::Null).is_empty());
		assert_eq!(Properties::from(json!({"k": "v"})).len(), 1);
	}

	#[test]
	fn serializes_as_plain_object() {
		let props = Properties::new().insert("k", "v");
		assert_eq!(serde_json::to_string(&props).unwrap(), r#"{"k":"v"}"#);
	}

	proptest! {
		#[test]
		fn len_counts_distinct_keys(keys in prop::collection::vec("[a-z]{1,8}", 0..20)) {
			let props = keys
				.iter()
				.fold(Properties::new(), |p, k| p.insert(k.as_str(), 1));
			let distinct: std::collections::HashSet<_> = keys.iter().collect();
			prop_assert_eq!(props.len(), distinct.len());
		}
	}
}
