// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Identity and attributes a flag is evaluated against.
///
/// Segment membership is evaluated per visitor, optionally scoped to an
/// account. An empty visitor id is treated the same as a missing one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub visitor_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub account_id: Option<String>,
	#[serde(default, skip_serializing_if = "HashMap::is_empty")]
	pub attributes: HashMap<String, serde_json::Value>,
}

impl Context {
	pub fn new() -> Self {
		Self::default()
	}

	/// Shorthand for a context identifying a single visitor.
	pub fn for_visitor(visitor_id: impl Into<String>) -> Self {
		Self::new().with_visitor_id(visitor_id)
	}

	pub fn with_visitor_id(mut self, visitor_id: impl Into<String>) -> Self {
		self.visitor_id = Some(visitor_id.into());
		self
	}

	pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
		self.account_id = Some(account_id.into());
		self
	}

	pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
		self.attributes.insert(key.into(), value);
		self
	}

	/// The visitor id, or `None` when missing or empty.
	pub fn visitor_id(&self) -> Option<&str> {
		self.visitor_id.as_deref().filter(|id| !id.is_empty())
	}

	/// The account id, or `None` when missing or empty.
	pub fn account_id(&self) -> Option<&str> {
		self.account_id.as_deref().filter(|id| !id.is_empty())
	}

	pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
		self.attributes.get(key)
	}

	/// A string-valued attribute.
	pub fn string_attribute(&self, key: &str) -> Option<&str> {
		self.attributes.get(key).and_then(|v| v.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn builder_sets_fields() {
		let ctx = Context::for_visitor("user-123")
			.with_account_id("acme")
			.with_attribute("plan", json!("enterprise"));

		assert_eq!(ctx.visitor_id(), Some("user-123"));
		assert_eq!(ctx.account_id(), Some("acme"));
		assert_eq!(ctx.attribute("plan"), Some(&json!("enterprise")));
	}

	#[test]
	fn empty_ids_are_treated_as_missing() {
		let ctx = Context::new().with_visitor_id("").with_account_id("");
		assert_eq!(ctx.visitor_id(), None);
		assert_eq!(ctx.account_id(), None);
	}

	#[test]
	fn string_attribute_ignores_other_types() {
		let ctx = Context::new()
			.with_attribute("url", json!("https://app.example.com"))
			.with_attribute("count", json!(3));

		assert_eq!(ctx.string_attribute("url"), Some("https://app.example.com"));
		assert_eq!(ctx.string_attribute("count"), None);
		assert_eq!(ctx.string_attribute("missing"), None);
	}

	#[test]
	fn deserializes_camel_case() {
		let ctx: Context = serde_json::from_value(json!({
			"visitorId": "v1",
			"accountId": "a1",
			"attributes": {"url": "https://x.example.com"}
		}))
		.unwrap();

		assert_eq!(ctx.visitor_id(), Some("v1"));
		assert_eq!(ctx.account_id(), Some("a1"));
		assert_eq!(ctx.string_attribute("url"), Some("https://x.example.com"));
	}
}
