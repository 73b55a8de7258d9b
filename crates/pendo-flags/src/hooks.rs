// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Post-evaluation hooks.
//!
//! The provider calls every registered [`EvaluationHook`] after each typed
//! resolution. [`TrackingHook`] is the built-in hook: it reports each
//! evaluation as a Pendo track event with these properties:
//!
//! | Property | Value |
//! |----------|-------|
//! | `flag_key` | The evaluated flag key |
//! | `flag_variant` | The variant, or `"unknown"` |
//! | `flag_reason` | The resolution reason, or `"UNKNOWN"` |
//! | `flag_value` | The resolved value as text (see [`stringify_value`]) |
//! | `provider_name` | The reporting provider's name |
//!
//! # Example
//!
//! ```ignore
//! use pendo_flags::{PendoProvider, TrackingOptions};
//!
//! let provider = PendoProvider::builder()
//!     .api_key("pendo-api-key")
//!     .default_url("https://app.example.com")
//!     .track_event_secret("shared-secret")
//!     .track_evaluations(TrackingOptions::new().filter(|key| !key.starts_with("internal.")))
//!     .build()?;
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use pendo_flags_core::{Context, ErrorCode, Properties, ResolutionReason, ResolutionResult};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::tracking::EventReporter;

/// Event name used by [`TrackingHook`] unless overridden.
pub const DEFAULT_EVALUATION_EVENT: &str = "flag_evaluated";

/// A resolved value as reported to hooks.
pub trait EvaluationValue {
	fn to_evaluation_value(&self) -> Value;
}

impl EvaluationValue for bool {
	fn to_evaluation_value(&self) -> Value {
		Value::Bool(*self)
	}
}

impl EvaluationValue for String {
	fn to_evaluation_value(&self) -> Value {
		Value::String(self.clone())
	}
}

/// JSON has no NaN or infinity; those are reported as text (`"NaN"`, `"inf"`).
impl EvaluationValue for f64 {
	fn to_evaluation_value(&self) -> Value {
		if self.is_finite() {
			Value::from(*self)
		} else {
			Value::String(self.to_string())
		}
	}
}

impl EvaluationValue for Value {
	fn to_evaluation_value(&self) -> Value {
		self.clone()
	}
}

/// One completed flag evaluation, as seen by hooks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagEvaluation {
	pub flag_key: String,
	pub value: Value,
	pub variant: Option<String>,
	pub reason: Option<ResolutionReason>,
	pub error_code: Option<ErrorCode>,
}

impl FlagEvaluation {
	pub fn from_result<T: EvaluationValue>(
		flag_key: impl Into<String>,
		result: &ResolutionResult<T>,
	) -> Self {
		Self {
			flag_key: flag_key.into(),
			value: result.value.to_evaluation_value(),
			variant: result.variant.clone(),
			reason: Some(result.reason),
			error_code: result.error_code,
		}
	}

	/// Properties reported by [`TrackingHook`].
	pub fn to_tracking_properties(&self, provider_name: &str) -> Properties {
		Properties::new()
			.insert("flag_key", self.flag_key.as_str())
			.insert("flag_variant", self.variant.as_deref().unwrap_or("unknown"))
			.insert(
				"flag_reason",
				self.reason.map_or("UNKNOWN", |reason| reason.as_str()),
			)
			.insert("flag_value", stringify_value(&self.value))
			.insert("provider_name", provider_name)
	}
}

/// Renders a resolved value as text.
///
/// `null` becomes `"null"`, strings are used verbatim, objects and arrays
/// become compact JSON, and integral numbers drop their fractional part.
pub fn stringify_value(value: &Value) -> String {
	match value {
		Value::Null => "null".to_string(),
		Value::String(s) => s.clone(),
		Value::Number(n) => match n.as_f64() {
			Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
			_ => n.to_string(),
		},
		other => other.to_string(),
	}
}

/// Receives every flag evaluation made by the provider.
///
/// Hooks run on the resolution path, in registration order; keep them fast
/// and push slow work onto background tasks.
#[async_trait]
pub trait EvaluationHook: Send + Sync + 'static {
	async fn after_evaluation(&self, evaluation: &FlagEvaluation, context: &Context);
}

pub type SharedEvaluationHook = Arc<dyn EvaluationHook>;

type FlagFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Settings for [`TrackingHook`].
#[derive(Clone)]
pub struct TrackingOptions {
	event_name: String,
	provider_name: Option<String>,
	filter: Option<FlagFilter>,
}

impl TrackingOptions {
	pub fn new() -> Self {
		Self {
			event_name: DEFAULT_EVALUATION_EVENT.to_string(),
			provider_name: None,
			filter: None,
		}
	}

	/// Overrides the tracked event name.
	pub fn event_name(mut self, name: impl Into<String>) -> Self {
		self.event_name = name.into();
		self
	}

	/// Overrides the reported `provider_name` property.
	pub fn provider_name(mut self, name: impl Into<String>) -> Self {
		self.provider_name = Some(name.into());
		self
	}

	/// Only flags for which `should_track` returns true are reported.
	pub fn filter<F>(mut self, should_track: F) -> Self
	where
		F: Fn(&str) -> bool + Send + Sync + 'static,
	{
		self.filter = Some(Arc::new(should_track));
		self
	}
}

impl Default for TrackingOptions {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for TrackingOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TrackingOptions")
			.field("event_name", &self.event_name)
			.field("provider_name", &self.provider_name)
			.field("filter", &self.filter.is_some())
			.finish()
	}
}

/// Reports each evaluation through an [`EventReporter`].
#[derive(Clone)]
pub struct TrackingHook {
	reporter: EventReporter,
	event_name: String,
	provider_name: String,
	filter: Option<FlagFilter>,
}

impl TrackingHook {
	/// `default_provider_name` is used unless the options override it.
	pub fn new(
		reporter: EventReporter,
		options: TrackingOptions,
		default_provider_name: &str,
	) -> Self {
		Self {
			reporter,
			event_name: options.event_name,
			provider_name: options
				.provider_name
				.unwrap_or_else(|| default_provider_name.to_string()),
			filter: options.filter,
		}
	}

	fn should_track(&self, flag_key: &str) -> bool {
		self.filter.as_ref().map_or(true, |filter| filter(flag_key))
	}
}

impl fmt::Debug for TrackingHook {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TrackingHook")
			.field("event_name", &self.event_name)
			.field("provider_name", &self.provider_name)
			.field("filter", &self.filter.is_some())
			.finish_non_exhaustive()
	}
}

#[async_trait]
impl EvaluationHook for TrackingHook {
	async fn after_evaluation(&self, evaluation: &FlagEvaluation, context: &Context) {
		if !self.should_track(&evaluation.flag_key) {
			debug!(flag_key = %evaluation.flag_key, "Evaluation tracking filtered out");
			return;
		}

		let properties = evaluation.to_tracking_properties(&self.provider_name);
		// The send runs detached; its outcome is only logged.
		let _ = self.reporter.track(&self.event_name, context, properties);
	}
}
