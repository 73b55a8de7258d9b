// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use serde::{Deserialize, Serialize};

/// Variant reported when the visitor matched the flag's segment.
pub const VARIANT_ON: &str = "on";
/// Variant reported when the visitor was checked and did not match.
pub const VARIANT_OFF: &str = "off";
/// Variant reported when the caller's default was returned unchanged.
pub const VARIANT_DEFAULT: &str = "default";

/// Why a resolution produced its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionReason {
	/// The flag key is in the visitor's segment flag set.
	TargetingMatch,
	/// No match, or no data to evaluate against.
	Default,
	/// Resolution failed; the value is the caller's default.
	Error,
}

impl ResolutionReason {
	pub fn as_str(&self) -> &'static str {
		match self {
			ResolutionReason::TargetingMatch => "TARGETING_MATCH",
			ResolutionReason::Default => "DEFAULT",
			ResolutionReason::Error => "ERROR",
		}
	}
}

impl fmt::Display for ResolutionReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Provider-contract error codes attached to `ERROR` results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	ProviderNotReady,
	FlagNotFound,
	ParseError,
	TypeMismatch,
	TargetingKeyMissing,
	InvalidContext,
	General,
}

impl ErrorCode {
	pub fn as_str(&self) -> &'static str {
		match self {
			ErrorCode::ProviderNotReady => "PROVIDER_NOT_READY",
			ErrorCode::FlagNotFound => "FLAG_NOT_FOUND",
			ErrorCode::ParseError => "PARSE_ERROR",
			ErrorCode::TypeMismatch => "TYPE_MISMATCH",
			ErrorCode::TargetingKeyMissing => "TARGETING_KEY_MISSING",
			ErrorCode::InvalidContext => "INVALID_CONTEXT",
			ErrorCode::General => "GENERAL",
		}
	}
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Outcome of resolving one flag for one context.
///
/// Results are built fresh per call. `variant` is absent on errors;
/// `error_code` and `error_message` are present only on errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult<T> {
	pub value: T,
	pub reason: ResolutionReason,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub variant: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error_code: Option<ErrorCode>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error_message: Option<String>,
}

impl<T> ResolutionResult<T> {
	pub fn new(value: T, reason: ResolutionReason, variant: impl Into<String>) -> Self {
		Self {
			value,
			reason,
			variant: Some(variant.into()),
			error_code: None,
			error_message: None,
		}
	}

	/// The caller's default, returned because there was nothing to evaluate.
	pub fn default_value(value: T) -> Self {
		Self::new(value, ResolutionReason::Default, VARIANT_DEFAULT)
	}

	/// The caller's default, returned because resolution failed.
	pub fn error(value: T, code: ErrorCode, message: impl Into<String>) -> Self {
		Self {
			value,
			reason: ResolutionReason::Error,
			variant: None,
			error_code: Some(code),
			error_message: Some(message.into()),
		}
	}

	pub fn is_error(&self) -> bool {
		self.reason == ResolutionReason::Error
	}

	/// Replaces the value, keeping reason, variant and error details.
	pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResolutionResult<U> {
		ResolutionResult {
			value: f(self.value),
			reason: self.reason,
			variant: self.variant,
			error_code: self.error_code,
			error_message: self.error_message,
		}
	}
}

impl ResolutionResult<bool> {
	/// `{true, TARGETING_MATCH, "on"}` or `{false, DEFAULT, "off"}`.
	pub fn from_membership(enabled: bool) -> Self {
		if enabled {
			Self::new(true, ResolutionReason::TargetingMatch, VARIANT_ON)
		} else {
			Self::new(false, ResolutionReason::Default, VARIANT_OFF)
		}
	}
}
