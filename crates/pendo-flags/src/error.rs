// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Pendo flags provider.

use pendo_common_config::{EnvError, SecretEnvError};
use pendo_flags_core::EncodingError;
use thiserror::Error;

/// Result type alias for the provider.
pub type Result<T> = std::result::Result<T, FlagsError>;

/// Errors raised by the provider.
///
/// Configuration errors fail [`initialize`](crate::FlagProvider::initialize).
/// Remote errors never reach flag-resolution callers: they are folded into an
/// `ERROR` resolution result carrying this error's message.
#[derive(Error, Debug)]
pub enum FlagsError {
	#[error("Pendo API key is required")]
	MissingApiKey,

	#[error("Pendo default URL is required")]
	MissingDefaultUrl,

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("failed to build HTTP client: {0}")]
	HttpClient(#[source] reqwest::Error),

	#[error("Pendo API rate limited the request (429 Too Many Requests)")]
	RateLimited {
		/// Seconds until retry is allowed, from `Retry-After`.
		retry_after_secs: Option<u64>,
	},

	#[error("Pendo API error: {status} {status_text}")]
	ServerError { status: u16, status_text: String },

	#[error("request to Pendo failed: {message}")]
	RequestFailed {
		/// The transport error and each of its causes, joined with `": "`.
		message: String,
		#[source]
		source: reqwest::Error,
	},

	#[error("failed to parse Pendo response: {0}")]
	ParseFailed(String),

	#[error("track event secret is not configured")]
	MissingTrackSecret,

	#[error(transparent)]
	Encoding(#[from] EncodingError),
}

impl FlagsError {
	/// Wraps a transport error without its URL, which carries the API key.
	pub fn request_failed(err: reqwest::Error) -> Self {
		let source = err.without_url();
		FlagsError::RequestFailed {
			message: error_chain(&source),
			source,
		}
	}

	/// Wraps a response body error, with its causes and without its URL.
	pub fn parse_failed(err: reqwest::Error) -> Self {
		FlagsError::ParseFailed(error_chain(&err.without_url()))
	}

	/// True for errors that mean the provider cannot be used as configured.
	pub fn is_configuration(&self) -> bool {
		matches!(
			self,
			FlagsError::MissingApiKey
				| FlagsError::MissingDefaultUrl
				| FlagsError::InvalidConfig(_)
				| FlagsError::MissingTrackSecret
		)
	}

	/// True for failures talking to the Pendo API.
	pub fn is_remote(&self) -> bool {
		matches!(
			self,
			FlagsError::RateLimited { .. }
				| FlagsError::ServerError { .. }
				| FlagsError::RequestFailed { .. }
				| FlagsError::ParseFailed(_)
		)
	}
}

/// Renders `err` followed by every distinct cause in its source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
	let mut message = err.to_string();
	let mut cause = err.source();
	while let Some(e) = cause {
		let text = e.to_string();
		if !message.contains(&text) {
			message.push_str(": ");
			message.push_str(&text);
		}
		cause = e.source();
	}
	message
}

impl From<SecretEnvError> for FlagsError {
	fn from(err: SecretEnvError) -> Self {
		FlagsError::InvalidConfig(err.to_string())
	}
}

impl From<EnvError> for FlagsError {
	fn from(err: EnvError) -> Self {
		FlagsError::InvalidConfig(err.to_string())
	}
}
