// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provider configuration.
//!
//! Configuration can be built in code, deserialized (camelCase keys, e.g. from
//! a TOML file), or read from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `PENDO_API_KEY` / `PENDO_API_KEY_FILE` | `apiKey` |
//! | `PENDO_DEFAULT_URL` | `defaultUrl` |
//! | `PENDO_BASE_URL` | `baseUrl` |
//! | `PENDO_CACHE_TTL_MS` | `cacheTtlMs` |
//! | `PENDO_TRACK_EVENT_SECRET` / `PENDO_TRACK_EVENT_SECRET_FILE` | `trackEventSecret` |

use std::time::Duration;

use pendo_common_config::{load_env, load_secret_env, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{FlagsError, Result};

pub const DEFAULT_BASE_URL: &str = "https://data.pendo.io";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(60_000);

pub const ENV_API_KEY: &str = "PENDO_API_KEY";
pub const ENV_DEFAULT_URL: &str = "PENDO_DEFAULT_URL";
pub const ENV_BASE_URL: &str = "PENDO_BASE_URL";
pub const ENV_CACHE_TTL_MS: &str = "PENDO_CACHE_TTL_MS";
pub const ENV_TRACK_EVENT_SECRET: &str = "PENDO_TRACK_EVENT_SECRET";

/// Settings consumed by the provider.
///
/// `api_key` and `default_url` are required, but their absence is reported by
/// [`validate`](Self::validate) at initialization rather than at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
	#[serde(default = "empty_secret")]
	pub api_key: SecretString,
	/// Page URL sent with segment lookups when the context has no `url` attribute.
	#[serde(default)]
	pub default_url: String,
	#[serde(default = "default_base_url")]
	pub base_url: String,
	#[serde(default = "default_cache_ttl", rename = "cacheTtlMs", with = "duration_ms")]
	pub cache_ttl: Duration,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub track_event_secret: Option<SecretString>,
}

fn empty_secret() -> SecretString {
	SecretString::new(String::new())
}

fn default_base_url() -> String {
	DEFAULT_BASE_URL.to_string()
}

fn default_cache_ttl() -> Duration {
	DEFAULT_CACHE_TTL
}

impl ProviderConfig {
	pub fn new(api_key: impl Into<SecretString>, default_url: impl Into<String>) -> Self {
		Self {
			api_key: api_key.into(),
			default_url: default_url.into(),
			base_url: default_base_url(),
			cache_ttl: DEFAULT_CACHE_TTL,
			track_event_secret: None,
		}
	}

	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();
		self
	}

	pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
		self.cache_ttl = ttl;
		self
	}

	pub fn with_track_event_secret(mut self, secret: impl Into<SecretString>) -> Self {
		self.track_event_secret = Some(secret.into());
		self
	}

	/// Reads configuration from `PENDO_*` environment variables.
	///
	/// Missing required values are not an error here; see [`validate`](Self::validate).
	pub fn from_env() -> Result<Self> {
		let api_key = load_secret_env(ENV_API_KEY)?.unwrap_or_else(empty_secret);
		let default_url = load_env::<String>(ENV_DEFAULT_URL)?.unwrap_or_default();

		let mut config = Self::new(api_key, default_url);
		if let Some(base_url) = load_env::<String>(ENV_BASE_URL)? {
			config.base_url = base_url;
		}
		if let Some(ttl_ms) = load_env::<u64>(ENV_CACHE_TTL_MS)? {
			config.cache_ttl = Duration::from_millis(ttl_ms);
		}
		config.track_event_secret = load_secret_env(ENV_TRACK_EVENT_SECRET)?.filter(|s| !s.is_blank());

		Ok(config)
	}

	/// Parses a TOML document with the same camelCase keys.
	pub fn from_toml(input: &str) -> Result<Self> {
		toml::from_str(input).map_err(|e| FlagsError::InvalidConfig(e.to_string()))
	}

	/// Checks that the required settings are present.
	pub fn validate(&self) -> Result<()> {
		if self.api_key.is_blank() {
			return Err(FlagsError::MissingApiKey);
		}
		if self.default_url.trim().is_empty() {
			return Err(FlagsError::MissingDefaultUrl);
		}
		if self.base_url.trim().is_empty() {
			return Err(FlagsError::InvalidConfig("base URL must not be empty".to_string()));
		}
		Ok(())
	}

	/// The base URL without a trailing slash.
	pub fn normalized_base_url(&self) -> &str {
		self.base_url.trim_end_matches('/')
	}

	/// A usable (non-blank) track event secret, if configured.
	pub fn track_event_secret(&self) -> Option<&SecretString> {
		self.track_event_secret.as_ref().filter(|s| !s.is_blank())
	}
}

mod duration_ms {
	use std::time::Duration;

	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_u64(value.as_millis() as u64)
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
		u64::deserialize(deserializer).map(Duration::from_millis)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		let config = ProviderConfig::new("key", "https://app.example.com");
		assert_eq!(config.base_url, DEFAULT_BASE_URL);
		assert_eq!(config.cache_ttl, Duration::from_millis(60_000));
		assert!(config.track_event_secret().is_none());
		assert!(config.validate().is_ok());
	}

	#[test]
	fn validate_requires_api_key() {
		let config = ProviderConfig::new("", "https://app.example.com");
		assert!(matches!(config.validate(), Err(FlagsError::MissingApiKey)));

		let config = ProviderConfig::new("   ", "https://app.example.com");
		assert!(matches!(config.validate(), Err(FlagsError::MissingApiKey)));
	}

	#[test]
	fn validate_requires_default_url() {
		let config = ProviderConfig::new("key", "");
		assert!(matches!(config.validate(), Err(FlagsError::MissingDefaultUrl)));
	}

	#[test]
	fn api_key_checked_before_default_url() {
		let config = ProviderConfig::new("", "");
		assert!(matches!(config.validate(), Err(FlagsError::MissingApiKey)));
	}

	#[test]
	fn base_url_trailing_slash_is_trimmed() {
		let config = ProviderConfig::new("k", "u").with_base_url("http://localhost:8080//");
		assert_eq!(config.normalized_base_url(), "http://localhost:8080");
	}

	#[test]
	fn blank_track_secret_counts_as_missing() {
		let config = ProviderConfig::new("k", "u").with_track_event_secret("");
		assert!(config.track_event_secret().is_none());

		let config = ProviderConfig::new("k", "u").with_track_event_secret("s3cret");
		assert_eq!(config.track_event_secret().unwrap().expose(), "s3cret");
	}

	#[test]
	fn deserializes_camel_case_with_defaults() {
		let config: ProviderConfig = serde_json::from_value(serde_json::json!({
			"apiKey": "abc",
			"defaultUrl": "https://app.example.com",
			"cacheTtlMs": 1500,
		}))
		.unwrap();

		assert_eq!(config.api_key.expose(), "abc");
		assert_eq!(config.base_url, DEFAULT_BASE_URL);
		assert_eq!(config.cache_ttl, Duration::from_millis(1500));
		assert!(config.track_event_secret.is_none());
	}

	#[test]
	fn missing_required_fields_fail_validation_not_parsing() {
		let config: ProviderConfig = serde_json::from_str("{}").unwrap();
		assert!(matches!(config.validate(), Err(FlagsError::MissingApiKey)));
	}

	#[test]
	fn parses_toml() {
		let config = ProviderConfig::from_toml(
			r#"
			apiKey = "abc"
			defaultUrl = "https://app.example.com"
			baseUrl = "https://data.eu.pendo.io"
			trackEventSecret = "shh"
			"#,
		)
		.unwrap();

		assert_eq!(config.base_url, "https://data.eu.pendo.io");
		assert_eq!(config.track_event_secret().unwrap().expose(), "shh");
		assert_eq!(config.cache_ttl, DEFAULT_CACHE_TTL);
	}

	#[test]
	fn invalid_toml_is_config_error() {
		let err = ProviderConfig::from_toml("cacheTtlMs = \"soon\"").unwrap_err();
		assert!(matches!(err, FlagsError::InvalidConfig(_)));
	}

	#[test]
	fn serialization_redacts_secrets() {
		let config = ProviderConfig::new("abc", "u").with_track_event_secret("shh");
		let json = serde_json::to_string(&config).unwrap();
		assert!(!json.contains("abc"));
		assert!(!json.contains("shh"));
		assert!(json.contains("[REDACTED]"));
	}

	#[test]
	fn from_env_reads_variables() {
		std::env::set_var(ENV_API_KEY, "env-key");
		std::env::set_var(ENV_DEFAULT_URL, "https://env.example.com");
		std::env::set_var(ENV_CACHE_TTL_MS, "250");
		std::env::remove_var(ENV_BASE_URL);
		std::env::remove_var(ENV_TRACK_EVENT_SECRET);

		let config = ProviderConfig::from_env().unwrap();
		assert_eq!(config.api_key.expose(), "env-key");
		assert_eq!(config.default_url, "https://env.example.com");
		assert_eq!(config.cache_ttl, Duration::from_millis(250));
		assert_eq!(config.base_url, DEFAULT_BASE_URL);
		assert!(config.track_event_secret().is_none());

		std::env::remove_var(ENV_API_KEY);
		std::env::remove_var(ENV_DEFAULT_URL);
		std::env::remove_var(ENV_CACHE_TTL_MS);
	}
}
