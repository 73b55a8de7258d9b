// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Environment variable helpers.
//!
//! Secrets follow the `VAR` / `VAR_FILE` convention used by Docker and
//! Kubernetes secret mounts: `VAR_FILE` wins when both are set.

use std::path::PathBuf;
use std::str::FromStr;
use std::{env, fs};

use thiserror::Error;

use crate::secret::SecretString;

/// Errors raised while loading a secret from the environment.
#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

/// Errors raised while parsing a plain environment value.
#[derive(Debug, Error)]
#[error("invalid value for {var}: {message}")]
pub struct EnvError {
	pub var: String,
	pub message: String,
}

/// Load a secret from `{var}_FILE` (a path) or `{var}` (the value itself).
///
/// A single trailing newline is stripped from file contents. Returns
/// `Ok(None)` when neither variable is set.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(path_str);
		let content = fs::read_to_string(&path).map_err(|source| SecretEnvError::Io {
			path: path.clone(),
			source,
		})?;

		let value = content.strip_suffix('\n').unwrap_or(&content).to_string();
		return Ok(Some(SecretString::new(value)));
	}

	Ok(env::var(var).ok().map(SecretString::new))
}

/// Load and parse a non-secret value. Unset or empty variables yield `Ok(None)`.
pub fn load_env<T>(var: &str) -> Result<Option<T>, EnvError>
where
	T: FromStr,
	T::Err: std::fmt::Display,
{
	match env::var(var) {
		Ok(raw) if !raw.trim().is_empty() => {
			raw.trim().parse().map(Some).map_err(|e: T::Err| EnvError {
				var: var.to_string(),
				message: e.to_string(),
			})
		}
		_ => Ok(None),
	}
}
