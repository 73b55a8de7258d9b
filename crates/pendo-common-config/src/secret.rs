// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for credentials.
//!
//! ```
//! use pendo_common_config::Secret;
//!
//! let key = Secret::new("pendo-api-key".to_string());
//! assert_eq!(format!("{key}"), "[REDACTED]");
//! assert_eq!(key.expose(), "pendo-api-key");
//! ```

use std::fmt;

use zeroize::Zeroize;

/// Placeholder printed in place of any secret value.
pub const REDACTED: &str = "[REDACTED]";

/// A sensitive value that never shows up in `Debug`, `Display` or `Serialize`
/// output and is zeroed on drop. The inner value is only reachable through
/// [`Secret::expose`].
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T: Zeroize> {
	inner: T,
}

/// The common case: API keys and shared secrets.
pub type SecretString = Secret<String>;

impl<T: Zeroize> Secret<T> {
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Explicitly access the inner value.
	pub fn expose(&self) -> &T {
		&self.inner
	}
}

impl SecretString {
	/// True when the secret is empty or only whitespace.
	pub fn is_blank(&self) -> bool {
		self.inner.trim().is_empty()
	}
}

impl From<String> for SecretString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SecretString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

impl<T: Zeroize + Clone> Clone for Secret<T> {
	fn clone(&self) -> Self {
		Self::new(self.inner.clone())
	}
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T: Zeroize> fmt::Display for Secret<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T: Zeroize + PartialEq> PartialEq for Secret<T> {
	fn eq(&self, other: &Self) -> bool {
		self.inner == other.inner
	}
}

impl<T: Zeroize + Eq> Eq for Secret<T> {}

#[cfg(feature = "serde")]
mod serde_impl {
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	use super::{Secret, REDACTED};

	impl<T: Zeroize> Serialize for Secret<T> {
		fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
			T::deserialize(deserializer).map(Secret::new)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_and_display_are_redacted() {
		let secret = SecretString::from("track-secret");
		assert_eq!(format!("{secret:?}"), "Secret(\"[REDACTED]\")");
		assert_eq!(format!("{secret}"), "[REDACTED]");
	}

	#[test]
	fn expose_returns_inner_value() {
		let secret = SecretString::from("track-secret");
		assert_eq!(secret.expose(), "track-secret");
	}

	#[test]
	fn blank_detection() {
		assert!(SecretString::from("").is_blank());
		assert!(SecretString::from("   ").is_blank());
		assert!(!SecretString::from("k").is_blank());
	}

	#[cfg(feature = "serde")]
	#[test]
	fn serializes_redacted_and_deserializes_plain() {
		let secret = SecretString::from("abc");
		assert_eq!(serde_json::to_string(&secret).unwrap(), "\"[REDACTED]\"");

		let parsed: SecretString = serde_json::from_str("\"abc\"").unwrap();
		assert_eq!(parsed.expose(), "abc");
	}

	proptest! {
		#[test]
		fn never_leaks_through_formatting(value in "[a-zA-Z0-9]{8,40}") {
			let secret = SecretString::from(value.clone());
			let debug = format!("{secret:?}");
			let display = format!("{secret}");
			prop_assert!(!debug.contains(&value));
			prop_assert!(!display.contains(&value));
		}
	}
}
