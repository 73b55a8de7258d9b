// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The jzb query-string codec: JSON, zlib-deflated, url-safe base64.
//!
//! The alphabet is standard base64 with `+` mapped to `-`, `/` mapped to `_`,
//! and trailing `=` padding removed, so a token can be placed in a query
//! parameter without escaping.
//!
//! ```
//! use pendo_flags_core::jzb;
//! use serde_json::{json, Value};
//!
//! let payload = json!({"visitorId": "user-123", "accountId": null});
//! let token = jzb::encode(&payload).unwrap();
//! let decoded: Value = jzb::decode(&token).unwrap();
//! assert_eq!(decoded, payload);
//! ```

use std::io::{Read, Write};

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{EncodingError, Result};

/// Url-safe alphabet, no padding on encode, padding optional on decode.
const ENGINE: GeneralPurpose = GeneralPurpose::new(
	&alphabet::URL_SAFE,
	GeneralPurposeConfig::new()
		.with_encode_padding(false)
		.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes `payload` into a jzb token.
///
/// Fails only when the payload cannot be serialized to JSON.
pub fn encode<T>(payload: &T) -> Result<String>
where
	T: Serialize + ?Sized,
{
	let json = serde_json::to_vec(payload).map_err(EncodingError::Serialize)?;

	let mut encoder = ZlibEncoder::new(Vec::with_capacity(json.len() / 2 + 16), Compression::default());
	encoder.write_all(&json).map_err(EncodingError::Compress)?;
	let compressed = encoder.finish().map_err(EncodingError::Compress)?;

	Ok(ENGINE.encode(compressed))
}

/// Decodes a jzb token back into `T`. Padded tokens are accepted.
pub fn decode<T>(token: &str) -> Result<T>
where
	T: DeserializeOwned,
{
	let compressed = ENGINE.decode(token.trim_end_matches('='))?;

	let mut json = Vec::with_capacity(compressed.len() * 4);
	ZlibDecoder::new(compressed.as_slice())
		.read_to_end(&mut json)
		.map_err(EncodingError::Decompress)?;

	serde_json::from_slice(&json).map_err(EncodingError::Deserialize)
}

/// True when `token` is non-empty and uses only `[A-Za-z0-9_-]`.
pub fn is_url_safe(token: &str) -> bool {
	!token.is_empty()
		&& token
			.bytes()
			.all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
	use super::*;
	use base64::engine::general_purpose::STANDARD;
	use serde_json::{json, Value};

	#[test]
	fn round_trips_visitor_payload() {
		let payload = json!({
			"visitorId": "user-123",
			"accountId": "acme",
			"url": "https://app.example.com/settings?tab=billing",
		});

		let token = encode(&payload).unwrap();
		assert!(is_url_safe(&token));
		assert_eq!(decode::<Value>(&token).unwrap(), payload);
	}

	#[test]
	fn round_trips_empty_object() {
		let payload = json!({});
		let token = encode(&payload).unwrap();
		assert!(is_url_safe(&token));
		assert_eq!(decode::<Value>(&token).unwrap(), payload);
	}

	#[test]
	fn round_trips_non_ascii_text() {
		let payload = json!({"visitorId": "usuário-ñ", "note": "日本語 ✓ 🚀"});
		let token = encode(&payload).unwrap();
		assert_eq!(decode::<Value>(&token).unwrap(), payload);
	}

	#[test]
	fn matches_standard_base64_with_remapped_alphabet() {
		let payload = json!({"visitorId": "user-123", "padding": "xx"});
		let json = serde_json::to_vec(&payload).unwrap();
		let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(&json).unwrap();
		let compressed = encoder.finish().unwrap();

		let expected = STANDARD
			.encode(&compressed)
			.replace('+', "-")
			.replace('/', "_")
			.trim_end_matches('=')
			.to_string();

		assert_eq!(encode(&payload).unwrap(), expected);
	}

	#[test]
	fn accepts_padded_tokens() {
		let payload = json!({"visitorId": "v"});
		let mut token = encode(&payload).unwrap();
		while token.len() % 4 != 0 {
			token.push('=');
		}
		assert_eq!(decode::<Value>(&token).unwrap(), payload);
	}

	#[test]
	fn rejects_characters_outside_alphabet() {
		let err = decode::<Value>("not a token!").unwrap_err();
		assert!(matches!(err, EncodingError::Base64(_)));
	}

	#[test]
	fn rejects_base64_that_is_not_deflate() {
		let token = ENGINE.encode(b"plain text, not zlib");
		let err = decode::<Value>(&token).unwrap_err();
		assert!(matches!(err, EncodingError::Decompress(_)));
	}

	#[test]
	fn rejects_deflated_non_json() {
		let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(b"{not json").unwrap();
		let token = ENGINE.encode(encoder.finish().unwrap());

		let err = decode::<Value>(&token).unwrap_err();
		assert!(matches!(err, EncodingError::Deserialize(_)));
	}

	#[test]
	fn unserializable_payload_is_an_error() {
		use std::collections::HashMap;

		// JSON object keys must be strings.
		let mut payload = HashMap::new();
		payload.insert(vec![1u8], "value");

		let err = encode(&payload).unwrap_err();
		assert!(matches!(err, EncodingError::Serialize(_)));
	}

	#[test]
	fn url_safety_check() {
		assert!(is_url_safe("eJyrVkrLz1eyUkpKLFKqBQAeuAR3"));
		assert!(is_url_safe("a-b_c"));
		assert!(!is_url_safe(""));
		assert!(!is_url_safe("a+b"));
		assert!(!is_url_safe("a/b"));
		assert!(!is_url_safe("ab=="));
	}
}
