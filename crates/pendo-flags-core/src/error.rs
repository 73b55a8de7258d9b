// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Failures of the jzb codec. Each variant names the stage that failed.
#[derive(Debug, Error)]
pub enum EncodingError {
	#[error("payload is not JSON-serializable: {0}")]
	Serialize(#[source] serde_json::Error),

	#[error("deflate failed: {0}")]
	Compress(#[source] std::io::Error),

	#[error("token is not valid url-safe base64: {0}")]
	Base64(#[from] base64::DecodeError),

	#[error("inflate failed: {0}")]
	Decompress(#[source] std::io::Error),

	#[error("decoded payload is not valid JSON: {0}")]
	Deserialize(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EncodingError>;
