// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use reqwest::{Client, ClientBuilder};

/// SDK name reported in the User-Agent.
pub const SDK_NAME: &str = "pendo-flags";
/// SDK version reported in the User-Agent.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Creates an HTTP client with the standard User-Agent.
pub fn new_client() -> reqwest::Result<Client> {
	builder().build()
}

/// Creates a client builder with the standard User-Agent.
///
/// Use this when the client needs further customization.
///
/// ```ignore
/// let client = pendo_common_http::builder()
///     .connect_timeout(Duration::from_secs(5))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	builder_with_user_agent(user_agent())
}

/// Creates a client builder with a caller-supplied User-Agent, for embedding
/// applications that report their own product name.
pub fn builder_with_user_agent(user_agent: impl Into<String>) -> ClientBuilder {
	Client::builder().user_agent(user_agent.into())
}

/// Returns the standard User-Agent: `pendo-flags/{version} ({os}-{arch})`.
pub fn user_agent() -> String {
	format!(
		"{SDK_NAME}/{SDK_VERSION} ({}-{})",
		std::env::consts::OS,
		std::env::consts::ARCH
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn user_agent_has_name_and_version() {
		let ua = user_agent();
		assert!(ua.starts_with("pendo-flags/"));
		assert!(ua.contains(SDK_VERSION));
		assert!(ua.contains(std::env::consts::OS));
	}

	#[test]
	fn builders_produce_clients() {
		assert!(new_client().is_ok());
		assert!(builder_with_user_agent("embedder/1.0").build().is_ok());
	}
}
