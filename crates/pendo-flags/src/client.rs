// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP transport to the Pendo data API.
//!
//! Shared by the resolver (segment lookups) and the event reporter (track
//! calls) so both use the same base URL, credentials and connection pool.

use pendo_common_config::SecretString;
use pendo_flags_core::{jzb, FlagSet};
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::error::{FlagsError, Result};
use crate::tracking::TrackEvent;

pub const SEGMENT_FLAG_PATH: &str = "/data/segmentflag.json";
pub const TRACK_PATH: &str = "/data/track";
pub const TRACK_SECRET_HEADER: &str = "x-pendo-track-event-secret";

/// Payload jzb-encoded into the `jzb` query parameter of a segment lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRequest {
	pub visitor_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub account_id: Option<String>,
	pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentFlagsResponse {
	#[serde(default)]
	segment_flags: Option<Vec<String>>,
}

/// Client for the Pendo segment-flag and track endpoints.
#[derive(Debug, Clone)]
pub struct PendoClient {
	http_client: Client,
	base_url: String,
	api_key: SecretString,
	track_event_secret: Option<SecretString>,
}

impl PendoClient {
	/// Builds a client from `config` using the shared User-Agent.
	pub fn new(config: &ProviderConfig) -> Result<Self> {
		let http_client = pendo_common_http::new_client().map_err(FlagsError::HttpClient)?;
		Ok(Self::with_http_client(http_client, config))
	}

	/// Builds a client around an existing `reqwest::Client`.
	pub fn with_http_client(http_client: Client, config: &ProviderConfig) -> Self {
		Self {
			http_client,
			base_url: config.normalized_base_url().to_string(),
			api_key: config.api_key.clone(),
			track_event_secret: config.track_event_secret().cloned(),
		}
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	pub fn has_track_secret(&self) -> bool {
		self.track_event_secret.is_some()
	}

	/// Looks up the segment flags for one visitor/account pair.
	///
	/// `202 Accepted` (visitor not yet known) and `451` (visitor opted out)
	/// yield an empty set. `429` and any other non-success status are errors.
	pub async fn fetch_segment_flags(&self, request: &SegmentRequest) -> Result<FlagSet> {
		let token = jzb::encode(request)?;
		let url = format!(
			"{}{}/{}?jzb={}",
			self.base_url,
			SEGMENT_FLAG_PATH,
			self.api_key.expose(),
			token
		);

		debug!(
			visitor_id = %request.visitor_id,
			account_id = ?request.account_id,
			"Fetching segment flags"
		);

		let response = self
			.http_client
			.get(&url)
			.header(ACCEPT, "application/json")
			.send()
			.await
			.map_err(FlagsError::request_failed)?;

		match response.status() {
			StatusCode::ACCEPTED | StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS => {
				debug!(
					visitor_id = %request.visitor_id,
					status = response.status().as_u16(),
					"Visitor has no segment data"
				);
				Ok(FlagSet::empty())
			}
			status if status.is_success() => {
				let body: SegmentFlagsResponse = response
					.json()
					.await
					.map_err(FlagsError::parse_failed)?;
				Ok(body.segment_flags.unwrap_or_default().into_iter().collect())
			}
			_ => Err(status_error(response)),
		}
	}

	/// Posts a track event with the shared secret header.
	pub async fn send_track_event(&self, event: &TrackEvent) -> Result<()> {
		let secret = self
			.track_event_secret
			.as_ref()
			.ok_or(FlagsError::MissingTrackSecret)?;
		let url = format!("{}{}", self.base_url, TRACK_PATH);

		let response = self
			.http_client
			.post(&url)
			.header(TRACK_SECRET_HEADER, secret.expose())
			.json(event)
			.send()
			.await
			.map_err(FlagsError::request_failed)?;

		if response.status().is_success() {
			Ok(())
		} else {
			Err(status_error(response))
		}
	}
}

fn status_error(response: Response) -> FlagsError {
	let status = response.status();
	if status == StatusCode::TOO_MANY_REQUESTS {
		let retry_after_secs = response
			.headers()
			.get(reqwest::header::RETRY_AFTER)
			.and_then(|v| v.to_str().ok())
			.and_then(|s| s.parse().ok());
		return FlagsError::RateLimited { retry_after_secs };
	}

	FlagsError::ServerError {
		status: status.as_u16(),
		status_text: status.canonical_reason().unwrap_or("Unknown Status").to_string(),
	}
}
