// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fire-and-forget event tracking.
//!
//! [`EventReporter::track`] checks its preconditions, then hands the POST to
//! a spawned task. The caller never waits for it and never sees its errors;
//! failures are logged.

use std::sync::Arc;

use chrono::Utc;
use pendo_flags_core::{Context, Properties};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::client::PendoClient;

/// Body of a `POST /data/track` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEvent {
	#[serde(rename = "type")]
	pub kind: &'static str,
	pub event: String,
	pub visitor_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub account_id: Option<String>,
	/// Milliseconds since the Unix epoch.
	pub timestamp: i64,
	pub properties: Properties,
}

impl TrackEvent {
	pub fn new(
		event: impl Into<String>,
		visitor_id: impl Into<String>,
		account_id: Option<String>,
		properties: Properties,
	) -> Self {
		Self {
			kind: "track",
			event: event.into(),
			visitor_id: visitor_id.into(),
			account_id,
			timestamp: Utc::now().timestamp_millis(),
			properties,
		}
	}
}

/// Sends named visitor events to Pendo.
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Debug, Clone)]
pub struct EventReporter {
	client: Arc<PendoClient>,
}

impl EventReporter {
	pub fn new(client: Arc<PendoClient>) -> Self {
		Self { client }
	}

	/// Queues `event_name` for `context`'s visitor.
	///
	/// Skips with a warning, and makes no request, when no track secret is
	/// configured, when the context has no visitor id, or when called outside
	/// a tokio runtime. Otherwise returns the handle of the sending task; it
	/// can be dropped.
	pub fn track(
		&self,
		event_name: &str,
		context: &Context,
		properties: Properties,
	) -> Option<JoinHandle<()>> {
		if !self.client.has_track_secret() {
			warn!(event = event_name, "Track event secret not configured, skipping track");
			return None;
		}

		let Some(visitor_id) = context.visitor_id() else {
			warn!(event = event_name, "Context has no visitorId, skipping track");
			return None;
		};

		let Ok(runtime) = Handle::try_current() else {
			warn!(event = event_name, "No async runtime available, skipping track");
			return None;
		};

		let event = TrackEvent::new(
			event_name,
			visitor_id,
			context.account_id().map(str::to_string),
			properties,
		);
		let client = Arc::clone(&self.client);

		Some(runtime.spawn(async move {
			match client.send_track_event(&event).await {
				Ok(()) => debug!(event = %event.event, visitor_id = %event.visitor_id, "Track event sent"),
				Err(e) => error!(
					event = %event.event,
					visitor_id = %event.visitor_id,
					error = %e,
					"Failed to send track event"
				),
			}
		}))
	}
}
