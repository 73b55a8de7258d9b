// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The Pendo flag provider.
//!
//! A flag is "on" for a visitor exactly when the visitor/account pair belongs
//! to the Pendo segment named by the flag key. Segment memberships are fetched
//! once per cache miss and kept for the configured TTL.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pendo_common_config::SecretString;
use pendo_flags_core::{
	Context, ErrorCode, FlagSet, Properties, ResolutionReason, ResolutionResult, VARIANT_OFF,
	VARIANT_ON,
};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, SegmentCache};
use crate::client::{PendoClient, SegmentRequest};
use crate::config::ProviderConfig;
use crate::error::Result;
use crate::hooks::{
	EvaluationHook, EvaluationValue, FlagEvaluation, SharedEvaluationHook, TrackingHook,
	TrackingOptions,
};
use crate::tracking::EventReporter;

pub const PROVIDER_NAME: &str = "pendo";

/// Context attribute that overrides the configured default URL.
pub const URL_ATTRIBUTE: &str = "url";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderMetadata {
	pub name: &'static str,
}

/// Contract shared by flag providers.
///
/// Resolution never fails: problems are reported through the returned
/// [`ResolutionResult`] with [`ResolutionReason::Error`] and the caller's
/// default value.
#[async_trait]
pub trait FlagProvider: Send + Sync {
	fn metadata(&self) -> ProviderMetadata;

	async fn initialize(&self) -> Result<()>;

	async fn close(&self);

	async fn resolve_boolean(
		&self,
		flag_key: &str,
		default_value: bool,
		context: &Context,
	) -> ResolutionResult<bool>;

	async fn resolve_string(
		&self,
		flag_key: &str,
		default_value: String,
		context: &Context,
	) -> ResolutionResult<String>;

	async fn resolve_number(
		&self,
		flag_key: &str,
		default_value: f64,
		context: &Context,
	) -> ResolutionResult<f64>;

	async fn resolve_object(
		&self,
		flag_key: &str,
		default_value: Value,
		context: &Context,
	) -> ResolutionResult<Value>;

	/// Reports a named event for the context's visitor without waiting for delivery.
	fn track(&self, event_name: &str, context: &Context, properties: Properties);

	async fn clear_cache(&self);
}

/// Builder for [`PendoProvider`].
pub struct PendoProviderBuilder {
	config: ProviderConfig,
	http_client: Option<Client>,
	hooks: Vec<SharedEvaluationHook>,
	tracking: Option<TrackingOptions>,
}

impl PendoProviderBuilder {
	pub fn new() -> Self {
		Self::from_config(ProviderConfig::new("", ""))
	}

	pub fn from_config(config: ProviderConfig) -> Self {
		Self {
			config,
			http_client: None,
			hooks: Vec::new(),
			tracking: None,
		}
	}

	pub fn api_key(mut self, api_key: impl Into<SecretString>) -> Self {
		self.config.api_key = api_key.into();
		self
	}

	pub fn default_url(mut self, url: impl Into<String>) -> Self {
		self.config.default_url = url.into();
		self
	}

	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.config = self.config.with_base_url(url);
		self
	}

	pub fn cache_ttl(mut self, ttl: Duration) -> Self {
		self.config = self.config.with_cache_ttl(ttl);
		self
	}

	pub fn track_event_secret(mut self, secret: impl Into<SecretString>) -> Self {
		self.config = self.config.with_track_event_secret(secret);
		self
	}

	/// Uses `client` instead of the shared default HTTP client.
	pub fn http_client(mut self, client: Client) -> Self {
		self.http_client = Some(client);
		self
	}

	/// Registers a post-evaluation hook. Hooks run in registration order.
	pub fn hook<H: EvaluationHook>(mut self, hook: H) -> Self {
		self.hooks.push(Arc::new(hook));
		self
	}

	/// Reports every evaluation as a track event.
	///
	/// The tracking hook runs after any hooks registered with [`hook`](Self::hook).
	pub fn track_evaluations(mut self, options: TrackingOptions) -> Self {
		self.tracking = Some(options);
		self
	}

	/// Builds the provider.
	///
	/// Required settings are checked by [`FlagProvider::initialize`], not here.
	pub fn build(self) -> Result<PendoProvider> {
		let client = match self.http_client {
			Some(http_client) => PendoClient::with_http_client(http_client, &self.config),
			None => PendoClient::new(&self.config)?,
		};
		let client = Arc::new(client);
		let reporter = EventReporter::new(Arc::clone(&client));

		let mut hooks = self.hooks;
		if let Some(options) = self.tracking {
			hooks.push(Arc::new(TrackingHook::new(
				reporter.clone(),
				options,
				PROVIDER_NAME,
			)));
		}

		Ok(PendoProvider {
			config: self.config,
			client,
			cache: SegmentCache::new(),
			reporter,
			hooks,
			ready: AtomicBool::new(false),
		})
	}
}

impl Default for PendoProviderBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Resolves flags from Pendo segment membership.
///
/// Each provider owns its cache; separately configured providers in one
/// process never share entries.
pub struct PendoProvider {
	config: ProviderConfig,
	client: Arc<PendoClient>,
	cache: SegmentCache,
	reporter: EventReporter,
	hooks: Vec<SharedEvaluationHook>,
	ready: AtomicBool,
}

impl PendoProvider {
	pub fn builder() -> PendoProviderBuilder {
		PendoProviderBuilder::new()
	}

	pub fn config(&self) -> &ProviderConfig {
		&self.config
	}

	pub fn cache(&self) -> &SegmentCache {
		&self.cache
	}

	pub fn reporter(&self) -> &EventReporter {
		&self.reporter
	}

	/// True between a successful `initialize` and `close`.
	pub fn is_ready(&self) -> bool {
		self.ready.load(Ordering::SeqCst)
	}

	async fn segment_flags(&self, key: CacheKey, request: SegmentRequest) -> Result<Arc<FlagSet>> {
		if let Some(flags) = self.cache.get(&key).await {
			debug!(cache_key = %key, "Segment cache hit");
			return Ok(flags);
		}

		debug!(cache_key = %key, "Segment cache miss, fetching");
		let flags = self.client.fetch_segment_flags(&request).await?;
		Ok(self.cache.set(key, flags, self.config.cache_ttl).await)
	}

	fn segment_request(&self, visitor_id: &str, context: &Context) -> SegmentRequest {
		let url = context
			.string_attribute(URL_ATTRIBUTE)
			.unwrap_or(self.config.default_url.as_str());

		SegmentRequest {
			visitor_id: visitor_id.to_string(),
			account_id: context.account_id().map(str::to_string),
			url: url.to_string(),
		}
	}

	async fn evaluate_boolean(
		&self,
		flag_key: &str,
		default_value: bool,
		context: &Context,
	) -> ResolutionResult<bool> {
		let (Some(visitor_id), Some(key)) = (context.visitor_id(), CacheKey::from_context(context))
		else {
			debug!(flag_key, "No visitorId in context, returning default");
			return ResolutionResult::default_value(default_value);
		};

		let request = self.segment_request(visitor_id, context);

		match self.segment_flags(key, request).await {
			Ok(flags) => ResolutionResult::from_membership(flags.contains(flag_key)),
			Err(e) => {
				warn!(flag_key, visitor_id, error = %e, "Segment lookup failed, returning default");
				ResolutionResult::error(default_value, ErrorCode::General, e.to_string())
			}
		}
	}

	async fn evaluate_derived<T>(
		&self,
		flag_key: &str,
		default_value: T,
		context: &Context,
		translate: impl FnOnce(bool) -> T + Send,
	) -> ResolutionResult<T>
	where
		T: Send,
	{
		let base = self.evaluate_boolean(flag_key, false, context).await;

		match base.reason {
			ResolutionReason::Error => base.map(|_| default_value),
			ResolutionReason::Default if !base.value => ResolutionResult::default_value(default_value),
			_ => base.map(translate),
		}
	}

	async fn run_hooks<T>(&self, flag_key: &str, result: &ResolutionResult<T>, context: &Context)
	where
		T: EvaluationValue + Sync,
	{
		if self.hooks.is_empty() {
			return;
		}

		let evaluation = FlagEvaluation::from_result(flag_key, result);
		for hook in &self.hooks {
			hook.after_evaluation(&evaluation, context).await;
		}
	}
}

#[async_trait]
impl FlagProvider for PendoProvider {
	fn metadata(&self) -> ProviderMetadata {
		ProviderMetadata {
			name: PROVIDER_NAME,
		}
	}

	async fn initialize(&self) -> Result<()> {
		self.config.validate()?;
		self.ready.store(true, Ordering::SeqCst);
		info!(
			base_url = %self.client.base_url(),
			cache_ttl_ms = self.config.cache_ttl.as_millis() as u64,
			tracking = self.client.has_track_secret(),
			"Pendo provider initialized"
		);
		Ok(())
	}

	async fn close(&self) {
		self.ready.store(false, Ordering::SeqCst);
		self.cache.clear().await;
		info!("Pendo provider closed");
	}

	async fn resolve_boolean(
		&self,
		flag_key: &str,
		default_value: bool,
		context: &Context,
	) -> ResolutionResult<bool> {
		let result = self.evaluate_boolean(flag_key, default_value, context).await;
		self.run_hooks(flag_key, &result, context).await;
		result
	}

	async fn resolve_string(
		&self,
		flag_key: &str,
		default_value: String,
		context: &Context,
	) -> ResolutionResult<String> {
		let result = self
			.evaluate_derived(flag_key, default_value, context, |enabled| {
				let variant = if enabled { VARIANT_ON } else { VARIANT_OFF };
				variant.to_string()
			})
			.await;
		self.run_hooks(flag_key, &result, context).await;
		result
	}

	async fn resolve_number(
		&self,
		flag_key: &str,
		default_value: f64,
		context: &Context,
	) -> ResolutionResult<f64> {
		let result = self
			.evaluate_derived(flag_key, default_value, context, |enabled| {
				if enabled {
					1.0
				} else {
					0.0
				}
			})
			.await;
		self.run_hooks(flag_key, &result, context).await;
		result
	}

	async fn resolve_object(
		&self,
		flag_key: &str,
		default_value: Value,
		context: &Context,
	) -> ResolutionResult<Value> {
		let result = self
			.evaluate_derived(flag_key, default_value, context, |enabled| {
				json!({ "enabled": enabled })
			})
			.await;
		self.run_hooks(flag_key, &result, context).await;
		result
	}

	fn track(&self, event_name: &str, context: &Context, properties: Properties) {
		let _ = self.reporter.track(event_name, context, properties);
	}

	async fn clear_cache(&self) {
		self.cache.clear().await;
		debug!("Segment cache cleared");
	}
}
