// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pendo segment-membership feature flag provider.
//!
//! A flag key names a Pendo segment; the flag is on for a visitor when the
//! visitor (and account, if given) belongs to that segment.
//!
//! # Features
//!
//! - **Typed resolution**: boolean, string, number and object results, all
//!   derived from segment membership
//! - **Per-visitor caching**: one remote lookup per visitor/account pair per TTL
//! - **Non-throwing**: remote failures come back as `ERROR` results carrying the
//!   caller's default
//! - **Event tracking**: fire-and-forget track events, optionally for every
//!   evaluation through a post-evaluation hook
//!
//! # Example
//!
//! ```ignore
//! use pendo_flags::{Context, FlagProvider, PendoProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = PendoProvider::builder()
//!         .api_key("pendo-integration-key")
//!         .default_url("https://app.example.com")
//!         .build()?;
//!     provider.initialize().await?;
//!
//!     let context = Context::for_visitor("user-123").with_account_id("acme");
//!     let enabled = provider.resolve_boolean("new-checkout", false, &context).await;
//!     println!("new-checkout = {} ({})", enabled.value, enabled.reason);
//!
//!     provider.close().await;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
mod error;
pub mod hooks;
mod provider;
mod tracking;

pub use cache::{CacheKey, SegmentCache};
pub use client::{PendoClient, SegmentRequest};
pub use config::{ProviderConfig, DEFAULT_BASE_URL, DEFAULT_CACHE_TTL};
pub use error::{FlagsError, Result};
pub use hooks::{
	stringify_value, EvaluationHook, EvaluationValue, FlagEvaluation, SharedEvaluationHook,
	TrackingHook, TrackingOptions,
};
pub use provider::{
	FlagProvider, PendoProvider, PendoProviderBuilder, ProviderMetadata, PROVIDER_NAME,
};
pub use tracking::{EventReporter, TrackEvent};

// Re-export core types for convenience
pub use pendo_flags_core::{
	jzb, Context, ErrorCode, FlagSet, Properties, ResolutionReason, ResolutionResult,
};
