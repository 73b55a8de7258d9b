// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Pendo segment flags.
//!
//! This crate holds the pieces that do not touch the network: the evaluation
//! [`Context`], the [`FlagSet`] returned by the segment service, the
//! [`ResolutionResult`] handed back to callers, the [`Properties`] builder for
//! tracked events, and the [`jzb`] codec used to carry payloads in a query
//! string. The HTTP side lives in `pendo-flags`.
//!
//! # Example
//!
//! ```
//! use pendo_flags_core::{jzb, Context, FlagSet, ResolutionReason, ResolutionResult};
//!
//! let ctx = Context::for_visitor("user-123").with_account_id("acme");
//! assert_eq!(ctx.visitor_id(), Some("user-123"));
//!
//! let flags: FlagSet = ["feature-a", "feature-b"].into_iter().collect();
//! let result = ResolutionResult::from_membership(flags.contains("feature-a"));
//! assert_eq!(result.reason, ResolutionReason::TargetingMatch);
//!
//! let token = jzb::encode(&serde_json::json!({"visitorId": "user-123"})).unwrap();
//! assert!(jzb::is_url_safe(&token));
//! ```

pub mod context;
pub mod error;
pub mod flag_set;
pub mod jzb;
pub mod properties;
pub mod resolution;

pub use context::Context;
pub use error::{EncodingError, Result};
pub use flag_set::FlagSet;
pub use properties::Properties;
pub use resolution::{
	ErrorCode, ResolutionReason, ResolutionResult, VARIANT_DEFAULT, VARIANT_OFF, VARIANT_ON,
};
