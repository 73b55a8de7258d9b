// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-visitor cache of segment flag sets.
//!
//! Entries expire lazily: a read at or after `expires_at` behaves as a miss
//! even if the entry has not been removed yet. Writes replace whole entries.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use pendo_flags_core::{Context, FlagSet};
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Cache key: `visitorId:accountId`, with an empty account part when absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
	pub fn new(visitor_id: &str, account_id: Option<&str>) -> Self {
		Self(format!("{visitor_id}:{}", account_id.unwrap_or("")))
	}

	/// The key for a context, or `None` when it has no visitor id.
	pub fn from_context(context: &Context) -> Option<Self> {
		context
			.visitor_id()
			.map(|visitor_id| Self::new(visitor_id, context.account_id()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for CacheKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

#[derive(Debug)]
struct CacheEntry {
	flags: Arc<FlagSet>,
	/// `None` when the TTL overflows the clock; such entries never expire.
	expires_at: Option<Instant>,
}

impl CacheEntry {
	fn is_live(&self, now: Instant) -> bool {
		self.expires_at.map_or(true, |at| now < at)
	}
}

/// In-memory segment cache.
///
/// Cloning yields a handle to the same map. Each provider creates its own, so
/// independently configured providers never share entries.
#[derive(Debug, Clone, Default)]
pub struct SegmentCache {
	inner: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
}

impl SegmentCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the live flag set for `key`.
	pub async fn get(&self, key: &CacheKey) -> Option<Arc<FlagSet>> {
		let now = Instant::now();
		self
			.inner
			.read()
			.await
			.get(key)
			.filter(|entry| entry.is_live(now))
			.map(|entry| Arc::clone(&entry.flags))
	}

	/// Stores `flags` for `ttl`, replacing any existing entry.
	///
	/// A zero TTL stores an entry that is already expired.
	pub async fn set(&self, key: CacheKey, flags: FlagSet, ttl: Duration) -> Arc<FlagSet> {
		let flags = Arc::new(flags);
		let entry = CacheEntry {
			flags: Arc::clone(&flags),
			expires_at: Instant::now().checked_add(ttl),
		};
		self.inner.write().await.insert(key, entry);
		flags
	}

	/// Removes every entry.
	pub async fn clear(&self) {
		self.inner.write().await.clear();
	}

	/// Removes expired entries and returns how many were dropped.
	///
	/// Reads already ignore expired entries; this only reclaims memory.
	pub async fn purge_expired(&self) -> usize {
		let now = Instant::now();
		let mut inner = self.inner.write().await;
		let before = inner.len();
		inner.retain(|_, entry| entry.is_live(now));
		before - inner.len()
	}

	/// Number of stored entries, including expired ones not yet purged.
	pub async fn len(&self) -> usize {
		self.inner.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.inner.read().await.is_empty()
	}
}
