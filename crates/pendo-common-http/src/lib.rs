// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with a consistent User-Agent header.

mod client;

pub use client::{builder, builder_with_user_agent, new_client, user_agent, SDK_NAME, SDK_VERSION};
