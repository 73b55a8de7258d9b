// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration primitives shared by the Pendo flags crates.
//!
//! - [`Secret<T>`]: a wrapper that keeps API keys and shared secrets out of
//!   logs and serialized config dumps
//! - [`load_secret_env`] / [`load_env`]: environment helpers with `*_FILE`
//!   support for secrets

pub mod env;
mod secret;

pub use env::{load_env, load_secret_env, EnvError, SecretEnvError};
pub use secret::{Secret, SecretString, REDACTED};
