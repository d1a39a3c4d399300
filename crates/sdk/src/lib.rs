// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of PlexLock.
//
// PlexLock is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// PlexLock is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with PlexLock. If not, see <https://www.gnu.org/licenses/>.

//! # PlexLock Client SDK
//!
//! ## Purpose
//! Thin client library over the coordinator's HTTP surface. Adds the one
//! piece of policy the server does not own: a retry loop with jittered
//! exponential backoff, bounded by a caller-supplied wait budget.
//!
//! ## Design Decisions
//! - **Conflict is the only retryable error**: everything else (transport,
//!   protocol, server error) aborts the acquire immediately
//! - **Scoped ownership**: [`LockGuard`] releases on every exit path; an
//!   explicit `release()` reports the outcome, a plain drop falls back to a
//!   best-effort background release
//!
//! ## Examples
//!
//! ```rust,no_run
//! use plexlock_sdk::LockClient;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = LockClient::new("http://localhost:8181")?;
//!
//! let guard = client
//!     .acquire("orders:42", Duration::from_secs(10), Duration::from_secs(2))
//!     .await?;
//! // ... protected section ...
//! guard.release().await?;
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod client;
pub mod error;

pub use backoff::BackoffConfig;
pub use client::{LockClient, LockGuard};
pub use error::{SdkError, SdkResult};
