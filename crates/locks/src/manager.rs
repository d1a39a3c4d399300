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

//! Lock manager trait and the granted-lock value type.

use crate::LockResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A granted lock.
///
/// The token is the bearer credential: release, refresh, and TTL all require
/// it, and no replica entry is ever modified on a token mismatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lock {
    /// Opaque resource name, used as the key on every replica
    pub resource: String,
    /// Coordinator-minted UUID v4; the bearer proof of ownership
    pub token: String,
    /// Validity window granted at acquisition
    pub ttl: Duration,
    /// Coordinator wall-clock time captured immediately before fan-out
    pub acquired_at: DateTime<Utc>,
}

/// Trait for quorum-based distributed lock coordination.
///
/// ## Design
/// - **Acquire**: grant on majority + timing check, reclaim partial grants
/// - **Release**: token-conditional delete, idempotent in effect
/// - **Refresh**: token-conditional expiry extension (heartbeat)
/// - **TTL**: remaining validity as seen by the quorum
///
/// The engine is stateless across requests; any coordinator instance can
/// serve any request.
#[async_trait]
pub trait LockManager: Send + Sync {
    /// Acquire a lock on `resource` for `ttl`.
    ///
    /// ## Returns
    /// - `Ok(Lock)`: granted on a majority of replicas within the window
    /// - `Err(LockError::Conflict)`: quorum not reached, or the acquisition
    ///   took longer than `ttl` (partial grants are reclaimed best-effort)
    /// - `Err(LockError::InvalidRequest)`: empty resource or TTL out of range
    async fn acquire(&self, resource: &str, ttl: Duration) -> LockResult<Lock>;

    /// Release the lock held under `token`.
    ///
    /// ## Returns
    /// - `Ok(())`: released (token mismatches on a minority are ignored;
    ///   that replica's entry belongs to a newer owner)
    /// - `Err(LockError::NotFound)`: a majority of replicas no longer carry
    ///   the key; the lock had already expired or been released
    /// - `Err(LockError::Internal)`: replica errors prevented a clean verdict
    async fn release(&self, resource: &str, token: &str) -> LockResult<()>;

    /// Extend the lock's expiry to `ttl` on every replica still holding
    /// `token`.
    ///
    /// ## Returns
    /// - `Ok(())`: a majority confirmed the extension
    /// - `Err(LockError::NotFound)`: the quorum no longer carries the token;
    ///   the caller must treat the protected section as lost
    async fn refresh(&self, resource: &str, token: &str, ttl: Duration) -> LockResult<()>;

    /// Remaining time-to-live, averaged over the replicas still holding
    /// `token`.
    ///
    /// ## Returns
    /// - `Ok(Duration)`: average remaining TTL across the confirming quorum
    /// - `Err(LockError::NotFound)`: fewer than a quorum confirmed the token
    async fn ttl(&self, resource: &str, token: &str) -> LockResult<Duration>;
}
