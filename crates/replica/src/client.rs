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

//! Replica client trait for lock storage operations.

use crate::ReplicaResult;
use async_trait::async_trait;
use std::time::Duration;

/// Outcome of a conditional delete on one replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Key existed, value matched, entry deleted
    Removed,
    /// Key did not exist (already expired or never written)
    Missing,
    /// Key existed but the stored value did not match
    Mismatch,
}

/// Client for one backing key-value replica.
///
/// ## Purpose
/// Exposes the small set of primitives the quorum engine needs: atomic
/// create-if-absent and token-conditional delete/expire/ttl. Conditional
/// operations compare the stored value and act in a single server-side step,
/// so a concurrent expiry between read and write cannot touch another
/// owner's entry.
///
/// ## Timeouts
/// Every operation takes an explicit `timeout`. Implementations must return
/// [`crate::ReplicaError::Timeout`] once the budget elapses; the engine
/// derives the budget from the per-replica limit and the remaining overall
/// deadline.
#[async_trait]
pub trait ReplicaClient: Send + Sync {
    /// Address of the backing replica, for logs and boot banners.
    fn address(&self) -> &str;

    /// Create `key = value` with expiry `ttl` only if the key is absent.
    ///
    /// ## Returns
    /// - `Ok(true)`: entry created, lock granted on this replica
    /// - `Ok(false)`: key already held by some value
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        timeout: Duration,
    ) -> ReplicaResult<bool>;

    /// Read the current value for `key`. Absent keys yield `Ok(None)`.
    async fn get(&self, key: &str, timeout: Duration) -> ReplicaResult<Option<String>>;

    /// Delete `key` only if its stored value equals `value` (atomic).
    async fn delete_if_match(
        &self,
        key: &str,
        value: &str,
        timeout: Duration,
    ) -> ReplicaResult<RemoveOutcome>;

    /// Reset the expiry of `key` to `ttl` only if its stored value equals
    /// `value` (atomic). Returns `false` when the key is absent or held by a
    /// different value.
    async fn expire_if_match(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        timeout: Duration,
    ) -> ReplicaResult<bool>;

    /// Remaining time-to-live of `key`, only if its stored value equals
    /// `value` (atomic). `None` when the key is absent, held by a different
    /// value, or carries no expiry.
    async fn ttl_if_match(
        &self,
        key: &str,
        value: &str,
        timeout: Duration,
    ) -> ReplicaResult<Option<Duration>>;
}
