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

//! Redis-backed replica client.
//!
//! ## Purpose
//! Production [`ReplicaClient`] implementation over one Redis instance.
//!
//! ## Design Decisions
//! - **Why ConnectionManager**: automatic connection pooling and reconnection
//! - **Why `SET NX PX`**: single-command atomic create-with-expiry
//! - **Why Lua scripts**: conditional delete/expire/ttl must compare the
//!   stored token and act in one atomic step; GET-then-DEL would race with
//!   expiry and re-acquisition by another owner

use crate::{RemoveOutcome, ReplicaClient, ReplicaError, ReplicaResult};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, RedisResult, Script};
use std::future::Future;
use std::time::Duration;

/// Delete the key only when it still holds the caller's value.
/// Returns -1 when absent, 1 when deleted, 0 on value mismatch.
const DELETE_IF_MATCH: &str = r#"
local current = redis.call('GET', KEYS[1])
if current == false then
  return -1
end
if current == ARGV[1] then
  return redis.call('DEL', KEYS[1])
end
return 0
"#;

/// Reset the expiry only when the key still holds the caller's value.
/// Returns 1 on success, 0 when absent or mismatched.
const EXPIRE_IF_MATCH: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
  return redis.call('PEXPIRE', KEYS[1], ARGV[2])
end
return 0
"#;

/// Remaining TTL in milliseconds, only when the key still holds the
/// caller's value. Returns -3 when absent or mismatched; PTTL semantics
/// otherwise (-2 vanished, -1 no expiry, >= 0 remaining).
const TTL_IF_MATCH: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
  return redis.call('PTTL', KEYS[1])
end
return -3
"#;

/// [`ReplicaClient`] backed by a single Redis instance.
pub struct RedisReplica {
    manager: ConnectionManager,
    address: String,
    delete_script: Script,
    expire_script: Script,
    ttl_script: Script,
}

impl RedisReplica {
    /// Connect to one Redis replica.
    ///
    /// ## Arguments
    /// * `address` - `host:port` or a full `redis://` URL
    ///
    /// ## Errors
    /// - [`ReplicaError::ConnectionFailed`] if the initial connection fails
    pub async fn connect(address: &str) -> ReplicaResult<Self> {
        let url = if address.contains("://") {
            address.to_string()
        } else {
            format!("redis://{}", address)
        };

        let client = Client::open(url.as_str())
            .map_err(|e| ReplicaError::ConnectionFailed(format!("invalid replica address '{}': {}", address, e)))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| ReplicaError::ConnectionFailed(format!("failed to connect to '{}': {}", address, e)))?;

        Ok(Self {
            manager,
            address: address.to_string(),
            delete_script: Script::new(DELETE_IF_MATCH),
            expire_script: Script::new(EXPIRE_IF_MATCH),
            ttl_script: Script::new(TTL_IF_MATCH),
        })
    }

    /// Run a Redis call under the given time budget.
    async fn bounded<T, F>(&self, timeout: Duration, fut: F) -> ReplicaResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result.map_err(ReplicaError::from),
            Err(_) => Err(ReplicaError::Timeout(timeout)),
        }
    }
}

#[async_trait]
impl ReplicaClient for RedisReplica {
    fn address(&self) -> &str {
        &self.address
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        timeout: Duration,
    ) -> ReplicaResult<bool> {
        let mut conn = self.manager.clone();
        let ttl_ms = ttl.as_millis().max(1) as u64;

        let reply: Option<String> = self
            .bounded(timeout, async {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("NX")
                    .arg("PX")
                    .arg(ttl_ms)
                    .query_async(&mut conn)
                    .await
            })
            .await?;

        Ok(reply.is_some())
    }

    async fn get(&self, key: &str, timeout: Duration) -> ReplicaResult<Option<String>> {
        let mut conn = self.manager.clone();

        self.bounded(timeout, async {
            redis::cmd("GET").arg(key).query_async(&mut conn).await
        })
        .await
    }

    async fn delete_if_match(
        &self,
        key: &str,
        value: &str,
        timeout: Duration,
    ) -> ReplicaResult<RemoveOutcome> {
        let mut conn = self.manager.clone();

        let reply: i64 = self
            .bounded(timeout, async {
                self.delete_script
                    .key(key)
                    .arg(value)
                    .invoke_async(&mut conn)
                    .await
            })
            .await?;

        Ok(match reply {
            -1 => RemoveOutcome::Missing,
            0 => RemoveOutcome::Mismatch,
            _ => RemoveOutcome::Removed,
        })
    }

    async fn expire_if_match(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        timeout: Duration,
    ) -> ReplicaResult<bool> {
        let mut conn = self.manager.clone();
        let ttl_ms = ttl.as_millis().max(1) as u64;

        let reply: i64 = self
            .bounded(timeout, async {
                self.expire_script
                    .key(key)
                    .arg(value)
                    .arg(ttl_ms)
                    .invoke_async(&mut conn)
                    .await
            })
            .await?;

        Ok(reply == 1)
    }

    async fn ttl_if_match(
        &self,
        key: &str,
        value: &str,
        timeout: Duration,
    ) -> ReplicaResult<Option<Duration>> {
        let mut conn = self.manager.clone();

        let reply: i64 = self
            .bounded(timeout, async {
                self.ttl_script
                    .key(key)
                    .arg(value)
                    .invoke_async(&mut conn)
                    .await
            })
            .await?;

        if reply > 0 {
            Ok(Some(Duration::from_millis(reply as u64)))
        } else {
            Ok(None)
        }
    }
}
