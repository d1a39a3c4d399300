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

//! In-memory replica client (for testing).
//!
//! ## Purpose
//! Single-process [`ReplicaClient`] used by the engine test suites. Honors
//! entry expiry like a real replica (lazy eviction on access) and offers
//! fault knobs so tests can simulate unreachable or slow replicas.
//!
//! ## Limitations
//! - Not persistent, not shared across processes
//! - Expired entries linger until the next access to their key

use crate::{RemoveOutcome, ReplicaClient, ReplicaError, ReplicaResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-memory replica with fault injection.
#[derive(Clone)]
pub struct MemoryReplica {
    address: String,
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    offline: Arc<AtomicBool>,
    latency: Arc<Mutex<Option<Duration>>>,
}

impl MemoryReplica {
    /// Create a new in-memory replica with a synthetic address.
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            entries: Arc::new(RwLock::new(HashMap::new())),
            offline: Arc::new(AtomicBool::new(false)),
            latency: Arc::new(Mutex::new(None)),
        }
    }

    /// Simulate an unreachable replica: every operation fails with
    /// [`ReplicaError::ConnectionFailed`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Inject a fixed delay before each operation. Delays longer than the
    /// caller's timeout surface as [`ReplicaError::Timeout`].
    pub async fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().await = latency;
    }

    /// Seed an entry directly, bypassing set-if-absent (test setup).
    pub async fn force_set(&self, key: &str, value: &str, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn fault_check(&self) -> ReplicaResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ReplicaError::ConnectionFailed(format!(
                "replica {} is offline",
                self.address
            )));
        }
        let latency = *self.latency.lock().await;
        if let Some(delay) = latency {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    /// Run an operation under the caller's time budget, after fault checks.
    async fn bounded<T, F>(&self, timeout: Duration, op: F) -> ReplicaResult<T>
    where
        F: std::future::Future<Output = ReplicaResult<T>>,
    {
        let guarded = async {
            self.fault_check().await?;
            op.await
        };
        match tokio::time::timeout(timeout, guarded).await {
            Ok(result) => result,
            Err(_) => Err(ReplicaError::Timeout(timeout)),
        }
    }
}

#[async_trait]
impl ReplicaClient for MemoryReplica {
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
        self.bounded(timeout, async {
            let mut entries = self.entries.write().await;
            let now = Instant::now();

            if let Some(existing) = entries.get(key) {
                if existing.live(now) {
                    return Ok(false);
                }
            }

            entries.insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    expires_at: now + ttl,
                },
            );
            Ok(true)
        })
        .await
    }

    async fn get(&self, key: &str, timeout: Duration) -> ReplicaResult<Option<String>> {
        self.bounded(timeout, async {
            let mut entries = self.entries.write().await;
            let now = Instant::now();

            match entries.get(key) {
                Some(entry) if entry.live(now) => Ok(Some(entry.value.clone())),
                Some(_) => {
                    entries.remove(key);
                    Ok(None)
                }
                None => Ok(None),
            }
        })
        .await
    }

    async fn delete_if_match(
        &self,
        key: &str,
        value: &str,
        timeout: Duration,
    ) -> ReplicaResult<RemoveOutcome> {
        self.bounded(timeout, async {
            let mut entries = self.entries.write().await;
            let now = Instant::now();

            match entries.get(key) {
                Some(entry) if entry.live(now) => {
                    if entry.value == value {
                        entries.remove(key);
                        Ok(RemoveOutcome::Removed)
                    } else {
                        Ok(RemoveOutcome::Mismatch)
                    }
                }
                Some(_) => {
                    entries.remove(key);
                    Ok(RemoveOutcome::Missing)
                }
                None => Ok(RemoveOutcome::Missing),
            }
        })
        .await
    }

    async fn expire_if_match(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
        timeout: Duration,
    ) -> ReplicaResult<bool> {
        self.bounded(timeout, async {
            let mut entries = self.entries.write().await;
            let now = Instant::now();

            match entries.get_mut(key) {
                Some(entry) if entry.live(now) && entry.value == value => {
                    entry.expires_at = now + ttl;
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
        .await
    }

    async fn ttl_if_match(
        &self,
        key: &str,
        value: &str,
        timeout: Duration,
    ) -> ReplicaResult<Option<Duration>> {
        self.bounded(timeout, async {
            let entries = self.entries.read().await;
            let now = Instant::now();

            match entries.get(key) {
                Some(entry) if entry.live(now) && entry.value == value => {
                    Ok(Some(entry.expires_at - now))
                }
                _ => Ok(None),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OP_TIMEOUT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_set_if_absent_respects_live_entry() {
        let replica = MemoryReplica::new("mem-1");

        let first = replica
            .set_if_absent("r", "a", Duration::from_secs(5), OP_TIMEOUT)
            .await
            .unwrap();
        let second = replica
            .set_if_absent("r", "b", Duration::from_secs(5), OP_TIMEOUT)
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
        assert_eq!(replica.get("r", OP_TIMEOUT).await.unwrap(), Some("a".to_string()));
    }

    #[tokio::test]
    async fn test_expired_entry_can_be_reacquired() {
        let replica = MemoryReplica::new("mem-1");

        replica
            .set_if_absent("r", "a", Duration::from_millis(20), OP_TIMEOUT)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        let granted = replica
            .set_if_absent("r", "b", Duration::from_secs(5), OP_TIMEOUT)
            .await
            .unwrap();
        assert!(granted);
        assert_eq!(replica.get("r", OP_TIMEOUT).await.unwrap(), Some("b".to_string()));
    }

    #[tokio::test]
    async fn test_delete_if_match_is_token_scoped() {
        let replica = MemoryReplica::new("mem-1");
        replica
            .set_if_absent("r", "a", Duration::from_secs(5), OP_TIMEOUT)
            .await
            .unwrap();

        let mismatch = replica.delete_if_match("r", "b", OP_TIMEOUT).await.unwrap();
        assert_eq!(mismatch, RemoveOutcome::Mismatch);

        let removed = replica.delete_if_match("r", "a", OP_TIMEOUT).await.unwrap();
        assert_eq!(removed, RemoveOutcome::Removed);

        let missing = replica.delete_if_match("r", "a", OP_TIMEOUT).await.unwrap();
        assert_eq!(missing, RemoveOutcome::Missing);
    }

    #[tokio::test]
    async fn test_offline_replica_fails_with_connection_error() {
        let replica = MemoryReplica::new("mem-1");
        replica.set_offline(true);

        let err = replica
            .set_if_absent("r", "a", Duration::from_secs(5), OP_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, ReplicaError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn test_latency_beyond_budget_times_out() {
        let replica = MemoryReplica::new("mem-1");
        replica.set_latency(Some(Duration::from_millis(100))).await;

        let err = replica
            .set_if_absent("r", "a", Duration::from_secs(5), Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, ReplicaError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_expire_if_match_extends_only_matching_value() {
        let replica = MemoryReplica::new("mem-1");
        replica
            .set_if_absent("r", "a", Duration::from_millis(100), OP_TIMEOUT)
            .await
            .unwrap();

        assert!(!replica
            .expire_if_match("r", "b", Duration::from_secs(10), OP_TIMEOUT)
            .await
            .unwrap());
        assert!(replica
            .expire_if_match("r", "a", Duration::from_secs(10), OP_TIMEOUT)
            .await
            .unwrap());

        let remaining = replica
            .ttl_if_match("r", "a", OP_TIMEOUT)
            .await
            .unwrap()
            .expect("entry should be live");
        assert!(remaining > Duration::from_secs(5));
    }
}
