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

//! Quorum lock engine over N replicas.

use crate::{Lock, LockError, LockManager, LockResult};
use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use plexlock_replica::{RemoveOutcome, ReplicaClient};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

/// Tuning knobs for the quorum engine.
#[derive(Debug, Clone)]
pub struct QuorumConfig {
    /// Time budget for one replica call
    pub per_replica_timeout: Duration,
    /// Overall deadline for one lock operation, independent of the
    /// per-replica budget
    pub operation_deadline: Duration,
    /// Upper bound on client-requested TTLs
    pub max_ttl: Duration,
}

impl Default for QuorumConfig {
    fn default() -> Self {
        Self {
            per_replica_timeout: Duration::from_secs(2),
            operation_deadline: Duration::from_secs(5),
            max_ttl: Duration::from_secs(600),
        }
    }
}

/// Per-replica verdict during release.
enum ReleaseTally {
    Released,
    Missing,
    Mismatch,
    Failed,
}

/// Redlock-style quorum engine.
///
/// Holds the replica list (immutable after boot) and no other state; every
/// operation fans out to all replicas concurrently and aggregates the
/// outcomes against the majority rule `⌊N/2⌋ + 1`.
pub struct QuorumLock {
    replicas: Vec<Arc<dyn ReplicaClient>>,
    quorum: usize,
    config: QuorumConfig,
}

impl QuorumLock {
    /// Create an engine with default configuration.
    ///
    /// ## Errors
    /// - [`LockError::InvalidRequest`]: fewer than 3 replicas, or an even
    ///   count (majorities must be unambiguous)
    pub fn new(replicas: Vec<Arc<dyn ReplicaClient>>) -> LockResult<Self> {
        Self::with_config(replicas, QuorumConfig::default())
    }

    /// Create an engine with explicit configuration.
    pub fn with_config(
        replicas: Vec<Arc<dyn ReplicaClient>>,
        config: QuorumConfig,
    ) -> LockResult<Self> {
        let n = replicas.len();
        if n < 3 {
            return Err(LockError::InvalidRequest(format!(
                "replica count must be at least 3, got {}",
                n
            )));
        }
        if n % 2 == 0 {
            return Err(LockError::InvalidRequest(format!(
                "replica count must be odd, got {}",
                n
            )));
        }

        Ok(Self {
            quorum: n / 2 + 1,
            replicas,
            config,
        })
    }

    /// Number of configured replicas.
    pub fn replica_count(&self) -> usize {
        self.replicas.len()
    }

    /// Majority threshold (`⌊N/2⌋ + 1`).
    pub fn quorum(&self) -> usize {
        self.quorum
    }

    /// Per-call budget: the replica timeout, capped by the remaining
    /// operation deadline.
    fn call_budget(&self, deadline: Instant) -> Duration {
        self.config
            .per_replica_timeout
            .min(deadline.saturating_duration_since(Instant::now()))
    }

    fn validate_ttl(&self, ttl: Duration) -> LockResult<()> {
        if ttl < Duration::from_millis(1) {
            return Err(LockError::InvalidRequest(
                "ttl must be at least 1ms".to_string(),
            ));
        }
        if ttl > self.config.max_ttl {
            return Err(LockError::InvalidRequest(format!(
                "ttl {:?} exceeds the maximum of {:?}",
                ttl, self.config.max_ttl
            )));
        }
        Ok(())
    }
}

fn validate_resource(resource: &str) -> LockResult<()> {
    if resource.is_empty() {
        return Err(LockError::InvalidRequest(
            "resource must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_token(token: &str) -> LockResult<()> {
    if token.is_empty() {
        return Err(LockError::InvalidRequest(
            "token must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl LockManager for QuorumLock {
    async fn acquire(&self, resource: &str, ttl: Duration) -> LockResult<Lock> {
        validate_resource(resource)?;
        self.validate_ttl(ttl)?;

        let token = Uuid::new_v4().to_string();
        let acquired_at = Utc::now();
        let deadline = Instant::now() + self.config.operation_deadline;
        let started = Instant::now();

        let attempts = self.replicas.iter().map(|replica| {
            let replica = Arc::clone(replica);
            let resource = resource.to_string();
            let token = token.clone();
            let timeout = self.call_budget(deadline);
            async move {
                match replica.set_if_absent(&resource, &token, ttl, timeout).await {
                    Ok(granted) => {
                        if granted {
                            debug!(replica = replica.address(), resource = %resource, "granted");
                        }
                        granted
                    }
                    Err(err) => {
                        warn!(replica = replica.address(), resource = %resource, %err, "acquire attempt failed");
                        false
                    }
                }
            }
        });

        let grants = join_all(attempts).await.into_iter().filter(|g| *g).count();
        let elapsed = started.elapsed();

        if grants >= self.quorum && elapsed < ttl {
            debug!(resource, token = %token, grants, ?elapsed, "lock acquired");
            return Ok(Lock {
                resource: resource.to_string(),
                token,
                ttl,
                acquired_at,
            });
        }

        // A grant whose acknowledgment was lost may still have landed on a
        // replica; reclaim unconditionally before reporting the conflict.
        if let Err(err) = self.release(resource, &token).await {
            debug!(resource, %err, "cleanup after failed acquire");
        }

        Err(LockError::Conflict(resource.to_string()))
    }

    async fn release(&self, resource: &str, token: &str) -> LockResult<()> {
        validate_resource(resource)?;
        validate_token(token)?;

        let deadline = Instant::now() + self.config.operation_deadline;

        let attempts = self.replicas.iter().map(|replica| {
            let replica = Arc::clone(replica);
            let resource = resource.to_string();
            let token = token.to_string();
            let timeout = self.call_budget(deadline);
            async move {
                match replica.delete_if_match(&resource, &token, timeout).await {
                    Ok(RemoveOutcome::Removed) => {
                        debug!(replica = replica.address(), resource = %resource, "released");
                        ReleaseTally::Released
                    }
                    Ok(RemoveOutcome::Missing) => ReleaseTally::Missing,
                    Ok(RemoveOutcome::Mismatch) => {
                        // The entry expired here and was re-granted to a newer
                        // owner; their lock must stay intact.
                        debug!(replica = replica.address(), resource = %resource, "token mismatch, entry left alone");
                        ReleaseTally::Mismatch
                    }
                    Err(err) => {
                        warn!(replica = replica.address(), resource = %resource, %err, "release attempt failed");
                        ReleaseTally::Failed
                    }
                }
            }
        });

        let mut released = 0usize;
        let mut gone = 0usize;
        let mut failed = 0usize;
        for outcome in join_all(attempts).await {
            match outcome {
                ReleaseTally::Released => released += 1,
                // Missing and mismatched both mean the caller's token no
                // longer exists on that replica.
                ReleaseTally::Missing | ReleaseTally::Mismatch => gone += 1,
                ReleaseTally::Failed => failed += 1,
            }
        }

        if released >= self.quorum {
            return Ok(());
        }
        if gone >= self.quorum {
            return Err(LockError::NotFound(resource.to_string()));
        }
        if failed > 0 {
            return Err(LockError::Internal(format!(
                "release failed on {} of {} replicas",
                failed,
                self.replicas.len()
            )));
        }
        Ok(())
    }

    async fn refresh(&self, resource: &str, token: &str, ttl: Duration) -> LockResult<()> {
        validate_resource(resource)?;
        validate_token(token)?;
        self.validate_ttl(ttl)?;

        let deadline = Instant::now() + self.config.operation_deadline;

        let attempts = self.replicas.iter().map(|replica| {
            let replica = Arc::clone(replica);
            let resource = resource.to_string();
            let token = token.to_string();
            let timeout = self.call_budget(deadline);
            async move {
                match replica.expire_if_match(&resource, &token, ttl, timeout).await {
                    Ok(refreshed) => {
                        if refreshed {
                            debug!(replica = replica.address(), resource = %resource, "refreshed");
                        }
                        refreshed
                    }
                    Err(err) => {
                        warn!(replica = replica.address(), resource = %resource, %err, "refresh attempt failed");
                        false
                    }
                }
            }
        });

        let refreshed = join_all(attempts).await.into_iter().filter(|r| *r).count();

        // Partial successes are left in place; a later refresh or release
        // reconciles them.
        if refreshed >= self.quorum {
            debug!(resource, refreshed, "lock refreshed");
            Ok(())
        } else {
            Err(LockError::NotFound(resource.to_string()))
        }
    }

    async fn ttl(&self, resource: &str, token: &str) -> LockResult<Duration> {
        validate_resource(resource)?;
        validate_token(token)?;

        let deadline = Instant::now() + self.config.operation_deadline;

        let attempts = self.replicas.iter().map(|replica| {
            let replica = Arc::clone(replica);
            let resource = resource.to_string();
            let token = token.to_string();
            let timeout = self.call_budget(deadline);
            async move {
                match replica.ttl_if_match(&resource, &token, timeout).await {
                    Ok(Some(remaining)) if remaining > Duration::ZERO => Some(remaining),
                    Ok(_) => None,
                    Err(err) => {
                        warn!(replica = replica.address(), resource = %resource, %err, "ttl check failed");
                        None
                    }
                }
            }
        });

        let confirmed: Vec<Duration> = join_all(attempts).await.into_iter().flatten().collect();

        if confirmed.len() >= self.quorum {
            let total: Duration = confirmed.iter().sum();
            Ok(total / confirmed.len() as u32)
        } else {
            Err(LockError::NotFound(resource.to_string()))
        }
    }
}
