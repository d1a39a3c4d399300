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

//! End-to-end scenarios for the quorum engine against in-memory replicas:
//! partial failures, timing violations, token safety, and expiry races.

use plexlock_locks::{LockError, LockManager, QuorumLock};
use plexlock_replica::{MemoryReplica, ReplicaClient};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

const OP_TIMEOUT: Duration = Duration::from_secs(1);

fn cluster(n: usize) -> (Vec<Arc<MemoryReplica>>, QuorumLock) {
    let replicas: Vec<Arc<MemoryReplica>> = (0..n)
        .map(|i| Arc::new(MemoryReplica::new(&format!("mem-{}", i))))
        .collect();
    let clients: Vec<Arc<dyn ReplicaClient>> = replicas
        .iter()
        .map(|r| Arc::clone(r) as Arc<dyn ReplicaClient>)
        .collect();
    let locker = QuorumLock::new(clients).expect("valid cluster");
    (replicas, locker)
}

async fn assert_resource_absent(replicas: &[Arc<MemoryReplica>], resource: &str) {
    for replica in replicas {
        let value = replica.get(resource, OP_TIMEOUT).await.unwrap();
        assert!(
            value.is_none(),
            "replica {} still carries '{}'",
            replica.address(),
            resource
        );
    }
}

#[tokio::test]
async fn test_acquire_release_round_trip() {
    let (replicas, locker) = cluster(3);

    let lock = locker.acquire("orders:1", Duration::from_secs(5)).await.unwrap();
    assert_eq!(lock.resource, "orders:1");
    assert!(!lock.token.is_empty());

    locker.release(&lock.resource, &lock.token).await.unwrap();
    assert_resource_absent(&replicas, "orders:1").await;
}

#[tokio::test]
async fn test_tokens_are_unique_across_grants() {
    let (_replicas, locker) = cluster(3);
    let mut seen = HashSet::new();

    for i in 0..20 {
        let resource = format!("r{}", i);
        let lock = locker.acquire(&resource, Duration::from_secs(5)).await.unwrap();
        assert!(seen.insert(lock.token.clone()), "token minted twice");
        locker.release(&resource, &lock.token).await.unwrap();
    }
}

#[tokio::test]
async fn test_second_acquire_conflicts_while_held() {
    let (_replicas, locker) = cluster(3);

    let lock = locker.acquire("orders:1", Duration::from_secs(5)).await.unwrap();

    let second = locker.acquire("orders:1", Duration::from_secs(5)).await;
    assert!(matches!(second, Err(LockError::Conflict(_))));

    // The holder is unaffected by the failed attempt.
    let remaining = locker.ttl("orders:1", &lock.token).await.unwrap();
    assert!(remaining > Duration::ZERO);
}

#[tokio::test]
async fn test_quorum_exactly_met_with_one_replica_down() {
    let (replicas, locker) = cluster(3);
    replicas[2].set_offline(true);

    let lock = locker.acquire("orders:1", Duration::from_secs(5)).await.unwrap();

    // 2 of 3 released, the third unreachable: still a clean release.
    locker.release(&lock.resource, &lock.token).await.unwrap();
    assert_resource_absent(&replicas[..2], "orders:1").await;
}

#[tokio::test]
async fn test_quorum_lost_reclaims_partial_grant() {
    let (replicas, locker) = cluster(3);

    // Two replicas already hold the resource for someone else.
    replicas[0]
        .force_set("orders:1", "foreign-token", Duration::from_secs(30))
        .await;
    replicas[1]
        .force_set("orders:1", "foreign-token", Duration::from_secs(30))
        .await;

    let result = locker.acquire("orders:1", Duration::from_secs(5)).await;
    assert!(matches!(result, Err(LockError::Conflict(_))));

    // The single partial grant was rolled back; the foreign entries stayed.
    let third = replicas[2].get("orders:1", OP_TIMEOUT).await.unwrap();
    assert!(third.is_none());
    for replica in &replicas[..2] {
        let value = replica.get("orders:1", OP_TIMEOUT).await.unwrap();
        assert_eq!(value, Some("foreign-token".to_string()));
    }
}

#[tokio::test]
async fn test_acquire_slower_than_ttl_is_rejected() {
    let (replicas, locker) = cluster(3);
    for replica in &replicas {
        replica.set_latency(Some(Duration::from_millis(60))).await;
    }

    // Every replica grants, but the fan-out takes longer than the TTL.
    let result = locker.acquire("orders:1", Duration::from_millis(30)).await;
    assert!(matches!(result, Err(LockError::Conflict(_))));

    for replica in &replicas {
        replica.set_latency(None).await;
    }
    assert_resource_absent(&replicas, "orders:1").await;
}

#[tokio::test]
async fn test_release_with_foreign_token_leaves_lock_intact() {
    let (_replicas, locker) = cluster(3);

    let lock = locker.acquire("orders:1", Duration::from_secs(5)).await.unwrap();

    let result = locker.release("orders:1", "not-the-owner").await;
    assert!(matches!(result, Err(LockError::NotFound(_))));

    // The real owner still holds a live lock.
    let remaining = locker.ttl("orders:1", &lock.token).await.unwrap();
    assert!(remaining > Duration::ZERO);
}

#[tokio::test]
async fn test_release_is_idempotent_in_effect() {
    let (_replicas, locker) = cluster(3);

    let lock = locker.acquire("orders:1", Duration::from_secs(5)).await.unwrap();

    locker.release(&lock.resource, &lock.token).await.unwrap();

    let second = locker.release(&lock.resource, &lock.token).await;
    assert!(matches!(second, Err(LockError::NotFound(_))));
}

#[tokio::test]
async fn test_ttl_and_refresh_after_release_report_not_found() {
    let (_replicas, locker) = cluster(3);

    let lock = locker.acquire("orders:1", Duration::from_secs(5)).await.unwrap();
    locker.release(&lock.resource, &lock.token).await.unwrap();

    let ttl = locker.ttl("orders:1", &lock.token).await;
    assert!(matches!(ttl, Err(LockError::NotFound(_))));

    let refresh = locker
        .refresh("orders:1", &lock.token, Duration::from_secs(5))
        .await;
    assert!(matches!(refresh, Err(LockError::NotFound(_))));
}

#[tokio::test]
async fn test_refresh_extends_remaining_ttl() {
    let (_replicas, locker) = cluster(3);

    let lock = locker.acquire("orders:1", Duration::from_millis(500)).await.unwrap();

    locker
        .refresh(&lock.resource, &lock.token, Duration::from_secs(10))
        .await
        .unwrap();

    let remaining = locker.ttl(&lock.resource, &lock.token).await.unwrap();
    assert!(remaining > Duration::from_secs(5), "remaining = {:?}", remaining);
}

#[tokio::test]
async fn test_refresh_after_expiry_does_not_touch_new_owner() {
    let (_replicas, locker) = cluster(3);

    let first = locker.acquire("orders:1", Duration::from_millis(40)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;

    // The resource expired everywhere and a second client now owns it.
    let second = locker.acquire("orders:1", Duration::from_secs(5)).await.unwrap();
    assert_ne!(first.token, second.token);

    let stale = locker
        .refresh(&first.resource, &first.token, Duration::from_secs(30))
        .await;
    assert!(matches!(stale, Err(LockError::NotFound(_))));

    // The new owner's TTL was not extended past its own grant.
    let remaining = locker.ttl("orders:1", &second.token).await.unwrap();
    assert!(remaining <= Duration::from_secs(5));
    assert!(remaining > Duration::ZERO);
}

#[tokio::test]
async fn test_ttl_averages_across_quorum() {
    let (replicas, locker) = cluster(3);

    let lock = locker.acquire("orders:1", Duration::from_secs(10)).await.unwrap();

    // One replica lost its entry; the other two still answer.
    replicas[0]
        .delete_if_match("orders:1", &lock.token, OP_TIMEOUT)
        .await
        .unwrap();

    let remaining = locker.ttl("orders:1", &lock.token).await.unwrap();
    assert!(remaining > Duration::from_secs(8));
    assert!(remaining <= Duration::from_secs(10));
}

#[tokio::test]
async fn test_release_with_mixed_failure_and_mismatch_is_internal() {
    let (replicas, locker) = cluster(3);

    let lock = locker.acquire("orders:1", Duration::from_secs(5)).await.unwrap();

    // One replica unreachable, one re-granted to a different owner: the
    // engine can neither confirm the release nor declare the lock gone.
    replicas[0].set_offline(true);
    replicas[1]
        .force_set("orders:1", "foreign-token", Duration::from_secs(30))
        .await;

    let result = locker.release(&lock.resource, &lock.token).await;
    assert!(matches!(result, Err(LockError::Internal(_))));
}

#[tokio::test]
async fn test_acquire_without_any_replica_never_leaks_a_token() {
    let (replicas, locker) = cluster(3);
    for replica in &replicas {
        replica.set_offline(true);
    }

    let result = locker.acquire("orders:1", Duration::from_secs(5)).await;
    assert!(matches!(result, Err(LockError::Conflict(_))));
}
