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

//! SDK tests against a live coordinator bound to an ephemeral port, backed
//! by an in-memory replica cluster.

use plexlock_locks::{LockManager, QuorumLock};
use plexlock_replica::{MemoryReplica, ReplicaClient};
use plexlock_sdk::{BackoffConfig, LockClient, SdkError};
use plexlock_server::http::{create_router, AppState};
use std::sync::Arc;
use std::time::{Duration, Instant};

const OP_TIMEOUT: Duration = Duration::from_secs(1);

/// Tight backoff so contended-path tests stay fast.
fn fast_backoff() -> BackoffConfig {
    BackoffConfig {
        initial: Duration::from_millis(20),
        max: Duration::from_millis(100),
        max_jitter: Duration::from_millis(5),
    }
}

async fn start_coordinator() -> (String, Vec<Arc<MemoryReplica>>) {
    let replicas: Vec<Arc<MemoryReplica>> = (0..3)
        .map(|i| Arc::new(MemoryReplica::new(&format!("mem-{}", i))))
        .collect();
    let clients: Vec<Arc<dyn ReplicaClient>> = replicas
        .iter()
        .map(|r| Arc::clone(r) as Arc<dyn ReplicaClient>)
        .collect();
    let locker = QuorumLock::new(clients).expect("valid cluster");

    let router = create_router(AppState {
        replica_count: locker.replica_count(),
        locker: Arc::new(locker) as Arc<dyn LockManager>,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", addr), replicas)
}

async fn assert_resource_absent(replicas: &[Arc<MemoryReplica>], resource: &str) {
    for replica in replicas {
        let value = replica.get(resource, OP_TIMEOUT).await.unwrap();
        assert!(value.is_none(), "replica {} still holds '{}'", replica.address(), resource);
    }
}

#[tokio::test]
async fn test_acquire_and_release_round_trip() {
    let (base_url, replicas) = start_coordinator().await;
    let client = LockClient::new(&base_url).unwrap();

    let guard = client
        .acquire("orders:1", Duration::from_secs(10), Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(guard.resource(), "orders:1");
    assert_eq!(guard.token().len(), 36);

    guard.release().await.unwrap();
    assert_resource_absent(&replicas, "orders:1").await;
}

#[tokio::test]
async fn test_acquire_times_out_while_contended() {
    let (base_url, _replicas) = start_coordinator().await;
    let holder = LockClient::new(&base_url).unwrap();
    let contender = LockClient::new(&base_url).unwrap().with_backoff(fast_backoff());

    let _held = holder
        .acquire("orders:1", Duration::from_secs(30), Duration::from_secs(2))
        .await
        .unwrap();

    let started = Instant::now();
    let result = contender
        .acquire("orders:1", Duration::from_millis(50), Duration::from_millis(250))
        .await;

    assert!(matches!(result, Err(SdkError::AcquireTimeout)));
    assert!(started.elapsed() >= Duration::from_millis(250));
}

#[tokio::test]
async fn test_acquire_retries_until_holder_expires() {
    let (base_url, _replicas) = start_coordinator().await;
    let holder = LockClient::new(&base_url).unwrap();
    let contender = LockClient::new(&base_url).unwrap().with_backoff(fast_backoff());

    // Short-lived holder; its guard is forgotten so only TTL frees the lock.
    let held = holder
        .acquire("orders:1", Duration::from_millis(120), Duration::from_secs(2))
        .await
        .unwrap();
    std::mem::forget(held);

    let guard = contender
        .acquire("orders:1", Duration::from_secs(10), Duration::from_secs(3))
        .await
        .expect("should win once the holder's TTL lapses");
    guard.release().await.unwrap();
}

#[tokio::test]
async fn test_refresh_extends_then_reports_loss() {
    let (base_url, replicas) = start_coordinator().await;
    let client = LockClient::new(&base_url).unwrap();

    let guard = client
        .acquire("orders:1", Duration::from_secs(5), Duration::from_secs(2))
        .await
        .unwrap();

    guard.refresh(Duration::from_secs(30)).await.unwrap();

    // Steal the entries out from under the guard to simulate a lost lock.
    for replica in &replicas {
        replica
            .delete_if_match("orders:1", guard.token(), OP_TIMEOUT)
            .await
            .unwrap();
    }

    let result = guard.refresh(Duration::from_secs(30)).await;
    assert!(matches!(result, Err(SdkError::NotFound)));
}

#[tokio::test]
async fn test_second_release_surfaces_not_found() {
    let (base_url, replicas) = start_coordinator().await;
    let client = LockClient::new(&base_url).unwrap();

    let guard = client
        .acquire("orders:1", Duration::from_secs(10), Duration::from_secs(2))
        .await
        .unwrap();

    // Release out-of-band, then through the guard: the coordinator reports
    // the lock as already gone.
    for replica in &replicas {
        replica
            .delete_if_match("orders:1", guard.token(), OP_TIMEOUT)
            .await
            .unwrap();
    }

    let result = guard.release().await;
    assert!(matches!(result, Err(SdkError::NotFound)));
}

#[tokio::test]
async fn test_dropped_guard_releases_in_background() {
    let (base_url, replicas) = start_coordinator().await;
    let client = LockClient::new(&base_url).unwrap();

    let guard = client
        .acquire("orders:1", Duration::from_secs(30), Duration::from_secs(2))
        .await
        .unwrap();
    drop(guard);

    // The drop spawns the release; give it a moment to land.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_resource_absent(&replicas, "orders:1").await;
}

#[tokio::test]
async fn test_transport_error_is_not_retried() {
    // Nothing listens here; the first attempt must fail fast instead of
    // burning the wait budget.
    let client = LockClient::new("http://127.0.0.1:1").unwrap();

    let started = Instant::now();
    let result = client
        .acquire("orders:1", Duration::from_secs(5), Duration::from_secs(30))
        .await;

    assert!(matches!(result, Err(SdkError::Transport(_))));
    assert!(started.elapsed() < Duration::from_secs(5));
}
