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

//! PlexLock coordinator binary.

use anyhow::{Context, Result};
use plexlock_locks::{LockManager, QuorumConfig, QuorumLock};
use plexlock_replica::{RedisReplica, ReplicaClient};
use plexlock_server::http::{create_router, AppState};
use plexlock_server::{telemetry, ServerConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let config = ServerConfig::from_env().context("configuration error")?;

    let mut replicas: Vec<Arc<dyn ReplicaClient>> =
        Vec::with_capacity(config.replica_addresses.len());
    for address in &config.replica_addresses {
        let replica = RedisReplica::connect(address)
            .await
            .with_context(|| format!("failed to connect replica '{}'", address))?;
        info!(address = %address, "replica connected");
        replicas.push(Arc::new(replica));
    }

    let engine_config = QuorumConfig {
        max_ttl: config.max_ttl,
        ..QuorumConfig::default()
    };
    let locker = QuorumLock::with_config(replicas, engine_config)
        .context("failed to build quorum engine")?;
    info!(
        replicas = locker.replica_count(),
        quorum = locker.quorum(),
        "quorum engine ready"
    );
    info!("endpoints: POST /lock, POST /unlock, POST /refresh, GET /ttl, GET /health");

    let state = AppState {
        replica_count: locker.replica_count(),
        locker: Arc::new(locker) as Arc<dyn LockManager>,
    };
    let router = create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(address = %addr, "server started");

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
