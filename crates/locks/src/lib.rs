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

//! # PlexLock Quorum Engine
//!
//! ## Purpose
//! Provides distributed mutual exclusion over a cluster of N independent
//! key-value replicas. A lock is granted only when it is acquired on a
//! majority of replicas within a wall-clock window shorter than its TTL
//! (Redlock-style quorum).
//!
//! ## Architecture Context
//! This crate is the stateless core behind the coordinator's HTTP surface:
//! - **Acquire**: mint a token, fan out set-if-absent to all replicas,
//!   grant on majority + timing check, reclaim partial grants on failure
//! - **Release/Refresh/TTL**: token-conditional fan-out with quorum tallies
//!
//! ## Design Decisions
//! - **Token-scoped ownership**: no replica entry is deleted or extended
//!   unless the supplied token matches the stored value
//! - **Per-replica timeouts under an overall deadline**: replica latency is
//!   bounded so the timing invariant (elapsed < TTL) stays checkable
//! - **Per-replica failures never propagate individually**: they are logged
//!   and tallied as non-grants
//!
//! ## Examples
//!
//! ```rust,no_run
//! use plexlock_locks::{LockManager, QuorumLock};
//! use plexlock_replica::{MemoryReplica, ReplicaClient};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let replicas: Vec<Arc<dyn ReplicaClient>> = (0..3)
//!     .map(|i| Arc::new(MemoryReplica::new(&format!("mem-{i}"))) as Arc<dyn ReplicaClient>)
//!     .collect();
//! let locker = QuorumLock::new(replicas)?;
//!
//! let lock = locker.acquire("orders:42", Duration::from_secs(10)).await?;
//! locker.refresh(&lock.resource, &lock.token, Duration::from_secs(10)).await?;
//! locker.release(&lock.resource, &lock.token).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod manager;
pub mod quorum;

pub use error::{LockError, LockResult};
pub use manager::{Lock, LockManager};
pub use quorum::{QuorumConfig, QuorumLock};
