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

//! # PlexLock Replica Clients
//!
//! ## Purpose
//! Provides the client abstraction the quorum engine uses to talk to one
//! backing key-value replica. The coordinator holds N independent replica
//! clients and treats each as its own failure domain.
//!
//! ## Architecture Context
//! The quorum engine (`plexlock-locks`) fans every lock operation out to all
//! replicas concurrently and aggregates the per-replica outcomes. Each client
//! connects to exactly one replica; nothing here knows about quorums.
//!
//! ## Design Decisions
//! - **Per-call timeout**: every operation takes an explicit time budget so
//!   the engine can bound fan-out latency below the lock TTL
//! - **Atomic compare-and-act**: conditional delete/expire/ttl are single
//!   server-side operations (Lua on Redis), never read-then-act sequences
//! - **Key-absent is not an error**: absence is part of the protocol and is
//!   reported in-band, distinct from transport failures
//!
//! ## Backend Support
//! - **Redis**: production backend (`SET NX PX` + Lua scripts)
//! - **InMemory**: single-process backend for tests, with fault injection

pub mod client;
pub mod error;
pub mod memory;
pub mod redis;

pub use client::{RemoveOutcome, ReplicaClient};
pub use error::{ReplicaError, ReplicaResult};
pub use memory::MemoryReplica;
pub use redis::RedisReplica;
