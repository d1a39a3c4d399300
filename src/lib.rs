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

//! PlexLock: quorum-based distributed mutual exclusion
//!
//! Core design:
//! - A lock is real only when a majority of independent replicas agree,
//!   and only while the agreement took less wall-clock time than the TTL
//! - Tokens are bearer credentials; nothing is mutated on a token mismatch
//! - The coordinator stays stateless so any instance can serve any request
//!
//! The workspace splits along those seams:
//! 1. Replica clients (Redis + in-memory)
//! 2. The quorum engine (acquire/release/refresh/ttl)
//! 3. The HTTP coordinator surface
//! 4. The client SDK with its backoff retry loop

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// Independent crates - re-export them here
pub use plexlock_locks as locks; // Quorum engine
pub use plexlock_replica as replica; // Per-replica clients
pub use plexlock_sdk as sdk; // Application-facing SDK
pub use plexlock_server as server; // HTTP coordinator
