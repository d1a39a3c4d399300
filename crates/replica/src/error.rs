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

//! Error types for replica operations.

use std::time::Duration;
use thiserror::Error;

/// Result type for replica operations.
pub type ReplicaResult<T> = Result<T, ReplicaError>;

/// Errors that can occur while talking to a single replica.
///
/// Key absence is deliberately not modeled here: a missing key is a normal
/// protocol outcome and is reported in-band by the operations themselves
/// (`Option::None`, [`crate::RemoveOutcome::Missing`]).
#[derive(Error, Debug)]
pub enum ReplicaError {
    /// Could not establish or re-establish a connection to the replica
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The replica answered with an error (command failure, protocol error)
    #[error("Backend error: {0}")]
    BackendError(String),

    /// The operation did not complete within its time budget
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

impl From<redis::RedisError> for ReplicaError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() {
            ReplicaError::ConnectionFailed(format!("Redis error: {}", err))
        } else {
            ReplicaError::BackendError(format!("Redis error: {}", err))
        }
    }
}
