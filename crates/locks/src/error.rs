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

//! Error taxonomy for lock operations.

use thiserror::Error;

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;

/// Errors surfaced by the quorum engine.
///
/// One value per request; per-replica failures are tallied internally and
/// never escape individually. The HTTP layer maps each variant to a status
/// code (400/409/404/500).
#[derive(Error, Debug)]
pub enum LockError {
    /// Inputs malformed or missing
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Quorum not reached during acquire
    #[error("Lock already acquired: {0}")]
    Conflict(String),

    /// Lock not found or expired
    #[error("Lock not found or expired: {0}")]
    NotFound(String),

    /// Replica errors outside the quorum-pass path
    #[error("Error connecting to one or more replicas: {0}")]
    Internal(String),
}
