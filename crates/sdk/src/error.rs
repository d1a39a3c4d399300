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

//! Error types for SDK operations.

use thiserror::Error;

/// Result type for SDK operations.
pub type SdkResult<T> = Result<T, SdkError>;

/// Errors surfaced by the client SDK.
///
/// Only [`SdkError::Conflict`] is retryable inside the acquire wait budget;
/// every other variant is immediately fatal to that call.
#[derive(Error, Debug)]
pub enum SdkError {
    /// Caller-supplied inputs malformed or missing
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The coordinator could not reach a quorum (HTTP 409)
    #[error("lock already acquired (HTTP 409)")]
    Conflict,

    /// The lock is gone: released, expired, or never held (HTTP 404)
    #[error("lock not found or already released (HTTP 404)")]
    NotFound,

    /// The acquire wait budget elapsed without a grant
    #[error("operation timed out")]
    AcquireTimeout,

    /// The coordinator answered with an unexpected status
    #[error("server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code returned by the coordinator
        status: u16,
        /// Message from the response body, when one was present
        message: String,
    },

    /// The request never produced a coordinator response
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
