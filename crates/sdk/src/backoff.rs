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

//! Exponential backoff with jitter for the acquire retry loop.

use rand::Rng;
use std::time::Duration;

/// Backoff policy: each retry sleeps `current + uniform(0, max_jitter)`,
/// then doubles `current` up to `max`.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// First retry delay
    pub initial: Duration,
    /// Cap on the un-jittered delay
    pub max: Duration,
    /// Upper bound of the uniform jitter added to every sleep
    pub max_jitter: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(5),
            max_jitter: Duration::from_millis(500),
        }
    }
}

impl BackoffConfig {
    /// Next un-jittered delay: doubled, capped at `max`.
    pub fn next(&self, current: Duration) -> Duration {
        (current * 2).min(self.max)
    }

    /// The delay to actually sleep: `current` plus uniform jitter.
    pub fn jittered(&self, current: Duration) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return current;
        }
        let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms));
        current + jitter
    }
}
