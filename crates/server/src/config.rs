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

//! Environment-driven server configuration (12-factor).
//!
//! The replica list is read once at boot and never mutated afterwards;
//! changing it requires a restart.

use crate::duration::parse_duration;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default HTTP listen port.
pub const DEFAULT_HTTP_PORT: u16 = 8181;

/// Default upper bound on client-requested TTLs.
pub const DEFAULT_MAX_TTL: Duration = Duration::from_secs(600);

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `REDIS_ADDRESSES` missing or empty
    #[error("REDIS_ADDRESSES is not set or empty. Hint: provide a comma-separated list of host:port entries.")]
    MissingAddresses,

    /// The quorum rule needs at least 3 replicas
    #[error("number of replicas must be at least 3, got {0}")]
    TooFewReplicas(usize),

    /// Majorities must be unambiguous
    #[error("number of replicas must be odd, got {0}")]
    EvenReplicaCount(usize),

    /// An environment value did not parse
    #[error("invalid value '{value}' for {name}")]
    InvalidValue { name: &'static str, value: String },
}

/// Coordinator server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// One `host:port` entry per replica
    pub replica_addresses: Vec<String>,
    /// HTTP listen port
    pub http_port: u16,
    /// Upper bound on client-requested TTLs
    pub max_ttl: Duration,
}

impl ServerConfig {
    /// Load configuration from the environment.
    ///
    /// ## Environment
    /// - `REDIS_ADDRESSES`: comma-separated `host:port` list, odd count >= 3
    /// - `PLEXLOCK_HTTP_PORT`: listen port (default 8181)
    /// - `PLEXLOCK_MAX_TTL`: duration string (default 10m)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = env::var("REDIS_ADDRESSES").unwrap_or_default();
        let replica_addresses = parse_replica_addresses(&raw)?;

        let http_port = match env::var("PLEXLOCK_HTTP_PORT") {
            Ok(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PLEXLOCK_HTTP_PORT",
                value: value.clone(),
            })?,
            Err(_) => DEFAULT_HTTP_PORT,
        };

        let max_ttl = match env::var("PLEXLOCK_MAX_TTL") {
            Ok(value) => parse_duration(&value).ok_or(ConfigError::InvalidValue {
                name: "PLEXLOCK_MAX_TTL",
                value,
            })?,
            Err(_) => DEFAULT_MAX_TTL,
        };

        Ok(Self {
            replica_addresses,
            http_port,
            max_ttl,
        })
    }
}

/// Parse and validate a comma-separated replica address list.
pub fn parse_replica_addresses(raw: &str) -> Result<Vec<String>, ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::MissingAddresses);
    }

    let addresses: Vec<String> = raw
        .split(',')
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect();

    if addresses.len() < 3 {
        return Err(ConfigError::TooFewReplicas(addresses.len()));
    }
    if addresses.len() % 2 == 0 {
        return Err(ConfigError::EvenReplicaCount(addresses.len()));
    }

    Ok(addresses)
}
