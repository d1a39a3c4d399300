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

//! # PlexLock Coordinator Server
//!
//! ## Purpose
//! Thin HTTP adapter over the quorum engine: parses query parameters,
//! translates the engine's error taxonomy to status codes, and serializes
//! JSON envelopes. The coordinator keeps no per-request state, so any
//! instance behind a load balancer can serve any request.
//!
//! ## Endpoints
//! - `POST /lock` - acquire a lock (`resource`, `ttl`)
//! - `POST /unlock` - release a lock (`resource`, `token`)
//! - `POST /refresh` - extend a lock's TTL (`resource`, `token`, `ttl`)
//! - `GET /ttl` - remaining TTL (`resource`, `token`)
//! - `GET /health` - liveness probe
//!
//! ## Configuration
//! Environment only (12-factor): `REDIS_ADDRESSES` (comma-separated, odd
//! count >= 3), `PLEXLOCK_HTTP_PORT` (default 8181), `PLEXLOCK_MAX_TTL`.

pub mod config;
pub mod duration;
pub mod http;
pub mod telemetry;

pub use config::{ConfigError, ServerConfig};
pub use http::{create_router, AppState};
