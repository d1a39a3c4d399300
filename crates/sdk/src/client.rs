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

//! Lock client and the scoped guard it hands out.

use crate::{BackoffConfig, SdkError, SdkResult};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Client for one PlexLock coordinator (or a load balancer in front of
/// several).
#[derive(Clone)]
pub struct LockClient {
    base_url: String,
    http: reqwest::Client,
    backoff: BackoffConfig,
}

impl LockClient {
    /// Create a client for the coordinator at `base_url`.
    ///
    /// ## Errors
    /// - [`SdkError::InvalidInput`]: empty base URL
    /// - [`SdkError::Transport`]: HTTP client construction failed
    pub fn new(base_url: &str) -> SdkResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(SdkError::InvalidInput(
                "base URL must not be empty".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url: base_url.to_string(),
            http,
            backoff: BackoffConfig::default(),
        })
    }

    /// Replace the default backoff policy.
    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Acquire a lock on `resource` for `ttl`, retrying conflicts with
    /// jittered exponential backoff for at most `wait_budget`.
    ///
    /// ## Returns
    /// - `Ok(LockGuard)`: the lock is held; release via the guard
    /// - `Err(SdkError::AcquireTimeout)`: the budget elapsed while the
    ///   resource stayed contended
    /// - any other error: first non-conflict failure, returned immediately
    pub async fn acquire(
        &self,
        resource: &str,
        ttl: Duration,
        wait_budget: Duration,
    ) -> SdkResult<LockGuard> {
        if resource.is_empty() {
            return Err(SdkError::InvalidInput(
                "resource must not be empty".to_string(),
            ));
        }

        let deadline = Instant::now() + wait_budget;
        let mut backoff = self.backoff.initial;

        loop {
            match self.try_acquire(resource, ttl).await {
                Ok(token) => {
                    return Ok(LockGuard {
                        client: self.clone(),
                        resource: resource.to_string(),
                        token,
                        acquired_at: Instant::now(),
                        released: false,
                    });
                }
                Err(SdkError::Conflict) => {
                    if Instant::now() >= deadline {
                        return Err(SdkError::AcquireTimeout);
                    }
                    let delay = self.backoff.jittered(backoff);
                    debug!(resource, ?delay, "lock contended, backing off");
                    tokio::time::sleep(delay).await;
                    backoff = self.backoff.next(backoff);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// One acquire attempt against the coordinator.
    async fn try_acquire(&self, resource: &str, ttl: Duration) -> SdkResult<String> {
        #[derive(Deserialize)]
        struct AcquireBody {
            token: Option<String>,
        }

        let ttl_param = format!("{}ms", ttl.as_millis());
        let response = self
            .http
            .post(format!("{}/lock", self.base_url))
            .query(&[("resource", resource), ("ttl", ttl_param.as_str())])
            .send()
            .await?;

        match response.status() {
            StatusCode::CONFLICT => Err(SdkError::Conflict),
            StatusCode::OK => {
                let body: AcquireBody = response.json().await?;
                body.token
                    .filter(|token| !token.is_empty())
                    .ok_or_else(|| SdkError::Server {
                        status: 200,
                        message: "no token returned from server".to_string(),
                    })
            }
            status => Err(server_error(status, response).await),
        }
    }

    async fn release_lock(&self, resource: &str, token: &str) -> SdkResult<()> {
        let response = self
            .http
            .post(format!("{}/unlock", self.base_url))
            .query(&[("resource", resource), ("token", token)])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => Err(SdkError::NotFound),
            status => Err(server_error(status, response).await),
        }
    }

    async fn refresh_lock(&self, resource: &str, token: &str, ttl: Duration) -> SdkResult<()> {
        let ttl_param = format!("{}ms", ttl.as_millis());
        let response = self
            .http
            .post(format!("{}/refresh", self.base_url))
            .query(&[
                ("resource", resource),
                ("token", token),
                ("ttl", ttl_param.as_str()),
            ])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => Err(SdkError::NotFound),
            status => Err(server_error(status, response).await),
        }
    }
}

async fn server_error(status: StatusCode, response: reqwest::Response) -> SdkError {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| "unexpected server response".to_string());

    SdkError::Server {
        status: status.as_u16(),
        message,
    }
}

/// A held lock, scoped to this value's lifetime.
///
/// Dropping the guard without calling [`LockGuard::release`] schedules a
/// best-effort background release on the current tokio runtime, so the lock
/// is returned on every exit path, including unwinding. Call `release()`
/// when the outcome matters.
pub struct LockGuard {
    client: LockClient,
    resource: String,
    token: String,
    acquired_at: Instant,
    released: bool,
}

impl LockGuard {
    /// The locked resource name.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The bearer token minted for this grant.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Local time the guard was issued.
    pub fn acquired_at(&self) -> Instant {
        self.acquired_at
    }

    /// Extend the lock's TTL. Single request, no retries.
    ///
    /// ## Returns
    /// - `Err(SdkError::NotFound)`: the quorum no longer carries this token;
    ///   treat the protected section as lost
    pub async fn refresh(&self, ttl: Duration) -> SdkResult<()> {
        self.client
            .refresh_lock(&self.resource, &self.token, ttl)
            .await
    }

    /// Release the lock and report the coordinator's verdict.
    ///
    /// Consumes the guard; the drop-time background release is disarmed
    /// first, so the lock is released at most once from this handle.
    pub async fn release(mut self) -> SdkResult<()> {
        self.released = true;
        self.client.release_lock(&self.resource, &self.token).await
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let client = self.client.clone();
                let resource = std::mem::take(&mut self.resource);
                let token = std::mem::take(&mut self.token);
                handle.spawn(async move {
                    if let Err(err) = client.release_lock(&resource, &token).await {
                        warn!(resource = %resource, %err, "background lock release failed");
                    }
                });
            }
            Err(_) => {
                warn!(
                    resource = %self.resource,
                    "lock guard dropped outside a tokio runtime; lock will lapse at TTL"
                );
            }
        }
    }
}
