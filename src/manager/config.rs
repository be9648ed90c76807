// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Manager construction configuration.

use std::time::Duration;

/// Default bound on how long teardown waits for an in-flight dispatch.
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Default capacity of the broadcast event stream.
const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Construction-time configuration for a [`Manager`](super::Manager).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use zwaver_lib::ManagerConfig;
///
/// let config = ManagerConfig::default().with_drain_timeout(Duration::from_millis(500));
/// assert_eq!(config.drain_timeout, Duration::from_millis(500));
/// ```
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// How long `destroy()` waits for an in-flight dispatch before
    /// force-proceeding and reporting
    /// [`Error::DrainTimeout`](crate::Error::DrainTimeout).
    pub drain_timeout: Duration,
    /// Capacity of the broadcast event stream; a subscriber that lags
    /// further than this loses its oldest events.
    pub event_capacity: usize,
}

impl ManagerConfig {
    /// Returns the config with a different drain timeout.
    #[must_use]
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Returns the config with a different event stream capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}
