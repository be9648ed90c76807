// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event bus for broadcasting manager events.

use tokio::sync::broadcast;

use super::ManagerEvent;

/// Default channel capacity for the event bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Event bus for broadcasting manager events to multiple subscribers.
///
/// The `EventBus` uses tokio's broadcast channel so that every
/// subscriber receives its own copy of each event. Publishing is
/// synchronous and thread-safe; in particular it is safe from the
/// controller stack's event thread, which is where notification events
/// originate.
///
/// # Capacity
///
/// The bus has a fixed capacity. If a subscriber falls behind, that
/// subscriber observes a `RecvError::Lagged` and loses the oldest
/// events; other subscribers and the dispatch path are unaffected.
///
/// # Examples
///
/// ```
/// use zwaver_lib::{DriverHandle, EventBus, ManagerEvent};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ManagerEvent::driver_added("/dev/ttyUSB0", DriverHandle::new(1)));
/// ```
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<ManagerEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a new event bus with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to manager events.
    ///
    /// Returns a receiver that will observe all events published after
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ManagerEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event to all subscribers.
    ///
    /// With no subscribers the event is silently discarded.
    pub fn publish(&self, event: ManagerEvent) {
        // Ignore errors (no subscribers).
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
