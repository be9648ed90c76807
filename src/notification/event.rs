// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Owned event types published on the manager event stream.

use serde::{Deserialize, Serialize};

use crate::handle::{DriverHandle, NotificationHandle};

/// An owned copy of one notification.
///
/// Unlike the dispatch-time envelope, this value owns its payload and
/// may be kept, queued or sent across threads freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// The driver the notification was raised for.
    pub driver: DriverHandle,
    /// The notification handle.
    pub handle: NotificationHandle,
    /// The opaque payload bytes, copied out of the raw event.
    pub payload: Vec<u8>,
}

/// Events published by the manager.
///
/// These cover driver lifecycle changes and every dispatched
/// notification, so a subscriber holding only a broadcast receiver can
/// mirror the full boundary traffic without registering a watcher
/// callback.
///
/// # Examples
///
/// ```
/// use zwaver_lib::{DriverHandle, ManagerEvent};
///
/// let added = ManagerEvent::driver_added("/dev/ttyUSB0", DriverHandle::new(1));
/// let removed = ManagerEvent::driver_removed("/dev/ttyUSB0", None);
/// assert_ne!(added, removed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManagerEvent {
    /// A driver was attached and entered the table.
    DriverAdded {
        /// The transport path the driver was attached for.
        path: String,
        /// The handle minted by the controller stack.
        driver: DriverHandle,
    },

    /// A driver left the table.
    DriverRemoved {
        /// The transport path the driver was registered under.
        path: String,
        /// Set when the stack-side detach failed; the entry is removed
        /// regardless.
        detach_error: Option<String>,
    },

    /// A notification was dispatched to the watcher set.
    Notification(NotificationEvent),
}

impl ManagerEvent {
    /// Creates a `DriverAdded` event.
    #[must_use]
    pub fn driver_added(path: impl Into<String>, driver: DriverHandle) -> Self {
        Self::DriverAdded {
            path: path.into(),
            driver,
        }
    }

    /// Creates a `DriverRemoved` event.
    #[must_use]
    pub fn driver_removed(path: impl Into<String>, detach_error: Option<String>) -> Self {
        Self::DriverRemoved {
            path: path.into(),
            detach_error,
        }
    }

    /// Returns the transport path for driver lifecycle events.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::DriverAdded { path, .. } | Self::DriverRemoved { path, .. } => Some(path),
            Self::Notification(_) => None,
        }
    }
}
