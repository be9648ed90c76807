// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The raw notification and its dispatch-time envelope.

use crate::handle::{DriverHandle, NotificationHandle};

use super::NotificationEvent;

/// A raw notification as raised by the controller stack.
///
/// The stack constructs one of these on its own thread and lends it to
/// the registered sink by reference. The payload bytes are owned by the
/// stack for the duration of that call and may be reclaimed the moment
/// the sink returns; nothing in this crate retains the reference.
#[derive(Debug)]
pub struct RawNotification {
    driver: DriverHandle,
    handle: NotificationHandle,
    payload: Vec<u8>,
}

impl RawNotification {
    /// Creates a raw notification.
    ///
    /// Called by controller stack implementations, not by the facade.
    #[must_use]
    pub fn new(
        driver: DriverHandle,
        handle: NotificationHandle,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            driver,
            handle,
            payload: payload.into(),
        }
    }

    /// Returns the driver this notification was raised for.
    #[must_use]
    pub fn driver(&self) -> DriverHandle {
        self.driver
    }

    /// Returns the notification handle.
    #[must_use]
    pub fn handle(&self) -> NotificationHandle {
        self.handle
    }

    /// Returns the opaque payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Read-only view of one notification during a dispatch pass.
///
/// An envelope is created by the bridge for each raw event and lent to
/// every watcher in turn. Its lifetime is tied to the raw notification,
/// so a watcher cannot stash the envelope or anything borrowed from it;
/// data needed past the callback must be copied out, most conveniently
/// with [`to_event`](Self::to_event).
///
/// # Examples
///
/// ```ignore
/// manager.add_watcher(ctx, |envelope, _ctx| {
///     // Fine: copy the payload for later.
///     let keep = envelope.to_event();
///     tx.send(keep).unwrap();
/// })?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NotificationEnvelope<'a> {
    raw: &'a RawNotification,
}

impl<'a> NotificationEnvelope<'a> {
    /// Wraps a raw notification for one dispatch pass.
    pub(crate) fn new(raw: &'a RawNotification) -> Self {
        Self { raw }
    }

    /// Returns the driver this notification was raised for.
    #[must_use]
    pub fn driver(&self) -> DriverHandle {
        self.raw.driver()
    }

    /// Returns the notification handle.
    #[must_use]
    pub fn handle(&self) -> NotificationHandle {
        self.raw.handle()
    }

    /// Returns the opaque payload bytes, valid for the duration of the
    /// callback.
    #[must_use]
    pub fn payload(&self) -> &'a [u8] {
        self.raw.payload()
    }

    /// Copies the envelope into an owned [`NotificationEvent`].
    #[must_use]
    pub fn to_event(&self) -> NotificationEvent {
        NotificationEvent {
            driver: self.driver(),
            handle: self.handle(),
            payload: self.payload().to_vec(),
        }
    }
}
