// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The controller stack trait and the notification sink it calls back.

use std::sync::Arc;

use crate::error::StackError;
use crate::handle::DriverHandle;
use crate::notification::RawNotification;

use super::CommandGroup;

/// Receiver for raw notifications raised by the controller stack.
///
/// The stack invokes [`on_notification`](Self::on_notification) from
/// its own background thread(s), independently of any caller thread.
/// The `RawNotification` reference is only valid for the duration of
/// the call: the stack retains ownership of the payload and may reclaim
/// it as soon as the call returns. Implementations must not block
/// longer than one dispatch pass and must copy anything they keep.
///
/// The facade's callback bridge is the one implementation in this
/// crate; stacks should not need another.
pub trait NotificationSink: Send + Sync {
    /// Delivers one raw notification.
    fn on_notification(&self, raw: &RawNotification);
}

/// The controller stack behind the manager facade.
///
/// Implementations wrap one controller library instance. All methods
/// take `&self`: the stack is shared between the caller's control
/// thread and its own event thread(s), so any internal mutability must
/// be synchronized by the implementation.
///
/// # Contract
///
/// - [`attach`](Self::attach) returns a [`DriverHandle`] that stays
///   valid until the matching [`detach`](Self::detach) or until the
///   sink is unregistered.
/// - Notifications for a single driver are raised in order; the stack
///   makes no ordering promise across drivers.
/// - After [`unregister_sink`](Self::unregister_sink) returns, the
///   stack must not invoke the sink again.
pub trait ControllerStack: Send + Sync {
    /// Returns the stack's short version string.
    fn version(&self) -> String;

    /// Returns the stack's long version string, including build
    /// metadata.
    fn version_long(&self) -> String;

    /// Attaches a driver for the controller at `controller_path`.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::AttachRejected`] if the stack cannot open
    /// the transport.
    fn attach(&self, controller_path: &str) -> Result<DriverHandle, StackError>;

    /// Detaches the driver previously attached for `controller_path`.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::DetachRejected`] if the stack cannot
    /// cleanly close the transport. The caller treats this as a soft
    /// failure.
    fn detach(&self, controller_path: &str, handle: DriverHandle) -> Result<(), StackError>;

    /// Registers the sink that will receive every raised notification.
    ///
    /// At most one sink is registered at a time; registering a new one
    /// replaces the old.
    fn register_sink(&self, sink: Arc<dyn NotificationSink>);

    /// Unregisters the current sink, if any.
    ///
    /// Once this returns the stack must raise no further
    /// notifications.
    fn unregister_sink(&self);

    /// Returns whether the stack supports a pass-through command group.
    ///
    /// The default stack supports none.
    fn supports(&self, group: CommandGroup) -> bool {
        let _ = group;
        false
    }

    /// Forwards an opaque pass-through command to the given driver.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::Unsupported`] unless overridden, or
    /// [`StackError::CommandRejected`] if the stack refuses the
    /// payload.
    fn forward(
        &self,
        handle: DriverHandle,
        group: CommandGroup,
        payload: &[u8],
    ) -> Result<(), StackError> {
        let _ = (handle, group, payload);
        Err(StackError::Unsupported)
    }
}
