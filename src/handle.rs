// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tagged opaque handle types.
//!
//! The controller stack and the caller exchange three kinds of opaque
//! identifiers across the boundary. Each gets its own newtype so that a
//! driver handle can never be confused with a user context or a
//! notification handle, even though all three are plain integers on the
//! wire:
//!
//! - [`DriverHandle`] - minted by the controller stack on a successful
//!   attach, identifies one attached controller
//! - [`ContextHandle`] - minted by the caller, passed back verbatim to
//!   that caller's watcher callback on every dispatch
//! - [`NotificationHandle`] - minted by the controller stack, identifies
//!   one raised notification

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle for one attached driver.
///
/// Returned by the controller stack when a driver is attached and keyed
/// in the driver table by its transport path. The value is meaningful
/// only to the stack that minted it.
///
/// # Examples
///
/// ```
/// use zwaver_lib::DriverHandle;
///
/// let handle = DriverHandle::new(3);
/// assert_eq!(handle.value(), 3);
/// assert_eq!(handle.to_string(), "Driver(3)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverHandle(u64);

impl DriverHandle {
    /// Creates a driver handle with the given raw value.
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DriverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Driver({})", self.0)
    }
}

/// Opaque user context attached to a watcher registration.
///
/// The manager never interprets this value; it is stored alongside the
/// watcher callback and handed back on every invocation, so a caller
/// registering several watchers can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextHandle(u64);

impl ContextHandle {
    /// Creates a context handle with the given raw value.
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ctx({})", self.0)
    }
}

/// Handle for one raised notification.
///
/// Identifies the notification within the controller stack for the
/// duration of one dispatch pass. The payload it refers to is owned by
/// the stack and reclaimed as soon as the dispatch returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationHandle(u64);

impl NotificationHandle {
    /// Creates a notification handle with the given raw value.
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw handle value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Notif({})", self.0)
    }
}
