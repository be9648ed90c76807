// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Notification types and the manager event stream.
//!
//! A notification exists in three forms as it crosses the boundary:
//!
//! - [`RawNotification`] - the event as the controller stack hands it
//!   over; the stack owns the payload and lends it out for exactly one
//!   sink call.
//! - [`NotificationEnvelope`] - the read-only, lifetime-bound view each
//!   watcher receives during one dispatch pass. It cannot outlive the
//!   raw event, so the "copy what you keep" rule is enforced by the
//!   borrow checker rather than by convention.
//! - [`NotificationEvent`] - an owned copy, published on the broadcast
//!   event stream for subscribers that prefer channels to callbacks.
//!
//! [`ManagerEvent`] wraps notifications together with driver lifecycle
//! events on the same stream, and [`EventBus`] is the broadcast channel
//! carrying them.

mod envelope;
mod event;
mod event_bus;

pub use envelope::{NotificationEnvelope, RawNotification};
pub use event::{ManagerEvent, NotificationEvent};
pub use event_bus::EventBus;
