// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The seam between the manager facade and the controller stack.
//!
//! Everything below this trait boundary - device discovery, the radio
//! protocol, message framing over the serial transport - belongs to the
//! controller stack and is out of scope for this crate. The facade only
//! needs four things from the stack:
//!
//! - version metadata ([`ControllerStack::version`],
//!   [`ControllerStack::version_long`])
//! - driver attach/detach by transport path
//! - a place to hang the notification sink the stack will invoke from
//!   its own thread ([`NotificationSink`])
//! - an optional pass-through lane for the declared command groups
//!   ([`CommandGroup`])
//!
//! # Implementing a stack
//!
//! A production implementation wraps the real controller library; tests
//! implement the trait over plain in-memory state and raise
//! notifications from spawned threads. See the crate-level example.

mod command;
mod controller;

pub use command::CommandGroup;
pub use controller::{ControllerStack, NotificationSink};
