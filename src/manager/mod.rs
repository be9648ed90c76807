// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The manager facade and its singleton lifecycle.
//!
//! This module provides the coordinating object of the crate:
//!
//! - [`Manager`] - owns the driver table, the watcher registry, the
//!   event bus and the dispatch gate, and exposes the public boundary
//!   operations
//! - [`ManagerContext`] - the explicitly passed singleton slot through
//!   which the manager is created, looked up and destroyed
//! - [`ManagerConfig`] - construction-time tuning knobs
//!
//! # Lifecycle
//!
//! The process-wide singleton of the original surface is reproduced as
//! an explicit context object: the host application owns exactly one
//! [`ManagerContext`] and passes it by reference wherever the manager
//! is needed. An empty slot is the `Uninitialized` state; `create`
//! moves it to `Active` (idempotently), and `destroy` drains in-flight
//! dispatch, detaches every driver and empties the slot again. Tests
//! construct as many independent contexts as they like.
//!
//! # Examples
//!
//! ```ignore
//! let context = ManagerContext::new();
//! let manager = context.create(stack)?;
//!
//! manager.add_driver("/dev/ttyUSB0")?;
//! manager.add_watcher(ContextHandle::new(1), |envelope, _ctx| {
//!     println!("notification {} from {}", envelope.handle(), envelope.driver());
//! })?;
//!
//! // ... run ...
//!
//! context.destroy()?;
//! ```

mod config;
mod context;
mod core;

pub use self::core::{LifecycleState, Manager};
pub use config::ManagerConfig;
pub use context::ManagerContext;
