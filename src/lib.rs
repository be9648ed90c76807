// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ZWaveR` Lib - a boundary layer for a Z-Wave controller stack.
//!
//! This library exposes a controller stack's lifecycle and event stream
//! to a host application: a single [`Manager`] coordinates driver
//! registration by transport path and fans every notification out to
//! registered watchers, safely bridging the stack's own event thread
//! into the caller's world.
//!
//! The controller stack itself (device discovery, radio protocol,
//! serial framing) stays behind the [`ControllerStack`] trait and is
//! out of scope here; the crate's job is the meeting point of the two
//! ownership models - opaque handles and raw callbacks on one side,
//! type-safe, ordered, teardown-aware delivery on the other.
//!
//! # Guarantees
//!
//! - At most one driver per transport path, at any time.
//! - Watchers are invoked in registration order, over a point-in-time
//!   snapshot: mutating the watcher set mid-dispatch (even from inside
//!   a callback) never corrupts a fan-out.
//! - Notifications for one driver are delivered serially and in order;
//!   no ordering is promised across drivers.
//! - The envelope a watcher receives cannot outlive the dispatch call;
//!   anything kept must be copied out (the borrow checker enforces it).
//! - Teardown waits (boundedly) for in-flight dispatch, and no watcher
//!   runs after `destroy()` returns.
//! - A panicking watcher is isolated and logged; it never poisons the
//!   fan-out or crosses back into the stack.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use parking_lot::Mutex;
//! use zwaver_lib::{
//!     ContextHandle, ControllerStack, DriverHandle, ManagerContext, NotificationSink,
//!     StackError,
//! };
//!
//! /// Glue to the real controller library.
//! #[derive(Default)]
//! struct SerialStack {
//!     sink: Mutex<Option<Arc<dyn NotificationSink>>>,
//! }
//!
//! impl ControllerStack for SerialStack {
//!     fn version(&self) -> String {
//!         "1.6".to_string()
//!     }
//!
//!     fn version_long(&self) -> String {
//!         "1.6.1962 (serial)".to_string()
//!     }
//!
//!     fn attach(&self, controller_path: &str) -> Result<DriverHandle, StackError> {
//!         // Open the transport, start the controller, mint a handle.
//!         let _ = controller_path;
//!         Ok(DriverHandle::new(1))
//!     }
//!
//!     fn detach(&self, _path: &str, _handle: DriverHandle) -> Result<(), StackError> {
//!         Ok(())
//!     }
//!
//!     fn register_sink(&self, sink: Arc<dyn NotificationSink>) {
//!         // The stack's event thread calls sink.on_notification(..).
//!         *self.sink.lock() = Some(sink);
//!     }
//!
//!     fn unregister_sink(&self) {
//!         *self.sink.lock() = None;
//!     }
//! }
//!
//! fn main() -> zwaver_lib::Result<()> {
//!     let context = ManagerContext::new();
//!     let manager = context.create(Arc::new(SerialStack::default()))?;
//!
//!     manager.add_driver("/dev/ttyUSB0")?;
//!     manager.add_watcher(ContextHandle::new(1), |envelope, _ctx| {
//!         println!("notification {} from {}", envelope.handle(), envelope.driver());
//!     })?;
//!
//!     // ... the stack's event thread drives the watchers ...
//!
//!     context.destroy()?;
//!     Ok(())
//! }
//! ```
//!
//! # Event stream
//!
//! Callers that prefer channels over callbacks can subscribe to the
//! broadcast stream instead; it carries driver lifecycle events and an
//! owned copy of every notification:
//!
//! ```ignore
//! let mut events = manager.subscribe();
//! tokio::spawn(async move {
//!     while let Ok(event) = events.recv().await {
//!         println!("event: {event:?}");
//!     }
//! });
//! ```

mod bridge;
pub mod driver;
pub mod error;
pub mod handle;
pub mod manager;
pub mod notification;
pub mod stack;
pub mod watcher;

pub use driver::DriverTable;
pub use error::{DriverError, Error, Result, StackError};
pub use handle::{ContextHandle, DriverHandle, NotificationHandle};
pub use manager::{LifecycleState, Manager, ManagerConfig, ManagerContext};
pub use notification::{
    EventBus, ManagerEvent, NotificationEnvelope, NotificationEvent, RawNotification,
};
pub use stack::{CommandGroup, ControllerStack, NotificationSink};
pub use watcher::{WatcherCallback, WatcherRegistry};
