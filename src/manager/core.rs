// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The manager facade.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::bridge::{CallbackBridge, DispatchGate};
use crate::driver::DriverTable;
use crate::error::{DriverError, Error, Result};
use crate::handle::{ContextHandle, DriverHandle};
use crate::notification::{EventBus, ManagerEvent, NotificationEnvelope, RawNotification};
use crate::stack::{CommandGroup, ControllerStack};
use crate::watcher::WatcherRegistry;

use super::ManagerConfig;

/// Room reserved up front for driver entries.
const INITIAL_DRIVER_CAPACITY: usize = 4;

/// Room reserved up front for watcher registrations.
const INITIAL_WATCHER_CAPACITY: usize = 8;

/// Lifecycle state of a manager instance.
///
/// The `Uninitialized` state of the boundary surface is represented by
/// an empty [`ManagerContext`](super::ManagerContext) slot; a `Manager`
/// value only exists in the states below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Normal operation; all boundary operations are accepted.
    Active,
    /// Teardown has begun: new operations are rejected while in-flight
    /// dispatch drains.
    Draining,
    /// Teardown finished; the instance is inert.
    Destroyed,
}

/// Coordinator for driver registration and notification fan-out.
///
/// A `Manager` owns the [`DriverTable`] and [`WatcherRegistry`] and
/// enforces the creation/teardown ordering between them: no envelope
/// dispatch begins after teardown has started, and teardown does not
/// finalize while a dispatch is in flight.
///
/// Instances are created through a [`ManagerContext`](super::ManagerContext);
/// see the module docs for the lifecycle walkthrough.
pub struct Manager {
    stack: Arc<dyn ControllerStack>,
    drivers: DriverTable,
    watchers: WatcherRegistry,
    events: EventBus,
    gate: DispatchGate,
    state: Mutex<LifecycleState>,
    config: ManagerConfig,
}

impl Manager {
    /// Builds a manager over the given stack and hooks the callback
    /// bridge up as the stack's notification sink.
    pub(crate) fn new(
        stack: Arc<dyn ControllerStack>,
        config: ManagerConfig,
    ) -> Result<Arc<Self>> {
        let drivers = DriverTable::with_capacity(Arc::clone(&stack), INITIAL_DRIVER_CAPACITY)?;
        let watchers = WatcherRegistry::with_capacity(INITIAL_WATCHER_CAPACITY)?;
        let events = EventBus::with_capacity(config.event_capacity);

        let manager = Arc::new(Self {
            stack,
            drivers,
            watchers,
            events,
            gate: DispatchGate::new(),
            state: Mutex::new(LifecycleState::Active),
            config,
        });

        let bridge = Arc::new(CallbackBridge::new(Arc::downgrade(&manager)));
        manager.stack.register_sink(bridge);

        Ok(manager)
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn lifecycle(&self) -> LifecycleState {
        *self.state.lock()
    }

    fn ensure_active(&self) -> Result<()> {
        match *self.state.lock() {
            LifecycleState::Active => Ok(()),
            LifecycleState::Draining => Err(Error::ShuttingDown),
            LifecycleState::Destroyed => Err(Error::NotInitialized),
        }
    }

    // =========================================================================
    // Version metadata
    // =========================================================================

    /// Returns the controller stack's short version string.
    #[must_use]
    pub fn version(&self) -> String {
        self.stack.version()
    }

    /// Returns the controller stack's long version string.
    #[must_use]
    pub fn version_long(&self) -> String {
        self.stack.version_long()
    }

    // =========================================================================
    // Driver lifecycle
    // =========================================================================

    /// Attaches a driver for the controller at `path`.
    ///
    /// # Errors
    ///
    /// Fails with `DuplicatePath` if a driver already holds the path,
    /// `AttachFailed` if the stack rejects the attach, or
    /// `ShuttingDown`/`NotInitialized` outside the active state.
    pub fn add_driver(&self, path: &str) -> Result<DriverHandle> {
        self.ensure_active()?;
        let handle = self.drivers.add_driver(path)?;
        self.events.publish(ManagerEvent::driver_added(path, handle));
        Ok(handle)
    }

    /// Detaches and removes the driver registered for `path`.
    ///
    /// A stack-side detach failure is soft: the entry is removed
    /// regardless, the failure is logged and carried on the event
    /// stream as [`ManagerEvent::DriverRemoved`] with `detach_error`
    /// set.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownPath` if no driver holds the path, or
    /// `ShuttingDown`/`NotInitialized` outside the active state.
    pub fn remove_driver(&self, path: &str) -> Result<()> {
        self.ensure_active()?;
        let detach_error = self.drivers.remove_driver(path)?;
        self.events.publish(ManagerEvent::driver_removed(
            path,
            detach_error.map(|error| error.to_string()),
        ));
        Ok(())
    }

    /// Returns every registered transport path.
    #[must_use]
    pub fn driver_paths(&self) -> Vec<String> {
        self.drivers.paths()
    }

    /// Returns the number of registered drivers.
    #[must_use]
    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    // =========================================================================
    // Watcher lifecycle
    // =========================================================================

    /// Registers a watcher callback under the caller's context handle.
    ///
    /// The callback runs on the controller stack's event thread for
    /// every dispatched notification; the envelope it receives is valid
    /// only for the duration of the call. Duplicate registrations of
    /// the same context are permitted and delivered independently.
    ///
    /// # Errors
    ///
    /// Fails with `ShuttingDown`/`NotInitialized` outside the active
    /// state.
    pub fn add_watcher<F>(&self, context: ContextHandle, callback: F) -> Result<()>
    where
        F: Fn(&NotificationEnvelope<'_>, ContextHandle) + Send + Sync + 'static,
    {
        self.ensure_active()?;
        self.watchers.add_watcher(context, callback)
    }

    /// Removes the oldest watcher registration matching `context`.
    ///
    /// # Errors
    ///
    /// Fails with `WatcherNotFound` if no registration matches, or
    /// `ShuttingDown`/`NotInitialized` outside the active state.
    pub fn remove_watcher(&self, context: ContextHandle) -> Result<()> {
        self.ensure_active()?;
        self.watchers.remove_watcher(context)
    }

    /// Returns the number of registered watchers.
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.watchers.watcher_count()
    }

    // =========================================================================
    // Event stream
    // =========================================================================

    /// Subscribes to the manager event stream.
    ///
    /// The stream carries driver lifecycle events and an owned copy of
    /// every dispatched notification, for callers that prefer a channel
    /// over a watcher callback. Dropping the receiver unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ManagerEvent> {
        self.events.subscribe()
    }

    /// Returns the number of active event stream subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }

    // =========================================================================
    // Pass-through commands
    // =========================================================================

    /// Forwards an opaque pass-through command to the driver registered
    /// for `path`.
    ///
    /// The manager applies no logic of its own here beyond the
    /// capability check and the path lookup; the payload goes to the
    /// stack verbatim.
    ///
    /// # Errors
    ///
    /// Fails with `UnsupportedCommand` if the stack does not support
    /// the group, `UnknownPath` if no driver holds the path, or
    /// `CommandFailed` if the stack rejects the payload.
    pub fn forward(&self, path: &str, group: CommandGroup, payload: &[u8]) -> Result<()> {
        self.ensure_active()?;
        if !self.stack.supports(group) {
            return Err(Error::UnsupportedCommand { group });
        }
        let handle = self.drivers.handle_for(path).ok_or_else(|| {
            Error::from(DriverError::UnknownPath {
                path: path.to_owned(),
            })
        })?;
        self.stack
            .forward(handle, group, payload)
            .map_err(|source| Error::CommandFailed { group, source })
    }

    // =========================================================================
    // Dispatch and teardown
    // =========================================================================

    /// Delivers one raw notification from the bridge.
    ///
    /// Runs on the controller stack's event thread. Takes a dispatch
    /// permit (dropping the event once draining has begun), serializes
    /// delivery per driver, fans the envelope out to the watcher
    /// snapshot, then publishes an owned copy on the event stream.
    pub(crate) fn deliver(&self, raw: &RawNotification) {
        let Some(_permit) = self.gate.begin() else {
            tracing::debug!(driver = %raw.driver(), "notification during teardown; dropped");
            return;
        };

        // A missing lock means the driver raced its own removal; the
        // envelope is opaque either way, so it is still fanned out.
        let delivery = self.drivers.delivery_lock(raw.driver());
        let _delivery_guard = delivery.as_ref().map(|lock| lock.lock());

        let envelope = NotificationEnvelope::new(raw);
        let delivered = self.watchers.dispatch(&envelope);
        tracing::trace!(
            driver = %raw.driver(),
            notification = %raw.handle(),
            watchers = delivered,
            "notification dispatched"
        );

        self.events.publish(ManagerEvent::Notification(envelope.to_event()));
    }

    /// Runs teardown: drains dispatch, detaches drivers, clears
    /// watchers.
    ///
    /// Called by [`ManagerContext::destroy`](super::ManagerContext::destroy).
    /// Safe to call more than once; every call after the first is a
    /// no-op.
    pub(crate) fn shutdown(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            if *state != LifecycleState::Active {
                return Ok(());
            }
            *state = LifecycleState::Draining;
        }

        self.watchers.freeze();
        self.stack.unregister_sink();

        let drained = self.gate.drain(self.config.drain_timeout);
        if !drained {
            tracing::error!(
                timeout = ?self.config.drain_timeout,
                "teardown proceeding with a dispatch still in flight"
            );
        }

        let failures = self.drivers.drain_all();
        for (path, error) in &failures {
            tracing::warn!(path, error = %error, "driver detach failed during teardown");
        }

        self.watchers.clear();
        *self.state.lock() = LifecycleState::Destroyed;
        tracing::info!(detach_failures = failures.len(), "manager destroyed");

        if drained { Ok(()) } else { Err(Error::DrainTimeout) }
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("lifecycle", &self.lifecycle())
            .field("driver_count", &self.driver_count())
            .field("watcher_count", &self.watcher_count())
            .finish()
    }
}
