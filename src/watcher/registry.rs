// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry for watcher callbacks and notification fan-out.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::handle::ContextHandle;
use crate::notification::NotificationEnvelope;

/// Type alias for watcher callbacks.
///
/// The envelope reference is only valid for the duration of the call;
/// the callback copies anything it keeps.
pub type WatcherCallback = Arc<dyn Fn(&NotificationEnvelope<'_>, ContextHandle) + Send + Sync>;

/// One watcher registration: the callback plus the caller's context.
#[derive(Clone)]
struct Registration {
    context: ContextHandle,
    callback: WatcherCallback,
}

/// Mutable registry state guarded by one lock.
struct Inner {
    /// Registrations in registration order.
    watchers: Vec<Registration>,
    /// Set at teardown; rejects further registrations.
    frozen: bool,
}

/// Registry for watcher callbacks.
///
/// Membership only ever changes through add and remove; registrations
/// are never mutated in place. Dispatch iterates a snapshot taken under
/// a read lock and releases the lock before the first callback runs, so
/// callbacks are free to call back into the registry (or the manager)
/// without deadlocking.
///
/// # Thread Safety
///
/// All methods take `&self`; the registry is shared between the
/// caller's control thread and the controller stack's event thread.
pub struct WatcherRegistry {
    inner: RwLock<Inner>,
}

impl WatcherRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                watchers: Vec::new(),
                frozen: false,
            }),
        }
    }

    /// Creates a registry with room reserved for `capacity` watchers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceExhaustion`] if the reservation fails.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut watchers = Vec::new();
        watchers.try_reserve(capacity)?;
        Ok(Self {
            inner: RwLock::new(Inner {
                watchers,
                frozen: false,
            }),
        })
    }

    /// Registers a watcher.
    ///
    /// The same context may be registered more than once; each
    /// registration is delivered to and removed independently.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShuttingDown`] once the registry has been
    /// frozen by teardown.
    pub fn add_watcher<F>(&self, context: ContextHandle, callback: F) -> Result<()>
    where
        F: Fn(&NotificationEnvelope<'_>, ContextHandle) + Send + Sync + 'static,
    {
        let mut inner = self.inner.write();
        if inner.frozen {
            return Err(Error::ShuttingDown);
        }
        inner.watchers.push(Registration {
            context,
            callback: Arc::new(callback),
        });
        Ok(())
    }

    /// Removes the oldest registration matching `context`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WatcherNotFound`] if no registration matches.
    pub fn remove_watcher(&self, context: ContextHandle) -> Result<()> {
        let mut inner = self.inner.write();
        match inner.watchers.iter().position(|r| r.context == context) {
            Some(index) => {
                inner.watchers.remove(index);
                Ok(())
            }
            None => Err(Error::WatcherNotFound),
        }
    }

    /// Fans one envelope out to every registered watcher.
    ///
    /// Iterates a point-in-time snapshot in registration order. The
    /// registry lock is released before the first callback runs, so
    /// concurrent (or reentrant) add/remove never corrupts the
    /// iteration: a watcher removed after the snapshot still sees this
    /// envelope, a watcher added after the snapshot sees only the next.
    ///
    /// A panicking callback is isolated and logged; later watchers in
    /// the snapshot still run.
    ///
    /// Returns the number of watchers invoked.
    pub fn dispatch(&self, envelope: &NotificationEnvelope<'_>) -> usize {
        let snapshot: Vec<Registration> = self.inner.read().watchers.clone();

        for registration in &snapshot {
            let invoke = AssertUnwindSafe(|| (registration.callback)(envelope, registration.context));
            if catch_unwind(invoke).is_err() {
                tracing::error!(
                    context = %registration.context,
                    notification = %envelope.handle(),
                    "watcher callback panicked during dispatch"
                );
            }
        }

        snapshot.len()
    }

    /// Freezes the registry: all further [`add_watcher`](Self::add_watcher)
    /// calls fail with [`Error::ShuttingDown`].
    pub fn freeze(&self) {
        self.inner.write().frozen = true;
    }

    /// Removes all registrations.
    pub fn clear(&self) {
        self.inner.write().watchers.clear();
    }

    /// Returns the number of registered watchers.
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.inner.read().watchers.len()
    }

    /// Returns `true` if there are no registered watchers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.watcher_count() == 0
    }
}

impl Default for WatcherRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WatcherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherRegistry")
            .field("watcher_count", &self.watcher_count())
            .finish()
    }
}
