// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Concurrency-safe path-to-driver mapping.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::{DriverError, Result, StackError};
use crate::handle::DriverHandle;
use crate::stack::ControllerStack;

/// One table entry.
struct DriverEntry {
    /// `None` while the attach request is still in flight; the entry
    /// then only reserves the path.
    handle: Option<DriverHandle>,
    /// Serializes raw-event delivery for this driver.
    delivery: Arc<Mutex<()>>,
}

/// Mapping from transport path to attached driver.
///
/// The table owns the attach/detach requests to the controller stack.
/// A path is reserved under the write lock before the attach request
/// goes out, which serializes add/remove of the *same* path while
/// letting distinct paths proceed independently - the lock is never
/// held across a stack call.
pub struct DriverTable {
    stack: Arc<dyn ControllerStack>,
    entries: RwLock<HashMap<String, DriverEntry>>,
}

impl DriverTable {
    /// Creates an empty table backed by the given stack.
    #[must_use]
    pub fn new(stack: Arc<dyn ControllerStack>) -> Self {
        Self {
            stack,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a table with room reserved for `capacity` drivers.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ResourceExhaustion`] if the reservation
    /// fails.
    pub fn with_capacity(stack: Arc<dyn ControllerStack>, capacity: usize) -> Result<Self> {
        let mut entries = HashMap::new();
        entries.try_reserve(capacity)?;
        Ok(Self {
            stack,
            entries: RwLock::new(entries),
        })
    }

    /// Attaches a driver for `path` and inserts it into the table.
    ///
    /// # Errors
    ///
    /// - [`DriverError::DuplicatePath`] if a driver (or an in-flight
    ///   attach) already holds the path; the table is unchanged.
    /// - [`DriverError::AttachFailed`] if the stack rejects the attach;
    ///   the reservation is rolled back.
    pub fn add_driver(&self, path: &str) -> Result<DriverHandle> {
        {
            let mut entries = self.entries.write();
            if entries.contains_key(path) {
                return Err(DriverError::DuplicatePath {
                    path: path.to_owned(),
                }
                .into());
            }
            entries.insert(
                path.to_owned(),
                DriverEntry {
                    handle: None,
                    delivery: Arc::new(Mutex::new(())),
                },
            );
        }

        match self.stack.attach(path) {
            Ok(handle) => {
                if let Some(entry) = self.entries.write().get_mut(path) {
                    entry.handle = Some(handle);
                }
                tracing::info!(path, driver = %handle, "driver attached");
                Ok(handle)
            }
            Err(source) => {
                self.entries.write().remove(path);
                tracing::debug!(path, error = %source, "driver attach rejected");
                Err(DriverError::AttachFailed {
                    path: path.to_owned(),
                    source,
                }
                .into())
            }
        }
    }

    /// Removes the driver registered for `path` and requests detach.
    ///
    /// The entry is removed *before* the detach request, so a failed
    /// detach can never leave an orphaned entry behind. A detach
    /// failure is soft: it is logged and returned as `Ok(Some(..))`
    /// for the caller to surface.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::UnknownPath`] if no driver holds the path
    /// (an attach still in flight does not count); no side effects.
    pub fn remove_driver(&self, path: &str) -> Result<Option<StackError>> {
        let handle = {
            let mut entries = self.entries.write();
            let handle = entries.get(path).and_then(|entry| entry.handle);
            match handle {
                Some(handle) => {
                    entries.remove(path);
                    handle
                }
                None => {
                    return Err(DriverError::UnknownPath {
                        path: path.to_owned(),
                    }
                    .into());
                }
            }
        };

        match self.stack.detach(path, handle) {
            Ok(()) => {
                tracing::info!(path, driver = %handle, "driver detached");
                Ok(None)
            }
            Err(error) => {
                tracing::warn!(path, driver = %handle, error = %error, "detach failed; entry removed anyway");
                Ok(Some(error))
            }
        }
    }

    /// Detaches every remaining driver, best-effort.
    ///
    /// Used by manager teardown. Per-driver detach failures are
    /// collected and returned; they never abort the sweep. Entries
    /// whose attach was still in flight are dropped without a detach
    /// request.
    pub fn drain_all(&self) -> Vec<(String, StackError)> {
        let drained: Vec<(String, DriverEntry)> = self.entries.write().drain().collect();

        let mut failures = Vec::new();
        for (path, entry) in drained {
            let Some(handle) = entry.handle else { continue };
            match self.stack.detach(&path, handle) {
                Ok(()) => tracing::debug!(path, driver = %handle, "driver detached during teardown"),
                Err(error) => failures.push((path, error)),
            }
        }
        failures
    }

    /// Returns the handle for `path`, if a driver is attached.
    #[must_use]
    pub fn handle_for(&self, path: &str) -> Option<DriverHandle> {
        self.entries.read().get(path).and_then(|entry| entry.handle)
    }

    /// Returns the delivery lock for the given driver, if it is still
    /// in the table.
    #[must_use]
    pub(crate) fn delivery_lock(&self, driver: DriverHandle) -> Option<Arc<Mutex<()>>> {
        self.entries
            .read()
            .values()
            .find(|entry| entry.handle == Some(driver))
            .map(|entry| Arc::clone(&entry.delivery))
    }

    /// Returns every registered transport path.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Returns the number of registered drivers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no drivers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for DriverTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverTable")
            .field("driver_count", &self.len())
            .finish()
    }
}
