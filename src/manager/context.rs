// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The explicit singleton slot for the manager.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::stack::ControllerStack;

use super::core::Manager;
use super::ManagerConfig;

/// Holder of the one manager instance for a host application.
///
/// The original boundary surface kept the manager in hidden process
/// state; this crate keeps it in an explicit context object instead.
/// The host owns exactly one `ManagerContext` for the lifetime of the
/// process and passes it by reference wherever the manager is needed -
/// the single-instance contract is the same, but tests can construct
/// as many independent contexts as they need.
///
/// An empty slot is the `Uninitialized` lifecycle state: [`get`](Self::get)
/// fails with [`Error::NotInitialized`] before the first
/// [`create`](Self::create) and again after [`destroy`](Self::destroy).
#[derive(Debug, Default)]
pub struct ManagerContext {
    slot: RwLock<Option<Arc<Manager>>>,
}

impl ManagerContext {
    /// Creates an empty (uninitialized) context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    /// Creates the manager over the given stack, or returns the
    /// existing instance if one is already active.
    ///
    /// Idempotent: a second `create` without an intervening `destroy`
    /// returns the same `Arc` and ignores the arguments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceExhaustion`] if a core structure
    /// cannot be allocated; the slot stays empty.
    pub fn create(&self, stack: Arc<dyn ControllerStack>) -> Result<Arc<Manager>> {
        self.create_with_config(stack, ManagerConfig::default())
    }

    /// Creates the manager with explicit configuration.
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create).
    pub fn create_with_config(
        &self,
        stack: Arc<dyn ControllerStack>,
        config: ManagerConfig,
    ) -> Result<Arc<Manager>> {
        let mut slot = self.slot.write();
        if let Some(existing) = slot.as_ref() {
            return Ok(Arc::clone(existing));
        }
        let manager = Manager::new(stack, config)?;
        *slot = Some(Arc::clone(&manager));
        Ok(manager)
    }

    /// Returns the active manager.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotInitialized`] if no manager is active.
    pub fn get(&self) -> Result<Arc<Manager>> {
        self.slot.read().as_ref().map(Arc::clone).ok_or(Error::NotInitialized)
    }

    /// Destroys the active manager, if any.
    ///
    /// Empties the slot first (so `get` fails immediately), then runs
    /// teardown: in-flight dispatch is drained, every remaining driver
    /// is detached best-effort, and all watchers are cleared. Calling
    /// `destroy` with no active manager is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DrainTimeout`] if an in-flight dispatch did not
    /// finish within the configured drain timeout. Teardown still
    /// completes in that case.
    pub fn destroy(&self) -> Result<()> {
        let manager = self.slot.write().take();
        match manager {
            Some(manager) => manager.shutdown(),
            None => Ok(()),
        }
    }

    /// Returns `true` while a manager is active in this context.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.slot.read().is_some()
    }
}
