// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `ZWaveR` library.
//!
//! This module provides the error hierarchy for failures across the
//! manager facade: lifecycle violations, driver-table key violations,
//! and failures reported by the controller stack across the boundary.
//!
//! No panic ever crosses the boundary in either direction: watcher
//! callback panics are caught and logged by the dispatch path, and the
//! controller stack reports its own failures as [`StackError`] values.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::stack::CommandGroup;

/// The main error type for this library.
///
/// This enum encompasses all failures a caller can observe when driving
/// the manager facade.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation requiring an active manager was attempted before
    /// `create()` or after `destroy()`.
    #[error("manager is not initialized")]
    NotInitialized,

    /// A registration or command was attempted while teardown is in
    /// progress or already complete.
    #[error("manager is shutting down")]
    ShuttingDown,

    /// A driver-table operation failed.
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// A watcher removal found no registration for the given context.
    #[error("no watcher registered for this context")]
    WatcherNotFound,

    /// A pass-through command group is not supported by the controller
    /// stack behind this manager.
    #[error("command group {group} is not supported by the controller stack")]
    UnsupportedCommand {
        /// The unsupported group.
        group: CommandGroup,
    },

    /// A pass-through command was rejected by the controller stack.
    #[error("pass-through command {group} failed: {source}")]
    CommandFailed {
        /// The command group that was forwarded.
        group: CommandGroup,
        /// The stack-reported failure.
        #[source]
        source: StackError,
    },

    /// Allocation of a core manager structure failed.
    ///
    /// This is the only condition the facade treats as fatal; it is
    /// still reported to the caller rather than aborting the process.
    #[error("failed to allocate core manager structures")]
    ResourceExhaustion,

    /// Teardown timed out waiting for an in-flight dispatch to finish.
    ///
    /// Teardown force-proceeds after the configured drain timeout; this
    /// error surfaces the stall as an operational fault.
    #[error("teardown timed out waiting for an in-flight dispatch")]
    DrainTimeout,
}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Self::ResourceExhaustion
    }
}

/// Errors related to the driver table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// A driver is already registered (or an attach is already in
    /// flight) for this transport path.
    #[error("a driver is already registered for {path}")]
    DuplicatePath {
        /// The offending transport path.
        path: String,
    },

    /// No driver is registered for this transport path.
    #[error("no driver registered for {path}")]
    UnknownPath {
        /// The transport path that was looked up.
        path: String,
    },

    /// The controller stack rejected the attach request.
    ///
    /// The table is left unchanged.
    #[error("controller attach failed for {path}: {source}")]
    AttachFailed {
        /// The transport path that failed to attach.
        path: String,
        /// The stack-reported failure.
        #[source]
        source: StackError,
    },
}

/// Failures reported by the controller stack across the boundary.
///
/// Detach rejection is deliberately *soft*: the driver table removes
/// the entry regardless, and the failure travels as a warning on the
/// event stream rather than as an [`Error`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    /// The stack could not attach a driver for the given path.
    #[error("attach rejected: {0}")]
    AttachRejected(String),

    /// The stack could not cleanly detach a driver.
    #[error("detach rejected: {0}")]
    DetachRejected(String),

    /// The stack rejected a forwarded pass-through command.
    #[error("command rejected: {0}")]
    CommandRejected(String),

    /// The operation is not supported by this controller stack.
    #[error("operation not supported by this controller stack")]
    Unsupported,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
