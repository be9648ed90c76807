// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Watcher registration and dispatch.
//!
//! A watcher is a `(callback, context)` pair that receives every
//! notification the manager fans out. Registrations are kept in
//! registration order, and dispatch always runs over a point-in-time
//! snapshot of that order, so a watcher mutating the registry from
//! inside its own callback can never corrupt an in-progress fan-out.
//!
//! Duplicate registrations of the same context are permitted and
//! coexist; [`WatcherRegistry::remove_watcher`] removes the oldest
//! matching one per call.

mod registry;

pub use registry::{WatcherCallback, WatcherRegistry};
