// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver registration by transport path.
//!
//! The [`DriverTable`] maps each transport path (for example
//! `/dev/ttyUSB0`) to the driver handle the controller stack minted for
//! it. At most one driver exists per path at any time; attach and
//! detach requests to the stack happen outside the table lock so that
//! operations on distinct paths never contend across a native call.

mod table;

pub use table::DriverTable;
