// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pass-through command groups.
//!
//! The controller surface declares a number of API groups - polling,
//! node information, values, scenes, statistics and friends - whose
//! operations carry no manager-side logic: they delegate directly to
//! the driver identified by the call. The facade models them as a
//! capability set: the stack advertises which groups it supports, and
//! [`Manager::forward`](crate::Manager::forward) hands the opaque
//! payload straight through.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A declared pass-through API group.
///
/// The payload format within each group is a contract between the
/// caller and the controller stack; the manager never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandGroup {
    /// Polling control for Z-Wave devices.
    Polling,
    /// Node information queries.
    NodeInformation,
    /// Value get/set operations.
    Values,
    /// Climate control schedules.
    ClimateSchedules,
    /// Switch-all commands.
    SwitchAll,
    /// Configuration parameters.
    Configuration,
    /// Association groups.
    Groups,
    /// Controller commands.
    Controller,
    /// Network commands.
    Network,
    /// Scene commands.
    Scenes,
    /// Statistics retrieval.
    Statistics,
}

impl CommandGroup {
    /// Every declared group, in surface order.
    pub const ALL: [Self; 11] = [
        Self::Polling,
        Self::NodeInformation,
        Self::Values,
        Self::ClimateSchedules,
        Self::SwitchAll,
        Self::Configuration,
        Self::Groups,
        Self::Controller,
        Self::Network,
        Self::Scenes,
        Self::Statistics,
    ];

    /// Returns the group's wire name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Polling => "polling",
            Self::NodeInformation => "node-information",
            Self::Values => "values",
            Self::ClimateSchedules => "climate-schedules",
            Self::SwitchAll => "switch-all",
            Self::Configuration => "configuration",
            Self::Groups => "groups",
            Self::Controller => "controller",
            Self::Network => "network",
            Self::Scenes => "scenes",
            Self::Statistics => "statistics",
        }
    }
}

impl fmt::Display for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_name() {
        for group in CommandGroup::ALL {
            assert_eq!(group.to_string(), group.name());
        }
    }

    #[test]
    fn all_groups_are_distinct() {
        use std::collections::HashSet;

        let set: HashSet<_> = CommandGroup::ALL.into_iter().collect();
        assert_eq!(set.len(), CommandGroup::ALL.len());
    }
}
