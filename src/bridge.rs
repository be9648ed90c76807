// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The thread-boundary adapter between the controller stack and the
//! watcher set.
//!
//! The controller stack raises events on its own thread(s) and knows
//! nothing about the manager's lifecycle. The [`CallbackBridge`] is the
//! single [`NotificationSink`] handed to the stack; for each raw event
//! it re-establishes the managed side's guarantees before any watcher
//! runs:
//!
//! - the manager must still be alive (a `Weak` upgrade) and not
//!   draining (a [`DispatchGate`] permit) - otherwise the event is
//!   dropped, never raced against teardown;
//! - delivery is serialized per driver, so a stack that raises from
//!   multiple threads still cannot re-enter the watcher set for the
//!   same driver;
//! - the envelope lent to watchers cannot outlive the raw event.

use std::sync::Weak;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::manager::Manager;
use crate::notification::RawNotification;
use crate::stack::NotificationSink;

/// The sink registered with the controller stack.
///
/// Holds only a weak reference to the manager: once teardown has
/// released the singleton, a late event finds nothing to upgrade and is
/// dropped on the stack's thread without touching freed state.
pub(crate) struct CallbackBridge {
    manager: Weak<Manager>,
}

impl CallbackBridge {
    pub(crate) fn new(manager: Weak<Manager>) -> Self {
        Self { manager }
    }
}

impl NotificationSink for CallbackBridge {
    fn on_notification(&self, raw: &RawNotification) {
        let Some(manager) = self.manager.upgrade() else {
            tracing::debug!(driver = %raw.driver(), "notification after teardown; dropped");
            return;
        };
        manager.deliver(raw);
    }
}

/// Counter state behind the gate's mutex.
struct GateState {
    in_flight: usize,
    draining: bool,
}

/// Tracks in-flight dispatches and coordinates teardown draining.
///
/// The dispatch path is a two-state machine per event: a permit is
/// taken while watchers run and returned when the pass completes.
/// Teardown flips `draining` (after which no new permit is issued) and
/// waits, boundedly, for the in-flight count to reach zero.
pub(crate) struct DispatchGate {
    state: Mutex<GateState>,
    drained: Condvar,
}

impl DispatchGate {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                in_flight: 0,
                draining: false,
            }),
            drained: Condvar::new(),
        }
    }

    /// Takes a dispatch permit, or `None` once draining has started.
    pub(crate) fn begin(&self) -> Option<DispatchPermit<'_>> {
        let mut state = self.state.lock();
        if state.draining {
            return None;
        }
        state.in_flight += 1;
        Some(DispatchPermit { gate: self })
    }

    /// Starts draining and waits for in-flight dispatches to finish.
    ///
    /// Returns `false` if the wait timed out with a dispatch still in
    /// flight; the caller decides how loudly to fail.
    pub(crate) fn drain(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        state.draining = true;
        while state.in_flight > 0 {
            if self.drained.wait_until(&mut state, deadline).timed_out() {
                return state.in_flight == 0;
            }
        }
        true
    }

    #[cfg(test)]
    fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }
}

impl std::fmt::Debug for DispatchGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DispatchGate")
            .field("in_flight", &state.in_flight)
            .field("draining", &state.draining)
            .finish()
    }
}

/// RAII permit for one dispatch pass.
pub(crate) struct DispatchPermit<'a> {
    gate: &'a DispatchGate,
}

impl Drop for DispatchPermit<'_> {
    fn drop(&mut self) {
        let mut state = self.gate.state.lock();
        state.in_flight -= 1;
        if state.in_flight == 0 {
            self.gate.drained.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn permit_round_trip() {
        let gate = DispatchGate::new();
        assert_eq!(gate.in_flight(), 0);

        let permit = gate.begin().unwrap();
        assert_eq!(gate.in_flight(), 1);

        drop(permit);
        assert_eq!(gate.in_flight(), 0);
    }

    #[test]
    fn overlapping_permits_are_counted() {
        let gate = DispatchGate::new();
        let first = gate.begin().unwrap();
        let second = gate.begin().unwrap();
        assert_eq!(gate.in_flight(), 2);
        drop(first);
        assert_eq!(gate.in_flight(), 1);
        drop(second);
        assert_eq!(gate.in_flight(), 0);
    }

    #[test]
    fn drain_with_nothing_in_flight_returns_immediately() {
        let gate = DispatchGate::new();
        assert!(gate.drain(Duration::from_millis(10)));
    }

    #[test]
    fn no_permits_after_drain() {
        let gate = DispatchGate::new();
        assert!(gate.drain(Duration::from_millis(10)));
        assert!(gate.begin().is_none());
    }

    #[test]
    fn drain_waits_for_in_flight_dispatch() {
        let gate = Arc::new(DispatchGate::new());
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let worker = {
            let gate = gate.clone();
            thread::spawn(move || {
                let permit = gate.begin().unwrap();
                entered_tx.send(()).unwrap();
                release_rx.recv().unwrap();
                drop(permit);
            })
        };

        entered_rx.recv().unwrap();

        let drainer = {
            let gate = gate.clone();
            thread::spawn(move || gate.drain(Duration::from_secs(5)))
        };

        // The drainer cannot finish while the permit is held.
        thread::sleep(Duration::from_millis(50));
        assert!(!drainer.is_finished());

        release_tx.send(()).unwrap();
        assert!(drainer.join().unwrap());
        worker.join().unwrap();
    }

    #[test]
    fn drain_times_out_on_a_stuck_dispatch() {
        let gate = Arc::new(DispatchGate::new());
        let permit = gate.begin().unwrap();

        assert!(!gate.drain(Duration::from_millis(50)));
        drop(permit);
    }
}
