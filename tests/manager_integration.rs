// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the manager facade against a mock controller
//! stack.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use zwaver_lib::{
    CommandGroup, ContextHandle, ControllerStack, DriverError, DriverHandle, Error,
    ManagerConfig, ManagerContext, ManagerEvent, NotificationHandle, NotificationSink,
    RawNotification, StackError,
};

/// In-memory controller stack double.
///
/// Notifications are raised through whatever sink is currently
/// registered, from whichever thread the test chooses - usually a
/// spawned one, to mirror the real stack's event thread.
#[derive(Default)]
struct MockStack {
    sink: Mutex<Option<Arc<dyn NotificationSink>>>,
    next_handle: AtomicU64,
    fail_attach: Mutex<HashSet<String>>,
    fail_detach: Mutex<HashSet<String>>,
}

impl MockStack {
    fn fail_attach_for(&self, path: &str) {
        self.fail_attach.lock().insert(path.to_owned());
    }

    fn fail_detach_for(&self, path: &str) {
        self.fail_detach.lock().insert(path.to_owned());
    }

    /// Raises one notification through the registered sink, if any.
    fn raise(&self, driver: DriverHandle, handle: u64, payload: &[u8]) {
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            let raw = RawNotification::new(driver, NotificationHandle::new(handle), payload);
            sink.on_notification(&raw);
        }
    }
}

impl ControllerStack for MockStack {
    fn version(&self) -> String {
        "1.6".to_string()
    }

    fn version_long(&self) -> String {
        "1.6.1962-mock".to_string()
    }

    fn attach(&self, controller_path: &str) -> Result<DriverHandle, StackError> {
        if self.fail_attach.lock().contains(controller_path) {
            return Err(StackError::AttachRejected("port busy".to_string()));
        }
        Ok(DriverHandle::new(
            self.next_handle.fetch_add(1, Ordering::SeqCst) + 1,
        ))
    }

    fn detach(&self, controller_path: &str, _handle: DriverHandle) -> Result<(), StackError> {
        if self.fail_detach.lock().contains(controller_path) {
            return Err(StackError::DetachRejected("port gone".to_string()));
        }
        Ok(())
    }

    fn register_sink(&self, sink: Arc<dyn NotificationSink>) {
        *self.sink.lock() = Some(sink);
    }

    fn unregister_sink(&self) {
        *self.sink.lock() = None;
    }

    fn supports(&self, group: CommandGroup) -> bool {
        group == CommandGroup::Configuration
    }

    fn forward(
        &self,
        _handle: DriverHandle,
        _group: CommandGroup,
        payload: &[u8],
    ) -> Result<(), StackError> {
        if payload.is_empty() {
            return Err(StackError::CommandRejected("empty payload".to_string()));
        }
        Ok(())
    }
}

/// Creates a context with an active manager over a fresh mock stack.
fn active_manager() -> (ManagerContext, Arc<MockStack>, Arc<zwaver_lib::Manager>) {
    let context = ManagerContext::new();
    let stack = Arc::new(MockStack::default());
    let manager = context
        .create(Arc::clone(&stack) as Arc<dyn ControllerStack>)
        .unwrap();
    (context, stack, manager)
}

// ============================================================================
// Singleton lifecycle
// ============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn get_before_create_fails_not_initialized() {
        let context = ManagerContext::new();
        assert!(matches!(context.get(), Err(Error::NotInitialized)));
    }

    #[test]
    fn create_twice_returns_the_same_singleton() {
        let (context, _stack, manager) = active_manager();
        let again = context.create(Arc::new(MockStack::default())).unwrap();
        assert!(Arc::ptr_eq(&manager, &again));
    }

    #[test]
    fn destroy_twice_is_a_no_op() {
        let (context, _stack, _manager) = active_manager();
        context.destroy().unwrap();
        context.destroy().unwrap();
        assert!(matches!(context.get(), Err(Error::NotInitialized)));
    }

    #[test]
    fn operations_on_a_retained_handle_fail_after_destroy() {
        let (context, _stack, manager) = active_manager();
        context.destroy().unwrap();

        assert!(matches!(
            manager.add_driver("/dev/ttyUSB0"),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(
            manager.add_watcher(ContextHandle::new(1), |_e, _c| {}),
            Err(Error::NotInitialized)
        ));
    }

    #[test]
    fn version_accessors_always_succeed() {
        let (_context, _stack, manager) = active_manager();
        assert_eq!(manager.version(), "1.6");
        assert_eq!(manager.version_long(), "1.6.1962-mock");
    }

    #[test]
    fn destroy_detaches_remaining_drivers() {
        let (context, _stack, manager) = active_manager();
        manager.add_driver("/dev/ttyUSB0").unwrap();
        manager.add_driver("/dev/ttyUSB1").unwrap();

        context.destroy().unwrap();
        assert_eq!(manager.driver_count(), 0);
        assert_eq!(manager.watcher_count(), 0);
    }
}

// ============================================================================
// Driver table (scenario A and friends)
// ============================================================================

mod drivers {
    use super::*;

    #[test]
    fn add_remove_add_remove_round_trip() {
        let (_context, _stack, manager) = active_manager();

        assert!(manager.add_driver("/dev/ttyUSB0").is_ok());
        assert!(matches!(
            manager.add_driver("/dev/ttyUSB0"),
            Err(Error::Driver(DriverError::DuplicatePath { .. }))
        ));
        assert!(manager.remove_driver("/dev/ttyUSB0").is_ok());
        assert!(matches!(
            manager.remove_driver("/dev/ttyUSB0"),
            Err(Error::Driver(DriverError::UnknownPath { .. }))
        ));
    }

    #[test]
    fn attach_failure_leaves_the_table_unchanged() {
        let (_context, stack, manager) = active_manager();
        stack.fail_attach_for("/dev/ttyACM0");

        assert!(matches!(
            manager.add_driver("/dev/ttyACM0"),
            Err(Error::Driver(DriverError::AttachFailed { .. }))
        ));
        assert_eq!(manager.driver_count(), 0);

        // A later attach on the same path is free to succeed.
        stack.fail_attach.lock().clear();
        assert!(manager.add_driver("/dev/ttyACM0").is_ok());
    }

    #[test]
    fn detach_failure_is_soft() {
        let (_context, stack, manager) = active_manager();
        stack.fail_detach_for("/dev/ttyUSB0");
        manager.add_driver("/dev/ttyUSB0").unwrap();

        // The failure does not surface as an error, and the entry is
        // gone.
        manager.remove_driver("/dev/ttyUSB0").unwrap();
        assert_eq!(manager.driver_count(), 0);
    }

    #[test]
    fn distinct_paths_get_distinct_handles() {
        let (_context, _stack, manager) = active_manager();
        let a = manager.add_driver("/dev/ttyUSB0").unwrap();
        let b = manager.add_driver("/dev/ttyUSB1").unwrap();
        assert_ne!(a, b);

        let mut paths = manager.driver_paths();
        paths.sort();
        assert_eq!(paths, vec!["/dev/ttyUSB0", "/dev/ttyUSB1"]);
    }
}

// ============================================================================
// Watcher registration and fan-out (scenario B and friends)
// ============================================================================

mod watchers {
    use super::*;

    #[test]
    fn fan_out_follows_registration_order_and_removal() {
        let (_context, stack, manager) = active_manager();
        let driver = manager.add_driver("/dev/ttyUSB0").unwrap();

        let order = Arc::new(Mutex::new(Vec::new()));
        for id in [1u64, 2] {
            let order = Arc::clone(&order);
            manager
                .add_watcher(ContextHandle::new(id), move |_envelope, ctx| {
                    order.lock().push(ctx.value());
                })
                .unwrap();
        }

        stack.raise(driver, 1, b"");
        assert_eq!(*order.lock(), vec![1, 2]);

        manager.remove_watcher(ContextHandle::new(1)).unwrap();
        stack.raise(driver, 2, b"");
        assert_eq!(*order.lock(), vec![1, 2, 2]);
    }

    #[test]
    fn remove_without_registration_fails() {
        let (_context, _stack, manager) = active_manager();
        assert!(matches!(
            manager.remove_watcher(ContextHandle::new(9)),
            Err(Error::WatcherNotFound)
        ));
    }

    #[test]
    fn duplicate_registrations_are_independent() {
        let (_context, stack, manager) = active_manager();
        let driver = manager.add_driver("/dev/ttyUSB0").unwrap();

        let counter = Arc::new(AtomicU32::new(0));
        for _ in 0..3 {
            let counter = Arc::clone(&counter);
            manager
                .add_watcher(ContextHandle::new(7), move |_e, _c| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }
        assert_eq!(manager.watcher_count(), 3);

        stack.raise(driver, 1, b"");
        assert_eq!(counter.load(Ordering::SeqCst), 3);

        // One removal per registration, oldest first; the fourth fails.
        for _ in 0..3 {
            manager.remove_watcher(ContextHandle::new(7)).unwrap();
        }
        assert!(matches!(
            manager.remove_watcher(ContextHandle::new(7)),
            Err(Error::WatcherNotFound)
        ));
    }

    #[test]
    fn watcher_sees_envelope_fields_and_copies_payload() {
        let (_context, stack, manager) = active_manager();
        let driver = manager.add_driver("/dev/ttyUSB0").unwrap();

        let copied = Arc::new(Mutex::new(None));
        let copied_clone = Arc::clone(&copied);
        manager
            .add_watcher(ContextHandle::new(1), move |envelope, _ctx| {
                *copied_clone.lock() = Some(envelope.to_event());
            })
            .unwrap();

        stack.raise(driver, 42, &[0xDE, 0xAD]);

        let event = copied.lock().take().unwrap();
        assert_eq!(event.driver, driver);
        assert_eq!(event.handle, NotificationHandle::new(42));
        assert_eq!(event.payload, vec![0xDE, 0xAD]);
    }

    #[test]
    fn watcher_may_call_back_into_the_manager() {
        let (_context, stack, manager) = active_manager();
        let driver = manager.add_driver("/dev/ttyUSB0").unwrap();

        let invoked = Arc::new(AtomicU32::new(0));
        {
            let manager = Arc::clone(&manager);
            let invoked = Arc::clone(&invoked);
            manager
                .clone()
                .add_watcher(ContextHandle::new(1), move |_e, _c| {
                    invoked.fetch_add(1, Ordering::SeqCst);
                    // Reentrant registration from inside a callback.
                    let counter = Arc::clone(&invoked);
                    manager
                        .add_watcher(ContextHandle::new(2), move |_e, _c| {
                            counter.fetch_add(10, Ordering::SeqCst);
                        })
                        .unwrap();
                })
                .unwrap();
        }

        // The watcher added mid-dispatch only joins the next snapshot.
        stack.raise(driver, 1, b"");
        assert_eq!(invoked.load(Ordering::SeqCst), 1);

        stack.raise(driver, 2, b"");
        assert_eq!(invoked.load(Ordering::SeqCst), 12);
    }

    #[test]
    fn panicking_watcher_does_not_block_the_rest() {
        let (_context, stack, manager) = active_manager();
        let driver = manager.add_driver("/dev/ttyUSB0").unwrap();

        manager
            .add_watcher(ContextHandle::new(1), |_e, _c| panic!("boom"))
            .unwrap();
        let reached = Arc::new(AtomicBool::new(false));
        let reached_clone = Arc::clone(&reached);
        manager
            .add_watcher(ContextHandle::new(2), move |_e, _c| {
                reached_clone.store(true, Ordering::SeqCst);
            })
            .unwrap();

        stack.raise(driver, 1, b"");
        assert!(reached.load(Ordering::SeqCst));
    }
}

// ============================================================================
// Per-driver delivery ordering
// ============================================================================

mod ordering {
    use super::*;

    #[test]
    fn notifications_for_one_driver_arrive_in_raise_order() {
        let (_context, stack, manager) = active_manager();
        let driver = manager.add_driver("/dev/ttyUSB0").unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        manager
            .add_watcher(ContextHandle::new(1), move |envelope, _ctx| {
                seen_clone.lock().push(envelope.handle().value());
            })
            .unwrap();

        let raiser = {
            let stack = Arc::clone(&stack);
            thread::spawn(move || {
                for handle in 1..=20 {
                    stack.raise(driver, handle, b"");
                }
            })
        };
        raiser.join().unwrap();

        assert_eq!(*seen.lock(), (1..=20).collect::<Vec<u64>>());
    }
}

// ============================================================================
// Teardown (scenario C and friends)
// ============================================================================

mod teardown {
    use super::*;

    #[test]
    fn in_flight_dispatch_completes_before_destroy_returns() {
        let (context, stack, manager) = active_manager();
        let driver = manager.add_driver("/dev/ttyUSB0").unwrap();

        let entry = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));
        let invoked = Arc::new(AtomicU32::new(0));
        {
            let entry = Arc::clone(&entry);
            let release = Arc::clone(&release);
            let invoked = Arc::clone(&invoked);
            manager
                .add_watcher(ContextHandle::new(1), move |_e, _c| {
                    invoked.fetch_add(1, Ordering::SeqCst);
                    entry.wait();
                    release.wait();
                })
                .unwrap();
        }

        // The dispatch runs on its own thread, as the real stack would.
        let raiser = {
            let stack = Arc::clone(&stack);
            thread::spawn(move || stack.raise(driver, 1, b""))
        };
        entry.wait();

        // Let the watcher go shortly after destroy starts draining.
        let releaser = {
            let release = Arc::clone(&release);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(100));
                release.wait();
            })
        };

        // Destroy must block until the in-flight dispatch finishes.
        context.destroy().unwrap();
        assert_eq!(invoked.load(Ordering::SeqCst), 1);

        raiser.join().unwrap();
        releaser.join().unwrap();

        // Nothing is invoked after destroy has returned.
        stack.raise(driver, 2, b"");
        assert_eq!(invoked.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stuck_dispatch_times_out_and_teardown_proceeds() {
        let context = ManagerContext::new();
        let stack = Arc::new(MockStack::default());
        let manager = context
            .create_with_config(
                Arc::clone(&stack) as Arc<dyn ControllerStack>,
                ManagerConfig::default().with_drain_timeout(Duration::from_millis(100)),
            )
            .unwrap();
        let driver = manager.add_driver("/dev/ttyUSB0").unwrap();

        let entered = Arc::new(AtomicBool::new(false));
        let release = Arc::new(Barrier::new(2));
        {
            let entered = Arc::clone(&entered);
            let release = Arc::clone(&release);
            manager
                .add_watcher(ContextHandle::new(1), move |_e, _c| {
                    entered.store(true, Ordering::SeqCst);
                    release.wait();
                })
                .unwrap();
        }

        let raiser = {
            let stack = Arc::clone(&stack);
            thread::spawn(move || stack.raise(driver, 1, b""))
        };
        while !entered.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(1));
        }

        // The watcher never returns within the drain timeout: teardown
        // force-proceeds and reports the stall.
        assert!(matches!(context.destroy(), Err(Error::DrainTimeout)));
        assert!(matches!(context.get(), Err(Error::NotInitialized)));

        // A later destroy is still a clean no-op.
        context.destroy().unwrap();

        release.wait();
        raiser.join().unwrap();
    }

    #[test]
    fn notifications_after_destroy_are_dropped() {
        let (context, stack, manager) = active_manager();
        let driver = manager.add_driver("/dev/ttyUSB0").unwrap();

        let invoked = Arc::new(AtomicU32::new(0));
        let invoked_clone = Arc::clone(&invoked);
        manager
            .add_watcher(ContextHandle::new(1), move |_e, _c| {
                invoked_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        context.destroy().unwrap();
        stack.raise(driver, 1, b"");
        assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }
}

// ============================================================================
// Event stream
// ============================================================================

mod event_stream {
    use super::*;

    #[tokio::test]
    async fn stream_mirrors_driver_lifecycle_and_notifications() {
        let (_context, stack, manager) = active_manager();
        let mut events = manager.subscribe();

        let driver = manager.add_driver("/dev/ttyUSB0").unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            ManagerEvent::driver_added("/dev/ttyUSB0", driver)
        );

        stack.raise(driver, 5, &[0x01]);
        match events.recv().await.unwrap() {
            ManagerEvent::Notification(event) => {
                assert_eq!(event.driver, driver);
                assert_eq!(event.handle, NotificationHandle::new(5));
                assert_eq!(event.payload, vec![0x01]);
            }
            other => panic!("unexpected event: {other:?}"),
        }

        manager.remove_driver("/dev/ttyUSB0").unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            ManagerEvent::driver_removed("/dev/ttyUSB0", None)
        );
    }

    #[tokio::test]
    async fn detach_failure_is_carried_on_the_stream() {
        let (_context, stack, manager) = active_manager();
        stack.fail_detach_for("/dev/ttyUSB0");
        manager.add_driver("/dev/ttyUSB0").unwrap();

        let mut events = manager.subscribe();
        manager.remove_driver("/dev/ttyUSB0").unwrap();

        match events.recv().await.unwrap() {
            ManagerEvent::DriverRemoved { path, detach_error } => {
                assert_eq!(path, "/dev/ttyUSB0");
                assert!(detach_error.unwrap().contains("port gone"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn subscriber_count_is_visible() {
        let (_context, _stack, manager) = active_manager();
        assert_eq!(manager.subscriber_count(), 0);
        let rx = manager.subscribe();
        assert_eq!(manager.subscriber_count(), 1);
        drop(rx);
    }
}

// ============================================================================
// Pass-through commands
// ============================================================================

mod passthrough {
    use super::*;

    #[test]
    fn supported_group_is_forwarded() {
        let (_context, _stack, manager) = active_manager();
        manager.add_driver("/dev/ttyUSB0").unwrap();

        manager
            .forward("/dev/ttyUSB0", CommandGroup::Configuration, &[0x70, 0x04])
            .unwrap();
    }

    #[test]
    fn unsupported_group_is_rejected_up_front() {
        let (_context, _stack, manager) = active_manager();
        manager.add_driver("/dev/ttyUSB0").unwrap();

        assert!(matches!(
            manager.forward("/dev/ttyUSB0", CommandGroup::Scenes, &[0x2D]),
            Err(Error::UnsupportedCommand {
                group: CommandGroup::Scenes
            })
        ));
    }

    #[test]
    fn unknown_path_is_rejected() {
        let (_context, _stack, manager) = active_manager();

        assert!(matches!(
            manager.forward("/dev/ttyUSB0", CommandGroup::Configuration, &[0x70]),
            Err(Error::Driver(DriverError::UnknownPath { .. }))
        ));
    }

    #[test]
    fn stack_rejection_surfaces_as_command_failed() {
        let (_context, _stack, manager) = active_manager();
        manager.add_driver("/dev/ttyUSB0").unwrap();

        assert!(matches!(
            manager.forward("/dev/ttyUSB0", CommandGroup::Configuration, b""),
            Err(Error::CommandFailed { .. })
        ));
    }
}
