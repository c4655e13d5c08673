// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the serialized event queue and the shared controller

mod common;

use camera_shell::{
    AppError, ControllerPhase, EventQueue, LifecycleController, PermissionState,
    SharedController, SurfaceHandle,
};
use common::{Call, RecordingBridge};
use std::thread;

#[test]
fn test_surface_destroyed_returns_after_pipeline_stopped() {
    let bridge = RecordingBridge::new();
    let queue = EventQueue::spawn(LifecycleController::new(bridge.clone())).unwrap();
    let events = queue.sender();
    let s1 = SurfaceHandle::new(0x1000);

    events.surface_available(s1.clone()).unwrap();
    events.permission_result(PermissionState::Granted).unwrap();
    events.surface_destroyed(s1.clone()).unwrap();

    // Acknowledged, so the destroy must already be visible
    assert_eq!(
        bridge.calls(),
        vec![Call::Create(s1.id()), Call::Destroy(s1.id())]
    );
    assert!(!s1.is_valid());

    let controller = queue.shutdown().unwrap();
    assert_eq!(controller.phase(), ControllerPhase::Idle);
}

#[test]
fn test_events_from_two_threads_are_serialized() {
    for _ in 0..50 {
        let bridge = RecordingBridge::new();
        let queue = EventQueue::spawn(LifecycleController::new(bridge.clone())).unwrap();
        let surface = SurfaceHandle::new(0x1000);

        let ui = {
            let events = queue.sender();
            let surface = surface.clone();
            thread::spawn(move || events.surface_available(surface).unwrap())
        };
        let permission = {
            let events = queue.sender();
            thread::spawn(move || events.permission_result(PermissionState::Granted).unwrap())
        };
        ui.join().unwrap();
        permission.join().unwrap();

        queue.sender().surface_destroyed(surface.clone()).unwrap();

        // Whatever the arrival order, exactly one start and one stop
        assert_eq!(
            bridge.calls(),
            vec![Call::Create(surface.id()), Call::Destroy(surface.id())]
        );
        assert!(bridge.violations().is_empty(), "{:?}", bridge.violations());
        queue.shutdown().unwrap();
    }
}

#[test]
fn test_posting_after_shutdown_fails() {
    let bridge = RecordingBridge::new();
    let queue = EventQueue::spawn(LifecycleController::new(bridge)).unwrap();
    let events = queue.sender();

    queue.shutdown().unwrap();

    assert!(matches!(
        events.permission_result(PermissionState::Granted),
        Err(AppError::Queue(_))
    ));
    assert!(matches!(
        events.surface_destroyed(SurfaceHandle::new(0x1000)),
        Err(AppError::Queue(_))
    ));
}

#[test]
fn test_dropping_queue_stops_live_pipeline() {
    let bridge = RecordingBridge::new();
    {
        let queue = EventQueue::spawn(LifecycleController::new(bridge.clone())).unwrap();
        let events = queue.sender();
        events.permission_result(PermissionState::Granted).unwrap();
        events.surface_available(SurfaceHandle::new(0x1000)).unwrap();
    }
    assert_eq!(bridge.creates(), 1);
    assert_eq!(bridge.live(), 0);
}

#[test]
fn test_shared_controller_serializes_threads() {
    let bridge = RecordingBridge::new();
    let shared = SharedController::new(LifecycleController::new(bridge.clone()));
    let surface = SurfaceHandle::new(0x1000);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let shared = shared.clone();
            let surface = surface.clone();
            thread::spawn(move || {
                if i % 2 == 0 {
                    shared.on_surface_available(surface);
                } else {
                    shared.on_permission_result(PermissionState::Granted);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(shared.is_running());
    assert_eq!(bridge.creates(), 1);

    shared.on_surface_destroyed(&surface);
    assert_eq!(shared.phase(), ControllerPhase::Idle);
    assert_eq!(bridge.live(), 0);
}
