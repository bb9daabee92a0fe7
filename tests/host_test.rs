// Engine host lifecycle tests
// Run with: cargo test --test host_test

mod common;

use std::{sync::Arc, time::Duration};

use common::{launch, test_data_dir, updates_until_inactive, NotifierCall, RecordingLock};
use sleep_timer::{
    services::{DurationStore, NotificationAction},
    state::{CommandOutcome, Phase, TimerState, ViewState, ViewStateAdapter},
    tasks::view_state_sync_task,
};
use tokio::{
    sync::watch,
    time::{sleep, Instant},
};

#[tokio::test(start_paused = true)]
async fn finished_countdown_locks_once_and_persists_duration() {
    let dir = test_data_dir();
    let test = launch(DurationStore::open(&dir), RecordingLock::authorized());
    let mut updates = test.host.subscribe();
    let started = Instant::now();

    assert_eq!(test.host.start(5_000).await, CommandOutcome::Applied);
    let seen = updates_until_inactive(&mut updates).await;
    assert!(started.elapsed() >= Duration::from_millis(5_000));

    let n = seen.len();
    assert_eq!(seen[0], TimerState::active(5_000));
    assert_eq!(seen[n - 2], TimerState::active(0));
    assert_eq!(seen[n - 1], TimerState::inactive());
    assert!(seen[..n - 1]
        .windows(2)
        .all(|pair| pair[0].remaining_millis > pair[1].remaining_millis));

    test.host.shutdown().await;
    assert_eq!(test.lock.lock_count(), 1);
    assert_eq!(test.host.current_notification(), None);
    assert!(!test.host.is_keep_alive());

    // The duration outlives the process
    assert_eq!(DurationStore::open(&dir).get(), 5_000);
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test(start_paused = true)]
async fn unauthorized_lock_is_skipped_but_countdown_completes() {
    let test = launch(DurationStore::open_in_memory(), RecordingLock::unauthorized());
    let mut updates = test.host.subscribe();

    test.host.start(1_000).await;
    let seen = updates_until_inactive(&mut updates).await;
    assert_eq!(seen.last(), Some(&TimerState::inactive()));

    test.host.shutdown().await;
    assert_eq!(test.lock.lock_count(), 0);
    assert_eq!(test.notifier.calls().last(), Some(&NotifierCall::Cancel));
    assert_eq!(test.host.latest(), TimerState::inactive());
}

#[tokio::test(start_paused = true)]
async fn stop_broadcasts_inactive_without_locking() {
    let test = launch(DurationStore::open_in_memory(), RecordingLock::authorized());
    let mut updates = test.host.subscribe();

    test.host.start(60_000).await;
    // First update means the host has entered keep-alive mode
    assert_eq!(updates.recv().await.unwrap(), TimerState::active(60_000));
    assert!(test.host.is_keep_alive());
    assert_eq!(
        test.host.current_notification().map(|n| n.text),
        Some("00:01:00".to_string())
    );

    sleep(Duration::from_millis(500)).await;
    assert_eq!(test.host.stop().await, CommandOutcome::Applied);
    let seen = updates_until_inactive(&mut updates).await;
    assert_eq!(seen.last(), Some(&TimerState::inactive()));

    // Nothing else follows the inactive update
    sleep(Duration::from_secs(120)).await;
    assert!(updates.try_recv().is_err());

    assert_eq!(test.host.snapshot().await.phase, Phase::Idle);
    assert!(!test.host.is_keep_alive());
    assert_eq!(test.host.current_notification(), None);
    assert_eq!(test.lock.lock_count(), 0);
    assert_eq!(test.host.stop().await, CommandOutcome::Ignored);
}

#[tokio::test(start_paused = true)]
async fn extend_does_not_rewrite_persisted_duration() {
    let test = launch(DurationStore::open_in_memory(), RecordingLock::authorized());
    let mut updates = test.host.subscribe();

    test.host.start(5_000).await;
    updates.recv().await.unwrap();
    assert_eq!(test.host.extend(5_000).await, CommandOutcome::Applied);
    assert_eq!(
        test.host.handle_action(NotificationAction::Extend).await,
        CommandOutcome::Applied
    );

    let snapshot = test.host.snapshot().await;
    assert_eq!(snapshot.total_duration_millis, 15_000);
    assert_eq!(snapshot.remaining_millis, 15_000);

    let started = Instant::now();
    updates_until_inactive(&mut updates).await;
    assert!(started.elapsed() >= Duration::from_millis(15_000));

    test.host.shutdown().await;
    assert_eq!(test.store.get(), 5_000);
    assert_eq!(test.lock.lock_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn restart_replaces_countdown_and_locks_once() {
    let test = launch(DurationStore::open_in_memory(), RecordingLock::authorized());
    let mut updates = test.host.subscribe();

    test.host.start(10_000).await;
    sleep(Duration::from_millis(2_000)).await;
    test.host.start(1_000).await;
    let restarted = Instant::now();

    let seen = updates_until_inactive(&mut updates).await;
    // Only one inactive update: the replaced session never stopped or finished
    assert_eq!(seen.iter().filter(|update| !update.is_active()).count(), 1);
    assert!(restarted.elapsed() >= Duration::from_millis(1_000));
    assert!(restarted.elapsed() < Duration::from_millis(2_000));

    // Once the new session has reported, nothing from the old one follows
    let boundary = seen
        .iter()
        .position(|update| *update == TimerState::active(1_000))
        .expect("restart reported");
    assert!(seen[boundary..]
        .iter()
        .all(|update| update.remaining_millis <= 1_000));

    test.host.shutdown().await;
    assert_eq!(test.lock.lock_count(), 1);
    assert_eq!(test.store.get(), 1_000);
}

#[tokio::test(start_paused = true)]
async fn start_last_resumes_persisted_duration() {
    let store = DurationStore::open_in_memory();
    store.set(2_000);
    let test = launch(store, RecordingLock::unauthorized());

    assert_eq!(test.host.start_last().await, CommandOutcome::Applied);
    assert_eq!(test.host.snapshot().await.total_duration_millis, 2_000);
    test.host.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn invalid_start_is_ignored_and_not_persisted() {
    let store = DurationStore::open_in_memory();
    store.set(3_000);
    let test = launch(store, RecordingLock::authorized());

    assert_eq!(test.host.start(0).await, CommandOutcome::Ignored);
    assert_eq!(test.host.extend(1_000).await, CommandOutcome::Ignored);
    assert_eq!(
        test.host.handle_action(NotificationAction::Stop).await,
        CommandOutcome::Ignored
    );

    test.host.shutdown().await;
    assert_eq!(test.store.get(), 3_000);
    assert!(test.notifier.calls().iter().all(|call| *call == NotifierCall::Cancel));
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_running_countdown() {
    let test = launch(DurationStore::open_in_memory(), RecordingLock::authorized());
    let mut updates = test.host.subscribe();

    test.host.start(60_000).await;
    updates.recv().await.unwrap();
    test.host.shutdown().await;

    assert_eq!(test.host.latest(), TimerState::inactive());
    assert_eq!(test.host.current_notification(), None);
    assert!(!test.host.is_keep_alive());
    assert_eq!(test.lock.lock_count(), 0);
    assert!(test.notifier.calls().contains(&NotifierCall::Show("00:01:00".to_string())));

    // The host no longer accepts work
    assert_eq!(test.host.start(1_000).await, CommandOutcome::Ignored);
}

#[tokio::test(start_paused = true)]
async fn view_state_follows_countdown() {
    let store = DurationStore::open_in_memory();
    store.set(60_000);
    let test = launch(store, RecordingLock::authorized());

    let adapter = ViewStateAdapter::new(Arc::clone(&test.store), test.lock.clone());
    let (view_tx, view_rx) = watch::channel(ViewState::default());
    tokio::spawn(view_state_sync_task(adapter, test.host.subscribe(), view_tx));
    sleep(Duration::from_millis(10)).await;
    assert_eq!(view_rx.borrow().display_time, "00:01:00");

    test.host.start(3_661_000).await;
    sleep(Duration::from_millis(1_000)).await;
    {
        let view = view_rx.borrow();
        assert!(view.is_countdown_active);
        assert_eq!(view.display_time, "01:01:00");
    }

    test.host.stop().await;
    sleep(Duration::from_millis(10)).await;
    let view = view_rx.borrow().clone();
    assert!(!view.is_countdown_active);
    assert!(view.is_lock_authorized);
    assert_eq!(view.display_time, "01:01:01");
    assert_eq!((view.selected_hour, view.selected_minute), (1, 1));
    assert_eq!(view.last_duration_millis, 3_661_000);

    test.host.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn simultaneous_notification_and_client_commands() {
    let test = launch(DurationStore::open_in_memory(), RecordingLock::authorized());
    let mut updates = test.host.subscribe();
    test.host.start(60_000).await;

    let mut callers = Vec::new();
    for _ in 0..2 {
        let host = Arc::clone(&test.host);
        callers.push(tokio::spawn(async move {
            host.handle_action(NotificationAction::Extend).await;
        }));
    }
    let host = Arc::clone(&test.host);
    callers.push(tokio::spawn(async move {
        host.stop().await;
    }));
    let host = Arc::clone(&test.host);
    callers.push(tokio::spawn(async move {
        let snapshot = host.snapshot().await;
        assert!(snapshot.remaining_millis <= snapshot.total_duration_millis);
    }));
    for caller in callers {
        caller.await.unwrap();
    }

    let seen = updates_until_inactive(&mut updates).await;
    assert_eq!(seen.iter().filter(|update| !update.is_active()).count(), 1);
    assert!(seen.iter().all(|update| update.remaining_millis <= 70_000));

    // No tick follows the inactive update
    sleep(Duration::from_secs(120)).await;
    assert!(updates.try_recv().is_err());

    assert_eq!(test.host.snapshot().await.phase, Phase::Idle);
    assert!(!test.host.is_keep_alive());
    assert_eq!(test.host.current_notification(), None);
    assert_eq!(test.lock.lock_count(), 0);
    test.host.shutdown().await;
}
