use crate::{
    LinkError,
    link::{
        CommandOutcome, LinkMonitor, LinkState, PeripheralIds, PeripheralRef, TickAction,
    },
    tests::fakes::FakeTransport,
};

use std::{sync::Arc, time::Duration};

use tokio::{
    runtime::Handle,
    sync::{Notify, watch},
};

const TRIGGER: &str = "AA:BB:CC:DD:EE:FF";

fn monitor(transport: Arc<FakeTransport>, saved: Option<&str>) -> LinkMonitor {
    LinkMonitor::new(
        transport,
        PeripheralIds::default(),
        saved.map(str::to_string),
        Handle::current(),
    )
    .with_scan_timeout(Duration::from_millis(10))
}

async fn connected_monitor(transport: Arc<FakeTransport>) -> LinkMonitor {
    let monitor = monitor(transport, Some(TRIGGER));
    match monitor.tick().await {
        TickAction::ConnectIssued(handle) => handle.await.unwrap(),
        other => panic!("unexpected tick: {other:?}"),
    }
    monitor
}

/// WHAT: Commands without a remembered peripheral are dropped silently
/// WHY: The booth must keep working when the trigger is absent
#[tokio::test]
async fn given_no_peripheral_when_sending_command_then_not_connected_and_nothing_written() {
    // Given: A monitor that never found anything
    let transport = Arc::new(FakeTransport::default());
    let monitor = monitor(Arc::clone(&transport), None);

    // When: Sending the arm command
    let outcome = monitor.send_command("1").await.unwrap();

    // Then: NotConnected, no write
    assert_eq!(outcome, CommandOutcome::NotConnected);
    assert!(transport.log.lock().unwrap().writes.is_empty());
}

/// WHAT: Non-ASCII commands are rejected and never written
/// WHY: The peripheral only understands raw ASCII bytes
#[tokio::test]
async fn given_connected_peripheral_when_sending_non_ascii_then_error_and_nothing_written() {
    let transport = Arc::new(FakeTransport::with_visible(TRIGGER));
    let monitor = connected_monitor(Arc::clone(&transport)).await;

    let result = monitor.send_command("é").await;

    assert!(matches!(result, Err(LinkError::NonAsciiCommand { .. })));
    assert!(transport.log.lock().unwrap().writes.is_empty());
}

/// WHAT: With nothing remembered and nothing saved, a tick does nothing
/// WHY: No scan should run until a peripheral was chosen in settings
#[tokio::test]
async fn given_no_saved_identifier_when_ticking_then_idle_without_scan() {
    let transport = Arc::new(FakeTransport::with_visible(TRIGGER));
    let monitor = monitor(Arc::clone(&transport), None);

    let action = monitor.tick().await;

    assert!(matches!(action, TickAction::Idle));
    assert_eq!(transport.log.lock().unwrap().scans, 0);
}

/// WHAT: A saved peripheral is discovered, remembered and connected
/// WHY: The trigger reconnects automatically after an app restart
#[tokio::test]
async fn given_saved_identifier_when_peripheral_visible_then_remembered_and_connected() {
    // Given: A saved identifier that is advertising
    let transport = Arc::new(FakeTransport::with_visible(TRIGGER));

    // When: Ticking and letting the connect finish
    let monitor = connected_monitor(Arc::clone(&transport)).await;

    // Then: Remembered as connected, and commands are written as ASCII
    assert_eq!(
        monitor.remembered().await,
        Some(PeripheralRef {
            identifier: TRIGGER.to_string(),
            state: LinkState::Connected,
        })
    );
    assert_eq!(monitor.send_command("1").await.unwrap(), CommandOutcome::Sent);
    assert_eq!(
        transport.log.lock().unwrap().writes,
        vec![(TRIGGER.to_string(), b"1".to_vec())]
    );
}

/// WHAT: A saved peripheral that is not advertising is reported as not found
/// WHY: Scans are bounded and retried on the next tick
#[tokio::test]
async fn given_saved_identifier_when_peripheral_absent_then_not_found() {
    let transport = Arc::new(FakeTransport::default());
    let monitor = monitor(Arc::clone(&transport), Some(TRIGGER));

    let action = monitor.tick().await;

    assert!(matches!(action, TickAction::NotFound));
    assert!(monitor.remembered().await.is_none());
    assert_eq!(transport.log.lock().unwrap().connects, 0);
}

/// WHAT: A tick while a connect is in flight does not issue another
/// WHY: Overlapping connects confuse the Bluetooth stack
#[tokio::test]
async fn given_connect_in_flight_when_ticking_then_connect_pending() {
    // Given: A connect that blocks until released
    let gate = Arc::new(Notify::new());
    let transport = Arc::new(FakeTransport {
        visible: vec![TRIGGER.to_string()],
        connect_gate: Some(Arc::clone(&gate)),
        ..FakeTransport::default()
    });
    let monitor = monitor(Arc::clone(&transport), Some(TRIGGER));
    let TickAction::ConnectIssued(pending) = monitor.tick().await else {
        panic!("first tick should issue a connect");
    };

    // When: Ticking again before it completes
    let action = monitor.tick().await;

    // Then: Pending, only one connect issued; releasing it connects
    assert!(matches!(action, TickAction::ConnectPending));
    gate.notify_one();
    pending.await.unwrap();
    assert_eq!(transport.log.lock().unwrap().connects, 1);
    assert!(matches!(monitor.tick().await, TickAction::Connected));
}

/// WHAT: A dropped link is reconnected on the next tick
/// WHY: The trigger should survive power cycles without user action
#[tokio::test]
async fn given_dropped_link_when_ticking_then_reconnect_issued() {
    // Given: A connected peripheral whose link dropped
    let transport = Arc::new(FakeTransport::with_visible(TRIGGER));
    let monitor = connected_monitor(Arc::clone(&transport)).await;
    transport.drop_link(TRIGGER);

    // When: Ticking
    let action = monitor.tick().await;

    // Then: A reconnect was spawned and succeeds
    match action {
        TickAction::ConnectIssued(handle) => handle.await.unwrap(),
        other => panic!("expected reconnect, got {other:?}"),
    }
    assert_eq!(transport.log.lock().unwrap().connects, 2);
    assert_eq!(
        monitor.remembered().await.map(|p| p.state),
        Some(LinkState::Connected)
    );
}

/// WHAT: A dropped link turns the next command into a no-op
/// WHY: Commands never wait for a reconnect
#[tokio::test]
async fn given_dropped_link_when_sending_command_then_not_connected() {
    let transport = Arc::new(FakeTransport::with_visible(TRIGGER));
    let monitor = connected_monitor(Arc::clone(&transport)).await;
    transport.drop_link(TRIGGER);

    let outcome = monitor.send_command("1").await.unwrap();

    assert_eq!(outcome, CommandOutcome::NotConnected);
    assert!(transport.log.lock().unwrap().writes.is_empty());
}

/// WHAT: A failed write is reported, not retried
/// WHY: Arming is best effort; recording goes ahead regardless
#[tokio::test]
async fn given_failing_write_when_sending_command_then_write_failed() {
    let transport = Arc::new(FakeTransport {
        visible: vec![TRIGGER.to_string()],
        fail_write: true,
        ..FakeTransport::default()
    });
    let monitor = connected_monitor(Arc::clone(&transport)).await;

    let outcome = monitor.send_command("1").await.unwrap();

    assert_eq!(outcome, CommandOutcome::WriteFailed);
}

/// WHAT: Choosing another peripheral forgets and disconnects the old one
/// WHY: The next tick must look for the newly saved identifier
#[tokio::test]
async fn given_connected_peripheral_when_saving_other_identifier_then_old_one_disconnected() {
    let transport = Arc::new(FakeTransport::with_visible(TRIGGER));
    let monitor = connected_monitor(Arc::clone(&transport)).await;

    monitor
        .set_saved_identifier(Some("11:22:33:44:55:66".to_string()))
        .await;

    assert!(monitor.remembered().await.is_none());
    assert_eq!(
        transport.log.lock().unwrap().disconnects,
        vec![TRIGGER.to_string()]
    );
    assert!(matches!(monitor.tick().await, TickAction::NotFound));
}

/// WHAT: The run loop exits when shutdown is signalled
/// WHY: The monitor must not keep the runtime alive on exit
#[tokio::test]
async fn given_running_monitor_when_shutdown_signalled_then_loop_exits() {
    // Given: A monitor polling in the background
    let transport = Arc::new(FakeTransport::with_visible(TRIGGER));
    let monitor = monitor(Arc::clone(&transport), Some(TRIGGER));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runner = monitor.clone();
    let task = tokio::spawn(async move {
        runner.run(Duration::from_millis(10), shutdown_rx).await;
    });

    // When: Signalling shutdown after the first poll
    tokio::time::sleep(Duration::from_millis(30)).await;
    shutdown_tx.send(true).unwrap();

    // Then: The loop ends and the first poll connected the peripheral
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .unwrap()
        .unwrap();
    assert!(transport.log.lock().unwrap().connects >= 1);
}
