//! Tests for the simulation task and its channels.
//!
//! Run with: `cargo test --package cograph-layout --test actor`

use std::time::Duration;

use cograph_layout::{
    ActorConfig, Command, DragPhase, Event, InitPayload, LayoutError, LayoutKind, NodeInput,
    SimulationHandle, TickCadence,
};
use tokio::time::timeout;

const LIMIT: Duration = Duration::from_secs(30);

fn payload(count: usize) -> InitPayload {
    InitPayload {
        nodes: (0..count)
            .map(|i| NodeInput {
                id: format!("n{i}"),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn immediate() -> ActorConfig {
    ActorConfig {
        cadence: TickCadence::Immediate,
        ..Default::default()
    }
}

#[tokio::test]
async fn runs_to_rest_with_monotone_alpha() {
    let (handle, mut events) = SimulationHandle::spawn(immediate());
    handle.send(Command::Init(payload(12))).await.unwrap();

    let result = timeout(LIMIT, async {
        let mut previous = f64::INFINITY;
        let mut ticks = 0usize;
        while let Some(event) = events.recv().await {
            match event {
                Event::Tick(snapshot) => {
                    assert!(snapshot.alpha <= previous);
                    assert_eq!(snapshot.nodes.len(), 12);
                    previous = snapshot.alpha;
                    ticks += 1;
                }
                Event::End => return ticks,
            }
        }
        panic!("event stream closed before end");
    })
    .await
    .expect("simulation did not finish in time");

    assert!(result > 0 && result <= 687);
}

#[tokio::test]
async fn lagging_host_still_sees_final_positions() {
    let config = ActorConfig {
        cadence: TickCadence::Immediate,
        event_capacity: 1,
        ..Default::default()
    };
    let (handle, mut events) = SimulationHandle::spawn(config);
    handle.send(Command::Init(payload(5))).await.unwrap();

    // Read nothing while the simulation runs to rest.
    tokio::time::sleep(Duration::from_millis(500)).await;

    let last_alpha = timeout(LIMIT, async {
        let mut last = None;
        while let Some(event) = events.recv().await {
            match event {
                Event::Tick(snapshot) => last = Some(snapshot.alpha),
                Event::End => return last,
            }
        }
        panic!("event stream closed before end");
    })
    .await
    .unwrap()
    .expect("no snapshot before end");

    // 0.99^687 is the last alpha above 0.001.
    assert!(last_alpha >= 0.001 && last_alpha < 0.00101, "{last_alpha}");
}

#[tokio::test]
async fn empty_init_reports_end() {
    let (handle, mut events) = SimulationHandle::spawn(immediate());
    handle.send(Command::Init(InitPayload::default())).await.unwrap();
    let event = timeout(LIMIT, events.recv()).await.unwrap();
    assert_eq!(event, Some(Event::End));
}

#[tokio::test]
async fn commands_apply_before_next_tick() {
    let config = ActorConfig {
        cadence: TickCadence::Interval(Duration::from_millis(1)),
        ..Default::default()
    };
    let (handle, mut events) = SimulationHandle::spawn(config);
    handle.send(Command::Init(payload(6))).await.unwrap();
    for phase in [DragPhase::Start, DragPhase::Drag] {
        handle
            .send(Command::Drag {
                node_id: "n3".into(),
                phase,
                x: Some(100.0),
                y: Some(100.0),
            })
            .await
            .unwrap();
    }

    let pinned = timeout(LIMIT, async {
        while let Some(event) = events.recv().await {
            if let Event::Tick(snapshot) = event {
                let n3 = snapshot.node("n3").unwrap();
                if (n3.x, n3.y) == (100.0, 100.0) {
                    return true;
                }
            }
        }
        false
    })
    .await
    .unwrap();
    assert!(pinned);
}

#[tokio::test]
async fn layout_switch_emits_snapshot_then_idles() {
    let (handle, mut events) = SimulationHandle::spawn(immediate());
    handle.send(Command::Init(payload(5))).await.unwrap();
    handle
        .send(Command::Layout {
            kind: LayoutKind::Grid,
        })
        .await
        .unwrap();

    let snapshot = timeout(LIMIT, async {
        while let Some(event) = events.recv().await {
            if let Event::Tick(snapshot) = event {
                if snapshot.alpha == 0.0 {
                    return snapshot;
                }
            }
        }
        panic!("no layout snapshot");
    })
    .await
    .unwrap();
    assert_eq!(snapshot.nodes.len(), 5);

    // Idle: nothing further arrives until the host acts again.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(events.try_recv(), None);
}

#[tokio::test]
async fn shutdown_closes_the_stream() {
    let (handle, mut events) = SimulationHandle::spawn(immediate());
    handle.send(Command::Init(payload(40))).await.unwrap();
    handle.shutdown().await.unwrap();

    let drained = timeout(LIMIT, async {
        while events.recv().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok());

    // Let the task finish dropping its inbox.
    tokio::task::yield_now().await;
    assert!(matches!(
        handle.send(Command::Stop).await,
        Err(LayoutError::Disconnected)
    ));
}

#[tokio::test]
async fn dropping_handle_stops_the_task() {
    let (handle, mut events) = SimulationHandle::spawn(immediate());
    handle.send(Command::Init(payload(3))).await.unwrap();
    drop(handle);

    let closed = timeout(LIMIT, async {
        while events.recv().await.is_some() {}
    })
    .await;
    assert!(closed.is_ok());
}
