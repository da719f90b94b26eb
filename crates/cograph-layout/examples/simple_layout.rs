//! Simple example driving a layout session tick by tick.
//!
//! Run with: cargo run --example simple_layout

use std::time::Instant;

use cograph_layout::{Command, EdgeInput, Event, InitPayload, NodeInput, Session};

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // People attending overlapping events
    let node_count = 1000;
    let edge_count = 2000;

    println!("Creating co-occurrence graph with {} nodes and {} edges...", node_count, edge_count);

    let nodes: Vec<NodeInput> = (0..node_count)
        .map(|i| NodeInput {
            id: format!("p{i}"),
            label: Some(format!("Person {i}")),
            weight: Some(((i * 7) % 40) as f64),
            ..Default::default()
        })
        .collect();

    // A path so the graph is connected, then pseudo-random shared events
    let mut edges: Vec<EdgeInput> = (1..node_count)
        .map(|i| EdgeInput {
            source: format!("p{}", i - 1),
            target: format!("p{i}"),
            weight: Some(1.0),
        })
        .collect();
    for i in 0..(edge_count - node_count + 1) {
        let source = (i * 17) % node_count;
        let target = (i * 31 + 7) % node_count;
        if source != target {
            edges.push(EdgeInput {
                source: format!("p{source}"),
                target: format!("p{target}"),
                weight: Some((i % 5) as f64),
            });
        }
    }

    let mut session = Session::new();
    session.apply(Command::Init(InitPayload {
        nodes,
        edges,
        ..Default::default()
    }));

    println!("Running layout simulation...");

    let start = Instant::now();
    let mut ticks = 0;
    while let Some(event) = session.tick() {
        let Event::Tick(snapshot) = event else {
            break;
        };
        ticks += 1;

        if ticks % 100 == 0 {
            let (min_x, max_x, min_y, max_y) = snapshot.nodes.iter().fold(
                (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
                |(min_x, max_x, min_y, max_y), n| {
                    (min_x.min(n.x), max_x.max(n.x), min_y.min(n.y), max_y.max(n.y))
                },
            );

            println!(
                "Tick {}: alpha = {:.4}, bounds = ({:.1}, {:.1}) to ({:.1}, {:.1})",
                ticks, snapshot.alpha, min_x, min_y, max_x, max_y
            );
        }
    }

    let elapsed = start.elapsed();
    let rate = ticks as f64 / elapsed.as_secs_f64();

    println!("\nCame to rest after {} ticks in {:.2?}", ticks, elapsed);
    println!("Average: {:.1} ticks/sec ({:.2} ms/tick)", rate, 1000.0 / rate);

    println!("\nFinal positions (first 5 nodes):");
    for node in session.graph().nodes.iter().take(5) {
        println!("  {}: ({:.2}, {:.2})", node.id, node.position.x, node.position.y);
    }
}
