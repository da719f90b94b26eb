//! `cograph run`: lay out a graph file and write the event stream.
//!
//! Drives a [`Session`] directly, as fast as it will tick, and writes one
//! JSON event per line until the simulation comes to rest.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use cograph_layout::{encode_event, Command, Event, InitPayload, LayoutKind, Session, TickSnapshot};

use crate::config::Config;

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub layout: LayoutKind,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Stop after this many ticks even if still warm.
    pub max_ticks: Option<u64>,
    /// Write every Nth tick.
    pub every: Option<usize>,
    /// Only write the last snapshot and the `end` event.
    pub final_only: bool,
    pub output: Option<PathBuf>,
}

/// Execute the `cograph run` command.
pub fn execute(config: &Config, graph_path: &Path, options: RunOptions) -> Result<()> {
    let contents = std::fs::read_to_string(graph_path)
        .with_context(|| format!("Failed to read graph from {}", graph_path.display()))?;
    let mut payload: InitPayload = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse graph file {}", graph_path.display()))?;

    // Flags beat the file, the file beats the CLI config.
    payload.config.width = options.width.or(payload.config.width).or(Some(config.width));
    payload.config.height = options.height.or(payload.config.height).or(Some(config.height));

    let mut out: Box<dyn Write> = match &options.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create output file {}", path.display())
        })?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let every = options.every.unwrap_or(config.emit_every).max(1);
    let started = Instant::now();
    let summary = simulate(payload, &options, every, &mut out)?;
    out.flush()?;

    info!(
        "Finished after {} ticks in {:.2?} ({} events written)",
        summary.ticks,
        started.elapsed(),
        summary.written
    );
    Ok(())
}

#[derive(Debug, Default, PartialEq)]
struct RunSummary {
    ticks: u64,
    written: usize,
}

fn simulate(
    payload: InitPayload,
    options: &RunOptions,
    every: usize,
    out: &mut dyn Write,
) -> Result<RunSummary> {
    let mut session = Session::new();
    let mut summary = RunSummary::default();
    let mut last: Option<TickSnapshot> = None;

    let mut emit = |event: &Event, summary: &mut RunSummary| -> Result<()> {
        writeln!(out, "{}", encode_event(event)?)?;
        summary.written += 1;
        Ok(())
    };

    if let Some(Event::End) = session.apply(Command::Init(payload)) {
        emit(&Event::End, &mut summary)?;
        return Ok(summary);
    }

    if options.layout != LayoutKind::Force {
        if let Some(event) = session.apply(Command::Layout {
            kind: options.layout,
        }) {
            emit(&event, &mut summary)?;
        }
        emit(&Event::End, &mut summary)?;
        return Ok(summary);
    }

    loop {
        let reached_limit = options
            .max_ticks
            .is_some_and(|max| session.tick_count() >= max);
        let event = if reached_limit {
            session.apply(Command::Stop)
        } else {
            session.tick()
        };

        match event {
            Some(Event::Tick(snapshot)) => {
                summary.ticks += 1;
                if options.final_only {
                    last = Some(snapshot);
                } else if summary.ticks % every as u64 == 0 {
                    emit(&Event::Tick(snapshot), &mut summary)?;
                }
            }
            Some(Event::End) | None => {
                if let Some(snapshot) = last.take() {
                    emit(&Event::Tick(snapshot), &mut summary)?;
                }
                emit(&Event::End, &mut summary)?;
                return Ok(summary);
            }
        }
    }
}
