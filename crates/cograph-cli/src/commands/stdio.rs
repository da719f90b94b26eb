//! `cograph stdio`: bridge a live simulation to stdin/stdout.
//!
//! Each stdin line is one JSON command; each stdout line is one JSON
//! event. Malformed lines are logged and skipped. EOF shuts the
//! simulation down after the events already produced have been written.

use anyhow::{Context, Result};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use cograph_layout::{decode_command, encode_event, ActorConfig, Event, SimulationHandle, TickCadence};

/// Execute the `cograph stdio` command.
pub async fn execute(cadence: TickCadence) -> Result<()> {
    let (handle, mut events) = SimulationHandle::spawn(ActorConfig {
        cadence,
        ..Default::default()
    });
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();
    let mut commands = 0usize;

    info!("Waiting for commands on stdin");
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match decode_command(line) {
                    Ok(command) => {
                        debug!("Command: {:?}", command);
                        commands += 1;
                        handle.send(command).await?;
                    }
                    Err(e) => warn!("Skipping malformed command: {}", e),
                }
            }
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                write_event(&mut stdout, &event).await?;
            }
        }
    }

    // A send after the task is gone means it has already closed the stream.
    if handle.shutdown().await.is_ok() {
        while let Some(event) = events.recv().await {
            write_event(&mut stdout, &event).await?;
        }
    }
    info!("Input closed after {} commands", commands);
    Ok(())
}

async fn write_event(out: &mut io::Stdout, event: &Event) -> Result<()> {
    let mut line = encode_event(event)?;
    line.push('\n');
    out.write_all(line.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}
