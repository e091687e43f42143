//! Terminal command source
//!
//! Maps stdin lines and Ctrl-C onto supervisor commands.

use crate::supervisor::{Command, SupervisorHandle};
use std::io::BufRead;

/// Parse one input line. Blank or unknown input yields `None`.
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "reconnect" => Some(Command::Reconnect),
        "q" | "quit" | "exit" => Some(Command::Terminate),
        _ => None,
    }
}

/// Listen for Ctrl-C and read commands from stdin.
///
/// Stdin is read on a detached OS thread: a blocking read parked on the
/// runtime's blocking pool would hold up shutdown after `q`.
pub fn spawn_command_source(handle: SupervisorHandle) {
    let ctrl_c_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, terminating");
            ctrl_c_handle.terminate();
        }
    });

    let spawned = std::thread::Builder::new()
        .name("stdin-commands".into())
        .spawn(move || forward_lines(std::io::stdin().lock(), &handle));
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "Could not start stdin reader, only Ctrl-C is available");
    }
}

/// Forward parsed commands from `reader` until EOF, `Terminate`, or a
/// closed supervisor. EOF is not a quit: piping an empty stdin keeps the
/// ticker running.
fn forward_lines<R: BufRead>(reader: R, handle: &SupervisorHandle) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stdin");
                return;
            }
        };

        let Some(command) = parse_command(&line) else {
            if !line.trim().is_empty() {
                tracing::warn!(input = %line.trim(), "Unknown command (r = reconnect, q = quit)");
            }
            continue;
        };

        if !handle.send(command) || command == Command::Terminate {
            return;
        }
    }
    tracing::debug!("stdin closed");
}
