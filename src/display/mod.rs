//! Status display
//!
//! The display never touches the network task. [`spawn_display`] watches the
//! shared [`PriceState`] and forwards changes to a [`Display`] on its own task.

use crate::feed::Symbol;
use crate::state::{ConnectionState, PriceState, StateSnapshot};
use std::io::Write;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Receives price and connection updates
pub trait Display: Send + Sync {
    /// New price label, e.g. `HYPE: $27.1234`
    fn on_price_update(&self, text: &str);

    /// Connection status changed
    fn on_connection_state_change(&self, state: &ConnectionState);
}

/// Prints one status line per change to stdout
pub struct TerminalDisplay {
    symbol: Symbol,
}

impl TerminalDisplay {
    pub fn new(symbol: Symbol) -> Self {
        Self { symbol }
    }

    /// Placeholder shown until a price arrives or while disconnected
    pub fn loading_label(&self) -> String {
        format!("{}: Loading...", self.symbol)
    }

    fn print(&self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        // A closed stdout is not worth crashing the ticker over
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.flush();
    }
}

impl Display for TerminalDisplay {
    fn on_price_update(&self, text: &str) {
        self.print(text);
    }

    fn on_connection_state_change(&self, state: &ConnectionState) {
        match state {
            ConnectionState::Open => self.print(&format!("[{}]", state)),
            _ => self.print(&format!("{} [{}]", self.loading_label(), state)),
        }
    }
}

/// Forward every change of `state` to `display` until the state is dropped.
///
/// The current state is delivered first. Intermediate values may be skipped
/// if the display falls behind; the latest value always arrives.
pub fn spawn_display(state: &PriceState, display: Arc<dyn Display>) -> JoinHandle<()> {
    let mut rx = state.subscribe();

    tokio::spawn(async move {
        let mut shown: Option<StateSnapshot> = None;
        loop {
            let current = rx.borrow_and_update().clone();
            render(display.as_ref(), shown.as_ref(), &current);
            shown = Some(current);

            if rx.changed().await.is_err() {
                tracing::debug!("Price state dropped, stopping display");
                break;
            }
        }
    })
}

/// Emit only what differs between `previous` and `current`
fn render(display: &dyn Display, previous: Option<&StateSnapshot>, current: &StateSnapshot) {
    if previous.map(|p| &p.connection) != Some(&current.connection) {
        display.on_connection_state_change(&current.connection);
    }
    // Ticks repeating the shown label leave the display alone
    if let Some(update) = &current.latest_price {
        let label = update.label();
        let shown = previous
            .and_then(|p| p.latest_price.as_ref())
            .map(|p| p.label());
        if shown.as_ref() != Some(&label) {
            display.on_price_update(&label);
        }
    }
}
