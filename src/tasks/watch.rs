//! Interactive watch loop driving the periodic tick

use std::io::{BufRead, Write};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    engine::TimerEngine,
    services::TickToken,
    state::TimerView,
    utils::shutdown_signal,
};

/// Commands accepted on stdin while watching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchCommand {
    Start,
    Pause,
    Toggle,
    Reset,
    Commit,
    Show,
    Hide,
    Status,
    Quit,
}

impl WatchCommand {
    /// Parse one input line. Blank lines toggle, like the widget's play button.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "" | "toggle" | "t" => Some(Self::Toggle),
            "start" | "s" => Some(Self::Start),
            "pause" | "p" => Some(Self::Pause),
            "reset" | "r" => Some(Self::Reset),
            "commit" | "c" => Some(Self::Commit),
            "show" => Some(Self::Show),
            "hide" => Some(Self::Hide),
            "status" => Some(Self::Status),
            "quit" | "q" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Apply a watch command. Returns false when the loop should end.
pub fn apply_command(engine: &mut TimerEngine, command: WatchCommand) -> bool {
    match command {
        WatchCommand::Start => engine.start(),
        WatchCommand::Pause => engine.pause(),
        WatchCommand::Toggle => engine.toggle(),
        WatchCommand::Reset => {
            engine.stop(false);
        }
        WatchCommand::Commit => {
            engine.stop(true);
        }
        WatchCommand::Show => engine.show(),
        WatchCommand::Hide => engine.hide(),
        WatchCommand::Status => render(&engine.view()),
        WatchCommand::Quit => return false,
    }
    true
}

/// Keep the timer on screen until quit, stdin EOF or a shutdown signal.
///
/// Ticks arriving on `ticks` refresh the display while running; every view
/// change is rendered as one line.
pub async fn watch_task(
    mut engine: TimerEngine,
    mut ticks: mpsc::UnboundedReceiver<TickToken>,
) -> anyhow::Result<()> {
    info!("Watching timer {}", engine.context_key());

    let mut view_rx = engine.subscribe();
    render(&view_rx.borrow_and_update());

    let mut lines = stdin_lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut signals_ok = true;

    loop {
        tokio::select! {
            Some(token) = ticks.recv() => {
                engine.handle_tick(token);
            }

            Ok(()) = view_rx.changed() => {
                render(&view_rx.borrow_and_update());
            }

            line = lines.recv() => {
                let Some(line) = line else {
                    debug!("Stdin closed");
                    break;
                };
                match WatchCommand::parse(&line) {
                    Some(command) => {
                        debug!("Watch command: {:?}", command);
                        if !apply_command(&mut engine, command) {
                            break;
                        }
                    }
                    None => warn!("Unknown command: {}", line.trim()),
                }
            }

            result = &mut shutdown, if signals_ok => {
                match result {
                    Ok(_) => break,
                    Err(e) => {
                        warn!("Failed to install signal handler: {}", e);
                        signals_ok = false;
                    }
                }
            }
        }
    }

    info!("Stopped watching timer {}", engine.context_key());
    Ok(())
}

/// Read stdin on a dedicated thread so a pending read never holds up exit
fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (line_tx, line_rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });
    line_rx
}

fn render(view: &TimerView) {
    let visibility = if view.shown { "" } else { " (hidden)" };
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "[{}] {}{}", view.phase, view.display_text, visibility) {
        warn!("Failed to render timer: {}", e);
    }
}
