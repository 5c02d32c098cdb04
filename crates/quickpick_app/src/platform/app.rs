use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use quickpick_core::{update, AppState, Msg};
use quickpick_logging::{qp_debug, qp_info, qp_warn};

use super::config::{self, DEFAULT_CONFIG_PATH};
use super::effects::EffectRunner;
use super::ui::input::{parse_command, Command, HELP};
use super::ui::render::render;
use super::{logging, AppError};

const POLL_INTERVAL: Duration = Duration::from_millis(75);

enum Input {
    Line(String),
    Closed,
}

pub fn run_app(config_path: Option<PathBuf>) -> Result<(), AppError> {
    let config_path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = config::load(&config_path)?;
    logging::initialize(
        config.log_destination,
        config.log_level()?,
        &config.log_file,
    );
    qp_info!("quickpick starting with config {:?}", config_path);

    let session_config = config.session_config()?;
    let initial_filter = config.initial_filter()?;
    // Longest a scripted run waits for outstanding work once input ends.
    let settle_limit = config.engine_config().fetch_timeout + session_config.advance_delay;
    let mut runner = EffectRunner::new(&config)?;
    let mut host = Host {
        state: AppState::with_config(session_config),
        runner: &runner,
    };

    host.dispatch(Msg::FilterChanged(initial_filter));
    host.print_view()?;
    println!("{HELP}");

    let input_rx = spawn_input_reader();
    loop {
        match input_rx.recv_timeout(POLL_INTERVAL) {
            Ok(Input::Line(line)) => match parse_command(&line, Utc::now()) {
                Ok(Command::Quit) => break,
                Ok(Command::Help) => println!("{HELP}"),
                Ok(Command::Start(filter)) => {
                    let filter = filter.unwrap_or_else(|| host.state.session().filter());
                    host.dispatch(Msg::StartClicked(filter));
                }
                Ok(Command::Dispatch(msgs)) => {
                    for msg in msgs {
                        host.dispatch(msg);
                    }
                }
                Err(message) => println!("{message}"),
            },
            Ok(Input::Closed) | Err(RecvTimeoutError::Disconnected) => {
                host.settle(settle_limit)?;
                break;
            }
            Err(RecvTimeoutError::Timeout) => host.dispatch(Msg::Tick),
        }

        host.drain_engine();
        host.print_view()?;
    }

    host.dispatch(Msg::Unmounted);
    drop(host);
    runner.shutdown();
    qp_info!("quickpick stopped");
    Ok(())
}

struct Host<'a> {
    state: AppState,
    runner: &'a EffectRunner,
}

impl Host<'_> {
    fn dispatch(&mut self, msg: Msg) {
        if !matches!(msg, Msg::Tick) {
            qp_debug!("Dispatch {:?}", msg);
        }
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);
    }

    fn drain_engine(&mut self) {
        while let Some(msg) = self.runner.poll() {
            self.dispatch(msg);
        }
    }

    /// Keeps delivering engine events after input ended until the session has
    /// nothing outstanding or `limit` has passed.
    fn settle(&mut self, limit: Duration) -> Result<(), AppError> {
        let deadline = Instant::now() + limit;
        while !is_settled(&self.state) || self.runner.live_fetches() > 0 {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                qp_warn!("Input closed with work still outstanding; giving up after {:?}", limit);
                break;
            };
            if let Some(msg) = self.runner.wait(remaining.min(POLL_INTERVAL)) {
                self.dispatch(msg);
                self.drain_engine();
            }
            self.print_view()?;
        }
        Ok(())
    }

    fn print_view(&mut self) -> Result<(), AppError> {
        if !self.state.consume_dirty() {
            return Ok(());
        }
        let mut out = io::stdout().lock();
        for line in render(&self.state.view()) {
            writeln!(out, "{line}")?;
        }
        out.flush()?;
        Ok(())
    }
}

/// True when no fetch is in flight and no vote is waiting for its advance.
fn is_settled(state: &AppState) -> bool {
    !state.session().is_loading() && state.pending_advance().is_none()
}

fn spawn_input_reader() -> mpsc::Receiver<Input> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Input::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    qp_warn!("stdin read failed: {}", err);
                    break;
                }
            }
        }
        let _ = tx.send(Input::Closed);
    });
    rx
}
