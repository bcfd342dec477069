//! `spintimer run`: play a sequence in the terminal.

use std::io::Write;

use clap::Args;
use spintimer_core::{Config, Database, Event, RunMode, TrainingSession};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use super::{resolve_sequence, CliResult, SequenceSource};
use crate::render;

const CONTROLS: &str =
    "controls: p pause/resume, n next, s stop, r reset, g start, q quit (then Enter)";

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SequenceSource,
    /// Wait for `g` instead of starting immediately
    #[arg(long)]
    pub no_auto_start: bool,
    /// Print events as JSON lines instead of a status display
    #[arg(long)]
    pub json: bool,
}

enum Control {
    Toggle,
    Next,
    Stop,
    Reset,
    Start,
    Quit,
    Help,
}

fn parse_control(line: &str) -> Option<Control> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "p" | "pause" | "resume" => Some(Control::Toggle),
        "n" | "next" | "skip" => Some(Control::Next),
        "s" | "stop" => Some(Control::Stop),
        "r" | "reset" => Some(Control::Reset),
        "g" | "go" | "start" => Some(Control::Start),
        "q" | "quit" | "exit" => Some(Control::Quit),
        "h" | "?" | "help" => Some(Control::Help),
        _ => None,
    }
}

pub fn run(args: RunArgs) -> CliResult {
    let config = Config::load()?;
    let db = Database::open()?;

    let mut source = args.source;
    if source.is_empty() {
        match config.default_set.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => source.set = Some(id.to_string()),
            _ => {
                return Err(
                    "nothing to run: pass --set, --file or --interval (or set default_set)".into(),
                )
            }
        }
    }

    let resolved = resolve_sequence(&source, &db, &config.colors)?;
    if let Some(set) = &resolved.saved_set {
        db.touch_saved_set(&set.id)?;
    }
    if let Some(name) = &resolved.name {
        info!(name = %name, "running training");
    }

    let auto_start = config.timer.auto_start && !args.no_auto_start;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(play(resolved.sequence, &config, auto_start, args.json))
}

async fn play(
    sequence: spintimer_core::IntervalSequence,
    config: &Config,
    auto_start: bool,
    json: bool,
) -> CliResult {
    let session = TrainingSession::new(config.session_options());
    let mut events = session.subscribe_events();
    let mut states = session.subscribe_state();

    if !json {
        print!("{}", render::timeline(&sequence, config.display.color_output));
        println!("{CONTROLS}");
    }
    session.load(sequence).await;
    if auto_start {
        session.start().await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut stdout = std::io::stdout();

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let projection = spintimer_core::Projection::of(&states.borrow_and_update());
                if !json {
                    write!(stdout, "\r\x1b[2K{}", render::status_line(&projection, &config.display))?;
                    stdout.flush()?;
                }
            }
            received = events.recv() => {
                let event = match received {
                    Ok(event) => event,
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "event receiver lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if json {
                    writeln!(stdout, "{}", serde_json::to_string(&event)?)?;
                } else if let Some(line) = render::event_line(&event, &config.display) {
                    writeln!(stdout, "\r\x1b[2K{line}")?;
                }
                stdout.flush()?;
                if matches!(event, Event::SessionCompleted { .. } | Event::TrainingStopped { .. }) {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => match parse_control(&line) {
                        Some(Control::Toggle) => { session.toggle().await; }
                        Some(Control::Next) => { session.skip_to_next().await; }
                        Some(Control::Stop) | Some(Control::Quit) => { session.stop().await; }
                        Some(Control::Reset) => { session.reset().await; }
                        Some(Control::Start) => { session.start().await; }
                        Some(Control::Help) => println!("\n{CONTROLS}"),
                        None => println!("\nunknown control '{}'; {CONTROLS}", line.trim()),
                    },
                    None => {
                        stdin_open = false;
                        // Nothing can start or resume the session any more;
                        // the stop event ends the loop.
                        if matches!(session.snapshot().run_mode, RunMode::Idle | RunMode::Paused) {
                            session.stop().await;
                        }
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                session.stop().await;
                break;
            }
        }
    }

    session.shutdown().await;
    if json {
        let projection = session.projection();
        writeln!(stdout, "{}", serde_json::to_string(&projection)?)?;
    } else {
        writeln!(stdout)?;
    }
    Ok(())
}
