//! Terminal driver: renders the countdown and reads one-line commands from stdin.

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Sender};
use std::thread;

use pomocycle::clock::SystemClock;
use pomocycle::display::{format_progress, format_stats, format_status};
use pomocycle::notifications::DesktopNotifier;
use pomocycle::persistence::Database;
use pomocycle::timer::{Command, ThreadTicker, TimerMessage};
use pomocycle::{Engine, EngineEvent, EngineParts};

const HELP: &str = "Commands: [Enter]/s start-pause · r reset · k skip · q quit";

/// Maps a line of input to a command.
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_lowercase().as_str() {
        "" | "s" | "start" | "p" | "pause" => Some(Command::StartPause),
        "r" | "reset" => Some(Command::Reset),
        "k" | "skip" => Some(Command::Skip),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Forwards commands read from `input` until it ends or the receiver is gone.
fn forward_commands<R: BufRead>(input: R, tx: &Sender<TimerMessage>) {
    for line in input.lines() {
        let Ok(line) = line else { break };
        match parse_command(&line) {
            Some(command) => {
                if tx.send(TimerMessage::Command(command)).is_err() {
                    return;
                }
            }
            None => eprintln!("{}", HELP),
        }
    }
    // Closed or detached stdin leaves the timer running on its ticker.
    tracing::info!("input closed, timer keeps running; press Ctrl-C to stop");
}

fn spawn_input_reader(tx: Sender<TimerMessage>) -> io::Result<()> {
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || forward_commands(io::stdin().lock(), &tx))?;
    Ok(())
}

fn render(engine: &Engine) {
    let run = engine.run_state();
    print!(
        "\r\x1b[2K{}  {}",
        format_status(&run),
        format_progress(&run, engine.total_secs())
    );
    let _ = io::stdout().flush();
}

/// Runs the timer until the user quits.
pub fn run(db: Database, auto_start: bool) -> Result<(), Box<dyn Error>> {
    let (tx, rx) = mpsc::channel();
    let (event_tx, events) = mpsc::channel();

    let mut engine = Engine::new(
        EngineParts {
            store: Box::new(db),
            clock: Box::new(SystemClock),
            ticker: Box::new(ThreadTicker::new(tx.clone())),
            notifier: Box::new(DesktopNotifier),
            observer: Box::new(event_tx),
        },
        auto_start,
    );

    spawn_input_reader(tx)?;
    println!("{}", HELP);
    println!("{}", format_stats(engine.progress()));
    render(&engine);

    while let Ok(message) = rx.recv() {
        match message {
            TimerMessage::Tick { generation } => engine.handle_tick(generation),
            TimerMessage::Command(Command::Quit) => break,
            TimerMessage::Command(command) => engine.apply(command),
        }

        for event in events.try_iter() {
            if let EngineEvent::ModeChanged { mode, progress } = event {
                println!("\r\x1b[2K→ {}", mode.label());
                println!("{}", format_stats(&progress));
            }
        }
        render(&engine);
    }

    println!();
    tracing::info!("timer stopped");
    Ok(())
}
