//! `hammer` – interactive driver for the hammer robot's behavior core.
//!
//! 1. Loads `~/.hammer/config.toml`, writing defaults on first run.
//! 2. Wires the coordinator to simulated hardware and starts the obstacle
//!    watch and patrol loops.
//! 3. Reads operator input from stdin (see [`shell`]) and prints every
//!    notification the robot publishes.
//! 4. Ctrl-C or `quit` stops both loops and cuts drive power.

mod config;
mod shell;

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use hammer_hal::{Color, Hold, Tone};
use hammer_hal::sim::SimHardware;
use hammer_middleware::EventBus;
use hammer_runtime::Coordinator;
use hammer_runtime::telemetry::init_tracing;
use tokio::sync::{broadcast, mpsc};
use tracing::warn;

use crate::shell::Flow;

#[tokio::main]
async fn main() {
    let _tracing = init_tracing("hammer");
    print_banner();

    let cfg = load_or_create_config();

    let (mut hardware, probes) = SimHardware::new().build();
    if let Err(e) = hardware.indicator.play_tone(&startup_tune()) {
        warn!(error = %e, "startup tone failed");
    }
    if let Err(e) = hardware.indicator.set_both(Color::Green, Hold::Persistent) {
        warn!(error = %e, "startup LEDs failed");
    }

    let bus = Arc::new(EventBus::new(64, "hammer"));
    tokio::spawn(print_notifications(bus.subscribe()));

    let (coordinator, loops) = match cfg.patrol_seed {
        Some(seed) => Coordinator::with_seed(cfg.behavior, hardware, bus.clone(), seed),
        None => Coordinator::new(cfg.behavior, hardware, bus.clone()),
    };
    let behavior = coordinator.config();
    println!(
        "  Patrol zone ±{}, obstacle alert below {} after {} readings.",
        behavior.zone_radius,
        behavior.breach_distance,
        behavior.breach_debounce + 1
    );
    let running = coordinator.start(loops);

    let (interrupt_tx, mut interrupts) = mpsc::unbounded_channel::<()>();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(());
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; use `quit` to exit");
    }

    println!(
        "  Simulated robot ready.  Type {} for commands.\n",
        "help".bold().cyan()
    );

    let mut lines = spawn_stdin_reader();
    loop {
        tokio::select! {
            _ = interrupts.recv() => {
                println!();
                println!("{}", "⚠  Ctrl-C received – stopping the robot …".yellow().bold());
                break;
            }
            line = lines.recv() => {
                let Some(line) = line else { break };
                let input = match shell::parse(&line) {
                    Ok(input) => input,
                    Err(e) => {
                        println!("  {} {}", "✗".red(), e);
                        prompt();
                        continue;
                    }
                };
                if shell::execute(running.coordinator(), &probes, input).await == Flow::Quit {
                    break;
                }
                prompt();
            }
        }
    }

    running.shutdown().await;
    println!("{}", "  ✓ Drive stopped.  Goodbye.".green());
}

fn load_or_create_config() -> config::Config {
    match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            match config::save(&config::Config::default()) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    }
}

/// Blocking stdin reads on a dedicated thread, forwarded line by line.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        prompt();
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn print_notifications(mut rx: broadcast::Receiver<hammer_types::Event>) {
    loop {
        match rx.recv().await {
            Ok(event) => println!(
                "\n  {} {} {}",
                "◆".magenta().bold(),
                event.payload.name().bold(),
                event.payload.payload()
            ),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "notification printer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn prompt() {
    print!("{} ", "hammer>".bold().cyan());
    io::stdout().flush().ok();
}

/// Eighth, eighth, quarter at 120 bpm.
fn startup_tune() -> Vec<Tone> {
    let eighth = Duration::from_millis(250);
    vec![
        Tone::new("C4", eighth),
        Tone::new("D4", eighth),
        Tone::new("E5", eighth * 2),
    ]
}

fn print_banner() {
    println!();
    println!("{}", r#"   _                                     "#.bold().yellow());
    println!("{}", r#"  | |__   __ _ _ __ ___  _ __ ___   ___ _ __ "#.bold().yellow());
    println!("{}", r#"  | '_ \ / _` | '_ ` _ \| '_ ` _ \ / _ \ '__|"#.bold().yellow());
    println!("{}", r#"  | | | | (_| | | | | | | | | | | |  __/ |   "#.bold().yellow());
    println!("{}", r#"  |_| |_|\__,_|_| |_| |_|_| |_| |_|\___|_|   "#.bold().yellow());
    println!();
}
