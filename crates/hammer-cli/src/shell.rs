//! Operator input: JSON directives or shorthand commands.
//!
//! Shorthand:
//!   move <direction words> [steps] [speed]   – e.g. `move go right 2 fast`
//!   patrol | smash | stop | pause
//!   obstacle <distance> [count]              – feed the simulated sensor
//!   status | help | quit
//!
//! A line starting with `{` is handed to the coordinator unchanged, exactly
//! as the voice skill would send it.

use colored::Colorize;
use hammer_hal::sim::SimProbes;
use hammer_runtime::Coordinator;
use hammer_types::command::speed_from_word;
use hammer_types::{Command, DEFAULT_SPEED, DEFAULT_STEPS, Direction, MoveCommand};

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Empty,
    Directive(String),
    Command(Command),
    Obstacle { distance: f32, count: usize },
    Status,
    Help,
    Quit,
}

/// Whether the shell should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn parse(line: &str) -> Result<Input, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Empty);
    }
    if line.starts_with('{') {
        return Ok(Input::Directive(line.to_string()));
    }

    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or_default().to_lowercase();
    let rest: Vec<&str> = words.collect();
    match head.as_str() {
        "move" | "go" => parse_move(&rest),
        "patrol" => Ok(Input::Command(Command::Patrol)),
        "smash" => Ok(Input::Command(Command::Smash)),
        "stop" => Ok(Input::Command(Command::Stop)),
        "pause" => Ok(Input::Command(Command::Move(MoveCommand::pause()))),
        "obstacle" => parse_obstacle(&rest),
        "status" => Ok(Input::Status),
        "help" | "?" => Ok(Input::Help),
        "quit" | "exit" => Ok(Input::Quit),
        other => Err(format!("unknown command '{other}'")),
    }
}

/// Words are the direction; the first number is steps; a second number or a
/// speed word is the speed.
fn parse_move(args: &[&str]) -> Result<Input, String> {
    let mut direction_words = Vec::new();
    let mut steps = None;
    let mut speed = None;

    for arg in args {
        if let Some(pct) = speed_from_word(arg) {
            speed = Some(pct);
        } else if let Ok(n) = arg.parse::<i64>() {
            if steps.is_none() {
                let n = u32::try_from(n).map_err(|_| format!("steps {n} must be non-negative"))?;
                steps = Some(n);
            } else if (-100..=100).contains(&n) {
                speed = Some(n as i32);
            } else {
                return Err(format!("speed {n} outside -100..=100"));
            }
        } else {
            direction_words.push(*arg);
        }
    }

    if direction_words.is_empty() {
        return Err("move needs a direction".to_string());
    }
    let phrase = direction_words.join(" ");
    Ok(Input::Command(Command::Move(MoveCommand {
        direction: Direction::from_word(&phrase),
        steps: steps.unwrap_or(DEFAULT_STEPS),
        speed: speed.unwrap_or(DEFAULT_SPEED),
    })))
}

fn parse_obstacle(args: &[&str]) -> Result<Input, String> {
    let distance = args
        .first()
        .ok_or("obstacle needs a distance")?
        .parse::<f32>()
        .map_err(|_| "distance must be a number".to_string())?;
    let count = match args.get(1) {
        Some(c) => c
            .parse::<usize>()
            .map_err(|_| "count must be a positive integer".to_string())?,
        None => 1,
    };
    Ok(Input::Obstacle { distance, count })
}

/// Act on one parsed line.
pub async fn execute(coordinator: &Coordinator, probes: &SimProbes, input: Input) -> Flow {
    match input {
        Input::Empty => {}
        Input::Directive(raw) => coordinator.handle_directive(&raw).await,
        Input::Command(command) => coordinator.handle(command).await,
        Input::Obstacle { distance, count } => {
            probes.range.push_repeated(distance, count);
            println!("  queued {count} sample(s) at {distance}");
        }
        Input::Status => print_status(coordinator),
        Input::Help => print_help(),
        Input::Quit => return Flow::Quit,
    }
    Flow::Continue
}

fn print_status(coordinator: &Coordinator) {
    let snap = coordinator.snapshot();
    let patrol = if snap.patrol_active {
        "on".green()
    } else {
        "off".dimmed()
    };
    let watch = if snap.alert_active() {
        "alert".red().bold()
    } else {
        "armed".green()
    };
    println!(
        "  heading {}  position {} of ±{}  patrol {}  watch {}",
        snap.tracker.heading().to_string().bold(),
        snap.tracker.position().to_string().bold(),
        snap.tracker.zone_radius(),
        patrol,
        watch,
    );
}

pub fn print_help() {
    println!();
    println!("  {}", "Commands".bold().underline());
    println!("    {}   e.g. move right 2 fast", "move <direction> [steps] [speed]".cyan());
    println!("    {}             start the random walk", "patrol".cyan());
    println!("    {}              swing the hammer", "smash".cyan());
    println!("    {}               stop and end patrol", "stop".cyan());
    println!("    {}              cut drive power only", "pause".cyan());
    println!("    {}   feed the simulated range sensor", "obstacle <cm> [count]".cyan());
    println!("    {}             heading, position and flags", "status".cyan());
    println!("    {}               exit", "quit".cyan());
    println!("    {}       raw voice-skill directive", "{\"type\": ...}".cyan());
    println!();
}
