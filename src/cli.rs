//! Command-line interface and REPL

use anyhow::{Context, Result};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use touchgrid::{Point, TouchEvent, TouchTracker};

use crate::replay::{print_outcome, print_points};

/// One parsed REPL line
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Event(TouchEvent),
    SetState(Point, bool),
    Points,
    Reset,
    Help,
    Quit,
}

/// Parse a REPL line like "down 10 20" or "move 12 20 10 20"
pub fn parse_command(line: &str) -> Result<ReplCommand> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        anyhow::bail!("Empty command");
    };
    let args: Vec<&str> = parts.collect();

    let coords = |expected: usize| -> Result<Vec<f32>> {
        if args.len() != expected {
            anyhow::bail!("'{}' takes {} coordinates, got {}", verb, expected, args.len());
        }
        args.iter()
            .map(|a| {
                a.parse::<f32>()
                    .with_context(|| format!("Invalid coordinate: {}", a))
            })
            .collect()
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "down" | "d" => {
            let c = coords(2)?;
            ReplCommand::Event(TouchEvent::down(c[0], c[1]))
        }
        "move" | "m" => {
            let c = coords(4)?;
            ReplCommand::Event(TouchEvent::moved(c[0], c[1], c[2], c[3]))
        }
        "up" | "u" => {
            let c = coords(4)?;
            ReplCommand::Event(TouchEvent::up(c[0], c[1], c[2], c[3]))
        }
        "set" => {
            if args.len() != 3 {
                anyhow::bail!("'set' takes x y true|false");
            }
            let x = args[0]
                .parse::<f32>()
                .with_context(|| format!("Invalid coordinate: {}", args[0]))?;
            let y = args[1]
                .parse::<f32>()
                .with_context(|| format!("Invalid coordinate: {}", args[1]))?;
            let flag = args[2]
                .parse::<bool>()
                .with_context(|| format!("Invalid flag: {}", args[2]))?;
            ReplCommand::SetState(Point::new(x, y), flag)
        }
        "points" | "p" => ReplCommand::Points,
        "reset" => ReplCommand::Reset,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => anyhow::bail!("Unknown command: {}", other),
    };

    Ok(command)
}

pub fn run_repl(mut tracker: TouchTracker) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("{}", "=== touchgrid REPL ===".bold().cyan());
    println!("{}", "Type 'help' for commands".dimmed());

    loop {
        let readline = rl.readline("touch> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match parse_command(&line) {
                    Ok(ReplCommand::Quit) => break,
                    Ok(command) => execute(&mut tracker, command),
                    Err(e) => println!("{} {:#}", "error:".red(), e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn execute(tracker: &mut TouchTracker, command: ReplCommand) {
    match command {
        ReplCommand::Event(event) => {
            let outcome = tracker.apply(event);
            print_outcome(&event, &outcome);
        }
        ReplCommand::SetState(point, flag) => {
            if tracker.set_state(point, flag) {
                println!("  {} {} = {}", "flag".green(), point, flag);
            } else {
                println!("  {} no contact at {}", "ignored".yellow(), point);
            }
        }
        ReplCommand::Points => print_points(tracker),
        ReplCommand::Reset => {
            tracker.reset();
            println!("  {}", "registry cleared".green());
        }
        ReplCommand::Help => print_help(),
        ReplCommand::Quit => {}
    }
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  down x y             register a contact");
    println!("  move x y px py       move the contact at (px, py) to (x, y)");
    println!("  up x y px py         release the contact at (px, py), else (x, y)");
    println!("  set x y true|false   set the flag of the contact at (x, y)");
    println!("  points               list current contacts");
    println!("  reset                clear every contact");
    println!("  quit                 leave the REPL");
}
