//! Interactive console for a follow session

use std::io::{self, BufRead, Write};
use std::thread;

use anyhow::Result;

use followcam_core::UiFlag;
use followcam_integration::GameApi;

use crate::app::SpectatorApp;

/// One line typed at the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Target(String),
    Adjust(i32),
    Start,
    Stop,
    Status,
    Ui { flag: UiFlag, enabled: bool },
    Help,
    Quit,
    Empty,
}

pub fn parse_switch(s: &str) -> Result<bool, String> {
    match s.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("expected on or off, got '{}'", other)),
    }
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "" => ConsoleCommand::Empty,
        "+" => ConsoleCommand::Adjust(1),
        "-" => ConsoleCommand::Adjust(-1),
        "target" | "t" => {
            if rest.is_empty() {
                return Err("usage: target <player>".to_string());
            }
            ConsoleCommand::Target(rest.to_string())
        }
        "start" => ConsoleCommand::Start,
        "stop" | "s" => ConsoleCommand::Stop,
        "status" => ConsoleCommand::Status,
        "ui" => {
            let mut args = rest.split_whitespace();
            let (Some(flag), Some(state), None) = (args.next(), args.next(), args.next()) else {
                return Err("usage: ui <ui|nameplates|minimap|mute> <on|off>".to_string());
            };
            ConsoleCommand::Ui {
                flag: flag.parse()?,
                enabled: parse_switch(state)?,
            }
        }
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => return Err(format!("unknown command '{}', type help", other)),
    };
    Ok(command)
}

const HELP: &str = "\
Commands:
  target <player>     follow a different player
  + / -               nudge the camera and remember the correction
  start / stop        start or stop following
  status              show the current target and camera
  ui <flag> <on|off>  flags: ui, nameplates, minimap, mute
  quit                stop and exit";

/// Run the console until `quit` or end of input
pub fn run<A: GameApi + 'static>(app: &mut SpectatorApp<A>, player: Option<String>) -> Result<()> {
    let events = app.subscribe();
    thread::spawn(move || {
        for event in events {
            if event.is_error() {
                eprintln!("! {}", event);
            } else {
                println!("> {}", event);
            }
        }
    });

    match player {
        Some(player) => report(app.set_target(&player).map(|s| s.to_string())),
        None => println!("Enter a player name to begin (target <player>)"),
    }
    println!("{}", HELP);

    let stdin = io::stdin();
    prompt()?;
    for line in stdin.lock().lines() {
        let line = line?;
        match parse_command(&line) {
            Ok(ConsoleCommand::Quit) => break,
            Ok(command) => execute(app, command),
            Err(e) => eprintln!("! {}", e),
        }
        prompt()?;
    }

    app.shutdown();
    Ok(())
}

fn execute<A: GameApi + 'static>(app: &mut SpectatorApp<A>, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Target(player) => report(app.set_target(&player).map(|s| s.to_string())),
        ConsoleCommand::Adjust(delta) => report(
            app.adjust_camera(delta)
                .map(|c| format!("Camera adjusted to {} (saved)", c)),
        ),
        ConsoleCommand::Start => report(app.start_following().map(|_| app.status().to_string())),
        ConsoleCommand::Stop => app.stop_following(),
        ConsoleCommand::Status => println!("{}", app.status()),
        ConsoleCommand::Ui { flag, enabled } => report(
            app.set_ui_flag(flag, enabled)
                .map(|_| format!("{}: {}", flag.description(), if enabled { "on" } else { "off" })),
        ),
        ConsoleCommand::Help => println!("{}", HELP),
        ConsoleCommand::Quit | ConsoleCommand::Empty => {}
    }
}

fn report<E: std::fmt::Display>(result: Result<String, E>) {
    match result {
        Ok(message) => println!("{}", message),
        Err(e) => eprintln!("! {}", e),
    }
}

fn prompt() -> io::Result<()> {
    print!("followcam> ");
    io::stdout().flush()
}
