//! CLI module
//!
//! This module provides the command-line interface functionality for the
//! ticklist tool: argument parsing, the interactive session loop and the
//! terminal rendering of tasks and statistics.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use lazy_static::lazy_static;
use serde::Serialize;
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::{
    models::{ListController, Task, TaskList, TaskStats, MAX_DESCRIPTION_LEN},
    timefmt::format_relative,
};

const EMPTY_STATE_TITLE: &str = "No tasks yet";
const EMPTY_STATE_MESSAGE: &str = "Add your first task to get started!";
const INPUT_PLACEHOLDER: &str = "What needs to be done?";

lazy_static! {
    static ref EXAMPLE_TASKS: Vec<String> = vec![
        "Buy groceries for the week".to_string(),
        "Call the dentist to reschedule".to_string(),
        "Finish the quarterly report".to_string(),
        "Water the plants".to_string(),
        "Book train tickets for Friday".to_string(),
    ];
    static ref SESSION_HELP: String = format!(
        r#"Commands:
  add <description>    Add a task, up to {} characters (alias: a)
  toggle <n>           Flip completion of the task at position <n> (alias: t)
  rm <n>               Delete the task at position <n>, asks first (alias: d)
  list                 Show the tasks (alias: ls)
  stats                Show totals and the completion percentage
  json                 Dump tasks and stats as JSON
  help                 Show this help (alias: ?)
  quit                 Leave the session (alias: q)"#,
        MAX_DESCRIPTION_LEN
    );
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive task session (the default)
    Session {
        /// Populate the list with example tasks
        #[arg(long)]
        example: bool,
    },

    /// Interactive guide on how to use this tool
    Guide,

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Run the CLI application
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Session { example: false }) {
        Commands::Session { example } => {
            let controller = ListController::new(TaskList::new());
            run_session(controller, example).await
        }

        Commands::Guide => {
            print_guide();
            Ok(())
        }

        Commands::Completions { shell } => {
            // Generate completions for the specified shell
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut io::stdout());
            Ok(())
        }
    }
}

/// A command typed at the session prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Add(String),
    Toggle(usize),
    Delete(usize),
    List,
    Stats,
    Json,
    Help,
    Quit,
}

/// Parses one prompt line into a session command.
///
/// The first whitespace-separated word selects the command; the remainder is
/// its argument. An `add` with no argument is passed through so the
/// description validation produces the error message, rather than this
/// parser inventing its own.
fn parse_session_command(line: &str) -> Result<SessionCommand, String> {
    let trimmed = line.trim();
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (trimmed, ""),
    };

    match word {
        "add" | "a" => Ok(SessionCommand::Add(rest.to_string())),
        "toggle" | "t" => parse_position(rest, "toggle").map(SessionCommand::Toggle),
        "rm" | "delete" | "d" => parse_position(rest, "rm").map(SessionCommand::Delete),
        "list" | "ls" => Ok(SessionCommand::List),
        "stats" => Ok(SessionCommand::Stats),
        "json" => Ok(SessionCommand::Json),
        "help" | "h" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
        other => Err(format!(
            "Unknown command '{}'. Type 'help' to list commands.",
            other
        )),
    }
}

fn parse_position(input: &str, command: &str) -> Result<usize, String> {
    match input.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!(
            "Usage: {} <n>, where <n> is a task position from 'list'",
            command
        )),
    }
}

/// Resolves a 1-based display position against the current snapshot.
fn task_at_position(controller: &ListController, position: usize) -> Result<Task, String> {
    let tasks = controller.tasks();
    position
        .checked_sub(1)
        .and_then(|index| tasks.get(index).cloned())
        .ok_or_else(|| {
            format!(
                "No task at position {} (the list has {} tasks)",
                position,
                tasks.len()
            )
        })
}

/// Runs the interactive session until `quit` or end of input.
async fn run_session(
    controller: ListController,
    example: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if example {
        println!("Populating with example tasks...");
        create_example_tasks(&controller);
    }

    // Debug-level observer; the session re-renders explicitly after each command
    let mut updates = controller.subscribe();
    tokio::spawn(async move {
        while updates.recv().await.is_ok() {
            tracing::debug!("task list updated");
        }
    });

    println!(
        "{} (type 'help' to list commands)",
        "ticklist session".bold()
    );
    println!();
    print_tasks(&controller.tasks(), Utc::now());

    let mut lines = BufReader::new(stdin()).lines();

    loop {
        print_prompt(controller.tasks().is_empty())?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_session_command(trimmed) {
            Ok(SessionCommand::Quit) => break,
            Ok(command) => execute(&controller, command, &mut lines).await?,
            Err(message) => println!("{}", message.red()),
        }
    }

    println!("Bye.");
    Ok(())
}

/// Applies one parsed command to the controller and renders the outcome.
async fn execute(
    controller: &ListController,
    command: SessionCommand,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        SessionCommand::Add(description) => match controller.add(&description) {
            Ok(task) => {
                println!("Added \"{}\"", task.description());
                print_tasks(&controller.tasks(), Utc::now());
            }
            Err(error) => println!("{}", error.to_string().red()),
        },

        SessionCommand::Toggle(position) => match task_at_position(controller, position) {
            Ok(task) => {
                if let Some(updated) = controller.toggle(task.id()) {
                    let verb = if updated.is_completed() {
                        "Completed"
                    } else {
                        "Reopened"
                    };
                    println!("{} \"{}\"", verb, updated.description());
                }
                print_tasks(&controller.tasks(), Utc::now());
            }
            Err(message) => println!("{}", message.red()),
        },

        SessionCommand::Delete(position) => match task_at_position(controller, position) {
            Ok(task) => {
                if confirm_delete(lines).await? {
                    if controller.delete(task.id()).is_some() {
                        println!("Deleted \"{}\"", task.description());
                    }
                    print_tasks(&controller.tasks(), Utc::now());
                } else {
                    println!("Cancelled");
                }
            }
            Err(message) => println!("{}", message.red()),
        },

        SessionCommand::List => print_tasks(&controller.tasks(), Utc::now()),
        SessionCommand::Stats => print_stats(&controller.stats()),
        SessionCommand::Json => print_json(controller)?,
        SessionCommand::Help => println!("{}", *SESSION_HELP),

        // Handled by the session loop
        SessionCommand::Quit => {}
    }

    Ok(())
}

fn print_prompt(show_placeholder: bool) -> io::Result<()> {
    if show_placeholder {
        print!("{} ", INPUT_PLACEHOLDER.dimmed());
    }
    print!("> ");
    io::stdout().flush()
}

/// Asks for confirmation before a delete; end of input counts as "no".
async fn confirm_delete(lines: &mut Lines<BufReader<Stdin>>) -> io::Result<bool> {
    println!("{}", "Delete Task".bold());
    print!("Are you sure you want to delete this task? [y/N] ");
    io::stdout().flush()?;

    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Renders the task list in display order with 1-based positions.
fn print_tasks(tasks: &[Task], now: DateTime<Utc>) {
    if tasks.is_empty() {
        println!("{}", EMPTY_STATE_TITLE.bold());
        println!("{}", EMPTY_STATE_MESSAGE.dimmed());
        return;
    }

    for (i, task) in tasks.iter().enumerate() {
        let checkbox = if task.is_completed() {
            "[x]".green()
        } else {
            "[ ]".normal()
        };
        let description = if task.is_completed() {
            task.description().dimmed().strikethrough()
        } else {
            task.description().normal()
        };
        let age = format!("({})", format_relative(task.created_at(), now));

        println!("{:>2}. {} {} {}", i + 1, checkbox, description, age.dimmed());
    }
}

fn print_stats(stats: &TaskStats) {
    println!("{}", "Stats".bold());
    println!("  Total:     {}", stats.total);
    println!("  Completed: {}", stats.completed.to_string().green());
    println!("  Pending:   {}", stats.pending.to_string().yellow());
    println!("  Done:      {}%", stats.completion_percentage);
}

#[derive(Serialize)]
struct SessionSnapshot {
    tasks: Vec<Task>,
    stats: TaskStats,
}

fn print_json(controller: &ListController) -> serde_json::Result<()> {
    let snapshot = SessionSnapshot {
        tasks: controller.tasks(),
        stats: controller.stats(),
    };

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Seeds the list with example tasks for trying out the session
fn create_example_tasks(controller: &ListController) {
    let mut added = Vec::new();
    for description in EXAMPLE_TASKS.iter() {
        if let Ok(task) = controller.add(description) {
            added.push(task);
        }
    }

    // Mark the first couple as done so the display grouping is visible
    for task in added.iter().take(2) {
        controller.toggle(task.id());
    }
}

fn print_guide() {
    let guide = r#"
=== TICKLIST GUIDE ===

Ticklist is a single-user task list that lives entirely in memory. There is
no file, no database and no network: a session starts empty (or seeded with
examples), and everything is gone when it ends. It is meant for the scratch
list you keep next to a terminal while working.

== HOW THE LIST BEHAVES ==

- Descriptions are trimmed and must be 1 to 200 characters after trimming.
- Tasks you have not finished always sort above completed ones; within each
  group the newest task comes first. Deleting never reshuffles the rest.
- Timestamps render relative to now ("Just now", "5 mins ago", "Yesterday")
  and fall back to a calendar date after a month.
- Completing a task is reversible. Toggle it again to reopen it.

== STARTING ==

  $ ticklist                       Start an interactive session (the default)
  $ ticklist session --example     Start with a few example tasks
  $ ticklist guide                 Show this guide
  $ ticklist completions <SHELL>   Generate shell completions
  $ ticklist <COMMAND> --help      Show help for a specific command

== SESSION COMMANDS ==

  add <description>    Add a task
  toggle <n>           Flip completion of the task at position <n>
  rm <n>               Delete the task at position <n> (asks first)
  list                 Show the tasks
  stats                Show totals and the completion percentage
  json                 Dump tasks and stats as JSON
  help                 Show the command list
  quit                 Leave the session

Positions are the numbers shown by 'list'. They shift as the list resorts,
so check 'list' before toggling or deleting.

== TIPS ==

- Keep descriptions short; the list is for remembering, not documenting.
- 'stats' is a quick way to see how the day is going.
- The JSON dump is handy for copying a session's state somewhere before
  quitting.
"#;

    println!("{}", guide);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validate_description;

    #[test]
    fn test_parse_add_passes_description_through() {
        assert_eq!(
            parse_session_command("add buy milk"),
            Ok(SessionCommand::Add("buy milk".to_string()))
        );
        assert_eq!(
            parse_session_command("  a   spaced   words  "),
            Ok(SessionCommand::Add("spaced   words".to_string()))
        );

        // Bare 'add' surfaces the description validation error downstream
        assert_eq!(
            parse_session_command("add"),
            Ok(SessionCommand::Add(String::new()))
        );
    }

    #[test]
    fn test_parse_positions() {
        assert_eq!(
            parse_session_command("toggle 2"),
            Ok(SessionCommand::Toggle(2))
        );
        assert_eq!(parse_session_command("t 1"), Ok(SessionCommand::Toggle(1)));
        assert_eq!(parse_session_command("rm 3"), Ok(SessionCommand::Delete(3)));
        assert_eq!(parse_session_command("d 4"), Ok(SessionCommand::Delete(4)));

        // Positions are 1-based and numeric
        assert!(parse_session_command("toggle 0").is_err());
        assert!(parse_session_command("toggle x").is_err());
        assert!(parse_session_command("rm").is_err());
    }

    #[test]
    fn test_parse_bare_commands_and_aliases() {
        for (line, expected) in [
            ("list", SessionCommand::List),
            ("ls", SessionCommand::List),
            ("stats", SessionCommand::Stats),
            ("json", SessionCommand::Json),
            ("help", SessionCommand::Help),
            ("?", SessionCommand::Help),
            ("quit", SessionCommand::Quit),
            ("exit", SessionCommand::Quit),
            ("q", SessionCommand::Quit),
        ] {
            assert_eq!(parse_session_command(line), Ok(expected));
        }
    }

    #[test]
    fn test_parse_unknown_command() {
        let error = parse_session_command("frobnicate").unwrap_err();
        assert!(error.contains("Unknown command"));
    }

    #[test]
    fn test_example_tasks_are_valid() {
        for description in EXAMPLE_TASKS.iter() {
            assert!(validate_description(description).is_ok());
        }
    }

    #[test]
    fn test_example_seed_marks_some_complete() {
        let controller = ListController::new(TaskList::default());
        create_example_tasks(&controller);

        let tasks = controller.tasks();
        assert_eq!(tasks.len(), EXAMPLE_TASKS.len());
        assert_eq!(controller.stats().completed, 2);

        // Completed examples group after the pending ones
        assert!(!tasks.first().unwrap().is_completed());
        assert!(tasks.last().unwrap().is_completed());
    }

    #[test]
    fn test_task_at_position_resolves_against_snapshot() {
        let controller = ListController::new(TaskList::default());
        controller.add("first").unwrap();
        controller.add("second").unwrap();

        let tasks = controller.tasks();
        assert_eq!(
            task_at_position(&controller, 1).unwrap().id(),
            tasks[0].id()
        );
        assert_eq!(
            task_at_position(&controller, 2).unwrap().id(),
            tasks[1].id()
        );

        let error = task_at_position(&controller, 3).unwrap_err();
        assert!(error.contains("No task at position 3"));
    }
}
