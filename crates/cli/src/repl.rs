//! Interactive session.
//!
//! Each line is `<op> <kind> [args...]`, split with shell quoting rules so
//! JSON attributes can be wrapped in single quotes:
//!
//! ```text
//! sportsdb> create sport '{"name": "Football", "active": true}'
//! sportsdb> filter sport regex:^Foot AND events:>=1
//! ```

use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sportsdb_executor::Executor;
use tracing::warn;

const PROMPT: &str = "sportsdb> ";
const HISTORY_FILE: &str = ".sportsdb_history";

const HELP: &str = "\
Operations:
  create <kind> '<json attrs>'
  update <kind> <id> '<json attrs>'
  get <kind> <id>
  deactivate <kind> <id>
  activate <kind> <id>
  filter <kind> [clause AND clause ...]

Kinds: sport, event, selection
Filter clauses: regex:<pattern>, <collection>:<op><n> with op one of << <= >> >= ==
Type 'help' for this text, 'exit' or Ctrl-D to leave.";

/// What a line asks the session to do.
#[derive(Debug, PartialEq)]
enum Line {
    Empty,
    Help,
    Exit,
    Run {
        op: String,
        kind: String,
        args: Vec<String>,
    },
    Invalid(String),
}

fn parse_line(line: &str) -> Line {
    let Some(words) = shlex::split(line) else {
        return Line::Invalid("unbalanced quotes".into());
    };
    let mut words = words.into_iter();
    let Some(op) = words.next() else {
        return Line::Empty;
    };
    match op.to_ascii_lowercase().as_str() {
        "help" | "?" => return Line::Help,
        "exit" | "quit" => return Line::Exit,
        _ => {}
    }
    match words.next() {
        Some(kind) => Line::Run {
            op,
            kind,
            args: words.collect(),
        },
        None => Line::Invalid(format!("missing entity kind after '{}'", op)),
    }
}

fn history_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(HISTORY_FILE))
}

/// Run the read-eval-print loop until EOF or `exit`.
pub fn run(executor: &Executor) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let history = history_path();
    if let Some(path) = &history {
        // Missing on first run.
        let _ = editor.load_history(path);
    }

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        if !line.trim().is_empty() {
            editor.add_history_entry(line.as_str())?;
        }

        match parse_line(&line) {
            Line::Empty => {}
            Line::Help => println!("{}", HELP),
            Line::Exit => break,
            Line::Invalid(reason) => eprintln!("error: {}", reason),
            Line::Run { op, kind, args } => {
                crate::print_outcome(crate::execute(executor, &op, &kind, &args));
            }
        }
    }

    if let Some(path) = &history {
        if let Err(e) = editor.save_history(path) {
            warn!(path = %path.display(), error = %e, "Could not save history");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_line() {
        assert_eq!(
            parse_line(r#"create sport '{"name": "Rugby League"}'"#),
            Line::Run {
                op: "create".into(),
                kind: "sport".into(),
                args: vec![r#"{"name": "Rugby League"}"#.into()],
            }
        );
        assert_eq!(
            parse_line("filter event regex:^Final AND selections:>=2"),
            Line::Run {
                op: "filter".into(),
                kind: "event".into(),
                args: vec!["regex:^Final".into(), "AND".into(), "selections:>=2".into()],
            }
        );
    }

    #[test]
    fn test_parse_control_lines() {
        assert_eq!(parse_line("   "), Line::Empty);
        assert_eq!(parse_line("HELP"), Line::Help);
        assert_eq!(parse_line("quit"), Line::Exit);
        assert!(matches!(parse_line("get"), Line::Invalid(_)));
        assert!(matches!(parse_line("create sport '{\"name\""), Line::Invalid(_)));
    }
}
