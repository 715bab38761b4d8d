// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Interactive REPL (Read-Eval-Print Loop) for Kestrel.
//!
//! Each entry is evaluated as a classic script against the same realm, so
//! `var`, `let` and function declarations persist between entries.

use std::borrow::Cow;
use std::path::PathBuf;

use kestrel_engine::Engine;
use owo_colors::OwoColorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Config, Editor, Helper};
use tracing::debug;

use crate::print_error;

/// REPL configuration constants
const HISTORY_FILE: &str = ".kestrel_history";
const MAX_HISTORY_SIZE: usize = 1000;

const KEYWORDS: &[&str] = &[
    "break", "case", "catch", "const", "continue", "debugger", "default", "delete", "do", "else",
    "finally", "for", "function", "if", "in", "instanceof", "let", "new", "return", "switch",
    "throw", "try", "typeof", "var", "void", "while", "with",
];

const LITERALS: &[&str] = &["true", "false", "null", "undefined", "NaN", "Infinity", "this"];

const BUILTINS: &[&str] = &[
    "Array", "Boolean", "console", "Error", "Function", "Number", "Object", "RangeError",
    "ReferenceError", "String", "Symbol", "SyntaxError", "TypeError", "globalThis",
];

/// REPL commands that can be executed with a dot prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Exit,
    Clear,
    Version,
    Load,
}

impl ReplCommand {
    /// Parse a REPL command from input string
    pub fn parse(input: &str) -> Option<(Self, Option<&str>)> {
        let rest = input.trim().strip_prefix('.')?;
        let mut parts = rest.splitn(2, char::is_whitespace);
        let command = parts.next()?.to_lowercase();
        let arg = parts.next().map(str::trim).filter(|arg| !arg.is_empty());

        let command = match command.as_str() {
            "help" | "h" | "?" => ReplCommand::Help,
            "exit" | "quit" | "q" => ReplCommand::Exit,
            "clear" | "cls" => ReplCommand::Clear,
            "version" | "v" => ReplCommand::Version,
            "load" | "l" => ReplCommand::Load,
            _ => return None,
        };
        Some((command, arg))
    }

    /// All available commands for help and completion
    pub fn all_commands() -> &'static [(&'static str, &'static str)] {
        &[
            (".help", "Show this help message"),
            (".exit", "Exit the REPL"),
            (".clear", "Clear the screen"),
            (".version", "Show version information"),
            (".load <file>", "Run a file as a script in this session"),
        ]
    }
}

/// rustyline helper providing completion, hints, highlighting and
/// multi-line validation
struct KestrelHelper {
    words: Vec<&'static str>,
}

impl KestrelHelper {
    fn new() -> Self {
        let commands = [".help", ".exit", ".clear", ".version", ".load", "console.log"];
        let words = KEYWORDS
            .iter()
            .chain(LITERALS)
            .chain(BUILTINS)
            .chain(commands.iter())
            .copied()
            .collect();
        Self { words }
    }

    /// Start of the identifier-ish word ending at `pos`.
    fn word_start(line: &str, pos: usize) -> usize {
        line[..pos]
            .rfind(|c: char| !c.is_alphanumeric() && c != '_' && c != '.')
            .map_or(0, |i| i + 1)
    }
}

impl Completer for KestrelHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let word = &line[Self::word_start(line, pos)..pos];
        if word.is_empty() {
            return Ok((pos, Vec::new()));
        }
        let matches = self
            .words
            .iter()
            .filter(|candidate| candidate.starts_with(word))
            .map(|candidate| Pair {
                display: candidate.to_string(),
                replacement: candidate[word.len()..].to_string(),
            })
            .collect();
        Ok((pos, matches))
    }
}

impl Hinter for KestrelHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if pos < line.len() {
            return None;
        }
        let word = &line[Self::word_start(line, pos)..];
        if word.len() < 2 {
            return None;
        }
        self.words
            .iter()
            .find(|candidate| candidate.starts_with(word) && candidate.len() > word.len())
            .map(|candidate| (&candidate[word.len()..]).dimmed().to_string())
    }
}

impl Highlighter for KestrelHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let mut result = String::with_capacity(line.len() * 2);
        let mut word = String::new();
        for c in line.chars() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                word.push(c);
                continue;
            }
            if !word.is_empty() {
                result.push_str(&highlight_word(&word));
                word.clear();
            }
            let colored = match c {
                '(' | ')' | '[' | ']' | '{' | '}' => c.yellow().to_string(),
                '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' | '!' | '&' | '|' | '^' => c.cyan().to_string(),
                '"' | '\'' | '`' => c.green().to_string(),
                _ => c.to_string(),
            };
            result.push_str(&colored);
        }
        if !word.is_empty() {
            result.push_str(&highlight_word(&word));
        }
        Cow::Owned(result)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn highlight_word(word: &str) -> String {
    if KEYWORDS.contains(&word) {
        word.magenta().bold().to_string()
    } else if LITERALS.contains(&word) {
        word.blue().to_string()
    } else if BUILTINS.contains(&word) {
        word.cyan().to_string()
    } else if word.chars().all(|c| c.is_ascii_digit()) {
        word.yellow().to_string()
    } else {
        word.to_string()
    }
}

impl Validator for KestrelHelper {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        let input = ctx.input();
        if !is_balanced(input) {
            return Ok(ValidationResult::Incomplete);
        }
        // A trailing operator or separator expects more input
        let trimmed = input.trim_end();
        if trimmed.ends_with(['\\', '+', '-', '*', '/', '=', ',']) {
            return Ok(ValidationResult::Incomplete);
        }
        Ok(ValidationResult::Valid(None))
    }
}

/// Whether brackets, braces and parentheses are closed outside string
/// literals. A mismatched closer counts as balanced so the parser reports
/// it.
fn is_balanced(input: &str) -> bool {
    let mut stack = Vec::new();
    let mut quote = None;
    let mut escaped = false;

    for c in input.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            Some(_) if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' | '`' => quote = Some(c),
                '(' => stack.push(')'),
                '[' => stack.push(']'),
                '{' => stack.push('}'),
                ')' | ']' | '}' => {
                    if stack.pop() != Some(c) {
                        return true;
                    }
                }
                _ => {}
            },
        }
    }
    stack.is_empty() && quote.is_none()
}

impl Helper for KestrelHelper {}

/// The interactive REPL
pub struct Repl {
    engine: Engine,
    editor: Editor<KestrelHelper, DefaultHistory>,
    history_path: PathBuf,
}

impl Repl {
    /// Wraps an engine, keeping whatever a file or `--eval` already
    /// declared.
    pub fn new(engine: Engine) -> rustyline::Result<Self> {
        let config = Config::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .max_history_size(MAX_HISTORY_SIZE)?
            .auto_add_history(true)
            .build();

        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(KestrelHelper::new()));

        let history_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kestrel")
            .join(HISTORY_FILE);
        if let Some(parent) = history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if editor.load_history(&history_path).is_err() {
            debug!(path = %history_path.display(), "no REPL history loaded");
        }

        Ok(Self {
            engine,
            editor,
            history_path,
        })
    }

    /// Runs the REPL main loop until `.exit` or end of input.
    pub fn run(&mut self) -> rustyline::Result<()> {
        self.print_banner();

        loop {
            let prompt = format!("{} ", "kestrel>".bright_green().bold());
            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if let Some((command, arg)) = ReplCommand::parse(trimmed) {
                        match self.execute_command(command, arg) {
                            CommandResult::Continue => continue,
                            CommandResult::Exit => break,
                        }
                    }
                    self.eval_and_print(trimmed);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C".dimmed());
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "^D".dimmed());
                    break;
                }
                Err(err) => {
                    eprintln!("{}: {err:?}", "Error".red().bold());
                    break;
                }
            }
        }

        if let Err(error) = self.editor.save_history(&self.history_path) {
            debug!(%error, "failed to save REPL history");
        }
        Ok(())
    }

    fn print_banner(&self) {
        println!();
        println!(
            "  {} {} {}",
            "Kestrel".white().bold(),
            "v".dimmed(),
            env!("CARGO_PKG_VERSION").bright_yellow()
        );
        println!(
            "  {} {} {}",
            "Type".dimmed(),
            ".help".cyan(),
            "for available commands".dimmed()
        );
        println!();
    }

    fn execute_command(&mut self, command: ReplCommand, arg: Option<&str>) -> CommandResult {
        match command {
            ReplCommand::Help => self.print_help(),
            ReplCommand::Exit => return CommandResult::Exit,
            ReplCommand::Clear => print!("\x1B[2J\x1B[H"),
            ReplCommand::Version => {
                println!("{}: {}", "Kestrel".bright_cyan().bold(), env!("CARGO_PKG_VERSION").yellow());
            }
            ReplCommand::Load => match arg {
                Some(path) => self.load_file(path),
                None => eprintln!(
                    "{}: {} {}",
                    "Error".red().bold(),
                    ".load".cyan(),
                    "requires a file path".dimmed()
                ),
            },
        }
        CommandResult::Continue
    }

    fn print_help(&self) {
        println!();
        println!("{}", "REPL Commands:".white().bold());
        println!();
        for (command, description) in ReplCommand::all_commands() {
            println!("  {:16} {}", command.cyan(), description.dimmed());
        }
        println!();
        println!("{}", "Keyboard Shortcuts:".white().bold());
        println!();
        println!("  {:16} {}", "Ctrl+C".yellow(), "Cancel current input".dimmed());
        println!("  {:16} {}", "Ctrl+D".yellow(), "Exit REPL".dimmed());
        println!("  {:16} {}", "Tab".yellow(), "Autocomplete".dimmed());
        println!();
    }

    fn load_file(&mut self, path: &str) {
        match std::fs::read_to_string(path) {
            Ok(source) => self.eval_and_print(&source),
            Err(error) => eprintln!("{}: {path}: {error}", "Error".red().bold()),
        }
    }

    fn eval_and_print(&mut self, input: &str) {
        match self.engine.eval_script(input) {
            Ok(value) => println!("{}", self.engine.inspect(&value).dimmed()),
            Err(error) => print_error(&error),
        }
    }
}

/// Result of executing a REPL command
enum CommandResult {
    Continue,
    Exit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repl_command_parse() {
        assert_eq!(ReplCommand::parse(".help"), Some((ReplCommand::Help, None)));
        assert_eq!(ReplCommand::parse(".q"), Some((ReplCommand::Exit, None)));
        assert_eq!(
            ReplCommand::parse(".load test.js"),
            Some((ReplCommand::Load, Some("test.js")))
        );
        assert_eq!(ReplCommand::parse(".bogus"), None);
        assert_eq!(ReplCommand::parse("not a command"), None);
    }

    #[test]
    fn test_is_balanced() {
        assert!(is_balanced("(1 + 2)"));
        assert!(is_balanced("{ a: 1 }"));
        assert!(is_balanced("function f() { return 1; }"));
        assert!(!is_balanced("(1 + 2"));
        assert!(!is_balanced("{ a: 1"));
        assert!(is_balanced("'string with (unbalanced'"));
        assert!(is_balanced("'escaped \\' quote'"));
    }

    #[test]
    fn test_completion_words() {
        let helper = KestrelHelper::new();
        assert!(helper.words.contains(&"console.log"));
        assert!(helper.words.contains(&"typeof"));
    }
}
