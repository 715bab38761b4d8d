// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Kestrel - a tree-walking ECMAScript interpreter
//!
//! This is the main entry point for the kestrel CLI/REPL.
//!
//! ## Features
//!
//! - Runs files as modules (default) or classic scripts
//! - Evaluates inline code with `-e`
//! - Interactive REPL with highlighting and history

mod repl;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use kestrel_engine::{Engine, EngineConfig, Error, StdioHost};
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kestrel",
    about = "A tree-walking ECMAScript interpreter",
    version,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// JavaScript file to execute
    file: Option<PathBuf>,

    /// Evaluate code from the command line as a script
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,

    /// Run FILE as a classic script instead of a module
    #[arg(long)]
    script: bool,

    /// Nested calls allowed before a RangeError
    #[arg(long, value_name = "N")]
    max_call_depth: Option<usize>,

    /// Statements evaluated before giving up
    #[arg(long, value_name = "N")]
    step_budget: Option<u64>,

    /// Start the REPL after running FILE or --eval
    #[arg(short = 'i', long = "interactive", alias = "repl")]
    interactive: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if let Some(depth) = self.max_call_depth {
            config = config.with_max_call_depth(depth);
        }
        if let Some(steps) = self.step_budget {
            config = config.with_step_budget(steps);
        }
        config
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // RUST_LOG wins over the flag
    let default_filter = if cli.verbose {
        "kestrel=debug,kestrel_engine=debug"
    } else {
        "kestrel=warn,kestrel_engine=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    let mut engine = Engine::with_config(StdioHost, cli.config());
    let mut status = ExitCode::SUCCESS;

    if let Some(code) = &cli.eval {
        debug!(len = code.len(), "evaluating inline code");
        match engine.eval_script(code) {
            Ok(value) if !value.is_undefined() => println!("{}", engine.inspect(&value)),
            Ok(_) => {}
            Err(error) => {
                print_error(&error);
                status = ExitCode::FAILURE;
            }
        }
    } else if let Some(path) = &cli.file {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        debug!(path = %path.display(), script = cli.script, "running file");
        let result = if cli.script {
            engine.eval_script(&source).map(drop)
        } else {
            // The host already reported the failure
            engine.eval_module_source(&source)
        };
        if let Err(error) = result {
            if cli.script {
                print_error(&error);
            }
            status = ExitCode::FAILURE;
        }
    }

    if cli.interactive || (cli.eval.is_none() && cli.file.is_none()) {
        let mut repl = repl::Repl::new(engine).context("failed to initialize the REPL")?;
        repl.run().context("REPL error")?;
    }
    Ok(status)
}

/// Prints an engine error with its kind highlighted.
pub(crate) fn print_error(error: &Error) {
    let text = error.to_string();
    match text.split_once(':') {
        Some((kind, message)) => eprintln!("{}:{}", kind.red().bold(), message),
        None => eprintln!("{}", text.red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["kestrel", "--script", "--step-budget", "10", "main.js"]);
        assert!(cli.script);
        assert_eq!(cli.file, Some(PathBuf::from("main.js")));
        assert_eq!(cli.config().step_budget, Some(10));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["kestrel"]);
        assert!(cli.file.is_none());
        assert_eq!(cli.config(), EngineConfig::default());
    }
}
