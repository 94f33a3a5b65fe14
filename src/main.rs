//! CLI for inspecting project scripts and testing glob patterns.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use shipper::{Error, Glob, Project, ProjectError, parse, resolve};
use tracing_subscriber::EnvFilter;

/// Build orchestration driven by project scripts
#[derive(Parser, Debug)]
#[command(name = "shipper", version, about)]
struct Cli {
    /// Enable debug logging (overridden by `SHIPPER_LOG`)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a project script and print it back
    Check {
        /// Path to the project script
        script: PathBuf,
    },
    /// List the files a project selects
    Files {
        /// Path to the project script
        script: PathBuf,
    },
    /// Test paths against a glob pattern
    Glob {
        pattern: String,
        #[arg(required = true)]
        paths: Vec<String>,
        /// Require the whole path to be matched
        #[arg(short, long)]
        strict: bool,
    },
    /// Normalize a path against a base directory
    Resolve {
        path: String,
        /// Base directory (default: current directory)
        #[arg(short, long)]
        base: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Check { script } => check(&script),
        Command::Files { script } => files(&script),
        Command::Glob {
            pattern,
            paths,
            strict,
        } => glob(&pattern, &paths, strict),
        Command::Resolve { path, base } => resolve_path(&path, base.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("SHIPPER_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn check(script: &Path) -> Result<(), String> {
    let text =
        fs::read_to_string(script).map_err(|e| format!("{}: {e}", script.display()))?;
    match parse(&text) {
        Ok(document) => {
            print!("{document}");
            Ok(())
        }
        Err(e) => {
            let rendered = Error::from(e.clone()).render(&text);
            Err(format!("{}: {e}\n{rendered}", script.display()))
        }
    }
}

fn files(script: &Path) -> Result<(), String> {
    let project = Project::load(script).map_err(|e| describe(&e))?;
    for file in project.header_files().map_err(|e| describe(&e))? {
        println!("{file}");
    }
    Ok(())
}

fn describe(error: &ProjectError) -> String {
    match error {
        ProjectError::Glob { source, .. } => {
            format!("{error}\n{}", Error::from(source.clone()).render(""))
        }
        _ => error.to_string(),
    }
}

fn glob(pattern: &str, paths: &[String], strict: bool) -> Result<(), String> {
    let glob = Glob::new(pattern).map_err(|e| {
        let rendered = Error::from(e.clone()).render(pattern);
        format!("{e}\n{rendered}")
    })?;
    for path in paths {
        let verdict = if glob.test(path, strict) {
            "match"
        } else {
            "no match"
        };
        println!("{path}: {verdict}");
    }
    Ok(())
}

fn resolve_path(path: &str, base: Option<&str>) -> Result<(), String> {
    let base = match base {
        Some(base) => base.to_string(),
        None => std::env::current_dir()
            .map_err(|e| format!("cannot read the working directory: {e}"))?
            .to_string_lossy()
            .into_owned(),
    };
    println!("{}", resolve(path, &resolve(&base, "")));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_glob_command() {
        let cli = Cli::parse_from(["shipper", "glob", "--strict", "*.h", "a.h", "b.c"]);
        assert!(matches!(
            cli.command,
            Command::Glob { ref paths, strict: true, .. } if paths.len() == 2
        ));
    }

    #[test]
    fn parse_verbose_anywhere() {
        let cli = Cli::parse_from(["shipper", "check", "project.ship", "-v"]);
        assert!(cli.verbose);
    }
}
