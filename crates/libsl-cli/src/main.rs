use clap::{Parser, Subcommand};
use colored::Colorize;
use libsl_core::{Completion, CompletionConfig, LibraryDecl};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// LibSL: library specification language CLI
///
/// Check, format, complete and hash LibSL specifications.
#[derive(Parser)]
#[command(name = "libsl", version, about, long_about = None)]
struct Cli {
    /// Only print requested output and errors
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Log parser and completion progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a specification and report errors
    Check {
        /// Path to .lsl file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a specification in canonical form
    Fmt {
        /// Path to .lsl file
        file: PathBuf,
        /// Rewrite the file in place
        #[arg(long)]
        write: bool,
    },

    /// Run the completion passes and print the result
    Complete {
        /// Path to .lsl file
        file: PathBuf,
        /// JSON file with conversion rules
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output the completed IR as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute semantic hash (SHA-256) of a specification
    Hash {
        /// Path to .lsl file
        file: PathBuf,
    },

    /// List the files a specification includes
    Includes {
        /// Path to .lsl file
        file: PathBuf,
        /// Directory include names are resolved against
        #[arg(long)]
        dir: PathBuf,
    },

    /// Show version information
    Version,
}

/// Exit code for LibSL errors (syntax, build, completion)
const EXIT_LIBSL: i32 = 1;
/// Exit code for I/O and usage errors
const EXIT_IO: i32 = 2;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check { file, json } => cmd_check(&file, json, cli.quiet),
        Commands::Fmt { file, write } => cmd_fmt(&file, write, cli.quiet),
        Commands::Complete { file, config, json } => {
            cmd_complete(&file, config.as_deref(), json)
        }
        Commands::Hash { file } => cmd_hash(&file),
        Commands::Includes { file, dir } => cmd_includes(&file, &dir),
        Commands::Version => {
            println!(
                "libsl {} (libsl-core {})",
                env!("CARGO_PKG_VERSION"),
                libsl_core::VERSION
            );
            Ok(())
        }
    };

    process::exit(match result {
        Ok(()) => 0,
        Err(code) => code,
    });
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ── Helpers ────────────────────────────────────────────────

fn report_error(message: impl std::fmt::Display) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

fn read_source(file: &Path) -> Result<String, i32> {
    std::fs::read_to_string(file).map_err(|e| {
        report_error(format!("cannot read {}: {}", file.display(), e));
        EXIT_IO
    })
}

fn load_library(file: &Path) -> Result<LibraryDecl, i32> {
    let source = read_source(file)?;
    libsl_core::parse(&source).map_err(|e| {
        report_error(format!("{}: {}", file.display(), e));
        EXIT_LIBSL
    })
}

fn load_completion(config: Option<&Path>) -> Result<Completion, i32> {
    let Some(path) = config else {
        return Ok(Completion::new());
    };
    let text = read_source(path)?;
    let config = CompletionConfig::from_json(&text).map_err(|e| {
        report_error(format!("invalid config {}: {}", path.display(), e));
        EXIT_IO
    })?;
    tracing::debug!(config = %path.display(), "loaded completion config");
    Ok(config.into_completion())
}

fn to_json(value: &LibraryDecl) -> Result<String, i32> {
    serde_json::to_string_pretty(value).map_err(|e| {
        report_error(format!("cannot serialize output: {}", e));
        EXIT_IO
    })
}

// ── Commands ───────────────────────────────────────────────
//
// Each command returns the process exit code on failure.

fn cmd_check(file: &Path, json: bool, quiet: bool) -> Result<(), i32> {
    let source = read_source(file)?;

    match libsl_core::parse(&source) {
        Ok(library) => {
            if json {
                let report = serde_json::json!({
                    "valid": true,
                    "library": library.name,
                    "types": library.types.len(),
                    "automata": library.automata.len(),
                    "functions": library.functions.len(),
                    "errors": 0,
                });
                println!("{}", report);
            } else if !quiet {
                println!(
                    "{} {} is valid (library {}: {} types, {} automata, {} functions)",
                    "✓".green().bold(),
                    file.display(),
                    library.name,
                    library.types.len(),
                    library.automata.len(),
                    library.functions.len()
                );
            }
            Ok(())
        }
        Err(e) => {
            if json {
                let report = serde_json::json!({
                    "valid": false,
                    "errors": 1,
                    "message": e.to_string(),
                });
                println!("{}", report);
            } else {
                report_error(format!("{}: {}", file.display(), e));
            }
            Err(EXIT_LIBSL)
        }
    }
}

fn cmd_fmt(file: &Path, write: bool, quiet: bool) -> Result<(), i32> {
    let library = load_library(file)?;
    let canonical = libsl_core::print(&library);
    if !write {
        print!("{}", canonical);
        return Ok(());
    }
    std::fs::write(file, &canonical).map_err(|e| {
        report_error(format!("cannot write {}: {}", file.display(), e));
        EXIT_IO
    })?;
    if !quiet {
        println!("{} formatted {}", "✓".green().bold(), file.display());
    }
    Ok(())
}

fn cmd_complete(file: &Path, config: Option<&Path>, json: bool) -> Result<(), i32> {
    let completion = load_completion(config)?;
    let library = load_library(file)?;
    let completed = completion.run(&library).map_err(|e| {
        report_error(format!("{}: {}", file.display(), e));
        EXIT_LIBSL
    })?;
    if json {
        println!("{}", to_json(&completed)?);
    } else {
        print!("{}", libsl_core::print(&completed));
    }
    Ok(())
}

fn cmd_hash(file: &Path) -> Result<(), i32> {
    let library = load_library(file)?;
    println!("{}", libsl_core::semantic_hash(&library));
    Ok(())
}

fn cmd_includes(file: &Path, dir: &Path) -> Result<(), i32> {
    let library = load_library(file)?;
    for path in library.include_paths(dir) {
        println!("{}", path.display());
    }
    Ok(())
}
