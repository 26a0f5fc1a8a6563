//! Binary entry point for the tugdecomp CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Render a parse tree produced for 3.6 bytecode
//! tugdecomp render tree.json --revision 3.6
//!
//! # Same, reading the tree from stdin and printing a JSON envelope
//! tugdecomp render - --revision 3.6 --format json < tree.json
//!
//! # Show which rules are active for a revision
//! tugdecomp rules --revision 3.5
//! ```

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use tugdecomp::cli::{run_render, run_rules, RenderArgs};
use tugdecomp_core::error::{DecompError, OutputErrorCode};
use tugdecomp_core::output::{emit_response, ErrorResponse};
use tugdecomp_core::Revision;

// ============================================================================
// CLI Structure
// ============================================================================

/// Render Python 3 bytecode parse trees back to source text.
#[derive(Parser, Debug)]
#[command(name = "tugdecomp", version, about = "Render bytecode parse trees as Python source")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Emit log lines as JSON objects.
    #[arg(long, global = true)]
    log_json: bool,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for the render command.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Format {
    /// Source text only.
    #[default]
    Text,
    /// JSON response envelope.
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a JSON parse tree to source text.
    Render {
        /// Tree file, or `-` for stdin.
        input: String,

        /// Dialect revision the bytecode came from (e.g. 3.6).
        #[arg(long)]
        revision: Option<Revision>,

        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: Format,

        /// Indentation written per block level.
        #[arg(long)]
        indent: Option<String>,

        /// Write compiler-generated code instead of hiding it.
        #[arg(long)]
        show_internal: bool,

        /// Keep every argument list on one line.
        #[arg(long)]
        no_line_breaks: bool,
    },

    /// List the rule and precedence tables for a revision.
    Rules {
        /// Dialect revision (e.g. 3.6).
        #[arg(long)]
        revision: Revision,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_json);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber on stderr. `RUST_LOG` wins over `--log-level`.
fn init_tracing(level: LogLevel, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), DecompError> {
    match cli.command {
        Command::Render {
            input,
            revision,
            format,
            indent,
            show_internal,
            no_line_breaks,
        } => {
            let args = RenderArgs {
                revision,
                indent_unit: indent,
                show_internal,
                no_line_breaks,
            };
            let response = run_render(&input, &args)?;
            let mut stdout = io::stdout();
            match format {
                Format::Text => write!(stdout, "{}", response.source),
                Format::Json => emit_response(&response, &mut stdout),
            }
            .map_err(|e| DecompError::internal(format!("failed to write output: {}", e)))?;
            let _ = stdout.flush();
            Ok(())
        }
        Command::Rules { revision } => {
            let response = run_rules(revision);
            emit_response(&response, &mut io::stdout())
                .map_err(|e| DecompError::internal(e.to_string()))?;
            let _ = io::stdout().flush();
            Ok(())
        }
    }
}
