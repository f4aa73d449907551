//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use nodecull_app::{RunOptions, run_app};
use nodecull_config::{DEFAULT_CONFIG_PATH, TEMPLATE, write_template};
use nodecull_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
use tracing::info;

use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, render_outcome};

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    if let Err(err) = init_telemetry(&cli) {
        eprintln!("error: {}", err.display_message());
        return err.exit_code();
    }

    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn init_telemetry(cli: &Cli) -> CliResult<()> {
    let config = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
        build_sha: build_sha(),
    };
    init_logging(&config).map_err(CliError::failure)
}

async fn dispatch(mut cli: Cli) -> CliResult<()> {
    match cli.command.take().unwrap_or(Command::Run) {
        Command::Run => {
            let outcome = run_app(&cli.run_options()).await?;
            render_outcome(&outcome, cli.output)
        }
        Command::Template(TemplateCommand::Show) => {
            print!("{TEMPLATE}");
            Ok(())
        }
        Command::Template(TemplateCommand::Create(args)) => {
            let path = args.path.unwrap_or(cli.config);
            write_template(&path).map_err(CliError::failure)?;
            info!(path = %path.display(), "template created");
            println!("configuration template written to {}", path.display());
            Ok(())
        }
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, nodecull_telemetry::TelemetryError> {
    value.parse()
}

#[derive(Parser)]
#[command(
    name = "nodecull",
    version,
    about = "Remove worker nodes from a cluster and decommission their cloud instances"
)]
struct Cli {
    #[arg(
        short = 'c',
        long,
        global = true,
        env = "NODECULL_CONFIG",
        default_value = DEFAULT_CONFIG_PATH,
        help = "Configuration file"
    )]
    config: PathBuf,
    #[arg(
        short = 'n',
        long,
        default_value_t = 1,
        help = "Nodes to remove when the configuration has no node-count"
    )]
    node_count: usize,
    #[arg(long, help = "Ask the provider to validate stop/delete without applying them")]
    dry_run: bool,
    #[arg(long, help = "Do not run the cluster-removal script")]
    skip_cluster_removal: bool,
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_LOG_LEVEL,
        help = "Log level; RUST_LOG takes precedence"
    )]
    log_level: String,
    #[arg(long, global = true, value_parser = parse_log_format, help = "Log format: pretty or json")]
    log_format: Option<LogFormat>,
    #[arg(
        long = "output",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Run summary format"
    )]
    output: OutputFormat,
    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            config_path: self.config.clone(),
            node_count: self.node_count,
            dry_run: self.dry_run,
            skip_cluster_removal: self.skip_cluster_removal,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Select and decommission nodes (default).
    Run,
    /// Inspect or write the configuration template.
    #[command(subcommand)]
    Template(TemplateCommand),
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// Print the template to stdout.
    Show,
    /// Write the template to a file.
    Create(TemplateCreateArgs),
}

#[derive(Args)]
struct TemplateCreateArgs {
    #[arg(long, help = "Destination; defaults to --config")]
    path: Option<PathBuf>,
}
