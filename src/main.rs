use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docdrift::DriftError;
use docdrift::cli::InputOverrides;
use docdrift::cli::commands::{self, analyze::AnalyzeOptions};
use docdrift::report::ReportFormat;

/// Exit status when drift was found and `--fail-on-drift` is set
const EXIT_DRIFT: u8 = 2;

#[derive(Parser)]
#[command(name = "docdrift")]
#[command(
    version,
    about = "Detect drift between source code and its layered documentation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Explicit config file (TOML)")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

/// Input trees and aggregation flags shared by analysis commands
#[derive(Args, Debug, Clone, Default)]
struct InputArgs {
    #[arg(long, short, help = "Source code root")]
    source: Option<PathBuf>,
    #[arg(long, help = "Project-level documentation root")]
    project_docs: Option<PathBuf>,
    #[arg(long, help = "Component-level documentation root")]
    component_docs: Option<PathBuf>,
    #[arg(long, help = "Organization-level documentation root")]
    org_docs: Option<PathBuf>,
    #[arg(long, help = "Root that displayed paths are made relative to")]
    display_root: Option<PathBuf>,
    #[arg(long, help = "Prompt template file (Markdown with {{markers}})")]
    template: Option<PathBuf>,
    #[arg(long = "exclude", short = 'x', help = "Extra glob to skip (repeatable)")]
    exclude: Vec<String>,
    #[arg(long, help = "Skip checking that findings reference walked files")]
    no_reference_check: bool,
}

impl From<InputArgs> for InputOverrides {
    fn from(args: InputArgs) -> Self {
        Self {
            source: args.source,
            project_docs: args.project_docs,
            component_docs: args.component_docs,
            org_docs: args.org_docs,
            display_root: args.display_root,
            template: args.template,
            exclude: args.exclude,
            no_reference_check: args.no_reference_check,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze code and documentation for drift
    Analyze {
        #[command(flatten)]
        inputs: InputArgs,
        #[arg(long, short, help = "Model override")]
        model: Option<String>,
        #[arg(long, short, help = "Save the report to a file")]
        output: Option<PathBuf>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            value_parser = parse_format,
            help = "Report format: text, json, yaml"
        )]
        format: ReportFormat,
        #[arg(long, help = "Save the engine's raw answer before validation")]
        raw_output: Option<PathBuf>,
        #[arg(long, help = "Do not retry transient engine failures")]
        no_retry: bool,
        #[arg(long, help = "Exit with status 2 when drift is found")]
        fail_on_drift: bool,
    },

    /// Print the assembled prompt without calling the engine
    Prompt {
        #[command(flatten)]
        inputs: InputArgs,
        #[arg(long, short, help = "Write the prompt to a file")]
        output: Option<PathBuf>,
    },

    /// Check a saved engine answer against the result contract
    Validate {
        #[arg(help = "File holding the engine's answer")]
        answer: PathBuf,
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json, yaml"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

fn parse_format(s: &str) -> Result<ReportFormat, String> {
    s.parse()
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mdocdrift encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<DriftError>() {
                Some(drift) => eprintln!("\x1b[31mError [{}]:\x1b[0m {}", drift.class(), drift),
                None => eprintln!("\x1b[31mError:\x1b[0m {}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "docdrift=debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Analyze {
            inputs,
            model,
            output,
            format,
            raw_output,
            no_retry,
            fail_on_drift,
        } => {
            let options = AnalyzeOptions {
                inputs: inputs.into(),
                model,
                output,
                format,
                raw_output,
                no_retry,
            };
            let rt = Runtime::new()?;
            let drifted = rt.block_on(commands::analyze::run(config_path, options))?;
            if drifted && fail_on_drift {
                return Ok(ExitCode::from(EXIT_DRIFT));
            }
        }
        Commands::Prompt { inputs, output } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::prompt::run(config_path, &inputs.into(), output))?;
        }
        Commands::Validate { answer, inputs } => {
            let rt = Runtime::new()?;
            rt.block_on(commands::validate::run(config_path, &answer, &inputs.into()))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => commands::config::show(config_path, &format)?,
            ConfigAction::Path => commands::config::path()?,
            ConfigAction::Init { global, force } => commands::config::init(global, force)?,
        },
    }

    Ok(ExitCode::SUCCESS)
}
