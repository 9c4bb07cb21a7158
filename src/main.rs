use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use clap::{ArgAction, Parser, Subcommand};
use flowtime::commands::metrics::{self, BoundSide, FilteredArgs};
use flowtime::config::WorkflowConfig;
use flowtime::metrics::PeriodSelection;
use flowtime::output::Format;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LONG_VERSION: LazyLock<String> = LazyLock::new(flowtime::build_info::long_version);

#[derive(Parser)]
#[command(
    name = "flowtime",
    version,
    long_version = LONG_VERSION.as_str(),
    about = "Time-in-status and lead-time metrics from Jira changelogs"
)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: Format,
    /// Shorthand for --format pretty
    #[arg(long, global = true, hide = true)]
    pretty: bool,
    /// Workflow config (YAML); defaults to $FLOWTIME_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Evaluation instant for issues still in a status (default: now)
    #[arg(long, global = true)]
    as_of: Option<String>,
    /// Increase log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Metrics for a single ticket
    Ticket {
        /// Issue key, e.g. ABC-123
        key: String,
        /// JSON file or directory of exported issues
        #[arg(long)]
        source: PathBuf,
    },
    /// Metrics for project tickets completed in the last N days
    Project {
        /// Project key, e.g. ABC
        project: String,
        /// JSON file or directory of exported issues
        #[arg(long)]
        source: PathBuf,
        /// Look-back window in days
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// Project metrics narrowed by assignee, type and dates, with period breakdown
    Filtered {
        /// Project key, e.g. ABC
        project: String,
        /// JSON file or directory of exported issues
        #[arg(long)]
        source: PathBuf,
        /// Filter by assignee display name
        #[arg(long)]
        assignee: Option<String>,
        /// Filter by issue type (e.g. Bug, Story, Task)
        #[arg(long)]
        issue_type: Option<String>,
        /// Start date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        start: Option<String>,
        /// End date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        end: Option<String>,
        /// Period breakdown to include
        #[arg(long, value_enum, default_value = "all")]
        period: PeriodSelection,
    },
}

fn init_logging(verbose: u8) {
    let default_directive = match verbose {
        0 => "flowtime=warn",
        1 => "flowtime=info",
        _ => "flowtime=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn resolve_as_of(
    value: Option<&str>,
    workflow: &WorkflowConfig,
) -> flowtime::error::Result<DateTime<Utc>> {
    match value {
        Some(value) => {
            let offset = workflow.offset()?;
            Ok(metrics::parse_bound(value, offset, BoundSide::Start)?.with_timezone(&Utc))
        }
        None => Ok(Utc::now()),
    }
}

fn run(cli: Cli, format: Format) -> flowtime::error::Result<()> {
    let workflow = WorkflowConfig::load(cli.config.as_deref())?;
    let as_of = resolve_as_of(cli.as_of.as_deref(), &workflow)?;

    match cli.command {
        Commands::Ticket { key, source } => {
            metrics::ticket(&source, &key, &workflow, as_of, format)
        }
        Commands::Project {
            project,
            source,
            days,
        } => metrics::project(&source, &project, days, &workflow, as_of, format),
        Commands::Filtered {
            project,
            source,
            assignee,
            issue_type,
            start,
            end,
            period,
        } => metrics::filtered(
            &source,
            FilteredArgs {
                project,
                assignee,
                issue_type,
                start,
                end,
                period,
            },
            &workflow,
            as_of,
            format,
        ),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let format = if cli.pretty {
        Format::Pretty
    } else {
        cli.format
    };
    if let Err(e) = run(cli, format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
