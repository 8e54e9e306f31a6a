//! Scholar Advisor - Entry Point
//!
//! One-shot analysis, a stdio session, or the HTTP API.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use scholar_advisor::{
    Advisor, AdvisorRequest, Config, SessionCache,
    fetcher::cancel_pair,
    formatters,
    models::{CareerStage, EducationLevel, ResponseFormat},
    server::AdvisorServer,
};

#[derive(Parser, Debug)]
#[command(name = "scholar-advisor")]
#[command(about = "Academic career advisor backed by scholar profiles and an LLM")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Profile source API key (optional, enables higher rate limits)
    #[arg(long, env = "SCHOLAR_API_KEY", global = true)]
    scholar_api_key: Option<String>,

    /// Generation API key
    #[arg(long, env = "GEMINI_API_KEY", global = true, hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Maximum fetch attempts per request
    #[arg(long, global = true)]
    max_attempts: Option<u32>,

    /// Lower backoff bound in milliseconds
    #[arg(long, global = true)]
    backoff_min_ms: Option<u64>,

    /// Upper backoff bound in milliseconds
    #[arg(long, global = true)]
    backoff_max_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one profile and print the result
    Analyze(AnalyzeArgs),
    /// Read JSON requests line by line from stdin, sharing one session
    Session,
    /// Serve the HTTP API
    Serve {
        /// HTTP server port
        #[arg(long, default_value = "8000", env = "PORT")]
        port: u16,
    },
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Profile URL, scholar ID, or author name
    identifier: String,

    /// Current functional rank
    #[arg(long, value_enum, default_value_t = CareerStage::default())]
    career_stage: CareerStage,

    /// Highest completed degree
    #[arg(long, value_enum, default_value_t = EducationLevel::default())]
    education: EducationLevel,

    /// Discipline or study program
    #[arg(long, default_value = "")]
    discipline: String,

    /// Treat the input as an author name
    #[arg(long)]
    by_name: bool,

    /// Only fetch the profile, skip narrative generation
    #[arg(long)]
    profile_only: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = ResponseFormat::default())]
    format: ResponseFormat,
}

impl AnalyzeArgs {
    fn to_request(&self) -> AdvisorRequest {
        AdvisorRequest {
            raw_identifier: self.identifier.clone(),
            career_stage: self.career_stage,
            education_level: self.education,
            discipline: self.discipline.clone(),
            search_by_name: self.by_name,
            response_format: self.format,
        }
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays clean for results.
    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn build_config(args: &GlobalArgs) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;

    if args.scholar_api_key.is_some() {
        config.set_scholar_api_key(args.scholar_api_key.clone());
    }
    if args.gemini_api_key.is_some() {
        config.generation_api_key.clone_from(&args.gemini_api_key);
    }
    if let Some(attempts) = args.max_attempts {
        config.max_attempts = attempts;
    }
    if let Some(ms) = args.backoff_min_ms {
        config.backoff_min = Duration::from_millis(ms);
    }
    if let Some(ms) = args.backoff_max_ms {
        config.backoff_max = Duration::from_millis(ms);
    }

    config.validate()?;
    Ok(config)
}

async fn run_analyze(advisor: &Advisor, args: &AnalyzeArgs) -> ExitCode {
    let request = args.to_request();
    let mut session = SessionCache::new();

    let (handle, cancel) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling");
            handle.cancel();
        }
    });

    let output = if args.profile_only {
        advisor.profile(&request, &mut session, cancel).await.map(|lookup| {
            if request.response_format.is_json() {
                formatters::lookup_json(&lookup).to_string()
            } else {
                formatters::format_profile_markdown(&lookup.record)
            }
        })
    } else {
        advisor.analyze(&request, &mut session, cancel).await.map(|analysis| {
            if request.response_format.is_json() {
                formatters::analysis_json(&analysis).to_string()
            } else {
                formatters::format_analysis_markdown(&analysis)
            }
        })
    };

    match output {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(kind = e.kind(), error = %e, "Analysis failed");
            if request.response_format.is_json() {
                println!("{}", formatters::error_json(&e));
            } else {
                eprint!("{}", formatters::format_error_markdown(&e));
            }
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_tracing(&cli.global.log_level, cli.global.json_logs);

    let config = build_config(&cli.global)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        command = ?cli.command,
        ?config,
        "Starting scholar advisor"
    );

    let advisor = Advisor::from_config(&config)?;

    match cli.command {
        Command::Analyze(args) => return Ok(run_analyze(&advisor, &args).await),
        Command::Session => AdvisorServer::new(advisor).run_stdio().await?,
        Command::Serve { port } => AdvisorServer::new(advisor).run_http(port).await?,
    }

    Ok(ExitCode::SUCCESS)
}
