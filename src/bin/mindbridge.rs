//! MindBridge CLI - Command-line interface for MindBridge Risk
//!
//! Commands:
//! - score: Compute live risk factors for a session
//! - report: Build the analysis report for a finished session
//! - alerts: Generate therapist alerts for a list of sessions
//! - patients: Summarize risk history per patient
//! - severity: Classify a bare risk score
//! - config: Print the effective configuration

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use mindbridge_risk::pipeline::{parse_session, parse_sessions, RiskProcessor};
use mindbridge_risk::report::SessionReport;
use mindbridge_risk::severity::{classify_severity, RiskLevel};
use mindbridge_risk::trends::summarize_patients;
use mindbridge_risk::{generate_alerts_with_config, RiskConfig, RiskError};
use mindbridge_risk::{ENGINE_VERSION, PRODUCER_NAME};
use tracing::{debug, warn};

/// MindBridge - Risk scoring and alerting for monitoring sessions
#[derive(Parser)]
#[command(name = "mindbridge")]
#[command(author = "MindBridge")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score monitoring sessions and raise therapist alerts", long_about = None)]
struct Cli {
    /// Configuration file (JSON); defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute live risk factors for a session
    Score {
        /// Session file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
    },

    /// Build the analysis report for a finished session
    Report {
        /// Session file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
    },

    /// Generate therapist alerts for a list of sessions
    Alerts {
        /// Sessions file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Only print critical alerts
        #[arg(long)]
        critical_only: bool,
    },

    /// Summarize risk history per patient
    Patients {
        /// Sessions file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,
    },

    /// Classify a risk score on both severity ladders
    Severity {
        /// Risk score (0-100)
        score: f64,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), MindbridgeCliError> {
    let config = load_config(cli.config.as_deref())?;
    let processor = RiskProcessor::with_config(config)?;
    let pretty = cli.pretty;

    match cli.command {
        Commands::Score { input } => {
            let session = parse_session(&read_input(&input)?)?;
            let factors = processor.score_session(&session);
            print_value(
                &serde_json::json!({
                    "sessionId": session.id,
                    "patientId": session.patient_id,
                    "riskFactors": factors,
                    "riskLevel": RiskLevel::from_score(factors.overall_risk),
                }),
                pretty,
            )
        }

        Commands::Report { input } => {
            let session = parse_session(&read_input(&input)?)?;
            if !session.is_ended() {
                warn!(session_id = %session.id, "reporting on a session that has not ended");
            }
            print_value(&SessionReport::build(&session), pretty)
        }

        Commands::Alerts {
            input,
            critical_only,
        } => {
            let sessions = parse_sessions(&read_input(&input)?)?;
            let mut alerts = generate_alerts_with_config(&sessions, processor.config());
            if critical_only {
                alerts.retain(|a| a.severity == mindbridge_risk::AlertSeverity::Critical);
            }
            debug!(alerts = alerts.len(), "alerts ready");
            print_value(&alerts, pretty)
        }

        Commands::Patients { input } => {
            let sessions = parse_sessions(&read_input(&input)?)?;
            print_value(&summarize_patients(&sessions), pretty)
        }

        Commands::Severity { score } => {
            if !(0.0..=100.0).contains(&score) {
                return Err(MindbridgeCliError::ScoreOutOfRange(score));
            }
            print_value(
                &serde_json::json!({
                    "score": score,
                    "severity": classify_severity(score),
                    "riskLevel": RiskLevel::from_score(score),
                }),
                pretty,
            )
        }

        Commands::Config => {
            println!("{}", processor.config().to_json()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<RiskConfig, MindbridgeCliError> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            debug!(path = %path.display(), "loaded configuration");
            Ok(RiskConfig::from_json(&json)?)
        }
        None => Ok(RiskConfig::default()),
    }
}

fn read_input(input: &Path) -> Result<String, MindbridgeCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            warn!("reading sessions from an interactive terminal; end input with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn print_value<T: serde::Serialize>(value: &T, pretty: bool) -> Result<(), MindbridgeCliError> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", output);
    Ok(())
}

#[derive(Debug)]
enum MindbridgeCliError {
    Io(io::Error),
    Risk(RiskError),
    Json(serde_json::Error),
    ScoreOutOfRange(f64),
}

impl From<io::Error> for MindbridgeCliError {
    fn from(e: io::Error) -> Self {
        MindbridgeCliError::Io(e)
    }
}

impl From<RiskError> for MindbridgeCliError {
    fn from(e: RiskError) -> Self {
        MindbridgeCliError::Risk(e)
    }
}

impl From<serde_json::Error> for MindbridgeCliError {
    fn from(e: serde_json::Error) -> Self {
        MindbridgeCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    producer: &'static str,
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MindbridgeCliError> for CliError {
    fn from(e: MindbridgeCliError) -> Self {
        let (code, message, hint) = match e {
            MindbridgeCliError::Io(e) => (
                "IO_ERROR",
                e.to_string(),
                Some("Check file paths and permissions"),
            ),
            MindbridgeCliError::Risk(RiskError::InvalidConfig(msg)) => (
                "CONFIG_ERROR",
                msg,
                Some("Run 'mindbridge config' to see valid defaults"),
            ),
            MindbridgeCliError::Risk(e @ RiskError::JsonError(_)) => {
                ("JSON_ERROR", e.to_string(), Some("Check JSON syntax"))
            }
            MindbridgeCliError::Risk(e) => (
                "INPUT_ERROR",
                e.to_string(),
                Some("Ensure input matches the persisted session shape"),
            ),
            MindbridgeCliError::Json(e) => ("JSON_ERROR", e.to_string(), None),
            MindbridgeCliError::ScoreOutOfRange(score) => (
                "SCORE_OUT_OF_RANGE",
                format!("Risk score {} is outside [0, 100]", score),
                None,
            ),
        };

        CliError {
            producer: PRODUCER_NAME,
            code: code.to_string(),
            message,
            hint: hint.map(str::to_string),
        }
    }
}
