use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::BufReader;

use eq_cli::{draft::load_draft, run_session, telemetry, HostOutcome};
use eq_core::{SessionConfig, VerificationSession};
use eq_infra::create_transport;
use eq_shared::AppConfig;

#[derive(Parser)]
#[command(name = "enquiry")]
#[command(about = "Verify a phone number and submit an enquiry")]
#[command(version)]
struct Cli {
    /// Enquiry draft as JSON
    #[arg(short, long, env = "ENQUIRY_DRAFT_FILE")]
    draft: PathBuf,

    /// Configuration file; ENQUIRY_<SECTION>__<KEY> variables override it
    #[arg(short, long, env = "ENQUIRY_CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Use the in-memory backend; issued codes are printed to the log
    #[arg(long, env = "ENQUIRY_USE_MOCK")]
    mock: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    telemetry::init(&config.logging)?;
    tracing::info!(environment = ?config.environment, mock = cli.mock, "Starting enquiry client");

    let draft = load_draft(&cli.draft)?;
    let transport = create_transport(&config, cli.mock).context("creating verification transport")?;

    let mut session = match VerificationSession::new(transport, draft, SessionConfig::from(&config.verification)) {
        Ok(session) => session,
        Err(errors) => {
            for error in errors.errors() {
                eprintln!("{}: {}", error.field, error.message);
            }
            return Ok(ExitCode::from(2));
        }
    };

    let stdin = BufReader::new(tokio::io::stdin());
    let outcome = run_session(&mut session, stdin, tokio::io::stdout()).await?;

    Ok(match outcome {
        HostOutcome::Submitted { enquiry_id } => {
            println!("Thank you. Your enquiry reference is {}", enquiry_id);
            ExitCode::SUCCESS
        }
        HostOutcome::Failed { message } => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
        HostOutcome::Abandoned => ExitCode::from(130),
    })
}
