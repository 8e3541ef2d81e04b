use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use jobmarkt_backend::{
    AppError,
    config::Config,
    database::{create_pool, run_migrations},
    external::MailService,
    logging::init_logger,
    services::*,
    utils::{current_month, parse_month},
};

/// Select winners for a monthly draw
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Draw month as YYYY-MM (defaults to the current month)
    #[arg(long)]
    month: Option<String>,

    /// Number of job winners
    #[arg(long, default_value_t = DEFAULT_JOB_WINNERS)]
    job_winners: usize,

    /// Number of basic income winners
    #[arg(long, default_value_t = DEFAULT_INCOME_WINNERS)]
    income_winners: usize,

    /// Run the selection and report without saving anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logger();
    let cli = Cli::parse();

    let month = match cli.month.as_deref() {
        Some(m) => parse_month(m)?,
        None => current_month(),
    };

    let config = Config::from_toml()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("Failed to load configuration")?;
    let pool = create_pool(&config.database)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let mail_service = MailService::new(config.mail.clone())?;
    let notifications =
        NotificationService::new(Arc::new(mail_service), config.mail.dashboard_url.clone());
    let draw_service = DrawService::new(pool.clone(), config.draw.minimum_participants);
    let eligibility = EligibilityService::new(pool.clone(), draw_service.clone());
    let selection =
        WinnerSelectionService::new(pool.clone(), draw_service, eligibility, notifications);

    let request = SelectionRequest {
        month,
        job_winners: cli.job_winners,
        income_winners: cli.income_winners,
        dry_run: cli.dry_run,
    };

    match selection.select_winners(&request).await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome.summary)?);
            if let Some(handle) = outcome.notifications {
                match handle.await {
                    Ok(sent) => log::info!(
                        "Sent {sent}/{} winner notifications",
                        outcome.summary.total_winners()
                    ),
                    Err(e) => log::error!("Notification task failed: {e}"),
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(
            e @ (AppError::NotReady(_)
            | AppError::AlreadySelected(_)
            | AppError::NoEligibleParticipants(_)),
        ) => {
            log::error!("{e}");
            eprintln!("{e}");
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e.into()),
    }
}
