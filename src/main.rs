use aeo_audit::config::{FileConfig, ServiceConfig};
use aeo_audit::{form, output, utils, Args, AuditController, AuditPhase, HttpAnalysisService};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);

    let file_config = FileConfig::discover(args.config.as_deref())
        .context("Failed to load config file")?;
    let config = ServiceConfig::resolve(
        args.endpoint.as_deref(),
        args.timeout,
        file_config.as_ref(),
    )
    .context("Invalid service configuration")?;
    let service = HttpAnalysisService::new(&config)?;

    if args.health {
        let health = service.health().await.map_err(|e| {
            error!(action = "health_check", error = %e, "Health check failed");
            e
        })?;
        output::print_health(&health, args.json);
        return Ok(());
    }

    let mut controller = AuditController::new(service);

    match args.url.as_deref() {
        Some(url) => {
            controller.submit(url).await?;
            output::print_session(controller.session(), args.json);
            if matches!(controller.phase(), AuditPhase::Failed(_)) {
                std::process::exit(1);
            }
            Ok(())
        }
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            form::run_interactive(&mut controller, stdin, args.json).await?;
            Ok(())
        }
    }
}
