//! Network Path Tester - Main CLI Application
//!
//! Runs the requested path measurements against one target host, prints the
//! report and saves it as JSON.

use clap::Parser;
use network_path_tester::{
    cli::Cli,
    config::{display_config_summary, load_config, EnvManager},
    error::{AppError, ErrorReporter, Result},
    logging::LoggerFactory,
    network::SystemNetwork,
    output::{OutputCoordinator, ReportWriter},
    ProbeOrchestrator, PKG_NAME, VERSION,
};
use std::path::Path;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let use_color = cli.use_colors();
    let verbose = cli.verbose || cli.debug;

    let outcome = match run_env_command(&cli) {
        Ok(true) => Ok(()),
        Ok(false) => run_application(cli).await,
        Err(e) => Err(e),
    };

    if let Err(e) = outcome {
        ErrorReporter::new(use_color, verbose).report_error(&e);
        process::exit(e.exit_code());
    }
}

/// `.env` utilities that replace a measurement run; `true` when one ran
fn run_env_command(cli: &Cli) -> Result<bool> {
    if cli.env_help {
        print!("{}", EnvManager::display_env_help());
        return Ok(true);
    }

    if let Some(ref path) = cli.init_env {
        if path.exists() {
            return Err(AppError::config(format!("{} already exists", path.display())));
        }
        EnvManager::save_example_env_file(path)?;
        println!("Example configuration written to {}", path.display());
        return Ok(true);
    }

    if cli.check_env {
        let env_file = Path::new(".env");
        let mut problems = EnvManager::validate_current_env();
        match EnvManager::check_env_file(env_file)? {
            Some(lines) => problems.extend(lines),
            None => println!("No {} file found", env_file.display()),
        }

        if !problems.is_empty() {
            for problem in &problems {
                eprintln!("{}", problem);
            }
            return Err(AppError::config(format!("{} invalid configuration value(s)", problems.len())));
        }

        println!("Environment configuration is valid");
        return Ok(true);
    }

    Ok(false)
}

/// Main application logic; probe failures end up in the report, not here
async fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        eprintln!("{} v{}", PKG_NAME, VERSION);
        eprintln!("Debug mode enabled");
    }

    let config = load_config(cli)?;

    if config.debug {
        eprintln!("Configuration loaded successfully:\n{}\n", display_config_summary(&config));
    }

    let factory = LoggerFactory::new(config.clone())?;
    let app_logger = factory.create_logger("npt").await;
    let probe_logger = factory.create_probe_logger().await;

    let network = Arc::new(SystemNetwork::from_config(&config)?);
    let orchestrator = ProbeOrchestrator::new(config.clone(), network, probe_logger);

    let summary = orchestrator.run_configured().await?;

    let output = OutputCoordinator::from_config(&config);
    println!("{}", output.display_run(&summary)?);

    if config.save_report {
        match ReportWriter::from_config(&config).save(&summary.report) {
            Ok(path) => {
                app_logger
                    .info("Report saved")
                    .field("path", path.display().to_string())
                    .log()
                    .await;
                println!("{}", output.formatter().format_success(&format!("Report saved to {}", path.display()))?);
            }
            Err(e) => {
                // The run itself completed; a failed save is reported but not fatal
                app_logger.error("Failed to save report").error_info(&e).log().await;
                eprintln!("{}", output.formatter().format_warning(&e.user_friendly_message())?);
            }
        }
    }

    Ok(())
}
