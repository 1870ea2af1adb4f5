use anyhow::{Context, Result};
use app_profile_analyzer::analyzer::MarketAnalyzer;
use app_profile_analyzer::loader::load_dataset;
use app_profile_analyzer::models::Config;
use app_profile_analyzer::report;
use clap::{Arg, ArgAction, Command};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let matches = Command::new("app-profile-analyzer")
        .version("1.0")
        .about("Finds free app profiles worth building for the App Store and Google Play")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("app-profile.toml"),
        )
        .arg(
            Arg::new("init-config")
                .long("init-config")
                .help("Write the default configuration to the config path and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("sample")
                .short('s')
                .long("sample")
                .value_name("ROWS")
                .help("Rows to print at each cleaning stage (overrides the config)")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level used when RUST_LOG is not set")
                .default_value("info"),
        )
        .get_matches();

    let log_level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_file = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("app-profile.toml");

    if matches.get_flag("init-config") {
        Config::default().save_to_file(config_file)?;
        println!("📝 Wrote default configuration to: {}", config_file);
        return Ok(());
    }

    let mut config = if Path::new(config_file).exists() {
        info!(path = config_file, "Loading configuration");
        Config::load_from_file(config_file)
            .with_context(|| format!("Failed to load configuration: {}", config_file))?
    } else {
        warn!(path = config_file, "Configuration file not found, using built-in defaults");
        Config::default()
    };
    if let Some(sample) = matches.get_one::<usize>("sample") {
        config.sample_rows = *sample;
    }

    for dataset_config in &config.datasets {
        let dataset = load_dataset(&dataset_config.label, &dataset_config.path)?;

        print!("{}", report::explore_dataset(&dataset, &dataset_config.path, config.sample_rows));

        let analysis = MarketAnalyzer::new(dataset_config)
            .analyze(&dataset.rows)
            .with_context(|| format!("Failed to analyze {}", dataset_config.path))?;

        print!("{}", report::market_report(&analysis, &dataset.header, config.sample_rows));
    }

    println!("\n✅ Analysis complete!");
    Ok(())
}
