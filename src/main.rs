use anyhow::Context;
use clap::Parser;
use profile_harvester::adapters::{ConfiguredFingerprint, CsvProfileSink, LinkStore, WebDriverSessions};
use profile_harvester::config::{CliArgs, Command, HarvesterConfig};
use profile_harvester::core::search::run_search;
use profile_harvester::domain::ports::SystemClock;
use profile_harvester::utils::{logger, validation::Validate};
use profile_harvester::{CycleRunner, LicenseGate, LinkHarvester, ProfileCapture, ScrollMode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => HarvesterConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path.display()))?,
        None => HarvesterConfig::default(),
    };
    config.apply_env_overrides();
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }

    if args.json_logs || config.logging.json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting profile-harvester");
    if args.verbose {
        tracing::debug!("Configuration: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!("cannot create data directory {}", config.data_dir.display())
    })?;

    let fingerprint = ConfiguredFingerprint::from_override(config.license.fingerprint.as_deref());
    let gate = LicenseGate::new(fingerprint, config.license.clone());
    let sessions = WebDriverSessions::new(config.browser.webdriver_url.clone(), config.browser.headless);

    match args.command() {
        Command::Search { terms } => {
            let harvester =
                LinkHarvester::new(&config.harvest, &config.selectors, ScrollMode::SingleRun);
            let store = LinkStore::new(config.links_path());

            let found = run_search(
                &gate,
                &sessions,
                &harvester,
                &config.browser.start_url,
                &store,
                &terms,
            )
            .await?;

            match found {
                Some(links) => {
                    for link in &links {
                        println!("{}", link);
                    }
                    tracing::info!("✅ {} links found", links.len());
                }
                None => {
                    eprintln!("❌ License check denied");
                    std::process::exit(2);
                }
            }
        }
        command => {
            let harvester = LinkHarvester::new(
                &config.harvest,
                &config.selectors,
                ScrollMode::ContinuousScan,
            );
            let capture = ProfileCapture::new(
                CsvProfileSink::new(config.profiles_path()),
                SystemClock,
                config.selectors.clone(),
                config.capture.clone(),
                &config.browser,
            );
            let interval = config.schedule.interval();
            let mut runner = CycleRunner::new(gate, harvester, capture, config);

            if let Command::Once = command {
                let report = runner.run_cycle(&sessions).await?;
                println!("✅ Cycle finished");
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                runner.run_forever(&sessions, interval).await;
            }
        }
    }

    Ok(())
}
