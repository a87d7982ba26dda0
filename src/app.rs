use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;

use crate::pipeline::Pipeline;
use crate::profile::ProfileLoader;
use crate::watch::{self, WatchSettings};
use crate::Config;

/// Entry point of the `docx2chapters` binary
pub async fn run() -> ExitCode {
    let config = match Config::from_args_and_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.log_level);

    match run_with(config).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            for cause in e.chain().skip(1) {
                log::error!("caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}

/// Load the profile, build the pipeline and run the selected mode
pub async fn run_with(config: Config) -> Result<ExitCode> {
    log::info!("Word-to-LaTeX chapter converter");

    let loaded = ProfileLoader::new(&config)?.load()?;
    log::debug!("Profile source: {:?}", loaded.source);

    let pipeline = Pipeline::from_config(&config, loaded)?;
    let settings = WatchSettings::from(&pipeline.profile().watch);

    if config.once {
        return Ok(match pipeline.run_once() {
            Ok(_) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{:#}", e);
                ExitCode::FAILURE
            }
        });
    }

    watch::watch(Arc::new(pipeline), settings).await?;
    Ok(ExitCode::SUCCESS)
}

/// `RUST_LOG` wins; otherwise the `--log-level` value is the filter
fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
