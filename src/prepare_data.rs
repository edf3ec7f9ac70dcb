use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use yolo_prep::config::PrepareArgs;
use yolo_prep::error::to_exit_code;
use yolo_prep::{generate, Settings};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = PrepareArgs::parse();

    let result = Settings::load(&args.config)
        .and_then(|settings| generate(&settings.dataset, &settings.dataset.local_dir));
    match result {
        Ok(path) => {
            info!("Created {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            to_exit_code(e.exit_code())
        }
    }
}
