use clap::Parser;
use log::error;
use std::process::ExitCode;

use yolo_prep::config::TrainArgs;
use yolo_prep::error::to_exit_code;
use yolo_prep::{
    ensure_manifest, run_training, Credentials, KaggleFetcher, Result, Settings, UltralyticsCli,
};

fn run(args: &TrainArgs) -> Result<()> {
    let settings = Settings::load(&args.config)?;
    let credentials = if settings.dataset.is_kaggle() {
        Credentials::resolve(&args.env_file)?
    } else {
        None
    };

    let manifest = ensure_manifest(&settings, credentials.as_ref(), &KaggleFetcher::default())
        .map_err(|e| {
            error!("Dataset preparation failed: {}", e);
            e
        })?;
    run_training(
        &manifest,
        &settings.training,
        &UltralyticsCli::with_program(&args.yolo_bin),
    )
}

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = TrainArgs::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            to_exit_code(e.exit_code())
        }
    }
}
