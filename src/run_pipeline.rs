use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use yolo_prep::config::PipelineArgs;
use yolo_prep::error::to_exit_code;
use yolo_prep::{Credentials, KaggleFetcher, Pipeline, Settings, Split, UltralyticsCli};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = PipelineArgs::parse();

    let settings = match Settings::load(&args.config) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            return to_exit_code(e.exit_code());
        }
    };
    let split = match Split::new(args.split.train_split, args.split.seed) {
        Ok(split) => split,
        Err(e) => {
            error!("{}", e);
            return to_exit_code(e.exit_code());
        }
    };
    let credentials = if settings.dataset.is_kaggle() && !args.skip_download {
        match Credentials::resolve(&args.env_file) {
            Ok(credentials) => credentials,
            Err(e) => {
                error!("{}", e);
                return to_exit_code(e.exit_code());
            }
        }
    } else {
        None
    };

    let fetcher = KaggleFetcher::default();
    let engine = UltralyticsCli::with_program(&args.yolo_bin);
    let pipeline = Pipeline::new(&settings, &fetcher, &engine)
        .with_credentials(credentials)
        .with_split(split)
        .with_skip(args.skip_flags());

    match pipeline.run() {
        Ok(_) => {
            info!("Pipeline finished.");
            ExitCode::SUCCESS
        }
        Err(failure) => {
            error!("{}", failure);
            to_exit_code(failure.exit_code())
        }
    }
}
