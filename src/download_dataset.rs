use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use yolo_prep::config::DownloadArgs;
use yolo_prep::error::to_exit_code;
use yolo_prep::{
    auto_format_dataset, generate, run_download, Credentials, KaggleFetcher, PipelineError,
    Result, Settings, Split,
};

/// Fetch the dataset, reshape it if needed and write data.yaml
fn run(args: &DownloadArgs) -> Result<PathBuf> {
    let settings = Settings::load(&args.config)?;
    let dataset = &settings.dataset;
    let split = Split::new(args.split.train_split, args.split.seed)?;
    if dataset.classes.is_empty() {
        return Err(PipelineError::MissingClasses);
    }

    let credentials = if dataset.is_kaggle() {
        Credentials::resolve(&args.env_file)?
    } else {
        None
    };
    run_download(dataset, credentials.as_ref(), &KaggleFetcher::default())?;

    auto_format_dataset(&dataset.local_dir, split)?;
    generate(dataset, &dataset.local_dir)
}

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = DownloadArgs::parse();

    match run(&args) {
        Ok(path) => {
            info!("Generated data.yaml at {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            to_exit_code(e.exit_code())
        }
    }
}
