use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use yolo_prep::config::FormatArgs;
use yolo_prep::error::to_exit_code;
use yolo_prep::{auto_format_dataset, FormatOutcome, Split};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = FormatArgs::parse();

    let result = Split::new(args.split.train_split, args.split.seed)
        .and_then(|split| auto_format_dataset(&args.base_dir, split));
    match result {
        Ok(FormatOutcome::Formatted { train, val }) => {
            info!("Wrote {} train and {} val images.", train, val);
            ExitCode::SUCCESS
        }
        Ok(FormatOutcome::AlreadyCanonical) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            to_exit_code(e.exit_code())
        }
    }
}
