use log::{error, info};

use pix_restamp::config::Config;
use pix_restamp::{image_updater, metadata_parser, sanity_checker};

fn main() {
    let config = match Config::from_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    init_logging(config.verbose);

    info!("Input directory: {}", config.input_dir.display());

    if config.sanity_check {
        sanity_checker::check_sanity(&config.input_dir);
        return;
    }

    let metadata = metadata_parser::extract_metadata(&config.input_dir);
    if metadata.is_empty() {
        error!(
            "No photo metadata found under {}",
            config.input_dir.display()
        );
        std::process::exit(1);
    }

    // With --overwrite the output directory is unused; fall back to the
    // input directory so the embed loop has a valid path either way.
    let output_dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| config.input_dir.clone());

    match image_updater::embed_metadata(&config.input_dir, &output_dir, &metadata, config.overwrite)
    {
        Ok(summary) => {
            if summary.updated == 0 && summary.failed > 0 {
                error!("Every matched image failed to update");
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "info" }),
    )
    .init();
}
