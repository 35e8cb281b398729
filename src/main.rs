//! rust_regiondiff command-line interface

use std::time::Instant;

use clap::Parser;
use log::{info, LevelFilter};

use rust_regiondiff::cli::Cli;
use rust_regiondiff::prelude::*;

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let start = Instant::now();

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .ok();
    }
    info!("Using {} worker threads", rayon::current_num_threads());

    let config = cli.to_config()?;
    info!(
        "Comparing regions {} at cutoff {} (gene field: {})",
        config.regions.join(","),
        config.cutoff,
        config.gene_field
    );

    let blocks = run_pipeline(&config)?;
    for block in &blocks {
        println!("{}", block);
    }

    info!(
        "Finished in {:.1} ms",
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}
