use clap::Parser;
use colored::Colorize;
use homedepot::cli::DownsampleFragCli;
use homedepot::{downsample, logger};
use std::time::Instant;

fn run(cli: &DownsampleFragCli) -> anyhow::Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.threads)
        .build_global()?;
    downsample::run(&cli.args)?;
    Ok(())
}

fn main() {
    let pg_start = Instant::now();
    let cli = DownsampleFragCli::parse();
    logger::init(cli.log.log_level);
    log::debug!("Number of threads: {}", cli.threads);

    if let Err(e) = run(&cli) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }

    log::info!(
        "{} done! Time elapsed: {}",
        "downsample-frag".bright_green().bold(),
        format!("{:.2?}", pg_start.elapsed()).bright_yellow().bold()
    );
}
