use clap::Parser;
use colored::Colorize;
use homedepot::cli::GtfToBedCli;
use homedepot::{gtf_to_bed, logger};
use std::time::Instant;

fn main() {
    let pg_start = Instant::now();
    let cli = GtfToBedCli::parse();
    logger::init(cli.log.log_level);

    if let Err(e) = gtf_to_bed::run(&cli.args) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }

    log::info!(
        "{} done! Time elapsed: {}",
        "gtf-to-bed".bright_green().bold(),
        format!("{:.2?}", pg_start.elapsed()).bright_yellow().bold()
    );
}
