use colored::Colorize;
use homedepot::cli::Commands;
use homedepot::*;
use std::time::Instant;

fn main() {
    if let Err(e) = parse_cli() {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

pub fn parse_cli() -> anyhow::Result<()> {
    let pg_start = Instant::now();
    let args = cli::make_cli_parse();

    // set the logging level
    logger::init(args.log.log_level);

    // set up number of threads to use globally
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()?;

    let subcommand = match &args.command {
        //
        // Run GtfToBed
        //
        Some(Commands::GtfToBed(opts)) => {
            gtf_to_bed::run(opts)?;
            "gtf-to-bed"
        }
        //
        // Run DownsampleFrag
        //
        Some(Commands::DownsampleFrag(opts)) => {
            downsample::run(opts)?;
            "downsample-frag"
        }
        //
        // no command opt
        //
        None => return Ok(()),
    };

    let duration = pg_start.elapsed();
    log::info!(
        "{} done! Time elapsed: {}",
        subcommand.bright_green().bold(),
        format!("{:.2?}", duration).bright_yellow().bold()
    );
    Ok(())
}
