// shell completions for every binary, written to OUT_DIR
use clap_complete::{
    generate_to,
    shells::{Bash, Zsh},
};
use std::io;

include!("src/cli.rs");

fn main() -> io::Result<()> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    let outdir = match std::env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut apps = vec![
        (Cli::command(), "homedepot"),
        (GtfToBedCli::command(), "gtf-to-bed"),
        (DownsampleFragCli::command(), "downsample-frag"),
    ];
    for (app, name) in apps.iter_mut() {
        generate_to(Bash, app, *name, &outdir)?;
        generate_to(Zsh, app, *name, &outdir)?;
    }
    Ok(())
}
