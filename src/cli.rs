use clap::{AppSettings, Args, CommandFactory, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    propagate_version = true,
    subcommand_required = true,
    infer_subcommands = true,
    arg_required_else_help = true,
    help_expected = true
)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
pub struct Cli {
    /// Threads for reading and sampling files in parallel.
    #[clap(short, long, default_value_t = 8)]
    pub threads: usize,

    #[clap(flatten)]
    pub log: LogArgs,

    #[clap(subcommand)]
    pub command: Option<Commands>,
}

///
/// This structure contains all the subcommands for homedepot and their help descriptions.
///
/// Because of naming conventions for rust enums the commands names have
/// different capitalization than on the command line.
/// For example, the `GtfToBed` enum is invoked using `homedepot gtf-to-bed`.
///
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract and write sequence information from GTF/GFF to bed format.
    ///
    /// Every record of the requested feature type is turned into a window around one of its ends, e.g. the default of `-u 2000 -d 2000` around the 5' end gives promoter regions. Windows are strand aware and clipped to the chromosome sizes.
    #[clap(visible_aliases = &["g2b", "gtf2bed"])]
    GtfToBed(GtfToBedArgs),
    /// Downsample multiple fragment files to the same coverage.
    ///
    /// Reads are drawn uniformly without replacement until every file holds as many reads as the shallowest one (or `--target`).
    #[clap(visible_aliases = &["ds", "downsample"])]
    DownsampleFrag(DownsampleFragArgs),
}

/// Attribute syntax of the annotation.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    /// `key "value";` attributes.
    Gtf,
    /// `key=value;` attributes.
    Gff,
}

/// End of a feature a flanking distance is measured from.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// The 5' end, i.e. the start on `+` and the end on `-`.
    Start,
    /// The 3' end.
    End,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Critical,
    Error,
    Warning,
    Info,
    Debug,
    Notset,
}

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Set logging level.
    #[clap(
        long,
        value_enum,
        ignore_case = true,
        default_value_t = LogLevel::Info,
        help_heading = "DEBUG"
    )]
    pub log_level: LogLevel,
}

#[derive(Args, Debug, Clone)]
pub struct GtfToBedArgs {
    /// Input GTF/GFF file name.
    #[clap(short, long, alias = "input_file")]
    pub input_file: String,
    /// Input format.
    #[clap(long, alias = "input_type", value_enum, ignore_case = true, default_value_t = InputFormat::Gtf)]
    pub input_type: InputFormat,
    /// Output bed file name, add `.gz` to compress.
    #[clap(short, long, alias = "output_file")]
    pub output_file: String,
    /// What feature to extract.
    #[clap(short = 't', long = "type", default_value = "gene")]
    pub feature_type: String,
    /// Distance to extract upstream of the anchor, can be negative.
    #[clap(short, long, default_value_t = 2000, allow_hyphen_values = true)]
    pub upstream: i64,
    /// Which end to apply the upstream distance to (start means the 5' end).
    #[clap(long, alias = "upstream_anchor", value_enum, default_value_t = Anchor::Start)]
    pub upstream_anchor: Anchor,
    /// Distance to extract downstream of the anchor, can be negative.
    #[clap(short, long, default_value_t = 2000, allow_hyphen_values = true)]
    pub downstream: i64,
    /// Which end to apply the downstream distance to (start means the 5' end).
    #[clap(long, alias = "downstream_anchor", value_enum, default_value_t = Anchor::Start)]
    pub downstream_anchor: Anchor,
    /// The size of each chromosome, records on other chromosomes are skipped.
    #[clap(short, long, alias = "chrom_size_file")]
    pub chrom_size_file: String,
    /// The attribute tag used as the record name.
    #[clap(short = 'r', long, alias = "attr_id", default_value = "gene_id")]
    pub attr_id: String,
}

#[derive(Args, Debug, Clone)]
pub struct DownsampleFragArgs {
    /// A tab delimited file with two columns: <input_frag> <output_frag>.
    #[clap(short, long, alias = "input_file")]
    pub input_file: String,
    /// Downsample to this many reads instead of the depth of the smallest file.
    #[clap(short = 'n', long)]
    pub target: Option<u64>,
    /// Seed for the random number generator, drawn at random when missing.
    #[clap(short, long)]
    pub seed: Option<u64>,
}

/// Extract and write sequence information from GTF/GFF to bed format.
#[derive(Parser, Debug)]
#[clap(name = "gtf-to-bed", author, version, help_expected = true)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
pub struct GtfToBedCli {
    #[clap(flatten)]
    pub args: GtfToBedArgs,

    #[clap(flatten)]
    pub log: LogArgs,
}

/// Downsample multiple fragment files to the same coverage.
#[derive(Parser, Debug)]
#[clap(name = "downsample-frag", author, version, help_expected = true)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
pub struct DownsampleFragCli {
    #[clap(flatten)]
    pub args: DownsampleFragArgs,

    /// Number of threads.
    #[clap(short, long, default_value_t = 8)]
    pub threads: usize,

    #[clap(flatten)]
    pub log: LogArgs,
}

pub fn make_cli_parse() -> Cli {
    Cli::parse()
}

pub fn make_cli_app() -> clap::Command<'static> {
    Cli::command()
}
