//! # Command line interface for homedepot
//! [homedepot command line interface, subcommands, and options.](cli::Commands)
//! # README for homedepot
#![doc = include_str!("../README.md")]
/// BED records.
pub mod bed;
/// Chromosome sizes files.
pub mod chrom_sizes;
/// Command line interface for homedepot.
pub mod cli;
/// Downsample fragment files to a common number of reads.
pub mod downsample;
/// Fragment files from single-cell ATAC-seq.
pub mod fragment;
/// GTF/GFF parsing.
pub mod gtf;
/// Windows around GTF/GFF features written as BED.
pub mod gtf_to_bed;
/// Log formatting and levels.
pub mod logger;
/// Module for automatically reading and writing compressed or uncompressed files.
pub mod myio;
