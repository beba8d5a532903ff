use super::bed::BedRecord;
use super::chrom_sizes::{self, ChromSizes};
use super::cli::{Anchor, GtfToBedArgs};
use super::gtf::{GtfReader, GtfRecord};
use super::myio;
use anyhow::{Context, Result};
use itertools::Itertools;
use num_format::{Locale, ToFormattedString};
use std::collections::BTreeSet;
use std::io::Write;
use std::time::Instant;

/// Name written when the record lacks the requested attribute.
pub const MISSING_NAME: &str = ".";

/// Flanking distances and the feature ends they are measured from.
#[derive(Debug, Clone, Copy)]
pub struct Flank {
    pub upstream: i64,
    pub upstream_anchor: Anchor,
    pub downstream: i64,
    pub downstream_anchor: Anchor,
}

impl From<&GtfToBedArgs> for Flank {
    fn from(args: &GtfToBedArgs) -> Self {
        Flank {
            upstream: args.upstream,
            upstream_anchor: args.upstream_anchor,
            downstream: args.downstream,
            downstream_anchor: args.downstream_anchor,
        }
    }
}

/// Window around a feature given as a 0-based half-open interval `[st, en)`.
/// Upstream and downstream follow the strand, and the window is clipped to
/// `[0, chrom_size]`. Returns `None` when nothing is left.
/// # Example
/// ```
/// use homedepot::cli::Anchor;
/// use homedepot::gtf_to_bed::{flank_interval, Flank};
/// let promoter = Flank {
///     upstream: 2000,
///     upstream_anchor: Anchor::Start,
///     downstream: 500,
///     downstream_anchor: Anchor::Start,
/// };
/// // TSS of a + strand gene is its start
/// assert_eq!(flank_interval(10_000, 15_000, false, 100_000, &promoter), Some((8_000, 10_500)));
/// // and its end on the - strand
/// assert_eq!(flank_interval(10_000, 15_000, true, 100_000, &promoter), Some((14_500, 17_000)));
/// ```
pub fn flank_interval(
    st: u64,
    en: u64,
    reverse: bool,
    chrom_size: u64,
    flank: &Flank,
) -> Option<(u64, u64)> {
    let (five_prime, three_prime) = if reverse {
        (en as i64, st as i64)
    } else {
        (st as i64, en as i64)
    };
    let anchor = |a: Anchor| match a {
        Anchor::Start => five_prime,
        Anchor::End => three_prime,
    };

    let (new_st, new_en) = if reverse {
        (
            anchor(flank.downstream_anchor).saturating_sub(flank.downstream),
            anchor(flank.upstream_anchor).saturating_add(flank.upstream),
        )
    } else {
        (
            anchor(flank.upstream_anchor).saturating_sub(flank.upstream),
            anchor(flank.downstream_anchor).saturating_add(flank.downstream),
        )
    };

    let max_end = chrom_size as i64;
    let new_st = new_st.clamp(0, max_end);
    let new_en = new_en.clamp(0, max_end);
    if new_st < new_en {
        Some((new_st as u64, new_en as u64))
    } else {
        None
    }
}

/// Tallies of what happened to the input records.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GtfToBedStats {
    pub records: u64,
    pub unknown_chrom: u64,
    pub other_feature: u64,
    pub empty_window: u64,
    pub missing_name: u64,
    pub written: u64,
}

/// Turns GTF/GFF records into BED records for one set of options.
pub struct GtfToBed<'a> {
    pub args: &'a GtfToBedArgs,
    pub chrom_sizes: &'a ChromSizes,
    pub flank: Flank,
    pub stats: GtfToBedStats,
    skipped_chroms: BTreeSet<String>,
}

impl<'a> GtfToBed<'a> {
    pub fn new(args: &'a GtfToBedArgs, chrom_sizes: &'a ChromSizes) -> Self {
        GtfToBed {
            args,
            chrom_sizes,
            flank: Flank::from(args),
            stats: GtfToBedStats::default(),
            skipped_chroms: BTreeSet::new(),
        }
    }

    /// Convert one record, `None` if it is filtered out.
    pub fn convert(&mut self, rec: &GtfRecord) -> Option<BedRecord> {
        self.stats.records += 1;
        let chrom_size = match self.chrom_sizes.get(&rec.chrom) {
            Some(size) => *size,
            None => {
                self.stats.unknown_chrom += 1;
                if !self.skipped_chroms.contains(&rec.chrom) {
                    self.skipped_chroms.insert(rec.chrom.clone());
                }
                return None;
            }
        };
        if rec.feature != self.args.feature_type {
            self.stats.other_feature += 1;
            return None;
        }

        let (st, en) = rec.interval();
        let (st, en) = match flank_interval(st, en, rec.is_reverse(), chrom_size, &self.flank) {
            Some(window) => window,
            None => {
                self.stats.empty_window += 1;
                log::trace!("Empty window for {}:{}-{}", rec.chrom, rec.start, rec.end);
                return None;
            }
        };

        let name = match rec.parse_attributes(self.args.input_type).get(self.args.attr_id.as_str()) {
            Some(name) => name.to_string(),
            None => {
                self.stats.missing_name += 1;
                MISSING_NAME.to_string()
            }
        };

        self.stats.written += 1;
        Some(BedRecord {
            chrom: rec.chrom.clone(),
            st,
            en,
            name,
            score: rec.score.clone(),
            strand: rec.strand,
        })
    }

    /// Stream every record of `reader` through [`GtfToBed::convert`] into `out`.
    pub fn convert_all<R: std::io::BufRead, W: Write>(&mut self, reader: R, out: &mut W) -> Result<()> {
        for rec in GtfReader::new(reader) {
            let rec = rec.map_err(|(line, e)| anyhow::Error::new(e).context(format!("line {}", line)))?;
            if let Some(bed) = self.convert(&rec) {
                writeln!(out, "{}", bed)?;
            }
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        let s = &self.stats;
        if !self.skipped_chroms.is_empty() {
            log::warn!(
                "Skipped {} records on chromosomes missing from the size file: {}",
                s.unknown_chrom.to_formatted_string(&Locale::en),
                self.skipped_chroms.iter().join(", ")
            );
        }
        if s.missing_name > 0 {
            log::warn!(
                "{} records have no {} attribute, named them {:?}.",
                s.missing_name.to_formatted_string(&Locale::en),
                self.args.attr_id,
                MISSING_NAME
            );
        }
        log::info!(
            "Read {} records, {} are {}, wrote {} ({} empty windows dropped).",
            s.records.to_formatted_string(&Locale::en),
            (s.records - s.unknown_chrom - s.other_feature).to_formatted_string(&Locale::en),
            self.args.feature_type,
            s.written.to_formatted_string(&Locale::en),
            s.empty_window.to_formatted_string(&Locale::en),
        );
    }
}

/// Run `gtf-to-bed` end to end.
pub fn run(args: &GtfToBedArgs) -> Result<GtfToBedStats> {
    log::debug!("Parameters: {:?}", args);

    let stime = Instant::now();
    let chrom_sizes = chrom_sizes::parse_chrom_sizes(&args.chrom_size_file)?;
    log::debug!("Reading chrom size file takes: {:.2?}", stime.elapsed());

    let stime = Instant::now();
    let reader = myio::reader(&args.input_file)?;
    let mut out = myio::writer(&args.output_file)?;
    let mut converter = GtfToBed::new(args, &chrom_sizes);
    converter
        .convert_all(reader, &mut out)
        .with_context(|| format!("Failed to convert {}", args.input_file))?;
    out.flush()
        .with_context(|| format!("Failed to write {}", args.output_file))?;
    log::debug!("Converting records takes: {:.2?}", stime.elapsed());

    converter.log_summary();
    Ok(converter.stats)
}
