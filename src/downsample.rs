use super::cli::DownsampleFragArgs;
use super::fragment::{count_fragments, for_each_fragment};
use super::myio;
use anyhow::{anyhow, bail, Context, Result};
use num_format::{Locale, ToFormattedString};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::HashSet;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub input: String,
    pub output: String,
}

/// read the `<input_frag> <output_frag>` table
/// # Example
/// ```
/// let pairs = homedepot::downsample::load_input_table(".test/downsample.tsv").unwrap();
/// assert_eq!(pairs.len(), 2);
/// assert_eq!(pairs[1].input, ".test/frag_b.tsv.gz");
/// ```
pub fn load_input_table(filename: &str) -> Result<Vec<FilePair>> {
    let reader = myio::reader(filename)?;
    read_input_table(reader).with_context(|| format!("Unexpected error when reading {}", filename))
}

pub fn read_input_table<R: BufRead>(reader: R) -> Result<Vec<FilePair>> {
    let mut pairs = Vec::new();
    let mut outputs = HashSet::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let t: Vec<&str> = line.split_whitespace().collect();
        if t.len() != 2 {
            bail!(
                "expected <input_frag> <output_frag> at line {}, found {} columns",
                idx + 1,
                t.len()
            );
        }
        let pair = FilePair {
            input: t[0].to_string(),
            output: t[1].to_string(),
        };
        if pair.input == pair.output {
            bail!("output would overwrite its own input {} (line {})", pair.input, idx + 1);
        }
        if !outputs.insert(pair.output.clone()) {
            bail!("output {} is listed more than once (line {})", pair.output, idx + 1);
        }
        log::debug!("Get input: {}; output: {}.", pair.input, pair.output);
        pairs.push(pair);
    }
    if pairs.is_empty() {
        bail!("no fragment files listed");
    }
    Ok(pairs)
}

/// The depth every file is reduced to: the smallest total, or `requested` if
/// it does not exceed it.
pub fn target_depth(counts: &[u64], requested: Option<u64>) -> Result<u64> {
    let min = counts
        .iter()
        .copied()
        .min()
        .ok_or_else(|| anyhow!("no fragment files to downsample"))?;
    match requested {
        Some(n) if n > min => bail!(
            "requested {} reads but the smallest file only has {}",
            n,
            min
        ),
        Some(n) => Ok(n),
        None => Ok(min),
    }
}

/// Which reads of a file survive downsampling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Keep every read.
    All,
    /// Keep the reads at these sorted, distinct positions.
    Reads(Vec<u64>),
}

/// Pick `n` of `total` reads uniformly without replacement, sorted.
pub fn sample_reads<R: Rng + ?Sized>(rng: &mut R, total: u64, n: u64) -> Result<Selection> {
    if n > total {
        bail!("cannot sample {} reads out of {}", n, total);
    }
    if n == total {
        return Ok(Selection::All);
    }
    let length = usize::try_from(total).context("too many reads for this platform")?;
    let amount = usize::try_from(n).context("too many reads for this platform")?;
    let mut picks: Vec<u64> = rand::seq::index::sample(rng, length, amount)
        .into_iter()
        .map(|i| i as u64)
        .collect();
    picks.sort_unstable();
    Ok(Selection::Reads(picks))
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownsampleStats {
    pub fragments_in: u64,
    pub fragments_out: u64,
    pub reads_out: u64,
}

/// Walk the fragments of `reader`, numbering their reads `0..total` in file
/// order, and write every fragment that kept `k > 0` reads with count `k`.
/// # Example
/// ```
/// use homedepot::downsample::{downsample_reader, Selection};
/// let frags = "chr1\t0\t10\tA\t2\nchr1\t5\t15\tB\t3\n";
/// let mut out = Vec::new();
/// let stats = downsample_reader(frags.as_bytes(), &mut out, 5, &Selection::Reads(vec![1, 4])).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "chr1\t0\t10\tA\t1\nchr1\t5\t15\tB\t1\n");
/// assert_eq!(stats.reads_out, 2);
/// ```
pub fn downsample_reader<R: BufRead, W: Write>(
    reader: R,
    out: &mut W,
    total: u64,
    selection: &Selection,
) -> Result<DownsampleStats> {
    let mut stats = DownsampleStats::default();
    let mut offset = 0_u64;
    let mut next = 0_usize;
    for_each_fragment(reader, |frag| {
        stats.fragments_in += 1;
        let end = offset
            .checked_add(frag.count)
            .ok_or_else(|| anyhow!("read count overflows after {} reads", offset))?;
        let kept = match selection {
            Selection::All => frag.count,
            Selection::Reads(picks) => {
                let first = next;
                while next < picks.len() && picks[next] < end {
                    next += 1;
                }
                (next - first) as u64
            }
        };
        offset = end;
        if kept > 0 {
            writeln!(out, "{}", frag.with_count(kept))?;
            stats.fragments_out += 1;
            stats.reads_out += kept;
        }
        Ok(())
    })?;
    if offset != total {
        bail!(
            "expected {} reads but found {}, did the file change while running?",
            total,
            offset
        );
    }
    Ok(stats)
}

/// Downsample one file to `n` of its `total` reads.
pub fn downsample_file<R: Rng + ?Sized>(
    pair: &FilePair,
    total: u64,
    n: u64,
    rng: &mut R,
) -> Result<DownsampleStats> {
    log::info!("Downsampling {}.", pair.input);
    let selection = sample_reads(rng, total, n)?;

    let reader = myio::reader(&pair.input)?;
    let mut out = myio::writer(&pair.output)?;
    let stats = downsample_reader(reader, &mut out, total, &selection)
        .with_context(|| format!("Failed to downsample {}", pair.input))?;
    out.flush()
        .with_context(|| format!("Failed to write {}", pair.output))?;

    log::info!(
        "Finished writing {} of {} fragments to {}.",
        stats.fragments_out.to_formatted_string(&Locale::en),
        stats.fragments_in.to_formatted_string(&Locale::en),
        pair.output
    );
    Ok(stats)
}

/// Run `downsample-frag` end to end on the current rayon pool.
pub fn run(args: &DownsampleFragArgs) -> Result<Vec<DownsampleStats>> {
    log::debug!("Parameters: {:?}", args);
    let pairs = load_input_table(&args.input_file)?;

    let counts = pairs
        .par_iter()
        .map(|pair| count_fragments(&pair.input))
        .collect::<Result<Vec<u64>>>()?;
    for (pair, count) in pairs.iter().zip(&counts) {
        log::info!("{} has {} reads.", pair.input, count.to_formatted_string(&Locale::en));
    }

    let n = target_depth(&counts, args.target)?;
    if n == 0 {
        log::warn!("Downsample target is 0, all outputs will be empty.");
    }
    log::info!("Downsample target N: {}.", n.to_formatted_string(&Locale::en));

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    log::info!("Random seed: {}.", seed);

    pairs
        .par_iter()
        .zip(counts.par_iter())
        .enumerate()
        .map(|(idx, (pair, &total))| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(idx as u64));
            downsample_file(pair, total, n, &mut rng)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::Fragment;
    use rand_chacha::ChaCha8Rng;
    use std::fs;

    #[test]
    fn test_table_validation() {
        let pairs = read_input_table("# in out\na.tsv.gz\tb.tsv.gz\n\nc d\n".as_bytes()).unwrap();
        assert_eq!(
            pairs,
            vec![
                FilePair { input: "a.tsv.gz".to_string(), output: "b.tsv.gz".to_string() },
                FilePair { input: "c".to_string(), output: "d".to_string() },
            ]
        );
        assert!(read_input_table("a\n".as_bytes()).is_err());
        assert!(read_input_table("a b c\n".as_bytes()).is_err());
        assert!(read_input_table("a a\n".as_bytes()).is_err());
        assert!(read_input_table("a b\nc b\n".as_bytes()).is_err());
        assert!(read_input_table("# nothing\n".as_bytes()).is_err());
    }

    #[test]
    fn test_target_depth() {
        assert_eq!(target_depth(&[10, 4, 7], None).unwrap(), 4);
        assert_eq!(target_depth(&[10, 4, 7], Some(3)).unwrap(), 3);
        assert!(target_depth(&[10, 4, 7], Some(5)).is_err());
        assert!(target_depth(&[], None).is_err());
    }

    #[test]
    fn test_sample_reads() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let picks = match sample_reads(&mut rng, 1000, 250).unwrap() {
            Selection::Reads(picks) => picks,
            Selection::All => panic!("expected a subset"),
        };
        assert_eq!(picks.len(), 250);
        assert!(picks.windows(2).all(|w| w[0] < w[1]));
        assert!(picks.iter().all(|&i| i < 1000));

        let mut again = ChaCha8Rng::seed_from_u64(42);
        assert_eq!(sample_reads(&mut again, 1000, 250).unwrap(), Selection::Reads(picks));

        assert_eq!(sample_reads(&mut rng, 5, 5).unwrap(), Selection::All);
        assert_eq!(sample_reads(&mut rng, 5, 0).unwrap(), Selection::Reads(vec![]));
        assert!(sample_reads(&mut rng, 5, 6).is_err());
    }

    #[test]
    fn test_downsample_reader_walks_counts() {
        let frags = "chr1\t0\t10\tA\t2\nchr1\t5\t15\tB\t0\nchr1\t7\t20\tC\t3\nchr2\t1\t9\tA\t1\n";
        let mut out = Vec::new();
        let stats =
            downsample_reader(frags.as_bytes(), &mut out, 6, &Selection::Reads(vec![0, 1, 4, 5]))
                .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "chr1\t0\t10\tA\t2\nchr1\t7\t20\tC\t1\nchr2\t1\t9\tA\t1\n"
        );
        assert_eq!(
            stats,
            DownsampleStats { fragments_in: 4, fragments_out: 3, reads_out: 4 }
        );
    }

    #[test]
    fn test_downsample_reader_keep_all() {
        let frags = "chr1\t0\t10\tA\t2\nchr1\t5\t15\tB\t0\nchr1\t7\t20\tC\t3\n";
        let mut out = Vec::new();
        downsample_reader(frags.as_bytes(), &mut out, 5, &Selection::All).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "chr1\t0\t10\tA\t2\nchr1\t7\t20\tC\t3\n");
    }

    #[test]
    fn test_downsample_reader_count_overflow() {
        let frags = format!("chr1\t0\t10\tA\t2\nchr1\t5\t15\tB\t{}\n", u64::MAX);
        let err = downsample_reader(frags.as_bytes(), &mut Vec::new(), 2, &Selection::All).unwrap_err();
        assert!(format!("{:#}", err).starts_with("line 2"));
    }

    #[test]
    fn test_downsample_reader_total_mismatch() {
        let frags = "chr1\t0\t10\tA\t2\n";
        assert!(downsample_reader(frags.as_bytes(), &mut Vec::new(), 3, &Selection::All).is_err());
    }

    #[test]
    fn test_downsample_never_exceeds_original_counts() {
        let frags: String = (0..200)
            .map(|i| format!("chr1\t{}\t{}\tBC{}\t{}\n", i * 10, i * 10 + 50, i % 7, i % 5))
            .collect();
        let total: u64 = (0..200).map(|i| i % 5).sum();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let selection = sample_reads(&mut rng, total, 100).unwrap();
        let mut out = Vec::new();
        let stats = downsample_reader(frags.as_bytes(), &mut out, total, &selection).unwrap();
        assert_eq!(stats.reads_out, 100);

        let out = String::from_utf8(out).unwrap();
        let mut original = frags.lines().map(|l| Fragment::new(l).unwrap()).filter(|f| f.count > 0);
        for line in out.lines() {
            let kept = Fragment::new(line).unwrap();
            // output preserves input order
            let orig = original.find(|f| (f.chrom, f.st, f.en, f.barcode) == (kept.chrom, kept.st, kept.en, kept.barcode)).unwrap();
            assert!(kept.count >= 1 && kept.count <= orig.count);
        }
    }

    #[test]
    fn test_run_downsamples_to_smallest() {
        let dir = tempfile::tempdir().unwrap();
        let out_a = dir.path().join("a.ds.tsv.gz");
        let out_b = dir.path().join("b.ds.tsv");
        let table = dir.path().join("pairs.tsv");
        fs::write(
            &table,
            format!(
                ".test/frag_a.tsv\t{}\n.test/frag_b.tsv.gz\t{}\n",
                out_a.display(),
                out_b.display()
            ),
        )
        .unwrap();
        let args = DownsampleFragArgs {
            input_file: table.to_str().unwrap().to_string(),
            target: None,
            seed: Some(11),
        };

        let stats = run(&args).unwrap();
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.reads_out == 6));
        assert_eq!(count_fragments(out_a.to_str().unwrap()).unwrap(), 6);
        // the smallest file is copied unchanged
        let b = fs::read_to_string(&out_b).unwrap();
        assert_eq!(b.lines().count(), 4);

        // same seed, same result
        let first = fs::read(&out_a).unwrap();
        run(&args).unwrap();
        assert_eq!(fs::read(&out_a).unwrap(), first);
    }
}
