use super::myio;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::io::BufRead;

pub type ChromSizes = HashMap<String, u64>;

/// parse a chromosome sizes file (`name\tsize` per line)
/// # Example
/// ```
/// let sizes = homedepot::chrom_sizes::parse_chrom_sizes(".test/chrom.sizes").unwrap();
/// assert_eq!(sizes.len(), 3);
/// assert_eq!(sizes["chr2"], 6000);
/// ```
pub fn parse_chrom_sizes(filename: &str) -> Result<ChromSizes> {
    let reader = myio::reader(filename)?;
    read_chrom_sizes(reader).with_context(|| format!("Failed to read chromosome sizes from {}", filename))
}

pub fn read_chrom_sizes<R: BufRead>(reader: R) -> Result<ChromSizes> {
    let mut sizes = ChromSizes::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let mut tokens = line.split_ascii_whitespace();
        let (name, size) = match (tokens.next(), tokens.next()) {
            (Some(name), Some(size)) => (name, size),
            _ => bail!("expected <name> <size> at line {}: {:?}", idx + 1, line),
        };
        let size = size
            .parse::<u64>()
            .with_context(|| format!("invalid size {:?} at line {}", size, idx + 1))?;
        if let Some(old) = sizes.insert(name.to_string(), size) {
            log::warn!("Chromosome {} is listed twice ({} and {}), keeping {}.", name, old, size, size);
        }
    }
    log::debug!("Read sizes for {} chromosomes.", sizes.len());
    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comments_and_extra_columns() {
        let text = "# ucsc sizes\nchr1\t1000\textra\n\nchrM 16569\n";
        let sizes = read_chrom_sizes(text.as_bytes()).unwrap();
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes["chr1"], 1000);
        assert_eq!(sizes["chrM"], 16569);
    }

    #[test]
    fn test_duplicate_keeps_last() {
        let sizes = read_chrom_sizes("chr1\t10\nchr1\t20\n".as_bytes()).unwrap();
        assert_eq!(sizes["chr1"], 20);
    }

    #[test]
    fn test_malformed_lines() {
        assert!(read_chrom_sizes("chr1\n".as_bytes()).is_err());
        let err = read_chrom_sizes("chr1\t10\nchr2\tten\n".as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }
}
