use super::myio;
use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::io::BufRead;

/// One line of a fragment file, borrowing its text fields from the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub chrom: &'a str,
    pub st: u64,
    pub en: u64,
    pub barcode: &'a str,
    pub count: u64,
}

impl<'a> Fragment<'a> {
    /// Parse `chrom start end barcode count [...]`, extra columns are ignored.
    /// # Example
    /// ```
    /// use homedepot::fragment::Fragment;
    /// let frag = Fragment::new("chr1\t10\t120\tAAACGAAAGACTCGGA-1\t3\n").unwrap();
    /// assert_eq!(frag.barcode, "AAACGAAAGACTCGGA-1");
    /// assert_eq!(frag.count, 3);
    /// assert!(Fragment::new("chr1\t10\t120\tAAACGAAAGACTCGGA-1").is_err());
    /// ```
    pub fn new(line: &'a str) -> Result<Fragment<'a>> {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        let mut t = line.split('\t');
        let mut next = |column: &str| t.next().ok_or_else(|| anyhow!("missing the {} column", column));
        let chrom = next("chrom")?;
        let st = next("start")?;
        let en = next("end")?;
        let barcode = next("barcode")?;
        let count = next("count")?;
        Ok(Fragment {
            chrom,
            st: st.parse().with_context(|| format!("invalid start {:?}", st))?,
            en: en.parse().with_context(|| format!("invalid end {:?}", en))?,
            barcode,
            count: count
                .parse()
                .with_context(|| format!("invalid count {:?}", count))?,
        })
    }

    pub fn with_count(self, count: u64) -> Fragment<'a> {
        Fragment { count, ..self }
    }
}

impl fmt::Display for Fragment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.chrom, self.st, self.en, self.barcode, self.count
        )
    }
}

/// Call `f` on every fragment of `reader`, `#` and blank lines are skipped.
/// Errors are tagged with their line number.
pub fn for_each_fragment<R, F>(mut reader: R, mut f: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(Fragment) -> Result<()>,
{
    let mut line = String::new();
    let mut line_number = 0;
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        line_number += 1;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let frag = Fragment::new(&line).with_context(|| format!("line {}", line_number))?;
        f(frag).with_context(|| format!("line {}", line_number))?;
    }
    Ok(())
}

/// Total number of reads (sum of the count column) in a fragment file.
/// # Example
/// ```
/// let n = homedepot::fragment::count_fragments(".test/frag_a.tsv").unwrap();
/// assert_eq!(n, 10);
/// let n = homedepot::fragment::count_fragments(".test/frag_b.tsv.gz").unwrap();
/// assert_eq!(n, 6);
/// ```
pub fn count_fragments(filename: &str) -> Result<u64> {
    let reader = myio::reader(filename)?;
    let total =
        sum_counts(reader).with_context(|| format!("Failed to count fragments in {}", filename))?;
    log::debug!("File {} has {} fragments.", filename, total);
    Ok(total)
}

pub fn sum_counts<R: BufRead>(reader: R) -> Result<u64> {
    let mut total = 0_u64;
    for_each_fragment(reader, |frag| {
        total = total
            .checked_add(frag.count)
            .ok_or_else(|| anyhow!("read count overflows after {} reads", total))?;
        Ok(())
    })?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_columns_dropped() {
        let frag = Fragment::new("chr2\t5\t50\tBC\t2\textra\tcolumns").unwrap();
        assert_eq!(frag.to_string(), "chr2\t5\t50\tBC\t2");
        assert_eq!(frag.with_count(1).to_string(), "chr2\t5\t50\tBC\t1");
    }

    #[test]
    fn test_bad_counts() {
        assert!(Fragment::new("chr2\t5\t50\tBC\t-1").is_err());
        assert!(Fragment::new("chr2\t5\t50\tBC\tone").is_err());
        assert!(Fragment::new("chr2\tfive\t50\tBC\t1").is_err());
    }

    #[test]
    fn test_for_each_fragment() {
        let text = "# header\nchr1\t1\t2\tA\t1\n\nchr1\t3\t4\tB\t2\r\n";
        let mut seen = Vec::new();
        for_each_fragment(text.as_bytes(), |frag| {
            seen.push((frag.barcode.to_string(), frag.count));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec![("A".to_string(), 1), ("B".to_string(), 2)]);
    }

    #[test]
    fn test_count_overflow() {
        let text = format!("chr1\t1\t2\tA\t{}\nchr1\t3\t4\tB\t1\n", u64::MAX);
        let err = sum_counts(text.as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).starts_with("line 2"));
        assert_eq!(sum_counts("# only a header\n".as_bytes()).unwrap(), 0);
    }

    #[test]
    fn test_count_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.tsv");
        std::fs::write(&path, "").unwrap();
        assert_eq!(count_fragments(path.to_str().unwrap()).unwrap(), 0);
    }

    #[test]
    fn test_for_each_fragment_line_numbers() {
        let text = "chr1\t1\t2\tA\t1\nchr1\t3\t4\tB\n";
        let err = for_each_fragment(text.as_bytes(), |_| Ok(())).unwrap_err();
        assert!(format!("{:#}", err).starts_with("line 2"));
    }
}
