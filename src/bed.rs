use bio_types::strand::Strand;
use std::fmt;

/// A BED6 record, 0-based and half-open.
#[derive(Debug, Clone, PartialEq)]
pub struct BedRecord {
    pub chrom: String,
    pub st: u64,
    pub en: u64,
    pub name: String,
    pub score: String,
    pub strand: Strand,
}

impl BedRecord {
    pub fn len(&self) -> u64 {
        self.en - self.st
    }

    pub fn is_empty(&self) -> bool {
        self.st >= self.en
    }
}

/// # Example
/// ```
/// use bio_types::strand::Strand;
/// let rec = homedepot::bed::BedRecord {
///     chrom: "chr1".to_string(),
///     st: 0,
///     en: 2000,
///     name: "ENSG1".to_string(),
///     score: ".".to_string(),
///     strand: Strand::Reverse,
/// };
/// assert_eq!(rec.to_string(), "chr1\t0\t2000\tENSG1\t.\t-");
/// assert_eq!(rec.len(), 2000);
/// ```
impl fmt::Display for BedRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom, self.st, self.en, self.name, self.score, self.strand
        )
    }
}
