use super::cli::InputFormat;
use bio_types::strand::Strand;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::io::{self, BufRead};

lazy_static! {
    // key "value"; or key value;
    static ref GTF_ATTR_RE: Regex =
        Regex::new(r#"\s*(\S+)\s+(?:"([^"]*)"|([^;\s"]+))\s*;?"#).unwrap();
    static ref GFF_ATTR_RE: Regex = Regex::new(r"(\S+?)=([^;]+);?").unwrap();
}

#[derive(Debug)]
pub enum Error {
    MissingColumns { found: usize },
    ParseCoordinate { column: &'static str, value: String },
    ParseStrand { value: String },
    InvertedInterval { start: u64, end: u64 },
    Io(io::Error),
}
pub type GtfResult<T> = Result<T, crate::gtf::Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingColumns { found } => {
                write!(f, "expected 9 tab separated columns, found {}", found)
            }
            Error::ParseCoordinate { column, value } => {
                write!(f, "invalid {} coordinate {:?}", column, value)
            }
            Error::ParseStrand { value } => write!(f, "invalid strand {:?}", value),
            Error::InvertedInterval { start, end } => {
                write!(f, "start ({}) is after end ({})", start, end)
            }
            Error::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// One line of a GTF or GFF file. Coordinates are kept as written (1-based, inclusive).
#[derive(Debug, Clone, PartialEq)]
pub struct GtfRecord {
    pub chrom: String,
    pub source: String,
    pub feature: String,
    pub start: u64,
    pub end: u64,
    pub score: String,
    pub strand: Strand,
    pub frame: String,
    pub attributes: String,
}

fn parse_coordinate(column: &'static str, value: &str) -> GtfResult<u64> {
    value.parse::<u64>().map_err(|_| Error::ParseCoordinate {
        column,
        value: value.to_string(),
    })
}

impl GtfRecord {
    /// # Example
    /// ```
    /// use homedepot::gtf::GtfRecord;
    /// use bio_types::strand::Strand;
    /// let rec = GtfRecord::new("chr1\tHAVANA\tgene\t11869\t14409\t.\t+\t.\tgene_id \"ENSG00000223972\";").unwrap();
    /// assert_eq!(rec.feature, "gene");
    /// assert_eq!(rec.strand, Strand::Forward);
    /// assert_eq!((rec.start, rec.end), (11869, 14409));
    /// assert!(GtfRecord::new("chr1\tHAVANA\tgene\t11869").is_err());
    /// ```
    pub fn new(line: &str) -> GtfResult<GtfRecord> {
        let t: Vec<&str> = line.trim_end_matches(&['\r', '\n'][..]).split('\t').collect();
        if t.len() < 9 {
            return Err(Error::MissingColumns { found: t.len() });
        }
        let start = parse_coordinate("start", t[3])?;
        let end = parse_coordinate("end", t[4])?;
        if start > end {
            return Err(Error::InvertedInterval { start, end });
        }
        let strand = match t[6] {
            "+" => Strand::Forward,
            "-" => Strand::Reverse,
            "." | "?" => Strand::Unknown,
            other => {
                return Err(Error::ParseStrand {
                    value: other.to_string(),
                })
            }
        };

        Ok(GtfRecord {
            chrom: t[0].to_string(),
            source: t[1].to_string(),
            feature: t[2].to_string(),
            start,
            end,
            score: t[5].to_string(),
            strand,
            frame: t[7].to_string(),
            // a stray tab inside the attributes is kept
            attributes: t[8..].join("\t"),
        })
    }

    /// The 0-based, half-open interval of the record.
    pub fn interval(&self) -> (u64, u64) {
        (self.start.saturating_sub(1), self.end)
    }

    pub fn is_reverse(&self) -> bool {
        matches!(self.strand, Strand::Reverse)
    }

    pub fn parse_attributes(&self, format: InputFormat) -> HashMap<&str, &str> {
        parse_attributes(&self.attributes, format)
    }
}

/// Parse the attribute column. Repeated keys keep their last value.
/// # Example
/// ```
/// use homedepot::cli::InputFormat;
/// use homedepot::gtf::parse_attributes;
/// let attrs = parse_attributes("gene_id \"g1\"; gene_name \"ABC\";", InputFormat::Gtf);
/// assert_eq!(attrs["gene_name"], "ABC");
/// let attrs = parse_attributes("ID=gene:g1;Name=ABC", InputFormat::Gff);
/// assert_eq!(attrs["ID"], "gene:g1");
/// ```
pub fn parse_attributes(attributes: &str, format: InputFormat) -> HashMap<&str, &str> {
    let mut attrs = HashMap::new();
    match format {
        InputFormat::Gtf => {
            for caps in GTF_ATTR_RE.captures_iter(attributes) {
                let key = caps.get(1).map_or("", |m| m.as_str());
                let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
                attrs.insert(key, value);
            }
        }
        InputFormat::Gff => {
            for caps in GFF_ATTR_RE.captures_iter(attributes) {
                let key = caps.get(1).map_or("", |m| m.as_str());
                let value = caps.get(2).map_or("", |m| m.as_str());
                attrs.insert(key, value);
            }
        }
    }
    attrs
}

/// Iterate over the records of a GTF/GFF stream, skipping `#` lines and blank lines.
/// Errors carry the line number they happened on.
pub struct GtfReader<R: BufRead> {
    reader: R,
    buf: String,
    line_number: usize,
}

impl<R: BufRead> GtfReader<R> {
    pub fn new(reader: R) -> Self {
        GtfReader {
            reader,
            buf: String::new(),
            line_number: 0,
        }
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> Iterator for GtfReader<R> {
    type Item = Result<GtfRecord, (usize, Error)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_number += 1,
                Err(e) => return Some(Err((self.line_number + 1, Error::Io(e)))),
            }
            let line = self.buf.trim_end_matches(&['\r', '\n'][..]);
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            return Some(GtfRecord::new(line).map_err(|e| (self.line_number, e)));
        }
    }
}
