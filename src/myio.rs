use anyhow::{Context, Result};
use flate2::write;
use flate2::Compression;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

const BUFFER_SIZE: usize = 128 * 1024;

/// Write normal or compressed files seamlessly
/// Uses the presence of a `.gz` extension to decide, `-` writes to stdout.
/// # Example
/// ```
/// use std::io::{BufRead, Write};
/// let dir = tempfile::tempdir().unwrap();
/// let out = dir.path().join("out.bed.gz");
/// let mut w = homedepot::myio::writer(out.to_str().unwrap()).unwrap();
/// writeln!(w, "chr1\t0\t10").unwrap();
/// drop(w);
/// let mut line = String::new();
/// homedepot::myio::reader(out.to_str().unwrap()).unwrap().read_line(&mut line).unwrap();
/// assert_eq!(line, "chr1\t0\t10\n");
/// ```
pub fn writer(filename: &str) -> Result<Box<dyn Write>> {
    if filename == "-" {
        return Ok(Box::new(BufWriter::with_capacity(BUFFER_SIZE, io::stdout())));
    }
    let path = Path::new(filename);
    let file = File::create(path).with_context(|| format!("couldn't create {}", path.display()))?;

    if path.extension() == Some(OsStr::new("gz")) {
        Ok(Box::new(BufWriter::with_capacity(
            BUFFER_SIZE,
            write::GzEncoder::new(file, Compression::default()),
        )))
    } else {
        Ok(Box::new(BufWriter::with_capacity(BUFFER_SIZE, file)))
    }
}

/// Read normal or compressed files seamlessly
/// Compression is sniffed from the leading bytes, so bgzipped fragment files
/// work without a `.gz` suffix. `-` reads from stdin.
pub fn reader(filename: &str) -> Result<Box<dyn BufRead>> {
    let mut raw: Box<dyn Read> = if filename == "-" {
        Box::new(io::stdin())
    } else {
        Box::new(File::open(filename).with_context(|| format!("couldn't open {}", filename))?)
    };
    // read_to_end keeps going until 5 bytes or EOF, a pipe may hand them over piecemeal
    let mut head = Vec::with_capacity(5);
    raw.by_ref()
        .take(5)
        .read_to_end(&mut head)
        .with_context(|| format!("couldn't read {}", filename))?;
    let short = head.len() < 5;
    let stream = io::Cursor::new(head).chain(raw);
    // too short to carry a compression header, e.g. an empty file
    if short {
        return Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, stream)));
    }
    let (decoded, format) = niffler::get_reader(Box::new(stream))
        .with_context(|| format!("couldn't detect the compression of {}", filename))?;
    log::trace!("{} opened with compression {:?}", filename, format);
    Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, decoded)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(path: &Path) -> String {
        let mut text = String::new();
        reader(path.to_str().unwrap())
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        text
    }

    #[test]
    fn test_short_inputs_are_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.tsv");
        std::fs::write(&empty, "").unwrap();
        assert_eq!(read_all(&empty), "");
        let short = dir.path().join("short.tsv");
        std::fs::write(&short, "ab\n").unwrap();
        assert_eq!(read_all(&short), "ab\n");
        let five = dir.path().join("five.tsv");
        std::fs::write(&five, "abcd\n").unwrap();
        assert_eq!(read_all(&five), "abcd\n");
    }

    #[test]
    fn test_header_bytes_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.tsv");
        let text = "chr1\t0\t10\tA\t1\nchr1\t5\t15\tB\t2\n";
        std::fs::write(&plain, text).unwrap();
        assert_eq!(read_all(&plain), text);

        let gz = dir.path().join("frags.tsv.gz");
        let mut w = writer(gz.to_str().unwrap()).unwrap();
        w.write_all(text.as_bytes()).unwrap();
        drop(w);
        assert_eq!(read_all(&gz), text);
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = reader("/nonexistent/frags.tsv").err().unwrap();
        assert!(err.to_string().contains("/nonexistent/frags.tsv"));
    }
}
