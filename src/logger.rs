use super::cli::LogLevel;
use chrono::Local;
use env_logger::{Builder, Target};
use log::{LevelFilter, Record};
use std::io::{self, Write};

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            // `log` has no level above error
            LogLevel::Critical | LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Notset => LevelFilter::Trace,
        }
    }
}

/// Format one record as `[YYYY-MM-DD HH:MM:SS] LEVEL:target: message`.
pub fn write_record<W: Write + ?Sized>(buf: &mut W, record: &Record) -> io::Result<()> {
    writeln!(
        buf,
        "[{}] {}:{}: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.target(),
        record.args()
    )
}

/// Send log records to stderr as `[2024-01-31 12:00:00] INFO:homedepot::gtf_to_bed: message`.
pub fn init(level: LogLevel) {
    Builder::new()
        .target(Target::Stderr)
        .filter(None, level.into())
        .format(|buf, record| write_record(buf, record))
        .init();

    log::debug!("DEBUG logging enabled");
    log::trace!("TRACE logging enabled");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(LevelFilter::from(LogLevel::Critical), LevelFilter::Error);
        assert_eq!(LevelFilter::from(LogLevel::Warning), LevelFilter::Warn);
        assert_eq!(LevelFilter::from(LogLevel::Info), LevelFilter::Info);
        assert_eq!(LevelFilter::from(LogLevel::Notset), LevelFilter::Trace);
    }

    #[test]
    fn test_record_format() {
        let mut out = Vec::new();
        write_record(
            &mut out,
            &Record::builder()
                .args(format_args!("hello {}", 1))
                .level(log::Level::Info)
                .target("homedepot::gtf")
                .build(),
        )
        .unwrap();
        let line = String::from_utf8(out).unwrap();
        assert!(line.starts_with('['));
        assert!(chrono::NaiveDateTime::parse_from_str(&line[1..20], "%Y-%m-%d %H:%M:%S").is_ok());
        assert_eq!(&line[20..], "] INFO:homedepot::gtf: hello 1\n");
    }
}
