use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::formats::rows::split_quoted_row;
use crate::formats::{FormatHandler, FormatId, ParseError, RecordStream};
use crate::model::{CallRecord, Descriptor};

/// The format always carries a fixed two-line header before the record body.
const HEADER_LINES: usize = 2;

/// YourKit CSV call-trace export: quoted three-field rows of
/// `"descriptor","elapsed-ms","depth"` after a two-line header.
pub struct YourkitCsv;

impl FormatHandler for YourkitCsv {
    fn format_id(&self) -> FormatId {
        "yourkit"
    }

    /// Structural validation of the entire file. A single malformed line
    /// anywhere disqualifies the file: detection stays conservative so a
    /// file is never misrouted to the wrong parser. A header-only file
    /// accepts vacuously.
    fn accepts(&self, file: &Path) -> io::Result<bool> {
        if file.extension().and_then(|e| e.to_str()) != Some("csv") {
            return Ok(false);
        }
        let reader = BufReader::new(File::open(file)?);
        for line in reader.lines().skip(HEADER_LINES) {
            let line = match line {
                Ok(line) => line,
                // Not text — not this format.
                Err(e) if e.kind() == io::ErrorKind::InvalidData => return Ok(false),
                Err(e) => return Err(e),
            };
            if parse_row(&line).is_err() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn records(&self, file: &Path) -> Result<RecordStream, ParseError> {
        let reader = BufReader::new(File::open(file)?);
        let iter = reader
            .lines()
            .skip(HEADER_LINES)
            .enumerate()
            .map(|(index, line)| {
                let line = line?;
                parse_row(&line).map_err(|reason| ParseError::MalformedRecord {
                    line: index + HEADER_LINES + 1,
                    reason,
                })
            });
        Ok(Box::new(iter))
    }
}

/// Parse one body row. The same rules back both the sniffer and the record
/// parser, so acceptance and parsing cannot drift apart.
fn parse_row(line: &str) -> Result<CallRecord, &'static str> {
    let [raw_descriptor, raw_time, raw_level] =
        split_quoted_row(line).ok_or("expected three quoted fields")?;
    if !is_method(raw_descriptor) && !raw_descriptor.contains(':') {
        return Err("descriptor is neither method-shaped nor a marker");
    }
    let elapsed_ms: u64 = raw_time
        .parse()
        .map_err(|_| "elapsed time is not a non-negative integer")?;
    let depth: u32 = raw_level
        .parse()
        .map_err(|_| "depth level is not a non-negative integer")?;

    // Depth-0 rows with a colon descriptor open a thread's record block.
    let descriptor = if depth == 0 && raw_descriptor.contains(':') {
        let name = raw_descriptor.strip_suffix(':').unwrap_or(raw_descriptor);
        Descriptor::Thread(name.to_string())
    } else {
        Descriptor::Call(raw_descriptor.to_string())
    };
    Ok(CallRecord {
        descriptor,
        elapsed_ms,
        depth,
    })
}

/// Method-shaped: an open parenthesis strictly before a close parenthesis.
fn is_method(descriptor: &str) -> bool {
    match (descriptor.find('('), descriptor.find(')')) {
        (Some(open), Some(close)) => open < close,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    const VALID_BODY: &str = concat!(
        "\"h1\",\"h2\",\"h3\"\n",
        "\"h4\",\"h5\",\"h6\"\n",
        "\"main:\",\"0\",\"0\"\n",
        "\"int A.foo()\",\"5\",\"1\"\n",
    );

    #[test]
    fn accepts_valid_export() {
        let file = csv_file(VALID_BODY);
        assert!(YourkitCsv.accepts(file.path()).expect("io"));
    }

    #[test]
    fn sniffing_is_idempotent() {
        let file = csv_file(VALID_BODY);
        assert!(YourkitCsv.accepts(file.path()).expect("io"));
        assert!(YourkitCsv.accepts(file.path()).expect("io"));
    }

    #[test]
    fn rejects_non_integer_depth() {
        // Same as the valid export, but one depth field is not a number:
        // the whole file is rejected, not partially accepted.
        let file = csv_file(concat!(
            "\"h1\",\"h2\",\"h3\"\n",
            "\"h4\",\"h5\",\"h6\"\n",
            "\"main:\",\"0\",\"x\"\n",
            "\"int A.foo()\",\"5\",\"1\"\n",
        ));
        assert!(!YourkitCsv.accepts(file.path()).expect("io"));
    }

    #[test]
    fn rejects_negative_time() {
        let file = csv_file("\"h\",\"h\",\"h\"\n\"h\",\"h\",\"h\"\n\"int A.foo()\",\"-5\",\"1\"\n");
        assert!(!YourkitCsv.accepts(file.path()).expect("io"));
    }

    #[test]
    fn rejects_descriptor_without_parens_or_colon() {
        let file = csv_file("\"h\",\"h\",\"h\"\n\"h\",\"h\",\"h\"\n\"plain\",\"5\",\"1\"\n");
        assert!(!YourkitCsv.accepts(file.path()).expect("io"));
    }

    #[test]
    fn rejects_wrong_field_count() {
        let file = csv_file("\"h\",\"h\",\"h\"\n\"h\",\"h\",\"h\"\n\"int A.foo()\",\"5\"\n");
        assert!(!YourkitCsv.accepts(file.path()).expect("io"));
    }

    #[test]
    fn rejects_wrong_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".txt")
            .tempfile()
            .expect("temp file");
        file.write_all(VALID_BODY.as_bytes()).expect("write");
        assert!(!YourkitCsv.accepts(file.path()).expect("io"));
    }

    #[test]
    fn accepts_header_only_file() {
        let file = csv_file("\"h1\",\"h2\",\"h3\"\n\"h4\",\"h5\",\"h6\"\n");
        assert!(YourkitCsv.accepts(file.path()).expect("io"));
    }

    #[test]
    fn accepts_short_file() {
        // Fewer than two lines: missing header lines are treated as empty.
        let file = csv_file("\"h1\",\"h2\",\"h3\"\n");
        assert!(YourkitCsv.accepts(file.path()).expect("io"));
    }

    #[test]
    fn records_classify_thread_markers() {
        let file = csv_file(VALID_BODY);
        let records: Vec<_> = YourkitCsv
            .records(file.path())
            .expect("open")
            .collect::<Result<_, _>>()
            .expect("records");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].descriptor, Descriptor::Thread("main".into()));
        assert_eq!(records[0].depth, 0);
        assert_eq!(
            records[1].descriptor,
            Descriptor::Call("int A.foo()".into())
        );
        assert_eq!(records[1].elapsed_ms, 5);
        assert_eq!(records[1].depth, 1);
    }

    #[test]
    fn colon_descriptor_below_root_is_a_call() {
        let file = csv_file("\"h\",\"h\",\"h\"\n\"h\",\"h\",\"h\"\n\"gc: pause\",\"3\",\"2\"\n");
        let records: Vec<_> = YourkitCsv
            .records(file.path())
            .expect("open")
            .collect::<Result<_, _>>()
            .expect("records");
        assert_eq!(records[0].descriptor, Descriptor::Call("gc: pause".into()));
    }

    #[test]
    fn parsing_revalidates_each_line() {
        // A file the sniffer would reject still fails cleanly when handed
        // straight to the parser (the file may have changed after sniffing).
        let file = csv_file("\"h\",\"h\",\"h\"\n\"h\",\"h\",\"h\"\n\"int A.foo()\",\"bad\",\"1\"\n");
        let result: Result<Vec<_>, _> = YourkitCsv
            .records(file.path())
            .expect("open")
            .collect();
        assert!(matches!(
            result,
            Err(ParseError::MalformedRecord { line: 3, .. })
        ));
    }
}
