use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::formats::{FormatHandler, FormatId, ParseError, RecordStream};
use crate::model::{CallRecord, Descriptor};

/// Flame-graph folded stack format: one sample per line,
/// `frame;frame;... count`, root first. Produced by the stackcollapse
/// family of tools.
pub struct FoldedStacks;

impl FormatHandler for FoldedStacks {
    fn format_id(&self) -> FormatId {
        "flamegraph"
    }

    /// Accepts only when the file has at least one sample line and every
    /// non-empty, non-comment line parses. Total-file rejection, same
    /// conservatism as the CSV family: this grammar is loose enough that
    /// partial acceptance would misroute foreign files.
    fn accepts(&self, file: &Path) -> io::Result<bool> {
        let reader = BufReader::new(File::open(file)?);
        let mut saw_sample = false;
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => return Ok(false),
                Err(e) => return Err(e),
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if parse_stack_line(trimmed).is_err() {
                return Ok(false);
            }
            saw_sample = true;
        }
        Ok(saw_sample)
    }

    /// Each sample line expands into one record per frame, depth taken
    /// from the frame's position in the stack. The format has no thread
    /// markers; every record joins the implicit tree.
    fn records(&self, file: &Path) -> Result<RecordStream, ParseError> {
        let reader = BufReader::new(File::open(file)?);
        let iter = reader.lines().enumerate().flat_map(|(index, line)| {
            let line = match line {
                Ok(line) => line,
                Err(e) => return vec![Err(ParseError::Io(e))],
            };
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return Vec::new();
            }
            match parse_stack_line(trimmed) {
                Ok((frames, count)) => frames
                    .into_iter()
                    .enumerate()
                    .map(|(depth, name)| {
                        Ok(CallRecord {
                            descriptor: Descriptor::Call(name),
                            elapsed_ms: count,
                            depth: depth as u32,
                        })
                    })
                    .collect(),
                Err(reason) => vec![Err(ParseError::MalformedRecord {
                    line: index + 1,
                    reason,
                })],
            }
        });
        Ok(Box::new(iter))
    }
}

/// Split `a;b;c 42` into the frame names and the trailing sample count.
fn parse_stack_line(line: &str) -> Result<(Vec<String>, u64), &'static str> {
    let (stack, count) = line.rsplit_once(' ').ok_or("missing sample count")?;
    let count: u64 = count
        .trim()
        .parse()
        .map_err(|_| "sample count is not a non-negative integer")?;
    let stack = stack.trim();
    if stack.is_empty() {
        return Err("empty stack");
    }
    let frames: Vec<String> = stack.split(';').map(|f| f.trim().to_string()).collect();
    if frames.iter().any(String::is_empty) {
        return Err("empty frame name");
    }
    Ok((frames, count))
}
