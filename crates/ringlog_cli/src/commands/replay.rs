//! Replay command implementation.

use super::CliResult;
use ringlog_core::{Device, LogConfig};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Outcome of replaying input through a device.
#[derive(Debug, Serialize)]
pub struct ReplayResult {
    /// Where the input came from.
    pub source: String,
    /// Ring capacity used.
    pub capacity: usize,
    /// Terminated lines read from the input.
    pub lines_read: usize,
    /// Records committed by the device.
    pub commits: u64,
    /// Records evicted to make room.
    pub evictions: u64,
    /// Bytes in the live stream.
    pub total_bytes: u64,
    /// Unterminated bytes left at the end of input.
    pub pending_bytes: usize,
    /// Live records, oldest first.
    pub records: Vec<String>,
}

/// Feeds `reader` line by line through a fresh device.
///
/// Returns the summary and the live stream.
pub fn replay<R: BufRead>(mut reader: R, source: &str, capacity: usize) -> CliResult<(ReplayResult, Vec<u8>)> {
    let device = Device::new(LogConfig::new().capacity(capacity))?;

    let mut line = Vec::new();
    let mut lines_read = 0;
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if line.ends_with(b"\n") {
            lines_read += 1;
        }
        device.write(&line, None)?;
    }

    let stats = device.stats();
    let result = ReplayResult {
        source: source.to_string(),
        capacity,
        lines_read,
        commits: stats.commits,
        evictions: stats.evictions,
        total_bytes: device.total_bytes()?,
        pending_bytes: device.pending_bytes()?,
        records: device
            .records()?
            .iter()
            .map(|r| String::from_utf8_lossy(r.as_bytes()).into_owned())
            .collect(),
    };
    let contents = device.contents()?;
    device.close()?;
    Ok((result, contents))
}

/// Runs the replay command.
///
/// Reads from `input`, or stdin when it is `None`.
pub fn run(input: Option<&Path>, capacity: usize, format: &str) -> CliResult<()> {
    let (result, contents) = match input {
        Some(path) => {
            let file = File::open(path)?;
            replay(BufReader::new(file), &path.display().to_string(), capacity)?
        }
        None => replay(io::stdin().lock(), "<stdin>", capacity)?,
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            let mut out = io::stdout().lock();
            out.write_all(&contents)?;
            out.flush()?;
            print_summary(&result);
        }
    }

    Ok(())
}

fn print_summary(result: &ReplayResult) {
    eprintln!();
    eprintln!("=== Replay of {} ===", result.source);
    eprintln!("Capacity:      {}", result.capacity);
    eprintln!("Lines read:    {}", result.lines_read);
    eprintln!("Commits:       {}", result.commits);
    eprintln!("Evictions:     {}", result.evictions);
    eprintln!("Live records:  {}", result.records.len());
    eprintln!("Live bytes:    {}", result.total_bytes);
    if result.pending_bytes > 0 {
        eprintln!("Pending bytes: {} (unterminated tail)", result.pending_bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CliError;
    use std::io::Cursor;

    #[test]
    fn keeps_newest_records() {
        let input = Cursor::new(b"one\ntwo\nthree\nfour\n".to_vec());
        let (result, contents) = replay(input, "test", 2).unwrap();

        assert_eq!(contents, b"three\nfour\n".to_vec());
        assert_eq!(result.lines_read, 4);
        assert_eq!(result.commits, 4);
        assert_eq!(result.evictions, 2);
        assert_eq!(result.total_bytes, 11);
        assert_eq!(result.records, vec!["three\n", "four\n"]);
    }

    #[test]
    fn unterminated_tail_is_pending() {
        let input = Cursor::new(b"a\nb\ntail".to_vec());
        let (result, contents) = replay(input, "test", 10).unwrap();

        assert_eq!(contents, b"a\nb\n".to_vec());
        assert_eq!(result.lines_read, 2);
        assert_eq!(result.pending_bytes, 4);
    }

    #[test]
    fn json_shape() {
        let (result, _) = replay(Cursor::new(b"x\n".to_vec()), "stdin", 3).unwrap();
        let value: serde_json::Value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["capacity"], 3);
        assert_eq!(value["records"][0], "x\n");
    }

    #[test]
    fn zero_capacity_is_an_error() {
        let result = replay(Cursor::new(Vec::new()), "test", 0);
        assert!(matches!(result, Err(CliError::Log(_))));
    }
}
