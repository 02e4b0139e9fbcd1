//! Stress tests for the ring log.
//!
//! These harnesses drive a shared device from many threads and check what
//! readers observe.

use ringlog_core::{Device, LogConfig};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Reads that observed a malformed stream.
    pub violations: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, violations: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            violations,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Violations: {}", self.violations);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Records written per writer thread.
    pub operations: usize,
    /// Number of writer threads.
    pub writers: usize,
    /// Number of reader threads.
    pub readers: usize,
    /// Ring capacity.
    pub capacity: usize,
    /// Body length of each record, excluding the newline.
    pub record_size: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 1_000,
            writers: 4,
            readers: 4,
            capacity: 10,
            record_size: 32,
        }
    }
}

/// Builds the record writer `writer` emits as its `seq`-th record.
///
/// The body is a `w<writer>:<seq>:` header padded with the writer's letter.
pub fn stress_record(writer: usize, seq: usize, size: usize) -> Vec<u8> {
    let mut line = format!("w{writer}:{seq}:").into_bytes();
    let fill = b'a' + (writer % 26) as u8;
    while line.len() < size {
        line.push(fill);
    }
    line.push(b'\n');
    line
}

/// Returns true if every record in `stream` is a well-formed stress record.
pub fn is_well_formed(stream: &[u8]) -> bool {
    if stream.is_empty() {
        return true;
    }
    if !stream.ends_with(b"\n") {
        return false;
    }
    stream[..stream.len() - 1].split(|&b| b == b'\n').all(|line| {
        let text = String::from_utf8_lossy(line);
        let mut parts = text.splitn(3, ':');
        let (Some(writer), Some(seq), Some(fill)) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };
        let Some(Ok(writer)) = writer.strip_prefix('w').map(str::parse::<usize>) else {
            return false;
        };
        let expected = char::from(b'a' + (writer % 26) as u8);
        seq.parse::<usize>().is_ok() && fill.chars().all(|c| c == expected)
    })
}

/// One writer splits every record across two writes while
/// `config.readers` threads repeatedly read the whole stream.
///
/// The pending buffer is shared by the whole device, so `config.writers` is
/// ignored here. A violation is a read that observed a partial record.
pub fn stress_split_writes(config: &StressConfig) -> StressTestResult {
    let device = Device::new(LogConfig::new().capacity(config.capacity)).expect("Failed to create device");
    let done = Arc::new(AtomicBool::new(false));
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let violations = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();

    let readers: Vec<_> = (0..config.readers)
        .map(|_| {
            let device = Arc::clone(&device);
            let done = Arc::clone(&done);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let violations = Arc::clone(&violations);

            thread::spawn(move || {
                while !done.load(Ordering::Acquire) {
                    match device.contents() {
                        Ok(stream) => {
                            successful.fetch_add(1, Ordering::Relaxed);
                            if !is_well_formed(&stream) {
                                violations.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    let writer = {
        let device = Arc::clone(&device);
        let successful = Arc::clone(&successful);
        let failed = Arc::clone(&failed);
        let operations = config.operations;
        let size = config.record_size;

        thread::spawn(move || {
            for seq in 0..operations {
                let record = stress_record(0, seq, size);
                let (head, tail) = record.split_at(record.len() / 2);
                let result = device
                    .write(head, None)
                    .and_then(|_| device.write(tail, None));
                match result {
                    Ok(_) => successful.fetch_add(1, Ordering::Relaxed),
                    Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                };
            }
        })
    };

    writer.join().expect("Writer thread panicked");
    done.store(true, Ordering::Release);
    for handle in readers {
        handle.join().expect("Reader thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        violations.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Concurrent writers each append whole records in single writes.
///
/// Afterwards the device must hold exactly `min(total, capacity)` records.
pub fn stress_concurrent_writes(config: &StressConfig) -> (StressTestResult, Arc<Device>) {
    let device = Device::new(LogConfig::new().capacity(config.capacity)).expect("Failed to create device");
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));

    let start = Instant::now();

    let handles: Vec<_> = (0..config.writers)
        .map(|w| {
            let device = Arc::clone(&device);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let operations = config.operations;
            let size = config.record_size;

            thread::spawn(move || {
                for seq in 0..operations {
                    match device.write(&stress_record(w, seq, size), None) {
                        Ok(_) => successful.fetch_add(1, Ordering::Relaxed),
                        Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let violations = match device.contents() {
        Ok(stream) if is_well_formed(&stream) => 0,
        _ => 1,
    };
    let result = StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        violations,
        start.elapsed(),
    );
    (result, device)
}
