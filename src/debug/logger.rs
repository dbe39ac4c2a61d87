// Logger - CPU instruction trace
//
// Provides:
// - Bounded in-memory trace buffer
// - Optional trace file in nestest log format

use super::cpu::CpuState;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Default number of entries kept in memory
pub const DEFAULT_BUFFER_SIZE: usize = 10_000;

/// CPU trace logger
///
/// Keeps the most recent trace entries in memory and, when a log file is
/// open, writes every entry to it as one nestest-format line.
pub struct Logger {
    /// Enable CPU trace logging
    cpu_trace: bool,

    /// In-memory trace buffer, oldest first
    trace_buffer: VecDeque<CpuState>,

    /// Maximum number of entries in trace buffer (0 = unlimited)
    max_buffer_size: usize,

    /// Output file
    output_file: Option<BufWriter<File>>,
}

impl Logger {
    /// Create a logger with tracing disabled
    pub fn new() -> Self {
        Logger {
            cpu_trace: false,
            trace_buffer: VecDeque::new(),
            max_buffer_size: DEFAULT_BUFFER_SIZE,
            output_file: None,
        }
    }

    /// Enable CPU trace logging
    pub fn enable_cpu_trace(&mut self) {
        self.cpu_trace = true;
    }

    /// Disable CPU trace logging
    pub fn disable_cpu_trace(&mut self) {
        self.cpu_trace = false;
    }

    pub fn is_cpu_trace_enabled(&self) -> bool {
        self.cpu_trace
    }

    /// Set maximum trace buffer size
    ///
    /// When the buffer exceeds this size, old entries are removed.
    /// Set to 0 for unlimited size.
    pub fn set_max_buffer_size(&mut self, size: usize) {
        self.max_buffer_size = size;

        if size > 0 && self.trace_buffer.len() > size {
            let excess = self.trace_buffer.len() - size;
            self.trace_buffer.drain(..excess);
        }
    }

    /// Open a log file for output, replacing any open one
    pub fn open_log_file<P: AsRef<Path>>(&mut self, path: P) -> io::Result<()> {
        self.close_log_file()?;
        let file = File::create(path)?;
        self.output_file = Some(BufWriter::new(file));
        Ok(())
    }

    /// Flush and close the log file
    pub fn close_log_file(&mut self) -> io::Result<()> {
        match self.output_file.take() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }

    /// Log a CPU state
    pub fn log_cpu_state(&mut self, state: CpuState) {
        if !self.cpu_trace {
            return;
        }

        if let Some(file) = self.output_file.as_mut() {
            if let Err(e) = writeln!(file, "{}", state) {
                tracing::warn!(error = %e, "Closing trace file after write error");
                self.output_file = None;
            }
        }

        self.trace_buffer.push_back(state);

        if self.max_buffer_size > 0 && self.trace_buffer.len() > self.max_buffer_size {
            self.trace_buffer.pop_front();
        }
    }

    /// Trace entries, oldest first
    pub fn trace_buffer(&self) -> impl Iterator<Item = &CpuState> {
        self.trace_buffer.iter()
    }

    pub fn len(&self) -> usize {
        self.trace_buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace_buffer.is_empty()
    }

    /// Clear the trace buffer
    pub fn clear_buffer(&mut self) {
        self.trace_buffer.clear();
    }

    /// Get the last N trace entries, oldest first
    pub fn last_entries(&self, count: usize) -> impl Iterator<Item = &CpuState> {
        let start = self.trace_buffer.len().saturating_sub(count);
        self.trace_buffer.range(start..)
    }

    /// Format the last N entries, one line each
    pub fn format_last_entries(&self, count: usize) -> String {
        let mut output = String::new();

        for entry in self.last_entries(count) {
            output.push_str(&format!("{}\n", entry));
        }

        output
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        let _ = self.close_log_file();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Bus;
    use crate::cpu::Cpu;

    fn entry(cycles: u64) -> CpuState {
        CpuState::capture(&Cpu::new(), &Bus::new(), cycles)
    }

    #[test]
    fn test_logger_creation() {
        let logger = Logger::new();
        assert!(!logger.is_cpu_trace_enabled());
        assert!(logger.is_empty());
    }

    #[test]
    fn test_disabled_logger_records_nothing() {
        let mut logger = Logger::new();
        logger.log_cpu_state(entry(1));
        assert!(logger.is_empty());

        logger.enable_cpu_trace();
        logger.log_cpu_state(entry(2));
        assert_eq!(logger.len(), 1);

        logger.disable_cpu_trace();
        logger.log_cpu_state(entry(3));
        assert_eq!(logger.len(), 1);
    }

    #[test]
    fn test_max_buffer_size() {
        let mut logger = Logger::new();
        logger.enable_cpu_trace();
        logger.set_max_buffer_size(3);

        for cycles in 1..=4 {
            logger.log_cpu_state(entry(cycles));
        }

        let cycles: Vec<u64> = logger.trace_buffer().map(|state| state.cycles).collect();
        assert_eq!(cycles, vec![2, 3, 4], "Oldest entry dropped");
    }

    #[test]
    fn test_shrinking_buffer_keeps_newest() {
        let mut logger = Logger::new();
        logger.enable_cpu_trace();
        for cycles in 1..=5 {
            logger.log_cpu_state(entry(cycles));
        }

        logger.set_max_buffer_size(2);
        let cycles: Vec<u64> = logger.trace_buffer().map(|state| state.cycles).collect();
        assert_eq!(cycles, vec![4, 5]);
    }

    #[test]
    fn test_last_entries() {
        let mut logger = Logger::new();
        logger.enable_cpu_trace();
        for cycles in 1..=3 {
            logger.log_cpu_state(entry(cycles));
        }

        let last: Vec<u64> = logger.last_entries(2).map(|state| state.cycles).collect();
        assert_eq!(last, vec![2, 3]);
        assert_eq!(logger.format_last_entries(10).lines().count(), 3);
    }

    #[test]
    fn test_log_file_receives_lines() {
        let path = std::env::temp_dir().join(format!("cyclenes-trace-{}.log", std::process::id()));
        let mut logger = Logger::new();
        logger.enable_cpu_trace();
        logger.open_log_file(&path).expect("Failed to open log file");

        logger.log_cpu_state(entry(7));
        logger.log_cpu_state(entry(9));
        logger.close_log_file().expect("Failed to flush log file");

        let contents = std::fs::read_to_string(&path).expect("Failed to read log file");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("CYC:7"));

        let _ = std::fs::remove_file(&path);
    }
}
