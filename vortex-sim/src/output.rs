//! Per-tick imbalance log.
//!
//! Each run writes one integer per line to a file named after the routing
//! policy, so runs of different policies land side by side.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use vortex_sim_core::PolicyKind;

/// Buffered writer for the imbalance stream of one run.
pub struct ImbalanceLog<W: Write = BufWriter<File>> {
    writer: W,
    lines: u64,
}

impl ImbalanceLog {
    /// Create (or truncate) `<dir>/<policy name>`.
    pub fn create<P: AsRef<Path>>(dir: P, policy: PolicyKind) -> io::Result<(Self, PathBuf)> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(policy.name());
        let file = File::create(&path)?;
        Ok((Self::new(BufWriter::new(file)), path))
    }
}

impl<W: Write> ImbalanceLog<W> {
    /// Wrap an arbitrary writer.
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Append one tick's imbalance.
    pub fn record(&mut self, imbalance: u64) -> io::Result<()> {
        writeln!(self.writer, "{imbalance}")?;
        self.lines += 1;
        Ok(())
    }

    /// Number of ticks written.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Flush and hand back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
