//! CSV output for snapshots and probe traces.
//!
//! Snapshots arrive over a crossbeam channel and are written on a
//! dedicated thread, one file per step: `{prefix}_t{step:04}.csv`. Each
//! line holds one x index, with Ez values for increasing y separated by
//! commas.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use ezwave_engine::{FieldSnapshot, ProbeSet};
use tracing::info;

/// Writes snapshot CSVs into one directory.
#[derive(Clone, Debug)]
pub struct CsvRecorder {
    dir: PathBuf,
    prefix: String,
}

impl CsvRecorder {
    /// Record into `dir` with the given file-name prefix.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Output path for a snapshot taken at `step`.
    pub fn path_for(&self, step: u64) -> PathBuf {
        self.dir.join(format!("{}_t{:04}.csv", self.prefix, step))
    }

    /// Write one snapshot; returns the file written.
    pub fn write(&self, snapshot: &FieldSnapshot) -> io::Result<PathBuf> {
        let path = self.path_for(snapshot.step().0);
        let mut out = BufWriter::new(File::create(&path)?);
        let ez = snapshot.ez();
        let ny = snapshot.dims().ny();
        for row in ez.as_slice().chunks(ny) {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(out, "{}", line.join(","))?;
        }
        out.flush()?;
        info!(
            step = snapshot.step().0,
            path = %path.display(),
            scale = snapshot.display_scale(),
            "snapshot written"
        );
        Ok(path)
    }

    /// Drain `rx` on a new thread until every sender is dropped.
    ///
    /// The thread stops at the first write error and returns it.
    pub fn spawn(
        self,
        rx: Receiver<FieldSnapshot>,
    ) -> io::Result<JoinHandle<io::Result<Vec<PathBuf>>>> {
        thread::Builder::new()
            .name("ezwave-recorder".into())
            .spawn(move || {
                let mut written = Vec::new();
                for snapshot in rx {
                    written.push(self.write(&snapshot)?);
                }
                Ok(written)
            })
    }
}

/// Write probe traces as CSV: a `step` column, then one column per probe
/// in insertion order.
pub fn write_probes(path: &Path, probes: &ProbeSet) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    let header: Vec<&str> = std::iter::once("step").chain(probes.names()).collect();
    writeln!(out, "{}", header.join(","))?;

    let rows = probes
        .iter()
        .map(|(_, trace)| trace.samples().len())
        .max()
        .unwrap_or(0);
    for step in 0..rows {
        let mut line = step.to_string();
        for (_, trace) in probes.iter() {
            line.push(',');
            if let Some(v) = trace.samples().get(step) {
                line.push_str(&v.to_string());
            }
        }
        writeln!(out, "{line}")?;
    }
    out.flush()
}
