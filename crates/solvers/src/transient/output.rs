use std::{
    fmt::Write as _,
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use nalgebra::DVector;

use crate::history::History;

use super::Error;

/// Per-order output files of one history.
///
/// Slot `k` receives the order-`k` vector of every committed step.
#[derive(Debug)]
pub(crate) struct Outputs {
    writers: Vec<Option<StepWriter>>,
}

impl Outputs {
    /// Creates empty slots for orders `0..=max_order`.
    pub(crate) fn new(max_order: usize) -> Self {
        Self {
            writers: (0..=max_order).map(|_| None).collect(),
        }
    }

    /// Opens `path` as the output of derivative `order`.
    ///
    /// A file that cannot be created is logged and skipped. A previously
    /// opened file for the same order is closed and replaced.
    pub(crate) fn open(&mut self, path: &Path, order: usize) -> Result<(), Error> {
        let max = self.writers.len() - 1;
        let slot = self
            .writers
            .get_mut(order)
            .ok_or(Error::InvalidOutputOrder { order, max })?;

        if let Some(previous) = slot {
            log::warn!(
                "replacing output file {} for order {order} with {}",
                previous.path.display(),
                path.display()
            );
        }

        *slot = match StepWriter::create(path) {
            Ok(writer) => Some(writer),
            Err(err) => {
                log::warn!("cannot open output file {}: {err}", path.display());
                None
            }
        };
        Ok(())
    }

    /// Appends the current step of `history` to every open file.
    ///
    /// A file that fails to accept a line is logged and closed.
    pub(crate) fn write(&mut self, history: &History) {
        let Some(time) = history.current_time() else {
            return;
        };

        for (order, slot) in self.writers.iter_mut().enumerate() {
            let (Some(writer), Ok(values)) = (slot.as_mut(), history.conf(order, 0)) else {
                continue;
            };
            if let Err(err) = writer.write_line(time, values) {
                log::warn!(
                    "closing output file {} after write failure: {err}",
                    writer.path.display()
                );
                *slot = None;
            }
        }
    }
}

/// A flushed-per-line, tab-separated output file.
#[derive(Debug)]
struct StepWriter {
    path: PathBuf,
    file: BufWriter<File>,
}

impl StepWriter {
    fn create(path: &Path) -> io::Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        log::debug!("writing step output to {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    fn write_line(&mut self, time: f64, values: &DVector<f64>) -> io::Result<()> {
        self.file.write_all(format_line(time, values).as_bytes())?;
        self.file.flush()
    }
}

/// Formats `time \t v_0 \t ... \t v_{n-1}\n`.
pub(crate) fn format_line(time: f64, values: &DVector<f64>) -> String {
    let mut line = scientific(time);
    for value in values {
        line.push('\t');
        line.push_str(&scientific(*value));
    }
    line.push('\n');
    line
}

/// Formats like C's `%.6e`: six fractional digits and an exponent of at
/// least two digits with an explicit sign.
fn scientific(value: f64) -> String {
    let formatted = format!("{value:.6e}");
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return formatted;
    };

    let mut out = String::with_capacity(mantissa.len() + 5);
    out.push_str(mantissa);
    let sign = if exponent < 0 { '-' } else { '+' };
    // Writing to a String cannot fail.
    let _ = write!(out, "e{sign}{:02}", exponent.unsigned_abs());
    out
}
