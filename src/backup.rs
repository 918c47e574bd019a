//! Periodic snapshots of the matrix during long reductions.

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::format;
use crate::matrix::Matrix;

const PERIOD: Duration = Duration::from_secs(300);

/// Alternately overwrites two backup files with the numeric rendition of
/// the current matrix, at most once per period. Cheap to call from pass
/// boundaries; it does nothing until the period has elapsed.
pub struct Backup {
    paths: [PathBuf; 2],
    toggle: usize,
    period: Duration,
    last: Instant,
}

impl Default for Backup {
    fn default() -> Backup {
        Backup::new()
    }
}

impl Backup {
    pub fn new() -> Backup {
        Backup {
            paths: [PathBuf::from("backup1.ec"), PathBuf::from("backup2.ec")],
            toggle: 0,
            period: PERIOD,
            last: Instant::now(),
        }
    }

    pub fn maybe_write(&mut self, mat: &Matrix) {
        if self.last.elapsed() < self.period {
            return;
        }
        let path = &self.paths[self.toggle];
        self.toggle = (self.toggle + 1) % 2;

        debug!("start writing backup {}", path.display());
        let result = File::create(path).and_then(|f| {
            let mut w = BufWriter::new(f);
            format::write_numeric(mat, &mut w)?;
            w.flush()
        });
        match result {
            Ok(()) => debug!("finished backup {}", path.display()),
            Err(e) => warn!("backup {} failed: {}", path.display(), e),
        }
        self.last = Instant::now();
    }
}
