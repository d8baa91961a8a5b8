use crate::domain::ports::ResultsLog;
use crate::error::Result;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Append-only results file, kept apart from the application log so the
/// audit trail survives log rotation.
///
/// One file per day: `<dir>/results_<YYYY-MM-DD>.log`.
pub struct FileResultsLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileResultsLog {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let date = chrono::Local::now().format("%Y-%m-%d");
        let path = dir.join(format!("results_{}.log", date));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultsLog for FileResultsLog {
    fn record(&self, line: &str) -> Result<()> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "{} {}", stamp, line)?;
        file.flush()?;
        Ok(())
    }
}
