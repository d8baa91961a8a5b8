use crate::domain::secret::SecretMap;
use crate::error::{ConfigError, PayoutError, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Reads the two JSON inputs of a payout run.
///
/// The payments file is returned as a raw [`Value`]: its dialect is only
/// known once the validator has looked at the top-level keys.
pub struct ConfigReader<R: Read> {
    source: R,
}

impl ConfigReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> ConfigReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Text that is not JSON at all is reported like any other malformed
    /// payments file.
    pub fn payments(self) -> Result<Value> {
        serde_json::from_reader(self.source)
            .map_err(|e| PayoutError::Config(ConfigError::Structure(e.to_string())))
    }

    pub fn secrets(self) -> Result<SecretMap> {
        Ok(serde_json::from_reader(self.source)?)
    }
}
