use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{DatasetError, Result};

/// Environment variable overriding the bundled resource root.
pub const RESOURCES_ENV: &str = "RUSTY_BUNCH_RESOURCES";

/// Location of the bundled dataset files.
///
/// Layout under the root:
/// ```text
///  <root>/data/   iris.csv, digits.csv.gz, trees_*.csv.gz
///  <root>/descr/  iris.rst, digits.rst, trees.rst
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resources {
    root: PathBuf,
}

impl Resources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Resources { root: root.into() }
    }

    /// The `resources/` directory shipped with this crate.
    pub fn bundled() -> Self {
        Resources::new(concat!(env!("CARGO_MANIFEST_DIR"), "/resources"))
    }

    /// `$RUSTY_BUNCH_RESOURCES` when set and non-empty, else [`bundled`](Self::bundled).
    pub fn from_env() -> Self {
        match std::env::var_os(RESOURCES_ENV) {
            Some(dir) if !dir.is_empty() => Resources::new(dir),
            _ => Resources::bundled(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_path(&self, name: &str) -> PathBuf {
        self.root.join("data").join(name)
    }

    pub fn descr_path(&self, name: &str) -> PathBuf {
        self.root.join("descr").join(name)
    }

    pub(crate) fn open_data(&self, name: &str) -> Result<(PathBuf, File)> {
        let path = self.data_path(name);
        debug!("opening {}", path.display());
        let file = File::open(&path).map_err(|e| DatasetError::resource(&path, e))?;
        Ok((path, file))
    }

    /// Description text, or `None` if the dataset ships without one.
    pub fn read_descr(&self, name: &str) -> Result<Option<String>> {
        let path = self.descr_path(name);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no description at {}", path.display());
                Ok(None)
            }
            Err(e) => Err(DatasetError::io(&path, e)),
        }
    }
}

impl Default for Resources {
    fn default() -> Self {
        Resources::from_env()
    }
}
