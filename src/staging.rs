use crate::config::StagingConfig;
use crate::error::Result;
use crate::tabular::TabularFormat;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

const STAGING_PREFIX: &str = "drive-tabular-";

/// Where transfer operations buffer content on local disk.
#[derive(Debug, Clone, Default)]
pub struct StagingArea {
    dir: Option<PathBuf>,
    keep: bool,
}

impl StagingArea {
    pub fn new(dir: Option<PathBuf>, keep: bool) -> Self {
        Self { dir, keep }
    }

    pub fn from_config(config: &StagingConfig) -> Self {
        Self::new(config.dir.clone(), config.keep_files)
    }

    /// Create a uniquely named staging file with the format's extension.
    ///
    /// The file is removed when the returned handle is dropped, whichever way
    /// the owning operation exits, unless the area keeps files.
    pub fn create(&self, format: TabularFormat) -> Result<StagingFile> {
        let suffix = format!(".{}", format.extension());
        let mut builder = tempfile::Builder::new();
        builder
            .prefix(STAGING_PREFIX)
            .suffix(&suffix)
            .disable_cleanup(self.keep);

        let file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }?;

        match self.keep {
            true => warn!(path = ?file.path(), "Staging file will be kept"),
            false => debug!(path = ?file.path(), "Created staging file"),
        }

        Ok(StagingFile { file })
    }
}

pub struct StagingFile {
    file: NamedTempFile,
}

impl StagingFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn as_file_mut(&mut self) -> &mut File {
        self.file.as_file_mut()
    }
}
