//! Storage for generated audio files.
//!
//! Every artifact gets a process-unique name, `output_<32 hex>.wav`. Files are
//! written under a `.part` name and renamed into place, so a failed write never
//! leaves a file at the final path. Finished files are never cleaned up here.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::Result;
use crate::audio::{Pcm16, write_wav_i16};

const PREFIX: &str = "output_";
const EXTENSION: &str = "wav";

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Use `dir` for artifacts, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// A fresh artifact path. Nothing is created on disk.
    pub fn allocate(&self) -> PathBuf {
        let token = Uuid::new_v4().simple();
        self.dir.join(format!("{PREFIX}{token}.{EXTENSION}"))
    }

    /// Path of the finished artifact called `name`, or `None` when `name` is
    /// not an artifact name. Does not check that the file exists.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let token = name
            .strip_prefix(PREFIX)?
            .strip_suffix(EXTENSION)?
            .strip_suffix('.')?;
        let valid = token.len() == 32 && token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        valid.then(|| self.dir.join(name))
    }

    /// Write `pcm` to a fresh artifact path at `sample_rate` and return the path.
    pub fn persist(&self, pcm: &Pcm16, sample_rate: u32) -> Result<PathBuf> {
        let path = self.allocate();
        let partial = path.with_extension(format!("{EXTENSION}.part"));
        let written = write_wav_i16(&partial, &pcm.samples, sample_rate, pcm.channels)
            .and_then(|()| Ok(std::fs::rename(&partial, &path)?));
        if let Err(error) = written {
            let _ = std::fs::remove_file(&partial);
            return Err(error);
        }
        Ok(path)
    }
}
