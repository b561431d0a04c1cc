use crate::error::PipelineError;
use crate::scratch::ScratchSpace;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Somewhere a clip can be read from. Staging turns it into a local file
/// the decoder can open.
pub trait AudioSource: Send + Sync {
    /// Label used in logs and rankings
    fn describe(&self) -> String;

    fn stage(&self, scratch: &ScratchSpace) -> Result<PathBuf, PipelineError>;
}

/// Fetches remote clips (preview URLs, object storage keys, ...)
pub trait Retriever: Send + Sync {
    fn fetch(&self, locator: &str, sink: &mut dyn Write) -> std::io::Result<()>;
}

/// A clip already on disk; nothing is staged
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_owned(),
        }
    }
}

impl AudioSource for LocalFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn stage(&self, _scratch: &ScratchSpace) -> Result<PathBuf, PipelineError> {
        if !self.path.is_file() {
            return Err(PipelineError::staging(self.describe(), "no such file"));
        }
        Ok(self.path.clone())
    }
}

/// Encoded audio held in memory, written into scratch before decoding
#[derive(Debug, Clone)]
pub struct InMemoryClip {
    name: String,
    bytes: Vec<u8>,
    extension: Option<String>,
}

impl InMemoryClip {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            extension: None,
        }
    }

    /// Container extension used as a format hint, e.g. `"mp3"`
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }
}

impl AudioSource for InMemoryClip {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn stage(&self, scratch: &ScratchSpace) -> Result<PathBuf, PipelineError> {
        let path = scratch.reserve(self.extension.as_deref());
        std::fs::write(&path, &self.bytes).map_err(|e| PipelineError::staging(&self.name, e))?;
        tracing::debug!("Staged {} ({} bytes) at {:?}", self.name, self.bytes.len(), path);
        Ok(path)
    }
}

/// A clip fetched through a `Retriever` into scratch
pub struct Retrieved<R> {
    retriever: R,
    locator: String,
    extension: Option<String>,
}

impl<R: Retriever> Retrieved<R> {
    pub fn new(retriever: R, locator: impl Into<String>) -> Self {
        Self {
            retriever,
            locator: locator.into(),
            extension: None,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }
}

impl<R: Retriever> AudioSource for Retrieved<R> {
    fn describe(&self) -> String {
        self.locator.clone()
    }

    fn stage(&self, scratch: &ScratchSpace) -> Result<PathBuf, PipelineError> {
        let path = scratch.reserve(self.extension.as_deref());
        let file = File::create(&path).map_err(|e| PipelineError::staging(&self.locator, e))?;
        let mut sink = BufWriter::new(file);

        tracing::debug!("Retrieving {} into {:?}", self.locator, path);
        self.retriever
            .fetch(&self.locator, &mut sink)
            .and_then(|()| sink.flush())
            .map_err(|e| PipelineError::staging(&self.locator, e))?;

        Ok(path)
    }
}
