//! Collects the batch handed to one compiler run.

use std::path::PathBuf;

use jscc_core::{Contents, InputFile};

use crate::{Error, Result};

/// Ordered batch of buffered input files.
///
/// Files without contents are dropped. A streaming file poisons the
/// accumulator: that push and every later one fail with
/// [`Error::StreamingUnsupported`].
#[derive(Debug, Default)]
pub struct Accumulator {
    files: Vec<InputFile>,
    rejected: Option<PathBuf>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the next file from upstream.
    pub fn push(&mut self, file: InputFile) -> Result<()> {
        if let Some(path) = &self.rejected {
            return Err(Error::StreamingUnsupported { path: path.clone() });
        }
        match file.contents {
            Contents::Null => {
                tracing::trace!(path = %file.path.display(), "skipping file without contents");
                Ok(())
            }
            Contents::Stream => {
                self.rejected = Some(file.path.clone());
                Err(Error::StreamingUnsupported { path: file.path })
            }
            Contents::Buffer(_) => {
                self.files.push(file);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Close the batch, returning the files in arrival order.
    pub fn finish(self) -> Result<Vec<InputFile>> {
        match self.rejected {
            Some(path) => Err(Error::StreamingUnsupported { path }),
            None => Ok(self.files),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffered(path: &str) -> InputFile {
        InputFile::new("/src", path, "var x;")
    }

    #[test]
    fn test_keeps_arrival_order() {
        let mut acc = Accumulator::new();
        acc.push(buffered("/src/b.js")).unwrap();
        acc.push(buffered("/src/a.js")).unwrap();

        let files = acc.finish().unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.to_str().unwrap()).collect();
        assert_eq!(paths, vec!["/src/b.js", "/src/a.js"]);
    }

    #[test]
    fn test_drops_null_contents() {
        let mut acc = Accumulator::new();
        acc.push(InputFile::new("/src", "/src/dir", Contents::Null))
            .unwrap();
        acc.push(buffered("/src/a.js")).unwrap();

        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn test_stream_rejects_further_input() {
        let mut acc = Accumulator::new();
        let err = acc
            .push(InputFile::new("/src", "/src/s.js", Contents::Stream))
            .unwrap_err();
        assert!(matches!(err, Error::StreamingUnsupported { .. }));

        let err = acc.push(buffered("/src/a.js")).unwrap_err();
        assert!(matches!(err, Error::StreamingUnsupported { .. }));
        assert!(acc.is_empty());
        assert!(acc.finish().is_err());
    }

    #[test]
    fn test_empty_batch() {
        let acc = Accumulator::new();
        assert!(acc.finish().unwrap().is_empty());
    }
}
