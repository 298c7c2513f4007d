use std::path::{Component, Path, PathBuf};

use eyre::Result;

/// Contents of a file flowing through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    /// Placeholder entry with no contents (e.g. a directory).
    Null,
    /// Fully buffered contents.
    Buffer(Vec<u8>),
    /// Contents that can only be read incrementally.
    Stream,
}

impl Contents {
    pub fn is_null(&self) -> bool {
        matches!(self, Contents::Null)
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Contents::Stream)
    }

    /// Get the buffered bytes, if any.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Contents::Buffer(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl From<Vec<u8>> for Contents {
    fn from(bytes: Vec<u8>) -> Self {
        Contents::Buffer(bytes)
    }
}

impl From<&str> for Contents {
    fn from(text: &str) -> Self {
        Contents::Buffer(text.as_bytes().to_vec())
    }
}

/// A source file handed to the compiler stage by an upstream producer.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub cwd: PathBuf,
    pub base: PathBuf,
    pub path: PathBuf,
    pub contents: Contents,
}

impl InputFile {
    /// Create a file whose base is its working directory.
    pub fn new(
        cwd: impl Into<PathBuf>,
        path: impl Into<PathBuf>,
        contents: impl Into<Contents>,
    ) -> Self {
        let cwd = cwd.into();
        Self {
            base: cwd.clone(),
            cwd,
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Override the base directory.
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = base.into();
        self
    }

    /// Path of this file relative to its own working directory.
    pub fn relative(&self) -> PathBuf {
        relative_path(&self.cwd, &self.path)
    }
}

/// A file produced by the compiler stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub base: PathBuf,
    pub cwd: PathBuf,
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl OutputArtifact {
    /// Create an artifact rooted at `root` (used as both base and cwd).
    pub fn new(root: impl Into<PathBuf>, path: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        let root = root.into();
        Self {
            base: root.clone(),
            cwd: root,
            path: path.into(),
            contents,
        }
    }

    /// Path relative to the artifact's base.
    pub fn relative(&self) -> PathBuf {
        relative_path(&self.base, &self.path)
    }

    /// Final path component, e.g. `app-1a2b3c4d5e.js`.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Write the artifact below `dest`, keeping its path relative to its base.
    pub fn write(&self, dest: &Path) -> Result<PathBuf> {
        let target = dest.join(self.relative());
        write_file(&target, &self.contents)?;
        Ok(target)
    }
}

fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Compute `path` relative to `from`.
///
/// Both paths are compared lexically; `..` segments are emitted for the
/// components of `from` that `path` does not share. A relative `path` is
/// returned unchanged.
pub fn relative_path(from: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        return path.to_path_buf();
    }
    if let Ok(stripped) = path.strip_prefix(from) {
        return stripped.to_path_buf();
    }

    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = path.components().collect();
    let shared = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in shared..from.len() {
        result.push("..");
    }
    for component in &to[shared..] {
        result.push(component.as_os_str());
    }
    result
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_relative_path_inside_cwd() {
        let rel = relative_path(Path::new("/work"), Path::new("/work/src/app.js"));
        assert_eq!(rel, PathBuf::from("src/app.js"));
    }

    #[test]
    fn test_relative_path_outside_cwd() {
        let rel = relative_path(Path::new("/work/site"), Path::new("/work/lib/util.js"));
        assert_eq!(rel, PathBuf::from("../lib/util.js"));
    }

    #[test]
    fn test_relative_path_keeps_relative_input() {
        let rel = relative_path(Path::new("cwd"), Path::new("path"));
        assert_eq!(rel, PathBuf::from("path"));
    }

    #[test]
    fn test_input_file_relative() {
        let file = InputFile::new("/project", "/project/js/main.js", "var a;");
        assert_eq!(file.relative(), PathBuf::from("js/main.js"));
        assert_eq!(file.base, PathBuf::from("/project"));
    }

    #[test]
    fn test_contents_kinds() {
        assert!(Contents::Null.is_null());
        assert!(Contents::Stream.is_stream());
        assert_eq!(Contents::from("abc").as_bytes(), Some(&b"abc"[..]));
        assert_eq!(Contents::Stream.as_bytes(), None);
    }

    #[test]
    fn test_artifact_write_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let artifact = OutputArtifact::new("/tmp/build", "/tmp/build/js/app.js", b"x=1".to_vec());

        let written = artifact.write(temp.path()).unwrap();

        assert_eq!(written, temp.path().join("js/app.js"));
        assert_eq!(fs::read(&written).unwrap(), b"x=1");
    }

    #[test]
    fn test_artifact_write_overwrites_existing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("app.js"), "old").unwrap();

        let artifact = OutputArtifact::new("/b", "/b/app.js", b"new".to_vec());
        artifact.write(temp.path()).unwrap();

        assert_eq!(fs::read_to_string(temp.path().join("app.js")).unwrap(), "new");
    }

    #[test]
    fn test_artifact_file_name() {
        let artifact = OutputArtifact::new("/b", "/b/app-0123456789.js", Vec::new());
        assert_eq!(artifact.file_name(), Some("app-0123456789.js"));
    }
}
