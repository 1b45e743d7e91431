use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{ItemError, PipelineError};

/// Raw text of one per-item source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// File stem; doubles as the item's slug.
    pub name: String,
    pub path: PathBuf,
    pub text: String,
}

pub struct SourceReader {
    root: PathBuf,
    accept: fn(&Path) -> bool,
}

impl SourceReader {
    pub fn new(root: impl Into<PathBuf>, accept: fn(&Path) -> bool) -> Self {
        Self {
            root: root.into(),
            accept,
        }
    }

    /// Matching files directly under the root, sorted by file name.
    pub fn list(&self) -> Result<Vec<PathBuf>, PipelineError> {
        if !self.root.is_dir() {
            return Err(PipelineError::MissingSourceDir(self.root.clone()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!("⚠️  Skipping unreadable entry in {}: {}", self.root.display(), err);
                    continue;
                }
            };
            if entry.file_type().is_file() && (self.accept)(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    pub fn read(&self, path: &Path) -> Result<SourceFile, ItemError> {
        let text = fs::read_to_string(path).map_err(|source| ItemError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(strip_module_extension)
            .unwrap_or("unknown")
            .to_string();
        Ok(SourceFile {
            name,
            path: path.to_path_buf(),
            text,
        })
    }

    /// Reads every matching file. A file that can't be read is logged and
    /// left out; only a missing root fails the call.
    pub fn read_all(&self) -> Result<Vec<SourceFile>, PipelineError> {
        let mut out = Vec::new();
        for path in self.list()? {
            match self.read(&path) {
                Ok(file) => {
                    debug!("read {} ({} bytes)", path.display(), file.text.len());
                    out.push(file);
                }
                Err(err) => warn!("⚠️  Skipping {}: {}", path.display(), err),
            }
        }
        Ok(out)
    }
}

fn strip_module_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

pub fn is_json_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::is_item_module;

    #[test]
    fn lists_matching_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b-search.ts", "a-sum.ts", "index.ts", "notes.md", "c.test.ts"] {
            fs::write(dir.path().join(name), "export const x = 1;").unwrap();
        }
        fs::create_dir(dir.path().join("nested.ts")).unwrap();

        let reader = SourceReader::new(dir.path(), is_item_module);
        let names: Vec<_> = reader
            .read_all()
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["a-sum", "b-search"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let reader = SourceReader::new(dir.path().join("nope"), is_item_module);
        assert!(matches!(reader.list(), Err(PipelineError::MissingSourceDir(_))));
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.ts"), "export const x = 1;").unwrap();
        fs::write(dir.path().join("bad.ts"), [0xff, 0xfe, 0x00]).unwrap();

        let reader = SourceReader::new(dir.path(), is_item_module);
        let files = reader.read_all().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "good");
    }
}
