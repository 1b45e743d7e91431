use std::path::{Path, PathBuf};

/// Where sources are read from and where artifacts land. Built from CLI
/// arguments; nothing here is read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub content_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new("content", "data")
    }
}

impl PipelineConfig {
    pub fn new(content_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn source_dir(&self, kind: ContentKind) -> PathBuf {
        self.content_dir.join(kind.dir_name())
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.content_dir.join("projects")
    }

    pub fn artifact(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

/// The two module-backed content categories. They share the `ContentItem`
/// shape and differ only in location and output formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Exercises,
    Utilities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStyle {
    Pretty,
    Compact,
}

impl ContentKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            ContentKind::Exercises => "exercises",
            ContentKind::Utilities => "utilities",
        }
    }

    pub fn output_file(self) -> &'static str {
        match self {
            ContentKind::Exercises => "exercises.json",
            ContentKind::Utilities => "utilities.json",
        }
    }

    pub fn style(self) -> JsonStyle {
        match self {
            ContentKind::Exercises => JsonStyle::Pretty,
            ContentKind::Utilities => JsonStyle::Compact,
        }
    }
}

/// Source module filter: TypeScript files that define a single item.
pub fn is_item_module(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    name.ends_with(".ts")
        && name != "index.ts"
        && !name.ends_with(".d.ts")
        && !name.ends_with(".test.ts")
        && !name.ends_with(".spec.ts")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_category_dirs_from_content_root() {
        let cfg = PipelineConfig::new("site/content", "site/data");
        assert_eq!(cfg.source_dir(ContentKind::Exercises), Path::new("site/content/exercises"));
        assert_eq!(cfg.projects_dir(), Path::new("site/content/projects"));
        assert_eq!(cfg.artifact("projects.json"), Path::new("site/data/projects.json"));
    }

    #[test]
    fn filters_non_item_modules() {
        assert!(is_item_module(Path::new("two-sum.ts")));
        assert!(!is_item_module(Path::new("index.ts")));
        assert!(!is_item_module(Path::new("types.d.ts")));
        assert!(!is_item_module(Path::new("two-sum.test.ts")));
        assert!(!is_item_module(Path::new("notes.md")));
    }
}
