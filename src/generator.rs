use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::{is_item_module, ContentKind, JsonStyle, PipelineConfig};
use crate::content;
use crate::error::PipelineError;
use crate::projects;
use crate::reader::{is_json_file, SourceReader};

pub const PROJECTS_FILE: &str = "projects.json";
pub const PROJECTS_INDEX_FILE: &str = "projects-index.json";

/// One independently runnable generation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Exercises,
    Utilities,
    Projects,
}

impl Step {
    /// Order used by the `all` orchestrator.
    pub const ALL: [Step; 3] = [Step::Exercises, Step::Utilities, Step::Projects];
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Exercises => "exercises",
            Step::Utilities => "utilities",
            Step::Projects => "projects",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: Step,
    pub items: usize,
    pub skipped: usize,
    pub artifacts: Vec<PathBuf>,
}

impl StepReport {
    fn log(&self) {
        let written: Vec<String> = self.artifacts.iter().map(|p| p.display().to_string()).collect();
        info!(
            "✅ {}: {} items written, {} skipped -> {}",
            self.step,
            self.items,
            self.skipped,
            written.join(", ")
        );
    }
}

pub struct Generator {
    config: PipelineConfig,
}

impl Generator {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self, step: Step) -> Result<StepReport, PipelineError> {
        let report = match step {
            Step::Exercises => self.generate_content(ContentKind::Exercises)?,
            Step::Utilities => self.generate_content(ContentKind::Utilities)?,
            Step::Projects => self.generate_projects()?,
        };
        report.log();
        Ok(report)
    }

    /// Runs every step in order on the current thread, stopping at the first
    /// failure.
    pub fn run_all(&self) -> Result<Vec<StepReport>, PipelineError> {
        Step::ALL.iter().map(|&step| self.run(step)).collect()
    }

    pub fn generate_content(&self, kind: ContentKind) -> Result<StepReport, PipelineError> {
        let dir = self.config.source_dir(kind);
        info!("🔍 Scanning {} in {}", kind.dir_name(), dir.display());

        let reader = SourceReader::new(&dir, is_item_module);
        let files = reader.read_all()?;

        let mut items = Vec::with_capacity(files.len());
        let mut skipped = 0;
        for file in &files {
            match content::build_item(file) {
                Ok(item) => {
                    info!(
                        "  📄 Processed: {} ({} functions, {} solutions)",
                        item.slug,
                        item.functions.len(),
                        item.solutions.len()
                    );
                    items.push(item);
                }
                Err(err) => {
                    warn!("⚠️  Skipping {}: {}", file.path.display(), err);
                    skipped += 1;
                }
            }
        }
        warn_duplicate_slugs(kind.dir_name(), items.iter().map(|i| i.slug.as_str()));

        let path = self.config.artifact(kind.output_file());
        write_json(&path, &items, kind.style())?;

        Ok(StepReport {
            step: match kind {
                ContentKind::Exercises => Step::Exercises,
                ContentKind::Utilities => Step::Utilities,
            },
            items: items.len(),
            skipped,
            artifacts: vec![path],
        })
    }

    pub fn generate_projects(&self) -> Result<StepReport, PipelineError> {
        let dir = self.config.projects_dir();
        info!("🔍 Scanning projects in {}", dir.display());

        let reader = SourceReader::new(&dir, is_json_file);
        let files = reader.read_all()?;

        let mut items = Vec::with_capacity(files.len());
        let mut skipped = 0;
        for file in &files {
            match projects::load_project(file) {
                Ok(project) => {
                    info!("  📄 Loaded project: {} ({})", project.slug, project.metadata.title);
                    items.push(project);
                }
                Err(err) => {
                    warn!("⚠️  Skipping {}: {}", file.path.display(), err);
                    skipped += 1;
                }
            }
        }
        projects::sort_projects(&mut items);
        warn_duplicate_slugs("projects", items.iter().map(|p| p.slug.as_str()));

        let full = self.config.artifact(PROJECTS_FILE);
        let index = self.config.artifact(PROJECTS_INDEX_FILE);
        write_json(&full, &items, JsonStyle::Pretty)?;
        write_json(&index, &projects::summaries(&items), JsonStyle::Pretty)?;

        Ok(StepReport {
            step: Step::Projects,
            items: items.len(),
            skipped,
            artifacts: vec![full, index],
        })
    }
}

/// Runs every step in order, each on the blocking pool and awaited before
/// the next one starts. The first failing step fails the whole run.
pub async fn generate_all(config: PipelineConfig) -> Result<Vec<StepReport>, PipelineError> {
    let generator = Arc::new(Generator::new(config));
    let mut reports = Vec::with_capacity(Step::ALL.len());
    for step in Step::ALL {
        let worker = Arc::clone(&generator);
        let report = tokio::task::spawn_blocking(move || worker.run(step))
            .await
            .map_err(|e| PipelineError::Aborted {
                step: step.to_string(),
                reason: e.to_string(),
            })??;
        reports.push(report);
    }
    Ok(reports)
}

/// Serializes `value` to `path`, creating parent directories first.
pub fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    style: JsonStyle,
) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let body = match style {
        JsonStyle::Pretty => serde_json::to_string_pretty(value),
        JsonStyle::Compact => serde_json::to_string(value),
    }
    .map_err(|source| PipelineError::Serialize {
        artifact: path.display().to_string(),
        source,
    })?;
    fs::write(path, body).map_err(|e| PipelineError::io(path, e))
}

// Collisions are reported but not resolved; every item is still written.
fn warn_duplicate_slugs<'a>(category: &str, slugs: impl Iterator<Item = &'a str>) {
    let mut seen = HashSet::new();
    for slug in slugs {
        if !seen.insert(slug) {
            warn!("⚠️  Duplicate {} slug: {}", category, slug);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_json_creates_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/out.json");
        write_json(&path, &vec![1, 2], JsonStyle::Compact).unwrap();
        write_json(&path, &vec![1, 2], JsonStyle::Compact).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[1,2]");
    }

    #[test]
    fn pretty_uses_two_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &serde_json::json!({"a": [1]}), JsonStyle::Pretty).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n  \"a\": [\n    1\n  ]\n}");
    }

    #[test]
    fn write_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let err = write_json(&blocker.join("out.json"), &1, JsonStyle::Pretty).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn missing_content_dir_fails_the_step() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Generator::new(PipelineConfig::new(dir.path().join("content"), dir.path().join("out")));
        let err = generator.run(Step::Utilities).unwrap_err();
        assert!(matches!(err, PipelineError::MissingSourceDir(_)));
        assert!(!dir.path().join("out/utilities.json").exists());
    }
}
