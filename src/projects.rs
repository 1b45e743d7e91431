use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;

use crate::error::{ItemError, PipelineError};
use crate::reader::SourceFile;
use crate::templates;
use crate::{ProjectItem, ProjectSummary};

/// Parses one project file. List fields missing from the JSON come back as
/// empty lists; a missing `slug` falls back to the file stem.
pub fn load_project(file: &SourceFile) -> Result<ProjectItem, ItemError> {
    let mut project: ProjectItem =
        serde_json::from_str(&file.text).map_err(ItemError::InvalidJson)?;
    if project.slug.trim().is_empty() {
        project.slug = file.name.clone();
    }
    Ok(project)
}

/// Featured projects first, then by title. Stable, so equal keys keep
/// file-name order.
pub fn sort_projects(projects: &mut [ProjectItem]) {
    projects.sort_by(|a, b| {
        b.metadata
            .featured
            .cmp(&a.metadata.featured)
            .then_with(|| a.metadata.title.cmp(&b.metadata.title))
    });
}

pub fn summaries(projects: &[ProjectItem]) -> Vec<ProjectSummary> {
    projects.iter().map(ProjectSummary::from).collect()
}

lazy_static! {
    static ref SLUG: Option<Regex> = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").ok();
}

pub fn validate_slug(slug: &str) -> Result<(), PipelineError> {
    if SLUG.as_ref().map_or(false, |re| re.is_match(slug)) {
        Ok(())
    } else {
        Err(PipelineError::InvalidSlug(slug.to_string()))
    }
}

/// Writes a starter `<slug>.json` into the projects directory.
pub fn create_project_template(
    projects_dir: &Path,
    slug: &str,
    category: &str,
) -> Result<PathBuf, PipelineError> {
    validate_slug(slug)?;

    let path = projects_dir.join(format!("{}.json", slug));
    if path.exists() {
        return Err(PipelineError::AlreadyExists(path));
    }

    let body = templates::render_project(slug, category)?;
    fs::create_dir_all(projects_dir).map_err(|e| PipelineError::io(projects_dir, e))?;
    fs::write(&path, body).map_err(|e| PipelineError::io(&path, e))?;

    info!("📄 Created project template: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProjectMetadata;

    fn project(title: &str, featured: bool) -> ProjectItem {
        let raw = format!(
            r#"{{"metadata": {{"title": "{}", "description": "d", "featured": {}}}}}"#,
            title, featured
        );
        serde_json::from_str(&raw).unwrap()
    }

    fn source(name: &str, text: &str) -> SourceFile {
        SourceFile {
            name: name.to_string(),
            path: PathBuf::from(format!("{}.json", name)),
            text: text.to_string(),
        }
    }

    #[test]
    fn featured_first_then_title() {
        let mut list = vec![
            project("Banana", true),
            project("Cherry", false),
            project("Apple", true),
        ];
        sort_projects(&mut list);
        let titles: Vec<_> = list.iter().map(|p| p.metadata.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple", "Banana", "Cherry"]);
    }

    #[test]
    fn injects_defaults_for_missing_lists() {
        let file = source(
            "tracker",
            r#"{"metadata": {"title": "Tracker", "description": "Habit tracker"}}"#,
        );
        let p = load_project(&file).unwrap();
        assert_eq!(p.slug, "tracker");
        assert!(p.metrics.is_empty());
        assert!(p.lessons.is_empty());
        assert!(p.challenges.is_empty());
        assert!(p.future_improvements.is_empty());

        let json = serde_json::to_value(&p).unwrap();
        for field in ["metrics", "lessons", "challenges", "futureImprovements", "features"] {
            assert_eq!(json[field], serde_json::json!([]), "{} should be []", field);
        }
    }

    #[test]
    fn explicit_slug_wins_over_file_name() {
        let file = source(
            "old-name",
            r#"{"slug": "new-name", "metadata": {"title": "T", "description": "D"}}"#,
        );
        assert_eq!(load_project(&file).unwrap().slug, "new-name");
    }

    #[test]
    fn missing_required_metadata_is_rejected() {
        let file = source("x", r#"{"metadata": {"title": "No description"}}"#);
        assert!(matches!(load_project(&file), Err(ItemError::InvalidJson(_))));
        let file = source("y", "{ not json");
        assert!(load_project(&file).is_err());
    }

    #[test]
    fn summary_carries_listing_fields() {
        let file = source(
            "site",
            r#"{"metadata": {"title": "Site", "description": "D", "category": "web", "status": "live", "featured": true},
                "links": {"github": "https://github.com/example/site"}}"#,
        );
        let p = load_project(&file).unwrap();
        let s = &summaries(&[p])[0];
        assert_eq!(s.slug, "site");
        assert_eq!(s.status, "live");
        assert!(s.featured);
        assert_eq!(s.links.github.as_deref(), Some("https://github.com/example/site"));
    }

    #[test]
    fn slug_validation() {
        assert!(SLUG.is_some());
        assert!(validate_slug("my-project-2").is_ok());
        for bad in ["", "My-Project", "double--dash", "-lead", "trail-", "with space"] {
            assert!(matches!(validate_slug(bad), Err(PipelineError::InvalidSlug(_))), "{}", bad);
        }
    }

    #[test]
    fn creates_template_once() {
        let dir = tempfile::tempdir().unwrap();
        let projects_dir = dir.path().join("projects");
        let path = create_project_template(&projects_dir, "rust-cli", "tools").unwrap();
        assert_eq!(path, projects_dir.join("rust-cli.json"));

        let text = fs::read_to_string(&path).unwrap();
        let loaded = load_project(&source("rust-cli", &text)).unwrap();
        assert_eq!(
            loaded.metadata,
            ProjectMetadata {
                title: "Rust Cli".into(),
                description: "One-sentence summary of Rust Cli.".into(),
                category: "tools".into(),
                status: "in-progress".into(),
                featured: false,
                tags: vec![],
                role: None,
                timeline: None,
            }
        );

        assert!(matches!(
            create_project_template(&projects_dir, "rust-cli", "tools"),
            Err(PipelineError::AlreadyExists(_))
        ));
    }
}
