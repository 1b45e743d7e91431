use handlebars::Handlebars;
use include_dir::{include_dir, Dir};
use serde::Serialize;

use crate::error::PipelineError;

static TEMPLATE_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

pub const PROJECT_TEMPLATE: &str = "project";

/// Registry of every `*.hbs` file embedded from `templates/`, keyed by the
/// file name up to its first dot (`project.json.hbs` -> `project`).
pub fn registry() -> Result<Handlebars<'static>, PipelineError> {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(true);
    // Templates produce JSON, so values are escaped as JSON string contents.
    hb.register_escape_fn(json_escape);

    for file in TEMPLATE_DIR.files() {
        let path = file.path();
        if path.extension().and_then(|e| e.to_str()) != Some("hbs") {
            continue;
        }
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let name = file_name.split('.').next().unwrap_or(file_name);
        let body = file
            .contents_utf8()
            .ok_or_else(|| PipelineError::Template(format!("{} is not UTF-8", path.display())))?;
        hb.register_template_string(name, body)
            .map_err(|e| PipelineError::Template(e.to_string()))?;
    }
    Ok(hb)
}

fn json_escape(raw: &str) -> String {
    let quoted = serde_json::Value::String(raw.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

#[derive(Serialize)]
struct ProjectTemplate<'a> {
    slug: &'a str,
    title: String,
    category: &'a str,
}

pub fn render_project(slug: &str, category: &str) -> Result<String, PipelineError> {
    let data = ProjectTemplate {
        slug,
        title: title_from_slug(slug),
        category,
    };
    registry()?
        .render(PROJECT_TEMPLATE, &data)
        .map_err(|e| PipelineError::Template(e.to_string()))
}

/// `"my-cool-project"` -> `"My Cool Project"`.
pub fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProjectItem;

    #[test]
    fn renders_a_loadable_project() {
        let rendered = render_project("path-finder", "web").unwrap();
        let project: ProjectItem = serde_json::from_str(&rendered).unwrap();
        assert_eq!(project.slug, "path-finder");
        assert_eq!(project.metadata.title, "Path Finder");
        assert_eq!(project.metadata.category, "web");
        assert!(!project.metadata.featured);
        assert!(project.future_improvements.is_empty());
    }

    #[test]
    fn escapes_for_json() {
        let rendered = render_project("x", "say \"hi\"").unwrap();
        let project: ProjectItem = serde_json::from_str(&rendered).unwrap();
        assert_eq!(project.metadata.category, "say \"hi\"");
    }

    #[test]
    fn titles() {
        assert_eq!(title_from_slug("ai-chat-2"), "Ai Chat 2");
        assert_eq!(title_from_slug("solo"), "Solo");
    }
}
