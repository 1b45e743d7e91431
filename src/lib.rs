use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}

// Unknown or non-string difficulties are dropped rather than failing the item.
fn lenient_difficulty<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Difficulty>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(d)?;
    Ok(raw
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub concepts: Vec<String>,
    #[serde(default)]
    pub time_complexity: String,
    #[serde(default)]
    pub space_complexity: String,
    #[serde(
        default,
        deserialize_with = "lenient_difficulty",
        skip_serializing_if = "Option::is_none"
    )]
    pub difficulty: Option<Difficulty>,
}

/// One input/output pair shown next to an item. `output` may hold the
/// `{"error": "..."}` sentinel for expected-failure cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    #[serde(default)]
    pub input: serde_json::Value,
    #[serde(default)]
    pub output: serde_json::Value,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolutionType {
    Function,
    Class,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub name: String,
    pub tab_name: String,
    pub code: String,
    pub approach: String,
    pub time_complexity: String,
    pub space_complexity: String,
    pub is_optimal: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SolutionType>,
}

/// An exercise or utility, flattened from one source module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub name: String,
    pub slug: String,
    pub metadata: ItemMetadata,
    pub examples: Vec<Example>,
    pub code: String,
    pub functions: Vec<String>,
    pub solutions: Vec<Solution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screenshot {
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

/// A project case study. Every optional list is defaulted on load so the
/// page layer never sees a missing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    #[serde(default)]
    pub slug: String,
    pub metadata: ProjectMetadata,
    #[serde(default)]
    pub tech_stack: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
    #[serde(default)]
    pub links: ProjectLinks,
    #[serde(default)]
    pub lessons: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub future_improvements: Vec<String>,
}

/// Listing-view subset of a project, written to `projects-index.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: String,
    pub featured: bool,
    pub links: ProjectLinks,
}

impl From<&ProjectItem> for ProjectSummary {
    fn from(p: &ProjectItem) -> Self {
        Self {
            slug: p.slug.clone(),
            title: p.metadata.title.clone(),
            description: p.metadata.description.clone(),
            category: p.metadata.category.clone(),
            status: p.metadata.status.clone(),
            featured: p.metadata.featured,
            links: p.links.clone(),
        }
    }
}

pub mod complexity;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod heuristics;
pub mod lexer;
pub mod literal;
pub mod parser;
pub mod projects;
pub mod reader;
pub mod templates;
pub mod watch;

pub use config::{ContentKind, PipelineConfig};
pub use error::{ItemError, PipelineError};
pub use generator::{generate_all, Generator, Step, StepReport};
