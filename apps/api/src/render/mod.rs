//! Rendering collaborator: turns finished `ResumeContent` into a document artifact.
//!
//! A render failure is reported to the caller; the content itself stays valid.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::candidate::PersonName;
use crate::models::resume::ResumeContent;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize resume content: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedArtifact {
    pub path: String,
    pub file_name: String,
    pub format: &'static str,
}

#[async_trait]
pub trait ResumeRenderer: Send + Sync {
    fn format(&self) -> &'static str;

    async fn render(
        &self,
        content: &ResumeContent,
        name: &PersonName,
        company: &str,
    ) -> Result<RenderedArtifact, RenderError>;
}

/// Writes pretty-printed JSON into `dir`, creating it on first use.
pub struct JsonRenderer {
    dir: PathBuf,
}

impl JsonRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ResumeRenderer for JsonRenderer {
    fn format(&self) -> &'static str {
        "json"
    }

    async fn render(
        &self,
        content: &ResumeContent,
        name: &PersonName,
        company: &str,
    ) -> Result<RenderedArtifact, RenderError> {
        let stem = file_stem(name, company, Utc::now(), Uuid::new_v4());
        let file_name = format!("{stem}.{}", self.format());
        let path = self.dir.join(&file_name);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| RenderError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let body = serde_json::to_vec_pretty(content)?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| RenderError::Io {
                path: path.clone(),
                source,
            })?;

        info!("Rendered resume for candidate {} to {}", content.candidate_id, path.display());

        Ok(RenderedArtifact {
            path: path.to_string_lossy().into_owned(),
            file_name,
            format: self.format(),
        })
    }
}

/// `<first>_<last>_<company>_<YYYYmmdd_HHMMSS>_<id8>`, lowercased.
pub fn file_stem(name: &PersonName, company: &str, at: DateTime<Utc>, id: Uuid) -> String {
    let part = |value: &str, default: &str| {
        let slug = slug(value);
        if slug.is_empty() {
            default.to_string()
        } else {
            slug
        }
    };
    let id = id.simple().to_string();
    format!(
        "{}_{}_{}_{}_{}",
        part(&name.first, "user"),
        part(&name.last, "profile"),
        part(company, "company"),
        at.format("%Y%m%d_%H%M%S"),
        &id[..8]
    )
}

/// Lowercase with every run of non-alphanumerics collapsed to `_`.
fn slug(value: &str) -> String {
    let mut out = String::new();
    for c in value.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::models::resume::{ResumeHeader, SkillsSection};

    fn content() -> ResumeContent {
        ResumeContent {
            candidate_id: Uuid::from_u128(1),
            job_id: Uuid::from_u128(2),
            header: ResumeHeader {
                name: "Ada Lovelace".to_string(),
                title: "Engineer".to_string(),
                contact: Default::default(),
            },
            summary: "Summary.".to_string(),
            skills: SkillsSection::default(),
            experience: vec![],
            education: vec![],
            certifications: vec![],
        }
    }

    fn ada() -> PersonName {
        PersonName {
            first: "Ada".to_string(),
            last: "Lovelace".to_string(),
        }
    }

    #[test]
    fn test_file_stem_layout() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let id = Uuid::parse_str("1234abcd-0000-0000-0000-000000000000").unwrap();
        assert_eq!(
            file_stem(&ada(), "Acme Corp / EU", at, id),
            "ada_lovelace_acme_corp_eu_20240309_140507_1234abcd"
        );
        assert_eq!(
            file_stem(&PersonName::default(), "  ", at, id),
            "user_profile_company_20240309_140507_1234abcd"
        );
    }

    #[tokio::test]
    async fn test_json_renderer_writes_content() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = JsonRenderer::new(dir.path().join("out"));
        let artifact = renderer.render(&content(), &ada(), "Acme").await.unwrap();

        assert!(artifact.file_name.starts_with("ada_lovelace_acme_"));
        assert!(artifact.file_name.ends_with(".json"));
        assert_eq!(artifact.format, "json");

        let written = std::fs::read(&artifact.path).unwrap();
        let parsed: ResumeContent = serde_json::from_slice(&written).unwrap();
        assert_eq!(parsed, content());
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let renderer = JsonRenderer::new(&blocker);
        let err = renderer.render(&content(), &ada(), "Acme").await.unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
