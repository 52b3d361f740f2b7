//! Document generator - service layer
//!
//! Produces the files attached to an application. Failure never aborts an
//! application: a missing document just means that upload is skipped.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult, DocumentError};
use crate::models::JobCandidate;

/// Which resume / cover letter template to use for a posting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSelection {
    pub resume: String,
    pub cover_letter: String,
}

impl Default for DocumentSelection {
    fn default() -> Self {
        Self {
            resume: "resume".to_string(),
            cover_letter: "default".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedDocuments {
    pub resume: Option<PathBuf>,
    pub cover_letter: Option<PathBuf>,
}

impl GeneratedDocuments {
    pub fn paths(&self) -> Vec<PathBuf> {
        self.resume
            .iter()
            .chain(self.cover_letter.iter())
            .cloned()
            .collect()
    }
}

#[async_trait]
pub trait DocumentGenerator: Send + Sync {
    async fn generate(&self, job: &JobCandidate, selection: &DocumentSelection) -> GeneratedDocuments;

    /// Selections the oracle may choose between
    async fn available(&self) -> DocumentChoices {
        DocumentChoices::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentChoices {
    pub resumes: Vec<String>,
    pub cover_letters: Vec<String>,
}

/// Template-based generator
///
/// Layout of `documents_dir`:
/// - `<name>.pdf` resumes
/// - `cover_letter_<name>.txt` templates with `{company}` / `{title}` placeholders
/// - `submitted/` rendered cover letters
pub struct TemplateDocumentGenerator {
    documents_dir: PathBuf,
}

impl TemplateDocumentGenerator {
    pub fn new(documents_dir: impl Into<PathBuf>) -> Self {
        Self {
            documents_dir: documents_dir.into(),
        }
    }

    fn resume_path(&self, selection: &DocumentSelection) -> Option<PathBuf> {
        let path = self.documents_dir.join(format!("{}.pdf", selection.resume));
        if path.is_file() {
            Some(absolute(&path))
        } else {
            warn!("⚠️ Resume not found: {}", path.display());
            None
        }
    }

    async fn render_cover_letter(&self, job: &JobCandidate, selection: &DocumentSelection) -> AppResult<PathBuf> {
        let template_path = self
            .documents_dir
            .join(format!("cover_letter_{}.txt", selection.cover_letter));
        if !template_path.is_file() {
            return Err(DocumentError::TemplateMissing {
                path: template_path.display().to_string(),
            }
            .into());
        }

        let template = tokio::fs::read_to_string(&template_path)
            .await
            .map_err(|e| AppError::file_read_failed(template_path.display().to_string(), e))?;
        let title = job.normalized_title.as_deref().unwrap_or(&job.title);
        let rendered = render_template(&template, &job.company, title);

        let out_dir = self.documents_dir.join("submitted");
        tokio::fs::create_dir_all(&out_dir)
            .await
            .map_err(|e| render_failed(&out_dir, e))?;
        let out_path = out_dir.join(format!("Cover Letter {}.txt", file_safe(&job.company)));
        tokio::fs::write(&out_path, rendered)
            .await
            .map_err(|e| render_failed(&out_path, e))?;
        Ok(absolute(&out_path))
    }

    async fn list(&self) -> AppResult<DocumentChoices> {
        let mut choices = DocumentChoices::default();
        let mut entries = tokio::fs::read_dir(&self.documents_dir)
            .await
            .map_err(|e| AppError::file_read_failed(self.documents_dir.display().to_string(), e))?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(stem) = name.strip_suffix(".pdf") {
                choices.resumes.push(stem.to_string());
            } else if let Some(key) = name
                .strip_prefix("cover_letter_")
                .and_then(|rest| rest.strip_suffix(".txt"))
            {
                choices.cover_letters.push(key.to_string());
            }
        }
        choices.resumes.sort();
        choices.cover_letters.sort();
        Ok(choices)
    }
}

#[async_trait]
impl DocumentGenerator for TemplateDocumentGenerator {
    async fn generate(&self, job: &JobCandidate, selection: &DocumentSelection) -> GeneratedDocuments {
        let resume = self.resume_path(selection);
        let cover_letter = match self.render_cover_letter(job, selection).await {
            Ok(path) => {
                debug!("Cover letter written to {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("⚠️ No cover letter for {}: {}", job.company, e);
                None
            }
        };
        GeneratedDocuments { resume, cover_letter }
    }

    async fn available(&self) -> DocumentChoices {
        self.list().await.unwrap_or_else(|e| {
            warn!("Cannot list documents: {}", e);
            DocumentChoices::default()
        })
    }
}

pub fn render_template(template: &str, company: &str, title: &str) -> String {
    template.replace("{company}", company).replace("{title}", title)
}

/// Strip characters that are invalid in file names on common platforms
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if "<>:\"/\\|?*".contains(c) || c.is_control() { '_' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn render_failed(path: &Path, e: std::io::Error) -> AppError {
    DocumentError::RenderFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    }
    .into()
}
