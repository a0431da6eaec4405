//! Multipart assembly for course and category authoring.
//!
//! Each video file travels under its own field name `video_<clientId>`, and
//! the `modules` JSON names that field next to the video's metadata. The
//! server matches files to videos by id, never by position.

use crate::api::{MultipartForm, ValidationIssue};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const VIDEO_FIELD_PREFIX: &str = "video_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDraft {
    #[serde(default)]
    pub title: String,
    /// Seconds.
    #[serde(default)]
    pub duration: f64,
    pub file_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub videos: Vec<VideoDraft>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categorie: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub image_path: Option<PathBuf>,
    #[serde(default)]
    pub modules: Vec<ModuleDraft>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image_path: Option<PathBuf>,
}

/// One video as announced in the `modules` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoManifest {
    pub client_id: String,
    pub file_field: String,
    pub title: String,
    pub duration: f64,
    pub file_name: String,
    pub size: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleManifest {
    pub title: String,
    pub videos: Vec<VideoManifest>,
}

pub struct CourseUpload {
    pub form: MultipartForm,
    pub modules: Vec<ModuleManifest>,
}

pub fn validate_course(draft: &CourseDraft) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (field, value) in [
        ("name", &draft.name),
        ("description", &draft.description),
        ("categorie", &draft.categorie),
    ] {
        if value.trim().is_empty() {
            issues.push(ValidationIssue::new(field, format!("{field} is required")));
        }
    }
    if let Some(p) = &draft.image_path {
        if !p.is_file() {
            issues.push(ValidationIssue::new("imagePath", "image file not found"));
        }
    }
    if draft.modules.is_empty() {
        issues.push(ValidationIssue::new(
            "modules",
            "at least one module is required",
        ));
    }
    for (m, module) in draft.modules.iter().enumerate() {
        if module.title.trim().is_empty() {
            issues.push(ValidationIssue::new(
                format!("modules.{m}.title"),
                "module title is required",
            ));
        }
        if module.videos.is_empty() {
            issues.push(ValidationIssue::new(
                format!("modules.{m}.videos"),
                "each module needs at least one video",
            ));
        }
        for (v, video) in module.videos.iter().enumerate() {
            if video.title.trim().is_empty() {
                issues.push(ValidationIssue::new(
                    format!("modules.{m}.videos.{v}.title"),
                    "video title is required",
                ));
            }
            if video.duration < 0.0 {
                issues.push(ValidationIssue::new(
                    format!("modules.{m}.videos.{v}.duration"),
                    "duration must not be negative",
                ));
            }
            if !video.file_path.is_file() {
                issues.push(ValidationIssue::new(
                    format!("modules.{m}.videos.{v}.filePath"),
                    "video file not found",
                ));
            }
        }
    }
    issues
}

pub fn build_course_form(draft: &CourseDraft) -> anyhow::Result<CourseUpload> {
    let mut form = MultipartForm::new()
        .text("name", draft.name.trim())
        .text("description", draft.description.trim())
        .text("categorie", draft.categorie.trim())
        .text("level", draft.level.trim())
        .text("language", draft.language.trim());

    if let Some(p) = &draft.image_path {
        let bytes = read_file(p)?;
        form = form.file("image", file_name(p), content_type(p), bytes);
    }

    let mut modules = Vec::with_capacity(draft.modules.len());
    let mut files = Vec::new();
    for module in &draft.modules {
        let mut videos = Vec::with_capacity(module.videos.len());
        for video in &module.videos {
            let bytes = read_file(&video.file_path)?;
            let client_id = Uuid::new_v4().to_string();
            let file_field = format!("{VIDEO_FIELD_PREFIX}{client_id}");
            videos.push(VideoManifest {
                client_id,
                file_field: file_field.clone(),
                title: video.title.trim().to_string(),
                duration: video.duration,
                file_name: file_name(&video.file_path),
                size: bytes.len() as u64,
                sha256: sha256_hex(&bytes),
            });
            files.push((file_field, video.file_path.clone(), bytes));
        }
        modules.push(ModuleManifest {
            title: module.title.trim().to_string(),
            videos,
        });
    }

    form = form.text("modules", serde_json::to_string(&modules)?);
    for (field, path, bytes) in files {
        form = form.file(field, file_name(&path), content_type(&path), bytes);
    }

    tracing::debug!(
        modules = modules.len(),
        videos = modules.iter().map(|m| m.videos.len()).sum::<usize>(),
        "course form assembled"
    );
    Ok(CourseUpload { form, modules })
}

pub fn validate_category(draft: &CategoryDraft) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if draft.title.trim().is_empty() {
        issues.push(ValidationIssue::new("title", "title is required"));
    }
    if let Some(p) = &draft.image_path {
        if !p.is_file() {
            issues.push(ValidationIssue::new("imagePath", "image file not found"));
        }
    }
    issues
}

pub fn build_category_form(draft: &CategoryDraft) -> anyhow::Result<MultipartForm> {
    let mut form = MultipartForm::new().text("title", draft.title.trim());
    if let Some(p) = &draft.image_path {
        let bytes = read_file(p)?;
        form = form.file("image", file_name(p), content_type(p), bytes);
    }
    Ok(form)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn read_file(p: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(p).with_context(|| format!("failed to read {}", p.to_string_lossy()))
}

fn file_name(p: &Path) -> String {
    p.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string())
}

fn content_type(p: &Path) -> &'static str {
    let ext = p
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// JSON summary of an assembled upload for the IPC caller.
pub fn upload_summary(upload: &CourseUpload) -> serde_json::Value {
    json!({
        "modules": upload.modules,
        "parts": upload.form.parts.iter().map(|p| p.name.clone()).collect::<Vec<_>>(),
    })
}
