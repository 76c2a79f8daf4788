use crate::classify::classify_all;
use crate::config::EngineConfig;
use crate::error::{AppError, Result};
use crate::patterns::PatternMatcher;
use crate::render::{RenderInput, render};
use crate::stats::{KeyFile, LanguageAggregate, aggregate};
use crate::walker::walk;
use indexmap::IndexMap;
use log;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
    pub root: String,
    pub file_count: usize,
    pub dir_count: usize,
    pub total_bytes: u64,
    pub approx_tokens: u64,
    pub languages: IndexMap<String, LanguageAggregate>,
    pub key_files: Vec<KeyFile>,
}

/// A completed run: summary data plus the rendered document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub metadata: Metadata,
    pub content: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

/// Uniform success/failure envelope for callers that want data, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub success: bool,
    pub error: Option<ErrorInfo>,
    pub metadata: Option<Metadata>,
    pub content: Option<String>,
    pub truncated: bool,
}

impl AnalysisResult {
    pub fn from_outcome(outcome: Result<Analysis>) -> Self {
        match outcome {
            Ok(analysis) => AnalysisResult {
                success: true,
                error: None,
                metadata: Some(analysis.metadata),
                content: Some(analysis.content),
                truncated: analysis.truncated,
            },
            Err(e) => AnalysisResult::failure(&e),
        }
    }

    pub fn failure(error: &AppError) -> Self {
        AnalysisResult {
            success: false,
            error: Some(ErrorInfo {
                code: error.code().to_string(),
                message: error.to_string(),
            }),
            metadata: None,
            content: None,
            truncated: false,
        }
    }
}

/// Runs the whole pipeline over `root`: validate, walk, classify,
/// aggregate, render. The tree is never modified.
pub fn analyze(root: &Path, config: &EngineConfig) -> Result<Analysis> {
    let config = config.clone().validated()?;

    if !root.exists() {
        return Err(AppError::InvalidPath {
            path: root.to_path_buf(),
            reason: "does not exist".to_string(),
        });
    }
    if !root.is_dir() {
        return Err(AppError::InvalidPath {
            path: root.to_path_buf(),
            reason: "is not a directory".to_string(),
        });
    }
    let root = root.canonicalize().map_err(|e| AppError::InvalidPath {
        path: root.to_path_buf(),
        reason: format!("could not be resolved: {}", e),
    })?;
    log::info!("Analyzing repository at {}", root.display());

    let matcher = PatternMatcher::load(&root, &config.exclude, config.use_gitignore)?;
    let walk_result = walk(&root, &matcher, &config.prune_dirs, &config.render)?;
    let records = classify_all(&root, &walk_result.files);
    let stats = aggregate(&records, &walk_result);

    let root_label = root.display().to_string();
    let rendered = render(
        &RenderInput {
            root_label: &root_label,
            walk: &walk_result,
            records: &records,
            stats: &stats,
        },
        &config.render,
    )?;
    log::info!(
        "Rendered {} bytes for {} files{}.",
        rendered.content.len(),
        stats.file_count,
        if rendered.truncated { " (truncated)" } else { "" }
    );

    Ok(Analysis {
        metadata: Metadata {
            approx_tokens: stats.approx_tokens(),
            languages: stats.ordered_languages(),
            root: root_label,
            file_count: stats.file_count,
            dir_count: stats.dir_count,
            total_bytes: stats.total_bytes,
            key_files: stats.key_files,
        },
        content: rendered.content,
        truncated: rendered.truncated,
    })
}
