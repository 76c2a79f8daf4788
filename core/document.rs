use crate::classify::{FileRecord, Role};
use crate::config::RenderConfig;
use crate::error::Result;
use crate::render::{FileBody, RenderInput, load_body};
use crate::stats::{KeyFile, LanguageAggregate};
use crate::tree::{TreeNode, build_tree};
use indexmap::IndexMap;
use log;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct Document<'a> {
    pub root: &'a str,
    pub stats: DocumentStats,
    pub languages: IndexMap<String, LanguageAggregate>,
    pub key_files: &'a [KeyFile],
    pub extensions: &'a BTreeMap<String, usize>,
    pub tree: Vec<TreeNode>,
    pub files: Vec<FileEntry<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub files: usize,
    pub directories: usize,
    pub total_bytes: u64,
    pub approx_tokens: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OmittedReason {
    Compressed,
    Binary,
    TooLarge,
    ReadError,
}

#[derive(Debug, Serialize)]
pub struct FileEntry<'a> {
    pub path: &'a str,
    pub size: u64,
    pub is_text: bool,
    pub extension: &'a str,
    pub language: &'a str,
    pub role: Role,
    pub is_config: bool,
    pub is_entry: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub omitted: Option<OmittedReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> FileEntry<'a> {
    fn new(record: &'a FileRecord, config: &RenderConfig) -> Self {
        let mut entry = FileEntry {
            path: &record.rel_path,
            size: record.size,
            is_text: record.is_text,
            extension: &record.extension,
            language: &record.language,
            role: record.role,
            is_config: record.is_config,
            is_entry: record.is_entry,
            hints: record.hints(),
            content: None,
            omitted: None,
            error: None,
        };
        if config.compress {
            entry.omitted = Some(OmittedReason::Compressed);
            return entry;
        }
        match load_body(record, config) {
            FileBody::Text(text) => entry.content = Some(text),
            FileBody::Binary => entry.omitted = Some(OmittedReason::Binary),
            FileBody::TooLarge { .. } => entry.omitted = Some(OmittedReason::TooLarge),
            FileBody::ReadError(message) => {
                entry.omitted = Some(OmittedReason::ReadError);
                entry.error = Some(message);
            }
        }
        entry
    }
}

impl<'a> Document<'a> {
    pub fn build(input: &RenderInput<'a>, config: &RenderConfig) -> Self {
        let stats = input.stats;
        Document {
            root: input.root_label,
            stats: DocumentStats {
                files: stats.file_count,
                directories: stats.dir_count,
                total_bytes: stats.total_bytes,
                approx_tokens: stats.approx_tokens(),
            },
            languages: stats.ordered_languages(),
            key_files: &stats.key_files,
            extensions: &stats.extensions,
            tree: build_tree(input.walk),
            files: input
                .records
                .iter()
                .map(|record| FileEntry::new(record, config))
                .collect(),
        }
    }
}

pub fn render_json(input: &RenderInput<'_>, config: &RenderConfig) -> Result<String> {
    let document = Document::build(input, config);
    log::debug!("Serializing JSON document with {} files", document.files.len());
    Ok(serde_json::to_string_pretty(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregate;
    use crate::walker::WalkResult;
    use serde_json::Value;
    use std::fs;

    #[test]
    fn document_carries_content_and_omissions() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("a.py"), "print('a')\n").unwrap();
        fs::write(temp.path().join("blob.bin"), [0u8, 1, 2]).unwrap();
        let walk = WalkResult {
            paths: vec!["a.py".into(), "blob.bin".into()],
            files: vec!["a.py".into(), "blob.bin".into()],
            dirs: Default::default(),
        };
        let records = crate::classify::classify_all(temp.path(), &walk.files);
        let stats = aggregate(&records, &walk);
        let input = RenderInput {
            root_label: "demo",
            walk: &walk,
            records: &records,
            stats: &stats,
        };

        let json: Value =
            serde_json::from_str(&render_json(&input, &RenderConfig::default()).unwrap()).unwrap();
        assert_eq!(json["root"], "demo");
        assert_eq!(json["stats"]["files"], 2);
        assert_eq!(json["files"][0]["path"], "a.py");
        assert_eq!(json["files"][0]["content"], "print('a')\n");
        assert_eq!(json["files"][1]["omitted"], "binary");
        assert!(json["files"][1].get("content").is_none());
        assert_eq!(json["tree"][0]["type"], "file");

        let compressed = RenderConfig {
            compress: true,
            ..Default::default()
        };
        let json: Value =
            serde_json::from_str(&render_json(&input, &compressed).unwrap()).unwrap();
        assert_eq!(json["files"][0]["omitted"], "compressed");
        assert!(json["files"][0].get("content").is_none());
    }
}
