use crate::classify::{FileRecord, Role};
use crate::walker::WalkResult;
use indexmap::IndexMap;
use log;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LanguageAggregate {
    pub language: String,
    pub name: String,
    pub files: usize,
    pub bytes: u64,
    pub roles: BTreeMap<Role, usize>,
    pub entrypoints: Vec<String>,
    pub config_files: Vec<String>,
}

impl LanguageAggregate {
    fn new(language: &str, name: &str) -> Self {
        Self {
            language: language.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn add(&mut self, record: &FileRecord) {
        self.files += 1;
        self.bytes += record.size;
        *self.roles.entry(record.role).or_insert(0) += 1;
        if record.is_entry {
            self.entrypoints.push(record.rel_path.clone());
        }
        if record.is_config {
            self.config_files.push(record.rel_path.clone());
        }
    }
}

/// A curated highlight: docs, entrypoints and config files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyFile {
    pub path: String,
    pub role: Role,
    pub is_entry: bool,
    pub is_config: bool,
}

impl KeyFile {
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags = vec![self.role.as_str()];
        if self.is_entry {
            tags.push("entry");
        }
        if self.is_config {
            tags.push("config");
        }
        tags
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoStats {
    pub file_count: usize,
    pub dir_count: usize,
    pub total_bytes: u64,
    pub languages: HashMap<String, LanguageAggregate>,
    pub key_files: Vec<KeyFile>,
    /// Extension (or `(none)`) -> file count.
    pub extensions: BTreeMap<String, usize>,
}

impl RepoStats {
    pub fn approx_tokens(&self) -> u64 {
        self.total_bytes / 4
    }

    /// Descending bytes, then descending file count, then display name;
    /// the id breaks any remaining tie.
    pub fn languages_by_weight(&self) -> Vec<&LanguageAggregate> {
        let mut langs: Vec<&LanguageAggregate> = self.languages.values().collect();
        langs.sort_by(|a, b| {
            b.bytes
                .cmp(&a.bytes)
                .then_with(|| b.files.cmp(&a.files))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.language.cmp(&b.language))
        });
        langs
    }

    /// Same order as [`languages_by_weight`](Self::languages_by_weight), keyed by id.
    pub fn ordered_languages(&self) -> IndexMap<String, LanguageAggregate> {
        self.languages_by_weight()
            .into_iter()
            .map(|agg| (agg.language.clone(), agg.clone()))
            .collect()
    }

    /// Descending count, then extension.
    pub fn extensions_by_count(&self) -> Vec<(&str, usize)> {
        let mut exts: Vec<(&str, usize)> = self
            .extensions
            .iter()
            .map(|(ext, count)| (ext.as_str(), *count))
            .collect();
        exts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        exts
    }
}

/// Folds the classified files into per-language statistics in one pass.
pub fn aggregate(records: &[FileRecord], walk: &WalkResult) -> RepoStats {
    let mut stats = RepoStats {
        file_count: records.len(),
        dir_count: walk.dir_count(),
        ..Default::default()
    };

    for record in records {
        stats
            .languages
            .entry(record.language.clone())
            .or_insert_with(|| LanguageAggregate::new(&record.language, &record.language_name))
            .add(record);
        stats.total_bytes += record.size;
        *stats
            .extensions
            .entry(record.extension_label().to_string())
            .or_insert(0) += 1;

        if record.role == Role::Docs || record.is_entry || record.is_config {
            stats.key_files.push(KeyFile {
                path: record.rel_path.clone(),
                role: record.role,
                is_entry: record.is_entry,
                is_config: record.is_config,
            });
        }
    }
    stats.key_files.sort_by(|a, b| a.path.cmp(&b.path));

    log::debug!(
        "Aggregated {} files ({} bytes) across {} languages; {} key files.",
        stats.file_count,
        stats.total_bytes,
        stats.languages.len(),
        stats.key_files.len()
    );
    stats
}
