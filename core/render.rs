//! Markdown rendering, file content loading and output truncation.
//!
//! The structured (JSON) form lives in [`crate::document`]; both formats
//! consume the same walk, records and statistics and always emit files in
//! sorted path order.

use crate::classify::{FileRecord, Role};
use crate::config::{OutputFormat, RenderConfig};
use crate::document;
use crate::error::Result;
use crate::stats::RepoStats;
use crate::tree::tree_lines;
use crate::walker::WalkResult;
use log;
use std::fs;

pub const FILE_START_MARKER: &str = "===== FILE START:";
pub const FILE_END_MARKER: &str = "===== FILE END:";
pub const LINE_NUMBER_WIDTH: usize = 6;

/// Everything the renderer reads; produced by the earlier stages.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub root_label: &'a str,
    pub walk: &'a WalkResult,
    pub records: &'a [FileRecord],
    pub stats: &'a RepoStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content: String,
    pub truncated: bool,
}

/// What ends up in a file's content slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileBody {
    Binary,
    TooLarge { size: u64, limit: u64 },
    ReadError(String),
    Text(String),
}

/// Binary and oversized files are never opened.
pub fn load_body(record: &FileRecord, config: &RenderConfig) -> FileBody {
    if !record.is_text {
        return FileBody::Binary;
    }
    if record.size > config.max_file_bytes {
        return FileBody::TooLarge {
            size: record.size,
            limit: config.max_file_bytes,
        };
    }
    match fs::read(&record.abs_path) {
        Ok(bytes) => FileBody::Text(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            log::warn!("Failed to read {}: {}", record.abs_path.display(), e);
            FileBody::ReadError(e.to_string())
        }
    }
}

pub fn render(input: &RenderInput<'_>, config: &RenderConfig) -> Result<Rendered> {
    log::debug!(
        "Rendering {} files as {} (compress: {})",
        input.records.len(),
        config.format,
        config.compress
    );
    let full = match config.format {
        OutputFormat::Markdown => render_markdown(input, config),
        OutputFormat::Json => document::render_json(input, config)?,
    };
    Ok(truncate_output(full, config.max_output_bytes))
}

pub fn truncation_notice(limit: usize) -> String {
    format!(
        "\n\n[OUTPUT TRUNCATED: exceeded max output bytes ({})]\n",
        limit
    )
}

/// Cuts `content` to `limit` bytes and appends the notice. A cut that would
/// split a UTF-8 sequence backs off to the previous char boundary.
pub fn truncate_output(mut content: String, limit: usize) -> Rendered {
    if limit == 0 || content.len() <= limit {
        return Rendered {
            content,
            truncated: false,
        };
    }
    let mut cut = limit;
    while !content.is_char_boundary(cut) {
        cut -= 1;
    }
    log::info!(
        "Output of {} bytes truncated to {} bytes.",
        content.len(),
        cut
    );
    content.truncate(cut);
    content.push_str(&truncation_notice(limit));
    Rendered {
        content,
        truncated: true,
    }
}

/// Number of fenced blocks for `lines` lines; an empty file still gets one.
pub fn chunk_count(lines: usize, chunk_lines: usize) -> usize {
    if chunk_lines == 0 || lines == 0 {
        1
    } else {
        lines.div_ceil(chunk_lines)
    }
}

/// Fence one backtick longer than the longest run inside `text`, minimum 3.
fn fence_for(text: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for ch in text.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

pub fn render_markdown(input: &RenderInput<'_>, config: &RenderConfig) -> String {
    let mut out = String::new();
    write_overview(&mut out, input);
    write_languages(&mut out, input.stats);
    write_tree(&mut out, input.walk);
    if config.compress {
        write_file_list(&mut out, input.records);
    } else {
        write_file_contents(&mut out, input.records, config);
    }
    out
}

fn write_overview(out: &mut String, input: &RenderInput<'_>) {
    let stats = input.stats;
    out.push_str("# REPO OVERVIEW\n\n");
    out.push_str(&format!("- Root: `{}`\n", input.root_label));
    out.push_str(&format!("- Directories: {}\n", stats.dir_count));
    out.push_str(&format!("- Files: {}\n", stats.file_count));
    out.push_str(&format!("- Total bytes: {}\n", stats.total_bytes));
    out.push_str(&format!("- Approx. tokens: {}\n", stats.approx_tokens()));

    out.push_str("\n## Key files\n\n");
    if stats.key_files.is_empty() {
        out.push_str("(none)\n");
    }
    for key in &stats.key_files {
        out.push_str(&format!("- `{}` [{}]\n", key.path, key.tags().join(", ")));
    }

    out.push_str("\n## Extensions\n\n");
    let extensions = stats.extensions_by_count();
    if extensions.is_empty() {
        out.push_str("(none)\n");
    }
    for (ext, count) in extensions {
        out.push_str(&format!("- `{}`: {}\n", ext, count));
    }
    out.push('\n');
}

fn write_languages(out: &mut String, stats: &RepoStats) {
    out.push_str("# LANGUAGE OVERVIEW\n\n");
    let languages = stats.languages_by_weight();
    if languages.is_empty() {
        out.push_str("(no files)\n\n");
    }
    for lang in languages {
        out.push_str(&format!("## {} ({})\n\n", lang.name, lang.language));
        out.push_str(&format!("- Files: {}\n", lang.files));
        out.push_str(&format!("- Bytes: {}\n", lang.bytes));
        let roles: Vec<String> = Role::ALL
            .iter()
            .filter_map(|role| {
                lang.roles
                    .get(role)
                    .map(|count| format!("{}={}", role.as_str(), count))
            })
            .collect();
        out.push_str(&format!("- Roles: {}\n", roles.join(", ")));
        if !lang.entrypoints.is_empty() {
            out.push_str("- Entrypoints:\n");
            for path in &lang.entrypoints {
                out.push_str(&format!("  - `{}`\n", path));
            }
        }
        if !lang.config_files.is_empty() {
            out.push_str("- Config files:\n");
            for path in &lang.config_files {
                out.push_str(&format!("  - `{}`\n", path));
            }
        }
        out.push('\n');
    }
}

fn write_tree(out: &mut String, walk: &WalkResult) {
    out.push_str("# REPO TREE\n\n```text\n");
    for line in tree_lines(walk) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("```\n\n");
}

fn write_file_list(out: &mut String, records: &[FileRecord]) {
    out.push_str("# FILE LIST\n\n");
    if records.is_empty() {
        out.push_str("(no files)\n");
    }
    for record in records {
        out.push_str(&format!(
            "- `{}` | {} | {} | {} bytes | {}\n",
            record.rel_path,
            record.language,
            record.role,
            record.size,
            if record.is_text { "text" } else { "binary" }
        ));
    }
}

fn write_file_contents(out: &mut String, records: &[FileRecord], config: &RenderConfig) {
    out.push_str("# FILE CONTENTS\n\n");
    if records.is_empty() {
        out.push_str("(no files)\n");
    }
    for record in records {
        write_file_section(out, record, config);
    }
}

fn write_file_section(out: &mut String, record: &FileRecord, config: &RenderConfig) {
    let body = load_body(record, config);
    let line_count = match &body {
        FileBody::Text(text) => text.lines().count(),
        _ => 0,
    };
    let chunks = match &body {
        FileBody::Text(_) => chunk_count(line_count, config.chunk_lines),
        _ => 0,
    };

    out.push_str(&format!("{} {} =====\n", FILE_START_MARKER, record.rel_path));
    out.push_str(&format!("- Size: {} bytes\n", record.size));
    out.push_str(&format!(
        "- Type: {}\n",
        if record.is_text { "text" } else { "binary" }
    ));
    out.push_str(&format!(
        "- Language: {} ({})\n",
        record.language_name, record.language
    ));
    out.push_str(&format!("- Role: {}\n", record.role));
    let hints = record.hints();
    if !hints.is_empty() {
        out.push_str(&format!("- Hints: {}\n", hints.join("; ")));
    }
    out.push_str(&format!("- Chunks: {}\n\n", chunks));

    match &body {
        FileBody::Binary => out.push_str("[BINARY FILE OMITTED]\n"),
        FileBody::TooLarge { size, limit } => {
            out.push_str(&format!(
                "[FILE TOO LARGE: {} bytes exceeds limit of {} bytes; content omitted]\n",
                size, limit
            ));
        }
        FileBody::ReadError(message) => {
            out.push_str(&format!("[ERROR READING FILE: {}]\n", message));
        }
        FileBody::Text(text) => write_chunks(out, record, text, config),
    }

    out.push_str(&format!("\n{} {} =====\n\n", FILE_END_MARKER, record.rel_path));
}

fn write_chunks(out: &mut String, record: &FileRecord, text: &str, config: &RenderConfig) {
    let fence = fence_for(text);
    let tag = format!("{}:{}", record.language, record.rel_path);
    let lines: Vec<&str> = text.lines().collect();

    if lines.is_empty() {
        out.push_str(&format!("{}{}\n{}\n", fence, tag, fence));
        return;
    }

    let per_chunk = if config.chunk_lines == 0 {
        lines.len()
    } else {
        config.chunk_lines
    };
    let total = chunk_count(lines.len(), config.chunk_lines);
    // Line numbers run across chunk boundaries.
    let mut line_no = 0usize;

    for (index, chunk) in lines.chunks(per_chunk).enumerate() {
        if config.chunk_lines > 0 {
            out.push_str(&format!(
                "#### Chunk {}/{} (lines {}-{})\n\n",
                index + 1,
                total,
                line_no + 1,
                line_no + chunk.len()
            ));
        }
        out.push_str(&format!("{}{}\n", fence, tag));
        for line in chunk {
            line_no += 1;
            if config.line_numbers {
                out.push_str(&format!(
                    "{:>width$} | {}\n",
                    line_no,
                    line,
                    width = LINE_NUMBER_WIDTH
                ));
            } else {
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push_str(&format!("{}\n", fence));
        if index + 1 < total {
            out.push('\n');
        }
    }
}
