use crate::config::IGNORE_FILE_NAME;
use crate::error::{AppError, Result};
use globset::{GlobBuilder, GlobMatcher};
use log;
use std::fs;
use std::path::Path;

/// One compiled ignore line.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    pattern: String,
    anchored: bool,
    matcher: GlobMatcher,
}

impl IgnoreRule {
    /// Compiles a single ignore line. Returns `None` for blank and comment
    /// lines. A leading `!` is dropped and the rest still ignores: negation
    /// never re-includes a path.
    pub fn parse(line: &str) -> Option<Result<Self>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        let body = trimmed.strip_prefix('!').unwrap_or(trimmed);
        let anchored = body.starts_with('/');
        let body = body.trim_start_matches('/').trim_end_matches('/');
        if body.is_empty() {
            return None;
        }

        let translated = translate(body);
        let glob = if anchored {
            translated
        } else {
            format!("**/{}", translated)
        };

        let compiled = GlobBuilder::new(&glob)
            .literal_separator(true)
            .backslash_escape(false)
            .build()
            .map(|g| IgnoreRule {
                pattern: trimmed.to_string(),
                anchored,
                matcher: g.compile_matcher(),
            })
            .map_err(AppError::from);
        Some(compiled)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.matcher.is_match(rel_path)
    }
}

/// Brackets and braces are literal in ignore lines; only `*`, `**` and `?`
/// are wildcards.
fn translate(body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 8);
    for ch in body.chars() {
        match ch {
            '[' | ']' | '{' | '}' => {
                out.push('[');
                out.push(ch);
                out.push(']');
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Ordered list of ignore rules; the ignore file comes first, then the
/// caller's extra patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    rules: Vec<IgnoreRule>,
}

impl PatternMatcher {
    /// Builds a matcher from ignore-file lines. Lines that fail to compile
    /// are logged and skipped.
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut rules = Vec::new();
        for line in lines {
            match IgnoreRule::parse(line) {
                Some(Ok(rule)) => {
                    log::trace!("Adding ignore rule: {}", rule.pattern);
                    rules.push(rule);
                }
                Some(Err(e)) => {
                    log::warn!("Skipping ignore line \"{}\": {}", line.trim(), e);
                }
                None => {}
            }
        }
        Self { rules }
    }

    /// Appends caller-supplied patterns. Unlike ignore-file lines these are
    /// configuration, so a bad one is an error.
    pub fn with_extra_patterns(mut self, patterns: &[String]) -> Result<Self> {
        for pattern in patterns {
            match IgnoreRule::parse(pattern) {
                Some(Ok(rule)) => {
                    log::trace!("Adding extra exclude rule: {}", rule.pattern);
                    self.rules.push(rule);
                }
                Some(Err(e)) => {
                    return Err(AppError::config(
                        "exclude",
                        format!("invalid pattern \"{}\": {}", pattern, e),
                    ));
                }
                None => {}
            }
        }
        Ok(self)
    }

    /// Reads `<root>/.gitignore` (when `use_ignore_file` is set) and appends
    /// the extra patterns.
    pub fn load(root: &Path, extra: &[String], use_ignore_file: bool) -> Result<Self> {
        let ignore_path = root.join(IGNORE_FILE_NAME);
        let base = if use_ignore_file && ignore_path.is_file() {
            match fs::read_to_string(&ignore_path) {
                Ok(content) => {
                    log::debug!("Loaded ignore file: {}", ignore_path.display());
                    Self::from_lines(content.lines())
                }
                Err(e) => {
                    log::warn!(
                        "Could not read ignore file {}: {}",
                        ignore_path.display(),
                        e
                    );
                    Self::default()
                }
            }
        } else {
            Self::default()
        };
        let matcher = base.with_extra_patterns(extra)?;
        log::debug!("Pattern matcher ready with {} rules.", matcher.len());
        Ok(matcher)
    }

    pub fn is_ignored(&self, rel_path: &str) -> bool {
        match self.rules.iter().find(|rule| rule.matches(rel_path)) {
            Some(rule) => {
                log::trace!("Path {} ignored by rule {}", rel_path, rule.pattern);
                true
            }
            None => false,
        }
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(lines: &[&str]) -> PatternMatcher {
        PatternMatcher::from_lines(lines.iter().copied())
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let m = matcher(&["", "   ", "# comment", "*.log"]);
        assert_eq!(m.len(), 1);
        assert_eq!(m.rules()[0].pattern(), "*.log");
    }

    #[test]
    fn star_stays_within_a_segment() {
        let m = matcher(&["/src/*.rs"]);
        assert!(m.is_ignored("src/lib.rs"));
        assert!(!m.is_ignored("src/nested/lib.rs"));
    }

    #[test]
    fn unanchored_matches_at_any_segment_boundary() {
        let m = matcher(&["*.log", "cache"]);
        assert!(m.is_ignored("debug.log"));
        assert!(m.is_ignored("logs/deep/app.log"));
        assert!(m.is_ignored("cache"));
        assert!(m.is_ignored("a/b/cache"));
        assert!(!m.is_ignored("mycache"));
        assert!(!m.is_ignored("cache.txt"));
    }

    #[test]
    fn anchored_matches_only_from_root() {
        let m = matcher(&["/config.yml"]);
        assert!(m.rules()[0].is_anchored());
        assert!(m.is_ignored("config.yml"));
        assert!(!m.is_ignored("nested/config.yml"));
    }

    #[test]
    fn double_star_spans_segments() {
        let m = matcher(&["/docs/**/*.png", "generated/**"]);
        assert!(m.is_ignored("docs/img.png"));
        assert!(m.is_ignored("docs/a/b/img.png"));
        assert!(!m.is_ignored("docs/img.jpg"));
        assert!(m.is_ignored("generated/x.rs"));
        assert!(m.is_ignored("pkg/generated/deep/x.rs"));
    }

    #[test]
    fn question_mark_is_single_non_separator() {
        let m = matcher(&["file?.txt"]);
        assert!(m.is_ignored("file1.txt"));
        assert!(!m.is_ignored("file12.txt"));
        assert!(!m.is_ignored("file/.txt"));
    }

    #[test]
    fn trailing_slash_matches_directory_path() {
        let m = matcher(&["tmp/"]);
        assert!(m.is_ignored("tmp"));
        assert!(m.is_ignored("a/tmp"));
    }

    #[test]
    fn brackets_and_braces_are_literal() {
        let m = matcher(&["weird[1].txt", "{a,b}.md"]);
        assert!(m.is_ignored("weird[1].txt"));
        assert!(!m.is_ignored("weird1.txt"));
        assert!(m.is_ignored("{a,b}.md"));
        assert!(!m.is_ignored("a.md"));
    }

    // Negation is parsed but not honoured: "!keep.log" still ignores
    // keep.log, and nothing un-ignores a path matched by "*.log".
    #[test]
    fn negated_lines_are_compiled_as_ignoring_rules() {
        let m = matcher(&["*.log", "!keep.log"]);
        assert_eq!(m.len(), 2);
        assert_eq!(m.rules()[1].pattern(), "!keep.log");
        assert!(m.is_ignored("keep.log"));

        let only_negated = matcher(&["!important.txt"]);
        assert!(only_negated.is_ignored("important.txt"));
    }

    #[test]
    fn extra_patterns_append_after_file_rules() {
        let m = matcher(&["*.log"])
            .with_extra_patterns(&["*.tmp".to_string()])
            .unwrap();
        assert_eq!(m.len(), 2);
        assert!(m.is_ignored("x.tmp"));
        assert!(m.is_ignored("x.log"));
    }

    #[test]
    fn load_reads_gitignore_at_root() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(".gitignore"), "*.log\n# c\n\n/secret\n").unwrap();
        let m = PatternMatcher::load(temp.path(), &[], true).unwrap();
        assert_eq!(m.len(), 2);
        assert!(m.is_ignored("debug.log"));
        assert!(m.is_ignored("secret"));

        let without = PatternMatcher::load(temp.path(), &[], false).unwrap();
        assert!(without.is_empty());
    }
}
