//! Per-file language, role and entrypoint/config classification.
//!
//! Resolution is expressed as ordered rule lists ([`LANGUAGE_RULES`],
//! [`ROLE_RULES`]); the first rule that applies wins.

use crate::walker::extension_of;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use log;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Bytes inspected for binary detection and the shebang line.
pub const SNIFF_BYTES: u64 = 8192;
/// Language id used when nothing resolves and the file has no extension.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Source,
    Test,
    Config,
    Docs,
    Other,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Source, Role::Test, Role::Config, Role::Docs, Role::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Source => "source",
            Role::Test => "test",
            Role::Config => "config",
            Role::Docs => "docs",
            Role::Other => "other",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified file. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    pub rel_path: String,
    #[serde(skip)]
    pub abs_path: PathBuf,
    pub size: u64,
    pub is_text: bool,
    /// Lowercase, no dot; empty when the file has none.
    pub extension: String,
    pub language: String,
    pub language_name: String,
    pub role: Role,
    pub is_config: bool,
    pub is_entry: bool,
}

impl FileRecord {
    /// Annotations shown next to the file in full output.
    pub fn hints(&self) -> Vec<String> {
        let mut hints = Vec::new();
        if self.is_entry {
            hints.push("probable application entrypoint".to_string());
        }
        if self.is_config {
            let hint = manifest_hint(&self.rel_path).unwrap_or("build or tooling configuration");
            hints.push(hint.to_string());
        }
        match self.role {
            Role::Test => hints.push("test code".to_string()),
            Role::Docs => hints.push("documentation".to_string()),
            _ => {}
        }
        hints
    }

    pub fn extension_label(&self) -> &str {
        if self.extension.is_empty() {
            "(none)"
        } else {
            &self.extension
        }
    }
}

/// What the rules look at: cheap facts about the path plus a small sample.
#[derive(Debug, Clone)]
pub struct FileFacts<'a> {
    pub rel_path: &'a str,
    pub file_name: &'a str,
    pub extension: Option<String>,
    pub is_text: bool,
    pub first_line: Option<String>,
}

impl<'a> FileFacts<'a> {
    pub fn new(rel_path: &'a str, is_text: bool, first_line: Option<String>) -> Self {
        let file_name = rel_path.rsplit('/').next().unwrap_or(rel_path);
        Self {
            rel_path,
            file_name,
            extension: extension_of(rel_path),
            is_text,
            first_line,
        }
    }

    fn dir_components(&self) -> impl Iterator<Item = &'a str> {
        let mut parts: Vec<&'a str> = self.rel_path.split('/').collect();
        parts.pop();
        parts.into_iter()
    }

    fn stem(&self) -> &'a str {
        match self.file_name.rfind('.') {
            Some(idx) if idx > 0 => &self.file_name[..idx],
            _ => self.file_name,
        }
    }
}

// ---------------------------------------------------------------------------
// Language resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageRule {
    /// Static extension table.
    Extension,
    /// Conventional build/interpreter filenames, extensionless files only.
    Filename,
    /// `#!` interpreter directive, text files only.
    Shebang,
}

pub const LANGUAGE_RULES: [LanguageRule; 3] = [
    LanguageRule::Extension,
    LanguageRule::Filename,
    LanguageRule::Shebang,
];

impl LanguageRule {
    pub fn resolve(&self, facts: &FileFacts<'_>) -> Option<&'static str> {
        match self {
            LanguageRule::Extension => facts
                .extension
                .as_deref()
                .and_then(|ext| EXTENSION_LANGUAGES.get(ext).copied()),
            LanguageRule::Filename => {
                if facts.extension.is_some() {
                    return None;
                }
                FILENAME_LANGUAGES
                    .get(facts.file_name.to_lowercase().as_str())
                    .copied()
            }
            LanguageRule::Shebang => {
                if !facts.is_text {
                    return None;
                }
                let interpreter = facts.first_line.as_deref().and_then(shebang_interpreter)?;
                INTERPRETER_LANGUAGES.get(interpreter.as_str()).copied()
            }
        }
    }
}

/// Returns `(language id, resolved)`; `resolved` is false for the fallback.
pub fn resolve_language(facts: &FileFacts<'_>) -> (String, bool) {
    for rule in LANGUAGE_RULES {
        if let Some(lang) = rule.resolve(facts) {
            log::trace!("{}: language {} via {:?}", facts.rel_path, lang, rule);
            return (lang.to_string(), true);
        }
    }
    let fallback = facts
        .extension
        .clone()
        .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());
    (fallback, false)
}

/// Interpreter named by a `#!` line, with `env` indirection resolved and
/// version suffixes stripped (`python3.11` -> `python`).
pub fn shebang_interpreter(line: &str) -> Option<String> {
    let rest = line.strip_prefix("#!")?.trim();
    let mut words = rest.split_whitespace();
    let mut program = words.next()?.rsplit('/').next()?;
    if program == "env" {
        program = words
            .find(|w| !w.starts_with('-') && !w.contains('='))?
            .rsplit('/')
            .next()?;
    }
    let name = program.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
    if name.is_empty() {
        None
    } else {
        Some(name.to_lowercase())
    }
}

pub fn language_name(id: &str) -> String {
    LANGUAGE_NAMES
        .get(id)
        .map(|name| name.to_string())
        .unwrap_or_else(|| id.to_string())
}

static EXTENSION_LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("rs", "rust"),
        ("py", "python"),
        ("pyi", "python"),
        ("pyw", "python"),
        ("js", "javascript"),
        ("mjs", "javascript"),
        ("cjs", "javascript"),
        ("jsx", "javascript"),
        ("ts", "typescript"),
        ("tsx", "typescript"),
        ("mts", "typescript"),
        ("cts", "typescript"),
        ("go", "go"),
        ("java", "java"),
        ("kt", "kotlin"),
        ("kts", "kotlin"),
        ("scala", "scala"),
        ("sc", "scala"),
        ("groovy", "groovy"),
        ("gradle", "groovy"),
        ("c", "c"),
        ("h", "c"),
        ("cpp", "cpp"),
        ("cc", "cpp"),
        ("cxx", "cpp"),
        ("hpp", "cpp"),
        ("hh", "cpp"),
        ("hxx", "cpp"),
        ("cs", "csharp"),
        ("fs", "fsharp"),
        ("fsx", "fsharp"),
        ("rb", "ruby"),
        ("rake", "ruby"),
        ("gemspec", "ruby"),
        ("php", "php"),
        ("swift", "swift"),
        ("m", "objective-c"),
        ("mm", "objective-c"),
        ("dart", "dart"),
        ("lua", "lua"),
        ("pl", "perl"),
        ("pm", "perl"),
        ("r", "r"),
        ("jl", "julia"),
        ("ex", "elixir"),
        ("exs", "elixir"),
        ("erl", "erlang"),
        ("hrl", "erlang"),
        ("hs", "haskell"),
        ("ml", "ocaml"),
        ("mli", "ocaml"),
        ("clj", "clojure"),
        ("cljs", "clojure"),
        ("zig", "zig"),
        ("nim", "nim"),
        ("sh", "shell"),
        ("bash", "shell"),
        ("zsh", "shell"),
        ("fish", "shell"),
        ("ps1", "powershell"),
        ("bat", "batch"),
        ("cmd", "batch"),
        ("sql", "sql"),
        ("html", "html"),
        ("htm", "html"),
        ("css", "css"),
        ("scss", "scss"),
        ("sass", "scss"),
        ("less", "less"),
        ("vue", "vue"),
        ("svelte", "svelte"),
        ("md", "markdown"),
        ("markdown", "markdown"),
        ("rst", "restructuredtext"),
        ("adoc", "asciidoc"),
        ("asciidoc", "asciidoc"),
        ("org", "org"),
        ("txt", "text"),
        ("json", "json"),
        ("jsonc", "json"),
        ("yaml", "yaml"),
        ("yml", "yaml"),
        ("toml", "toml"),
        ("xml", "xml"),
        ("ini", "ini"),
        ("cfg", "ini"),
        ("proto", "protobuf"),
        ("graphql", "graphql"),
        ("gql", "graphql"),
        ("tf", "hcl"),
        ("hcl", "hcl"),
        ("dockerfile", "dockerfile"),
        ("mk", "makefile"),
        ("cmake", "cmake"),
        ("tex", "latex"),
        ("csv", "csv"),
        ("ipynb", "jupyter"),
        ("sol", "solidity"),
        ("vim", "vim"),
        ("el", "elisp"),
    ]
    .into_iter()
    .collect()
});

static FILENAME_LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("makefile", "makefile"),
        ("gnumakefile", "makefile"),
        ("dockerfile", "dockerfile"),
        ("containerfile", "dockerfile"),
        ("rakefile", "ruby"),
        ("gemfile", "ruby"),
        ("guardfile", "ruby"),
        ("podfile", "ruby"),
        ("vagrantfile", "ruby"),
        ("brewfile", "ruby"),
        ("jenkinsfile", "groovy"),
        ("build", "starlark"),
        ("workspace", "starlark"),
        ("justfile", "just"),
        ("procfile", "procfile"),
    ]
    .into_iter()
    .collect()
});

static INTERPRETER_LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("python", "python"),
        ("pypy", "python"),
        ("node", "javascript"),
        ("nodejs", "javascript"),
        ("bun", "javascript"),
        ("deno", "typescript"),
        ("ts-node", "typescript"),
        ("sh", "shell"),
        ("bash", "shell"),
        ("zsh", "shell"),
        ("dash", "shell"),
        ("ksh", "shell"),
        ("fish", "shell"),
        ("ruby", "ruby"),
        ("perl", "perl"),
        ("php", "php"),
        ("lua", "lua"),
        ("rscript", "r"),
        ("julia", "julia"),
        ("elixir", "elixir"),
        ("escript", "erlang"),
        ("pwsh", "powershell"),
        ("groovy", "groovy"),
        ("swift", "swift"),
    ]
    .into_iter()
    .collect()
});

static LANGUAGE_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("rust", "Rust"),
        ("python", "Python"),
        ("javascript", "JavaScript"),
        ("typescript", "TypeScript"),
        ("go", "Go"),
        ("java", "Java"),
        ("kotlin", "Kotlin"),
        ("scala", "Scala"),
        ("groovy", "Groovy"),
        ("c", "C"),
        ("cpp", "C++"),
        ("csharp", "C#"),
        ("fsharp", "F#"),
        ("ruby", "Ruby"),
        ("php", "PHP"),
        ("swift", "Swift"),
        ("objective-c", "Objective-C"),
        ("dart", "Dart"),
        ("lua", "Lua"),
        ("perl", "Perl"),
        ("r", "R"),
        ("julia", "Julia"),
        ("elixir", "Elixir"),
        ("erlang", "Erlang"),
        ("haskell", "Haskell"),
        ("ocaml", "OCaml"),
        ("clojure", "Clojure"),
        ("zig", "Zig"),
        ("nim", "Nim"),
        ("shell", "Shell"),
        ("powershell", "PowerShell"),
        ("batch", "Batch"),
        ("sql", "SQL"),
        ("html", "HTML"),
        ("css", "CSS"),
        ("scss", "SCSS"),
        ("less", "Less"),
        ("vue", "Vue"),
        ("svelte", "Svelte"),
        ("markdown", "Markdown"),
        ("restructuredtext", "reStructuredText"),
        ("asciidoc", "AsciiDoc"),
        ("org", "Org"),
        ("text", "Plain Text"),
        ("json", "JSON"),
        ("yaml", "YAML"),
        ("toml", "TOML"),
        ("xml", "XML"),
        ("ini", "INI"),
        ("protobuf", "Protocol Buffers"),
        ("graphql", "GraphQL"),
        ("hcl", "HCL"),
        ("dockerfile", "Dockerfile"),
        ("makefile", "Makefile"),
        ("cmake", "CMake"),
        ("latex", "LaTeX"),
        ("csv", "CSV"),
        ("jupyter", "Jupyter Notebook"),
        ("solidity", "Solidity"),
        ("vim", "Vim Script"),
        ("elisp", "Emacs Lisp"),
        ("starlark", "Starlark"),
        ("just", "Just"),
        ("procfile", "Procfile"),
        (UNKNOWN_LANGUAGE, "Unknown"),
    ]
    .into_iter()
    .collect()
});

// ---------------------------------------------------------------------------
// Role resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRule {
    TestPath,
    Manifest,
    Docs,
    Source,
}

pub const ROLE_RULES: [RoleRule; 4] = [
    RoleRule::TestPath,
    RoleRule::Manifest,
    RoleRule::Docs,
    RoleRule::Source,
];

impl RoleRule {
    pub fn applies(&self, facts: &FileFacts<'_>, language_resolved: bool) -> bool {
        match self {
            RoleRule::TestPath => is_test_path(facts),
            RoleRule::Manifest => is_manifest(facts),
            RoleRule::Docs => is_docs(facts),
            RoleRule::Source => language_resolved && !is_prose(facts.extension.as_deref()),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            RoleRule::TestPath => Role::Test,
            RoleRule::Manifest => Role::Config,
            RoleRule::Docs => Role::Docs,
            RoleRule::Source => Role::Source,
        }
    }
}

pub fn resolve_role(facts: &FileFacts<'_>, language_resolved: bool) -> Role {
    ROLE_RULES
        .iter()
        .find(|rule| rule.applies(facts, language_resolved))
        .map(RoleRule::role)
        .unwrap_or(Role::Other)
}

const TEST_DIRS: &[&str] = &[
    "test", "tests", "spec", "specs", "__tests__", "testing", "testdata", "e2e",
];
const DOC_DIRS: &[&str] = &["docs", "doc", "documentation"];
const PROSE_EXTENSIONS: &[&str] = &["md", "markdown", "rst", "txt", "adoc", "asciidoc", "org"];
const DOC_STEMS: &[&str] = &[
    "README",
    "CHANGELOG",
    "CHANGES",
    "HISTORY",
    "LICENSE",
    "LICENCE",
    "COPYING",
    "CONTRIBUTING",
    "AUTHORS",
    "NOTICE",
    "CODE_OF_CONDUCT",
    "SECURITY",
];
const CLASS_TEST_EXTENSIONS: &[&str] = &["java", "kt", "scala", "cs", "swift"];

fn is_prose(extension: Option<&str>) -> bool {
    extension.is_some_and(|ext| PROSE_EXTENSIONS.contains(&ext))
}

fn is_test_path(facts: &FileFacts<'_>) -> bool {
    if facts
        .dir_components()
        .any(|dir| TEST_DIRS.contains(&dir.to_lowercase().as_str()))
    {
        return true;
    }
    let name = facts.file_name.to_lowercase();
    if name.starts_with("test_") || name == "conftest.py" {
        return true;
    }
    let stem = facts.stem();
    let lower_stem = stem.to_lowercase();
    if ["_test", ".test", ".spec", "_spec"]
        .iter()
        .any(|suffix| lower_stem.ends_with(suffix))
    {
        return true;
    }
    facts
        .extension
        .as_deref()
        .is_some_and(|ext| CLASS_TEST_EXTENSIONS.contains(&ext))
        && (stem.ends_with("Test") || stem.ends_with("Tests"))
}

fn is_ci_path(rel_path: &str) -> bool {
    let lower = rel_path.to_lowercase();
    let yaml = lower.ends_with(".yml") || lower.ends_with(".yaml");
    yaml && (lower.starts_with(".github/workflows/") || lower.starts_with(".circleci/"))
}

fn is_manifest(facts: &FileFacts<'_>) -> bool {
    MANIFEST_HINTS.contains_key(facts.file_name.to_lowercase().as_str())
        || is_ci_path(facts.rel_path)
}

fn manifest_hint(rel_path: &str) -> Option<&'static str> {
    let name = rel_path.rsplit('/').next().unwrap_or(rel_path).to_lowercase();
    MANIFEST_HINTS.get(name.as_str()).copied().or_else(|| {
        if is_ci_path(rel_path) {
            Some("CI workflow definition")
        } else {
            None
        }
    })
}

fn is_docs(facts: &FileFacts<'_>) -> bool {
    let in_doc_dir = facts
        .dir_components()
        .any(|dir| DOC_DIRS.contains(&dir.to_lowercase().as_str()));
    if in_doc_dir && is_prose(facts.extension.as_deref()) {
        return true;
    }
    let head = facts
        .file_name
        .split('.')
        .next()
        .unwrap_or(facts.file_name)
        .to_uppercase();
    DOC_STEMS.contains(&head.as_str())
        || head.starts_with("LICENSE-")
        || head.starts_with("LICENCE-")
}

/// Lowercased manifest filename -> description.
static MANIFEST_HINTS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("package.json", "Node.js package manifest"),
        ("package-lock.json", "Node.js dependency lockfile"),
        ("npm-shrinkwrap.json", "Node.js dependency lockfile"),
        ("yarn.lock", "Yarn dependency lockfile"),
        ("pnpm-lock.yaml", "pnpm dependency lockfile"),
        ("pnpm-workspace.yaml", "pnpm workspace definition"),
        ("tsconfig.json", "TypeScript compiler configuration"),
        ("deno.json", "Deno configuration"),
        ("cargo.toml", "Rust crate manifest"),
        ("cargo.lock", "Rust dependency lockfile"),
        ("pyproject.toml", "Python project metadata"),
        ("setup.py", "Python package setup script"),
        ("setup.cfg", "Python package configuration"),
        ("requirements.txt", "Python dependency list"),
        ("requirements-dev.txt", "Python dependency list"),
        ("pipfile", "Pipenv dependency manifest"),
        ("pipfile.lock", "Pipenv dependency lockfile"),
        ("poetry.lock", "Poetry dependency lockfile"),
        ("tox.ini", "tox test environment configuration"),
        ("go.mod", "Go module definition"),
        ("go.sum", "Go module checksums"),
        ("pom.xml", "Maven project model"),
        ("build.gradle", "Gradle build script"),
        ("build.gradle.kts", "Gradle build script"),
        ("settings.gradle", "Gradle settings"),
        ("settings.gradle.kts", "Gradle settings"),
        ("build.sbt", "sbt build definition"),
        ("gemfile", "Ruby dependency manifest"),
        ("gemfile.lock", "Ruby dependency lockfile"),
        ("rakefile", "Rake task definitions"),
        ("composer.json", "PHP Composer manifest"),
        ("composer.lock", "PHP Composer lockfile"),
        ("mix.exs", "Elixir Mix project"),
        ("package.swift", "Swift package manifest"),
        ("pubspec.yaml", "Dart/Flutter package manifest"),
        ("makefile", "Make build script"),
        ("gnumakefile", "Make build script"),
        ("cmakelists.txt", "CMake build script"),
        ("justfile", "Just task runner recipes"),
        ("dockerfile", "Container build recipe"),
        ("containerfile", "Container build recipe"),
        ("docker-compose.yml", "Container orchestration definition"),
        ("docker-compose.yaml", "Container orchestration definition"),
        ("compose.yml", "Container orchestration definition"),
        ("compose.yaml", "Container orchestration definition"),
        (".gitlab-ci.yml", "GitLab CI pipeline"),
        (".travis.yml", "Travis CI configuration"),
        ("azure-pipelines.yml", "Azure Pipelines definition"),
        ("jenkinsfile", "Jenkins pipeline"),
        ("bitbucket-pipelines.yml", "Bitbucket Pipelines definition"),
    ]
    .into_iter()
    .collect()
});

// ---------------------------------------------------------------------------
// Entrypoints
// ---------------------------------------------------------------------------

/// Per-language conventions, matched against the lowercased relative path.
const ENTRY_PATTERNS: &[(&str, &[&str])] = &[
    (
        "python",
        &[
            "main.py",
            "__main__.py",
            "app.py",
            "manage.py",
            "wsgi.py",
            "asgi.py",
            "src/main.py",
            "src/app.py",
            "**/__main__.py",
        ],
    ),
    ("rust", &["src/main.rs", "src/bin/*.rs", "**/src/main.rs"]),
    ("go", &["main.go", "cmd/*/main.go", "**/cmd/*/main.go"]),
    (
        "javascript",
        &[
            "{index,main,app,server}.{js,mjs,cjs,jsx}",
            "src/{index,main,app,server}.{js,mjs,cjs,jsx}",
            "bin/*.js",
        ],
    ),
    (
        "typescript",
        &[
            "{index,main,app,server}.{ts,mts,tsx}",
            "src/{index,main,app,server}.{ts,mts,tsx}",
        ],
    ),
    (
        "java",
        &["**/main.java", "**/application.java", "**/*application.java"],
    ),
    (
        "kotlin",
        &["**/main.kt", "**/application.kt", "**/*application.kt"],
    ),
    ("scala", &["**/main.scala"]),
    ("c", &["main.c", "src/main.c"]),
    (
        "cpp",
        &["main.{cpp,cc,cxx}", "src/main.{cpp,cc,cxx}"],
    ),
    ("csharp", &["**/program.cs"]),
    ("ruby", &["bin/*", "exe/*", "config.ru", "main.rb", "app.rb"]),
    ("php", &["index.php", "public/index.php", "artisan"]),
    (
        "shell",
        &[
            "entrypoint.sh",
            "docker-entrypoint.sh",
            "run.sh",
            "start.sh",
            "bin/*",
        ],
    ),
    ("swift", &["**/main.swift"]),
    ("dart", &["lib/main.dart", "bin/*.dart"]),
];

static ENTRY_MATCHERS: Lazy<HashMap<&'static str, GlobSet>> = Lazy::new(|| {
    ENTRY_PATTERNS
        .iter()
        .map(|(lang, patterns)| {
            let mut builder = GlobSetBuilder::new();
            for pattern in patterns.iter() {
                let glob = GlobBuilder::new(pattern)
                    .literal_separator(true)
                    .build()
                    .expect("Invalid built-in entrypoint pattern");
                builder.add(glob);
            }
            let set = builder
                .build()
                .expect("Failed to build built-in entrypoint patterns");
            (*lang, set)
        })
        .collect()
});

pub fn is_entrypoint(language: &str, rel_path: &str) -> bool {
    ENTRY_MATCHERS
        .get(language)
        .is_some_and(|set| set.is_match(rel_path.to_lowercase()))
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

struct Sample {
    is_text: bool,
    first_line: Option<String>,
}

fn sniff(path: &Path) -> std::io::Result<Sample> {
    let mut buf = Vec::new();
    File::open(path)?.take(SNIFF_BYTES).read_to_end(&mut buf)?;
    if buf.contains(&0) {
        return Ok(Sample {
            is_text: false,
            first_line: None,
        });
    }
    let line_end = buf.iter().position(|b| *b == b'\n').unwrap_or(buf.len());
    let first_line = String::from_utf8_lossy(&buf[..line_end])
        .trim_end_matches('\r')
        .to_string();
    Ok(Sample {
        is_text: true,
        first_line: Some(first_line),
    })
}

/// Classifies one retained file. Never fails: unreadable metadata or samples
/// are logged and the file is treated as an empty text file here; the
/// renderer reports the open failure inline.
pub fn classify(root: &Path, rel_path: &str) -> FileRecord {
    let abs_path = root.join(rel_path);
    let size = match std::fs::metadata(&abs_path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            log::warn!("Could not read metadata for {}: {}", abs_path.display(), e);
            0
        }
    };
    let sample = match sniff(&abs_path) {
        Ok(sample) => sample,
        Err(e) => {
            log::warn!("Could not sample {}: {}", abs_path.display(), e);
            Sample {
                is_text: true,
                first_line: None,
            }
        }
    };

    let facts = FileFacts::new(rel_path, sample.is_text, sample.first_line);
    let (language, resolved) = resolve_language(&facts);
    let role = resolve_role(&facts, resolved);
    let is_config = is_manifest(&facts);
    let is_entry = is_entrypoint(&language, rel_path);

    FileRecord {
        rel_path: rel_path.to_string(),
        abs_path,
        size,
        is_text: sample.is_text,
        extension: facts.extension.clone().unwrap_or_default(),
        language_name: language_name(&language),
        language,
        role,
        is_config,
        is_entry,
    }
}

pub fn classify_all(root: &Path, files: &[String]) -> Vec<FileRecord> {
    log::debug!("Classifying {} files...", files.len());
    let records: Vec<FileRecord> = files.iter().map(|rel| classify(root, rel)).collect();
    let unique: HashSet<&str> = records.iter().map(|r| r.language.as_str()).collect();
    log::debug!("Classification complete: {} languages.", unique.len());
    records
}
