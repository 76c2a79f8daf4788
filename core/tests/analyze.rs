use repodigest_core::config::EngineConfig;
use repodigest_core::render::truncation_notice;
use repodigest_core::{OutputFormat, analyze};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn sample_repo(root: &Path) {
    write_file(&root.join("README.md"), "# Demo\n\nA small project.\n");
    write_file(&root.join("main.py"), "def main():\n    print('hi')\n");
    write_file(&root.join(".gitignore"), "*.log\n");
    write_file(&root.join("debug.log"), "noise\n");
}

fn file_sections(content: &str) -> Vec<&str> {
    content
        .lines()
        .filter_map(|line| line.strip_prefix("===== FILE START: "))
        .map(|rest| rest.trim_end_matches(" ====="))
        .collect()
}

#[test]
fn ignored_files_never_appear() {
    let temp = tempdir().unwrap();
    sample_repo(temp.path());

    let analysis = analyze(temp.path(), &EngineConfig::default()).unwrap();
    let content = &analysis.content;

    assert!(content.contains("# REPO OVERVIEW"));
    assert!(content.contains("# LANGUAGE OVERVIEW"));
    assert!(content.contains("# REPO TREE"));
    assert!(content.contains("# FILE CONTENTS"));
    assert!(content.contains("===== FILE START: README.md ====="));
    assert!(content.contains("===== FILE START: main.py ====="));
    assert!(content.contains("def main():"));
    assert!(!content.contains("debug.log"));
    assert!(!analysis.truncated);

    assert_eq!(analysis.metadata.file_count, 3);
    assert!(analysis.metadata.languages.contains_key("python"));
    assert!(analysis.metadata.languages.contains_key("markdown"));
    assert!(
        analysis
            .metadata
            .key_files
            .iter()
            .any(|key| key.path == "README.md")
    );
}

#[test]
fn sections_appear_in_order_and_files_are_sorted() {
    let temp = tempdir().unwrap();
    sample_repo(temp.path());
    write_file(&temp.path().join("src/util.py"), "X = 1\n");
    write_file(&temp.path().join("src/app.py"), "Y = 2\n");

    let content = analyze(temp.path(), &EngineConfig::default())
        .unwrap()
        .content;
    let overview = content.find("# REPO OVERVIEW").unwrap();
    let languages = content.find("# LANGUAGE OVERVIEW").unwrap();
    let tree = content.find("# REPO TREE").unwrap();
    let files = content.find("# FILE CONTENTS").unwrap();
    assert!(overview < languages && languages < tree && tree < files);

    let sections = file_sections(&content);
    let mut sorted = sections.clone();
    sorted.sort();
    assert_eq!(sections, sorted);
    assert_eq!(
        sections,
        vec![".gitignore", "README.md", "main.py", "src/app.py", "src/util.py"]
    );
}

#[test]
fn repeated_runs_are_identical() {
    let temp = tempdir().unwrap();
    sample_repo(temp.path());
    write_file(&temp.path().join("lib/a.rs"), "pub fn a() {}\n");

    let config = EngineConfig::default();
    let first = analyze(temp.path(), &config).unwrap();
    let second = analyze(temp.path(), &config).unwrap();
    assert_eq!(first.content, second.content);
    assert_eq!(first.metadata, second.metadata);
}

#[test]
fn oversized_file_is_listed_without_content() {
    let temp = tempdir().unwrap();
    let body = "y".repeat(10_000);
    write_file(&temp.path().join("big.txt"), &body);
    write_file(&temp.path().join("small.txt"), "ok\n");

    let mut config = EngineConfig::default();
    config.render.max_file_bytes = 5000;
    let content = analyze(temp.path(), &config).unwrap().content;

    assert!(content.contains("===== FILE START: big.txt ====="));
    assert!(content.contains("[FILE TOO LARGE: 10000 bytes exceeds limit of 5000 bytes"));
    assert!(!content.contains(&body));
    assert!(content.contains("===== FILE START: small.txt ====="));
}

#[test]
fn extension_filter_keeps_other_files_in_tree_only() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("app.py"), "print(1)\n");
    write_file(&temp.path().join("web/index.js"), "console.log(1)\n");

    let mut config = EngineConfig::default();
    config.render.extensions.insert("py".to_string());
    let analysis = analyze(temp.path(), &config).unwrap();

    assert_eq!(file_sections(&analysis.content), vec!["app.py"]);
    let tree_start = analysis.content.find("# REPO TREE").unwrap();
    let tree_end = analysis.content.find("# FILE CONTENTS").unwrap();
    let tree = &analysis.content[tree_start..tree_end];
    assert!(tree.contains("web/"));
    assert!(tree.contains("  index.js"));
    assert_eq!(analysis.metadata.file_count, 1);
}

#[test]
fn chunked_file_with_continuous_line_numbers() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("five.py"), "l1\nl2\nl3\nl4\nl5\n");

    let mut config = EngineConfig::default();
    config.render.chunk_lines = 2;
    config.render.line_numbers = true;
    let content = analyze(temp.path(), &config).unwrap().content;

    assert_eq!(content.matches("```python:five.py").count(), 3);
    assert!(content.contains("- Chunks: 3"));
    assert!(content.contains("#### Chunk 3/3 (lines 5-5)"));
    for n in 1..=5 {
        assert!(content.contains(&format!("{:>6} | l{}", n, n)));
    }
}

#[test]
fn compressed_output_is_structure_only() {
    let temp = tempdir().unwrap();
    sample_repo(temp.path());

    let full = analyze(temp.path(), &EngineConfig::default())
        .unwrap()
        .content;
    let mut config = EngineConfig::default();
    config.render.compress = true;
    let compressed = analyze(temp.path(), &config).unwrap().content;

    assert!(full.contains("===== FILE START:"));
    assert!(!compressed.contains("===== FILE START:"));
    assert!(compressed.contains("# FILE LIST"));
    assert!(compressed.contains("- `main.py` | python | source |"));
    assert!(!compressed.contains("print('hi')"));
    assert!(compressed.len() < full.len());
}

#[test]
fn output_ceiling_truncates_with_notice() {
    let temp = tempdir().unwrap();
    sample_repo(temp.path());

    let mut config = EngineConfig::default();
    config.render.max_output_bytes = 100;
    let analysis = analyze(temp.path(), &config).unwrap();

    assert!(analysis.truncated);
    assert!(analysis.content.ends_with(&truncation_notice(100)));
    assert!(analysis.content.len() <= 100 + truncation_notice(100).len());
}

#[test]
fn json_output_parses_and_matches_markdown_file_set() {
    let temp = tempdir().unwrap();
    sample_repo(temp.path());

    let markdown = analyze(temp.path(), &EngineConfig::default())
        .unwrap()
        .content;
    let mut config = EngineConfig::default();
    config.render.format = OutputFormat::Json;
    let json: Value = serde_json::from_str(&analyze(temp.path(), &config).unwrap().content).unwrap();

    let paths: Vec<&str> = json["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|file| file["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, file_sections(&markdown));
    assert_eq!(json["stats"]["files"], 3);
    assert!(json["languages"]["python"]["files"].as_u64().unwrap() >= 1);
    assert!(json["files"][2]["content"].as_str().unwrap().contains("def main"));
}

#[test]
fn gitignore_can_be_disabled() {
    let temp = tempdir().unwrap();
    sample_repo(temp.path());

    let mut config = EngineConfig::default();
    config.use_gitignore = false;
    config.exclude.push("README.md".to_string());
    let content = analyze(temp.path(), &config).unwrap().content;

    assert!(content.contains("===== FILE START: debug.log ====="));
    assert!(!content.contains("README.md"));
}

#[test]
fn nested_entrypoint_scenario_reports_roles() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("README.md"), "# Hi\n");
    write_file(
        &temp.path().join("src/main.py"),
        "import sys\n\nprint(sys.argv)\n",
    );
    write_file(&temp.path().join(".gitignore"), "*.log\n");
    write_file(&temp.path().join("debug.log"), "trace\n");

    let mut config = EngineConfig::default();
    config.render.format = OutputFormat::Json;
    let analysis = analyze(temp.path(), &config).unwrap();
    assert!(!analysis.content.contains("debug.log"));

    let json: Value = serde_json::from_str(&analysis.content).unwrap();
    let files = json["files"].as_array().unwrap();
    let find = |path: &str| {
        files
            .iter()
            .find(|file| file["path"] == path)
            .cloned()
            .unwrap()
    };
    assert_eq!(find("README.md")["role"], "docs");
    let main = find("src/main.py");
    assert_eq!(main["role"], "source");
    assert_eq!(main["is_entry"], true);
    assert_eq!(json["tree"][2]["name"], "src");
    assert_eq!(json["tree"][2]["children"][0]["name"], "main.py");
}

#[cfg(unix)]
#[test]
fn linked_directory_is_a_tree_entry_not_a_file() {
    let temp = tempdir().unwrap();
    write_file(&temp.path().join("real/a.py"), "A = 1\n");
    std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("link")).unwrap();

    let analysis = analyze(temp.path(), &EngineConfig::default()).unwrap();
    assert_eq!(analysis.metadata.file_count, 1);
    assert_eq!(analysis.metadata.dir_count, 2);
    assert_eq!(analysis.metadata.total_bytes, 6);
    assert_eq!(file_sections(&analysis.content), vec!["real/a.py"]);
    assert!(!analysis.content.contains("[ERROR READING FILE"));
    assert!(analysis.content.contains("\nlink/\n"));
}
