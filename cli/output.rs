use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use colored::*;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL};
use repodigest_core::Metadata;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

pub fn write_output(content: &str, output_path: Option<&Path>, quiet: bool) -> Result<()> {
    match output_path {
        Some(path) => {
            write_to_file(path, content)?;
            if !quiet {
                eprintln!(
                    "{} Digest saved to: {}",
                    "✅".green(),
                    path.display().to_string().blue()
                );
            }
            Ok(())
        }
        None => write_to_stdout(content),
    }
}

fn write_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("Failed to create file {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to file {}", path.display()))?;
    Ok(())
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

pub fn readable_size(bytes: u64) -> String {
    Byte::from_u64(bytes)
        .get_appropriate_unit(UnitType::Binary)
        .to_string()
}

/// Language summary on stderr so stdout stays pipeable.
pub fn print_stats_table(metadata: &Metadata, truncated: bool) {
    eprintln!();
    eprintln!("{}", " Repository Summary ".green().bold().underline());
    eprintln!("{:<20} {}", "Root:".green(), metadata.root.cyan());
    eprintln!(
        "{:<20} {}",
        "Files:".green(),
        metadata.file_count.to_string().cyan()
    );
    eprintln!(
        "{:<20} {}",
        "Directories:".green(),
        metadata.dir_count.to_string().cyan()
    );
    eprintln!(
        "{:<20} {}",
        "Total Size:".green(),
        readable_size(metadata.total_bytes).cyan()
    );
    eprintln!(
        "{:<20} {}",
        "Approx. Tokens:".green(),
        metadata.approx_tokens.to_string().cyan()
    );
    if truncated {
        eprintln!("{}", "Output was truncated.".yellow());
    }

    if metadata.languages.is_empty() {
        eprintln!("\n{}", "(No files selected)".yellow());
    } else {
        eprintln!("\n{}", " Languages ".green().bold().underline());
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Language").fg(Color::Green),
            Cell::new("Files").fg(Color::Green),
            Cell::new("Size").fg(Color::Green),
            Cell::new("Entrypoints").fg(Color::Green),
        ]);
        for lang in metadata.languages.values() {
            table.add_row(vec![
                Cell::new(format!("{} ({})", lang.name, lang.language)).fg(Color::Cyan),
                Cell::new(lang.files).set_alignment(CellAlignment::Right),
                Cell::new(readable_size(lang.bytes))
                    .set_alignment(CellAlignment::Right)
                    .fg(Color::DarkGrey),
                Cell::new(lang.entrypoints.join("\n")),
            ]);
        }
        eprintln!("{table}");
    }
    eprintln!();
}
