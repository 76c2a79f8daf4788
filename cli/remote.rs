use log;
use repodigest_core::{AppError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{self, Command};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Exit status after SIGINT/SIGTERM, following the shell convention.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Clone directory the interrupt handler removes before exiting. Shared
/// between the handler and the [`ClonedRepo`] currently alive; empty when no
/// clone exists.
#[derive(Debug, Clone, Default)]
pub struct InterruptCleanup {
    pending: Arc<Mutex<Option<PathBuf>>>,
}

impl InterruptCleanup {
    /// Installs the Ctrl+C / termination handler. Call once per process.
    pub fn install() -> Result<Self> {
        let cleanup = Self::default();
        let handler_cleanup = cleanup.clone();
        ctrlc::set_handler(move || {
            if let Some(path) = handler_cleanup.remove_pending() {
                log::warn!("Interrupted; removed clone directory {}", path.display());
            }
            process::exit(INTERRUPTED_EXIT_CODE);
        })
        .map_err(|e| AppError::Clone(format!("failed to install interrupt handler: {}", e)))?;
        log::debug!("Interrupt handler installed for clone cleanup.");
        Ok(cleanup)
    }

    fn register(&self, path: &Path) {
        if let Ok(mut pending) = self.pending.lock() {
            *pending = Some(path.to_path_buf());
        }
    }

    fn release(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.take();
        }
    }

    #[cfg(test)]
    fn pending(&self) -> Option<PathBuf> {
        self.pending.lock().ok().and_then(|pending| pending.clone())
    }

    /// Deletes the registered directory, if any, and returns its path.
    pub fn remove_pending(&self) -> Option<PathBuf> {
        let path = self.pending.lock().ok()?.take()?;
        if let Err(e) = fs::remove_dir_all(&path) {
            log::warn!("Could not remove {}: {}", path.display(), e);
        }
        Some(path)
    }
}

/// A shallow clone that lives exactly as long as this value. The temporary
/// directory is removed on drop, or by the interrupt handler if the process
/// is stopped first.
#[derive(Debug)]
pub struct ClonedRepo {
    dir: TempDir,
    checkout: PathBuf,
    cleanup: InterruptCleanup,
}

impl ClonedRepo {
    pub fn path(&self) -> &Path {
        &self.checkout
    }
}

impl Drop for ClonedRepo {
    fn drop(&mut self) {
        // TempDir removes the directory; the handler must not race it.
        self.cleanup.release();
        log::debug!("Removing clone directory {}", self.dir.path().display());
    }
}

/// `git clone --depth 1 --single-branch <url>` into a fresh temporary
/// directory under the system temp dir.
pub fn shallow_clone(url: &str, cleanup: &InterruptCleanup) -> Result<ClonedRepo> {
    shallow_clone_in(&std::env::temp_dir(), url, cleanup)
}

pub fn shallow_clone_in(
    parent: &Path,
    url: &str,
    cleanup: &InterruptCleanup,
) -> Result<ClonedRepo> {
    if url.trim().is_empty() {
        return Err(AppError::Clone("remote URL is empty".to_string()));
    }
    let dir = tempfile::Builder::new()
        .prefix("repodigest-")
        .tempdir_in(parent)
        .map_err(|e| AppError::Clone(format!("could not create temporary directory: {}", e)))?;
    let repo = ClonedRepo {
        checkout: dir.path().join("repo"),
        dir,
        cleanup: cleanup.clone(),
    };
    cleanup.register(repo.dir.path());
    log::info!("Cloning {} into {}", url, repo.checkout.display());

    // On any early return `repo` drops and takes the directory with it.
    let output = Command::new("git")
        .arg("clone")
        .arg("--depth")
        .arg("1")
        .arg("--single-branch")
        .arg("--quiet")
        .arg(url)
        .arg(&repo.checkout)
        .output()
        .map_err(|e| AppError::Clone(format!("failed to run git: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AppError::Clone(format!(
            "git clone of '{}' failed: {}",
            url,
            stderr.trim()
        )));
    }
    log::debug!("Clone complete: {}", repo.checkout.display());
    Ok(repo)
}
