//! Offline cache manifest for the service worker
//!
//! After a build, the public directory is scanned for the app shell (top
//! level pages) and the static assets under `_app/`. Both lists are baked
//! into `service-worker.js` ahead of a generic caching worker.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Directory static assets are copied to inside the public directory
pub const APP_DIR: &str = "_app";

/// File name of the generated worker
pub const WORKER_FILE: &str = "service-worker.js";

const WORKER_BODY: &str = include_str!("service-worker.js");

/// Paths the worker pre-caches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfflineManifest {
    /// Build time in milliseconds, used to version the caches
    pub timestamp: i64,
    /// Static assets under `_app/`
    pub files: Vec<String>,
    /// App shell pages
    pub shell: Vec<String>,
}

impl OfflineManifest {
    /// Scan a finished build; `root` is the site root ending with `/`
    pub fn scan(public_dir: &Path, root: &str) -> Result<Self> {
        let mut shell: Vec<String> = list_dir(public_dir)?
            .into_iter()
            .filter(|name| !name.starts_with('.') && name != APP_DIR && name != WORKER_FILE)
            .map(|name| format!("{}{}", root, name))
            .collect();
        shell.sort();
        shell.insert(0, root.to_string());

        let app_dir = public_dir.join(APP_DIR);
        let mut files: Vec<String> = if app_dir.is_dir() {
            list_dir(&app_dir)?
                .into_iter()
                .filter(|name| !name.ends_with(".map"))
                .map(|name| format!("{}{}/{}", root, APP_DIR, name))
                .collect()
        } else {
            Vec::new()
        };
        files.sort();

        Ok(Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
            files,
            shell,
        })
    }

    /// The worker script with this manifest prepended
    pub fn render_script(&self) -> String {
        // Vec<String> always serializes
        let files = serde_json::to_string(&self.files).unwrap_or_else(|_| "[]".to_string());
        let shell = serde_json::to_string(&self.shell).unwrap_or_else(|_| "[]".to_string());
        format!(
            "const timestamp = {};\nconst files = {};\nconst shell = {};\n\n{}",
            self.timestamp, files, shell, WORKER_BODY
        )
    }

    /// Write `service-worker.js` into the public directory
    pub fn write(&self, public_dir: &Path) -> Result<PathBuf> {
        let path = public_dir.join(WORKER_FILE);
        fs::write(&path, self.render_script()).map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(
            "Wrote {:?} ({} shell paths, {} files)",
            path,
            self.shell.len(),
            self.files.len()
        );
        Ok(path)
    }
}

fn list_dir(dir: &Path) -> Result<Vec<String>> {
    let read_err = |source| Error::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}
