//! The reprocessing pipeline: walk, rewrite, copy.
//!
//! One [`Pipeline::run`] call is one "pass": every regular file under the
//! watch root is read, optionally expanded, and written under its base
//! name directly into the target directory (subdirectory structure is
//! flattened, matching how Prometheus-style config mounts are consumed).
//!
//! A pass never fails as a whole. Every per-file or per-entry problem is
//! logged and the walk moves on, so one unreadable file cannot block the
//! rest of the configuration from being refreshed.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};
use walkdir::WalkDir;

use crate::Settings;
use crate::expand;

/// Unix permission mode for written files: owner read-write, group/other read.
#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o644;

/// Sequential file-rewriting pipeline invoked by the coordinator on settle.
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Root directory to read configuration from.
    watch_path: PathBuf,
    /// Directory processed files are written into.
    target_path: PathBuf,
    /// Whether to substitute environment references in file contents.
    expand_vars: bool,
    /// Whether to write output at all.
    copy_files: bool,
}

impl Pipeline {
    /// Build a pipeline from the parsed settings.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            watch_path: settings.watch_path.clone(),
            target_path: settings.target_path.clone(),
            expand_vars: settings.expand_vars,
            copy_files: settings.copy_files,
        }
    }

    /// Run one complete pass over the watched tree.
    ///
    /// Errors are logged per file and never abort the walk; this method
    /// never propagates failure to the caller.
    pub fn run(&self) {
        debug!(path = %self.watch_path.display(), "processing changes");

        if self.copy_files
            && let Err(e) = fs::create_dir_all(&self.target_path)
        {
            error!(
                path = %self.target_path.display(),
                error = %e,
                "failed to create target directory, skipping pass"
            );
            return;
        }

        let entries = WalkDir::new(&self.watch_path)
            .follow_links(true)
            .into_iter();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    error!(error = %e, "error walking watched path");
                    continue;
                }
            };

            if entry.file_type().is_file() {
                self.process_file(entry.path());
            }
        }
    }

    /// Rewrite a single source file into the target directory.
    fn process_file(&self, path: &Path) {
        let contents = match fs::read(path) {
            Ok(contents) => contents,
            Err(e) => {
                error!(path = %path.display(), error = %e, "error reading file");
                return;
            }
        };

        let output = if self.expand_vars {
            match String::from_utf8(contents) {
                Ok(text) => expand::expand(&text).into_bytes(),
                Err(e) => {
                    // Expansion needs text; binary content is mirrored untouched.
                    debug!(path = %path.display(), "not valid UTF-8, copying verbatim");
                    e.into_bytes()
                }
            }
        } else {
            contents
        };

        if !self.copy_files {
            debug!(path = %path.display(), "copy-files disabled, skipping write");
            return;
        }

        let Some(file_name) = path.file_name() else {
            warn!(path = %path.display(), "file has no base name, skipping");
            return;
        };
        let target_file = self.target_path.join(file_name);

        debug!(path = %target_file.display(), "writing updated content");
        if let Err(e) = fs::write(&target_file, output) {
            error!(path = %target_file.display(), error = %e, "error writing file");
            return;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let perms = fs::Permissions::from_mode(OUTPUT_MODE);
            if let Err(e) = fs::set_permissions(&target_file, perms) {
                warn!(path = %target_file.display(), error = %e, "failed to set file mode");
            }
        }
    }
}
