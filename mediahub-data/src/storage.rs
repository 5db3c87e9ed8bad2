use std::fs;
use std::path::{Path, PathBuf};

/// A configured mapping from a record's stored relative path to an
/// absolute filesystem location and a public URL.
///
/// Replaces ambient framework configuration: each instance carries its
/// own base directory, URL root, and web path, so images and recordings
/// can live on different hosts (static host vs CDN).
#[derive(Debug, Clone)]
pub struct AttachedDirectory {
    base_dir: PathBuf,
    url_root: String,
    url_path: String,
}

impl AttachedDirectory {
    pub fn new(
        base_dir: impl Into<PathBuf>,
        url_root: impl Into<String>,
        url_path: impl Into<String>,
    ) -> Self {
        Self {
            base_dir: base_dir.into(),
            url_root: url_root.into(),
            url_path: url_path.into(),
        }
    }

    /// Absolute on-disk location for a record's relative path.
    pub fn absolute_path(&self, relative: &str) -> PathBuf {
        self.base_dir.join(relative.trim_start_matches('/'))
    }

    /// Public URL for a record's relative path.
    pub fn public_url(&self, relative: &str) -> String {
        join_url(&join_url(&self.url_root, &self.url_path), relative)
    }
}

/// Join two URL fragments with exactly one slash between them.
pub fn join_url(left: &str, right: &str) -> String {
    let left = left.trim_end_matches('/');
    let right = right.trim_start_matches('/');
    if right.is_empty() {
        left.to_string()
    } else {
        format!("{}/{}", left, right)
    }
}

/// Probe whether a directory is writable by creating and removing a
/// marker file. Matches effective-permission semantics rather than
/// inspecting mode bits.
pub fn dir_writable(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }
    let probe = path.join(format!(".mediahub-probe-{}", std::process::id()));
    match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe)
    {
        Ok(file) => {
            drop(file);
            let _ = fs::remove_file(&probe);
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => true,
        Err(_) => false,
    }
}
