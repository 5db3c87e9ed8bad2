use std::path::PathBuf;

use serde::Deserialize;

use crate::storage::AttachedDirectory;

/// Application configuration loaded from file and/or environment.
///
/// Replaces the original ambient framework configuration: base URLs for
/// the frontend, static host, and CDN, plus the folder roots backing the
/// two attached-directory trees.
#[derive(Debug, Clone)]
pub struct Config {
    pub frontend_url: String,
    pub static_url: String,
    pub cdn_url: String,
    pub http_port: u16,
    pub database_path: PathBuf,
    pub folders: Folders,
    pub compiler: CompilerConfig,
}

#[derive(Debug, Clone)]
pub struct Folders {
    pub images_base_dir: PathBuf,
    pub images_webroot: String,
    pub recordings_base_dir: PathBuf,
    pub recordings_webroot: String,
}

/// External static-site compiler commands. Both optional; when unset the
/// server runs with the no-op compiler (test/CI mode).
#[derive(Debug, Clone, Default)]
pub struct CompilerConfig {
    pub full_command: Option<PathBuf>,
    pub fast_command: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct FoldersFile {
    images_base_dir: Option<PathBuf>,
    images_webroot: Option<String>,
    recordings_base_dir: Option<PathBuf>,
    recordings_webroot: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct CompilerFile {
    full_command: Option<PathBuf>,
    fast_command: Option<PathBuf>,
}

/// Raw TOML file structure for `~/.config/mediahub/config.toml`.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    frontend_url: Option<String>,
    static_url: Option<String>,
    cdn_url: Option<String>,
    http_port: Option<u16>,
    database_path: Option<PathBuf>,
    folders: Option<FoldersFile>,
    compiler: Option<CompilerFile>,
}

/// Default config file location.
fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .expect("could not determine config directory")
        .join("mediahub")
        .join("config.toml")
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .expect("could not determine local data directory")
        .join("mediahub")
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Priority: environment variables override file values, file values
    /// override defaults. File path can be overridden by `config_path`.
    pub fn load(config_path: Option<&PathBuf>) -> std::io::Result<Self> {
        let path = config_path.cloned().unwrap_or_else(default_config_path);

        let file_config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str::<ConfigFile>(&content).map_err(|e| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("failed to parse config {}: {}", path.display(), e),
                )
            })?
        } else {
            ConfigFile::default()
        };

        Ok(Self::from_file_and_env(file_config))
    }

    /// Build config from parsed file values and current environment.
    fn from_file_and_env(file_config: ConfigFile) -> Self {
        let ConfigFile {
            frontend_url,
            static_url,
            cdn_url,
            http_port,
            database_path,
            folders,
            compiler,
        } = file_config;
        let folders = folders.unwrap_or_default();
        let compiler = compiler.unwrap_or_default();

        let frontend_url = std::env::var("MEDIAHUB_FRONTEND_URL")
            .ok()
            .or(frontend_url);
        let static_url = std::env::var("MEDIAHUB_STATIC_URL").ok().or(static_url);
        let cdn_url = std::env::var("MEDIAHUB_CDN_URL").ok().or(cdn_url);
        let http_port = std::env::var("MEDIAHUB_HTTP_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .or(http_port);
        let database_path = std::env::var("MEDIAHUB_DATABASE_PATH")
            .ok()
            .map(PathBuf::from)
            .or(database_path);

        Self::build(
            frontend_url,
            static_url,
            cdn_url,
            http_port,
            database_path,
            folders,
            CompilerConfig {
                full_command: compiler.full_command,
                fast_command: compiler.fast_command,
            },
        )
    }

    /// Build config from resolved option values (after file + env merging).
    fn build(
        frontend_url: Option<String>,
        static_url: Option<String>,
        cdn_url: Option<String>,
        http_port: Option<u16>,
        database_path: Option<PathBuf>,
        folders: FoldersFile,
        compiler: CompilerConfig,
    ) -> Self {
        let data_dir = default_data_dir();
        let frontend_url =
            frontend_url.unwrap_or_else(|| "http://localhost:3200".to_string());
        let static_url = static_url.unwrap_or_else(|| frontend_url.clone());
        let cdn_url = cdn_url.unwrap_or_else(|| static_url.clone());

        Self {
            frontend_url,
            static_url,
            cdn_url,
            http_port: http_port.unwrap_or(3200),
            database_path: database_path.unwrap_or_else(|| data_dir.join("mediahub.db")),
            folders: Folders {
                images_base_dir: folders
                    .images_base_dir
                    .unwrap_or_else(|| data_dir.join("images")),
                images_webroot: folders
                    .images_webroot
                    .unwrap_or_else(|| "/static".to_string()),
                recordings_base_dir: folders
                    .recordings_base_dir
                    .unwrap_or_else(|| data_dir.join("recordings")),
                recordings_webroot: folders
                    .recordings_webroot
                    .unwrap_or_else(|| "/recordings".to_string()),
            },
            compiler,
        }
    }

    /// Attached-directory mapping for conference image folders, served
    /// from the static host.
    pub fn images_directory(&self) -> AttachedDirectory {
        AttachedDirectory::new(
            &self.folders.images_base_dir,
            &self.static_url,
            &self.folders.images_webroot,
        )
    }

    /// Attached-directory mapping for recording folders, served from the
    /// CDN.
    pub fn recordings_directory(&self) -> AttachedDirectory {
        AttachedDirectory::new(
            &self.folders.recordings_base_dir,
            &self.cdn_url,
            &self.folders.recordings_webroot,
        )
    }
}

/// Config rooted in a fresh temp directory, for testing. The TempDir
/// must be kept alive for the duration of the test.
#[cfg(test)]
pub fn test_config() -> (Config, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let base = dir.path().to_path_buf();
    let config = Config {
        frontend_url: "https://media.example.com".to_string(),
        static_url: "https://static.example.com".to_string(),
        cdn_url: "https://cdn.example.com".to_string(),
        http_port: 0,
        database_path: base.join("mediahub.db"),
        folders: Folders {
            images_base_dir: base.join("images"),
            images_webroot: "/static".to_string(),
            recordings_base_dir: base.join("recordings"),
            recordings_webroot: "/recordings".to_string(),
        },
        compiler: CompilerConfig::default(),
    };
    (config, dir)
}
