//! User-defined icon overrides.
//!
//! `custom_icons.txt` maps a process path or file name to an image in the
//! custom icon directory:
//!
//! ```text
//! # key,icon_name
//! "C:\Tools\app.exe","tools"
//! firefox,browser
//! ```
//!
//! Keys are matched case-insensitively with separators normalized; the full
//! path is tried before the file name.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use procwatch_core::error::CoreError;
use procwatch_core::utils::string_utils::{base_name, normalize_path_trimmed};

use super::errors::IconError;
use super::types::{Icon, IconSource};
use crate::fs_tasks;

/// Extensions tried, in order, for a mapped icon name.
pub const CUSTOM_ICON_EXTENSIONS: [&str; 3] = ["png", "svg", "ico"];

const MAPPING_HEADER: &str = "# Custom icon mappings: <process path or file name>,<icon file name without extension>\n";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomIconMap {
    entries: HashMap<String, String>,
}

fn unquote(field: &str) -> &str {
    field.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

impl CustomIconMap {
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, icon_name)) = line.split_once(',') else {
                log::warn!("Ignoring malformed icon mapping line: {}", line);
                continue;
            };
            let (key, icon_name) = (unquote(key), unquote(icon_name));
            if key.is_empty() || icon_name.is_empty() {
                log::warn!("Ignoring incomplete icon mapping line: {}", line);
                continue;
            }
            entries.insert(normalize_path_trimmed(key), icon_name.to_string());
        }
        Self { entries }
    }

    /// Icon name for a process, by full path first, then by file name.
    pub fn lookup(&self, path: &str, process_name: &str) -> Option<&str> {
        let key = normalize_path_trimmed(path);
        self.entries
            .get(&key)
            .or_else(|| self.entries.get(base_name(&key)))
            .or_else(|| self.entries.get(&normalize_path_trimmed(process_name)))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The mapping file plus the directory its icon names resolve in.
#[derive(Debug, Clone)]
pub struct IconMappingFile {
    path: PathBuf,
    icons_dir: PathBuf,
}

impl IconMappingFile {
    pub fn new(path: impl Into<PathBuf>, icons_dir: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), icons_dir: icons_dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn icons_dir(&self) -> &Path {
        &self.icons_dir
    }

    fn load_error(&self, source: CoreError) -> IconError {
        IconError::MappingLoad { path: self.path.clone(), source }
    }

    /// Reads the mapping file; a missing file is created with a header and
    /// yields an empty map.
    pub async fn load(&self) -> Result<CustomIconMap, IconError> {
        match fs_tasks::read_bytes(self.path.clone()).await {
            Ok(bytes) => Ok(CustomIconMap::parse(&String::from_utf8_lossy(&bytes))),
            Err(e) if e.is_not_found() => {
                let header = MAPPING_HEADER.as_bytes().to_vec();
                if let Err(err) = fs_tasks::write_bytes_atomically(self.path.clone(), header).await {
                    log::warn!("Could not create icon mapping file {:?}: {}", self.path, err);
                }
                Ok(CustomIconMap::default())
            }
            Err(e) => Err(self.load_error(e)),
        }
    }

    pub async fn modified(&self) -> Result<Option<SystemTime>, IconError> {
        fs_tasks::modified_time(self.path.clone()).await.map_err(|e| self.load_error(e))
    }

    /// Loads the image a mapping points at, probing [`CUSTOM_ICON_EXTENSIONS`].
    pub async fn load_icon(&self, icon_name: &str) -> Result<Icon, IconError> {
        for ext in CUSTOM_ICON_EXTENSIONS {
            let candidate = self.icons_dir.join(format!("{}.{}", icon_name, ext));
            match fs_tasks::read_bytes(candidate).await {
                Ok(data) => {
                    return Ok(Icon::new(data, ext, IconSource::Custom { icon_name: icon_name.to_string() }));
                }
                Err(e) if e.is_not_found() => continue,
                Err(e) => {
                    return Err(IconError::Resolution { key: icon_name.to_string(), reason: e.to_string() });
                }
            }
        }
        Err(IconError::Resolution {
            key: icon_name.to_string(),
            reason: format!("no image named '{}' in {:?}", icon_name, self.icons_dir),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_strips_quotes_and_lowercases_keys() {
        let map = CustomIconMap::parse("# c\n\"C:\\Tools\\App.exe\",\"tools\"\nFirefox , browser\nbroken line\n,x\n");
        assert_eq!(map.len(), 2);
        assert_eq!(map.lookup("c:/tools/app.exe", "app.exe"), Some("tools"));
        assert_eq!(map.lookup("/usr/lib/firefox/FIREFOX", "firefox"), Some("browser"));
    }

    #[test]
    fn test_lookup_prefers_full_path() {
        let map = CustomIconMap::parse("/opt/a/tool,specific\ntool,generic\n");
        assert_eq!(map.lookup("/opt/a/tool", "tool"), Some("specific"));
        assert_eq!(map.lookup("/opt/b/tool", "tool"), Some("generic"));
        assert_eq!(map.lookup("/opt/b/other", "other"), None);
    }

    #[tokio::test]
    async fn test_load_missing_file_creates_it() {
        let dir = TempDir::new().unwrap();
        let file = IconMappingFile::new(dir.path().join("custom_icons.txt"), dir.path().join("custom_icons"));
        assert!(file.load().await.unwrap().is_empty());
        assert!(file.modified().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_load_creates_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config/custom_icons.txt");
        let file = IconMappingFile::new(&path, dir.path().join("custom_icons"));
        assert!(file.load().await.unwrap().is_empty());
        assert!(tokio::fs::read_to_string(&path).await.unwrap().starts_with("# Custom icon mappings"));
    }

    #[tokio::test]
    async fn test_load_reports_unreadable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom_icons.txt");
        tokio::fs::create_dir_all(&path).await.unwrap();
        let file = IconMappingFile::new(&path, dir.path().join("custom_icons"));
        assert!(matches!(file.load().await, Err(IconError::MappingLoad { .. })));
    }

    #[tokio::test]
    async fn test_load_icon_tries_each_extension() {
        let dir = TempDir::new().unwrap();
        let icons_dir = dir.path().join("custom_icons");
        tokio::fs::create_dir_all(&icons_dir).await.unwrap();
        tokio::fs::write(icons_dir.join("browser.svg"), b"<svg/>").await.unwrap();
        let file = IconMappingFile::new(dir.path().join("custom_icons.txt"), &icons_dir);

        let icon = file.load_icon("browser").await.unwrap();
        assert_eq!(icon.format, "svg");
        assert_eq!(icon.source, IconSource::Custom { icon_name: "browser".to_string() });
        assert!(matches!(file.load_icon("missing").await, Err(IconError::Resolution { .. })));
    }
}
