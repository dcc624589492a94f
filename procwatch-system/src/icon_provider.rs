//! Icon lookup for new processes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use procwatch_domain::icons::{CustomIconMap, Icon, IconError, IconMappingFile, IconSource};
use procwatch_domain::ProcessDetails;
use tracing::{debug, trace, warn};

pub const THEME_ICON_EXTENSIONS: [&str; 2] = ["png", "svg"];

/// Source of icons for executables. May be slow; callers bound it with
/// [`resolve_with_timeout`].
#[async_trait]
pub trait IconProvider: Send + Sync {
    /// `Ok(None)` means the provider has no icon for this process.
    async fn resolve(&self, path: &str, process_name: &str) -> Result<Option<Icon>, IconError>;
}

/// Provider that never has an icon.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIconProvider;

#[async_trait]
impl IconProvider for NoIconProvider {
    async fn resolve(&self, _path: &str, _process_name: &str) -> Result<Option<Icon>, IconError> {
        Ok(None)
    }
}

/// Looks for `<name>.png` or `<name>.svg` in icon theme directories.
#[derive(Debug, Clone)]
pub struct ThemeIconProvider {
    dirs: Vec<PathBuf>,
}

impl ThemeIconProvider {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    fn candidate_names(path: &str, process_name: &str) -> Vec<String> {
        let stem = Path::new(path).file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let mut names = Vec::new();
        for name in [process_name, stem] {
            for variant in [name.to_string(), name.to_lowercase()] {
                if !variant.is_empty() && !names.contains(&variant) {
                    names.push(variant);
                }
            }
        }
        names
    }
}

#[async_trait]
impl IconProvider for ThemeIconProvider {
    async fn resolve(&self, path: &str, process_name: &str) -> Result<Option<Icon>, IconError> {
        for name in Self::candidate_names(path, process_name) {
            for dir in &self.dirs {
                for ext in THEME_ICON_EXTENSIONS {
                    let candidate = dir.join(format!("{}.{}", name, ext));
                    match tokio::fs::read(&candidate).await {
                        Ok(data) => {
                            trace!("Theme icon for '{}' found at {:?}", path, candidate);
                            return Ok(Some(Icon::new(data, ext, IconSource::Provider)));
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                        Err(e) => {
                            return Err(IconError::Resolution {
                                key: path.to_string(),
                                reason: format!("cannot read {:?}: {}", candidate, e),
                            });
                        }
                    }
                }
            }
        }
        Ok(None)
    }
}

pub async fn resolve_with_timeout(
    provider: &dyn IconProvider,
    path: &str,
    process_name: &str,
    timeout: Duration,
) -> Result<Option<Icon>, IconError> {
    match tokio::time::timeout(timeout, provider.resolve(path, process_name)).await {
        Ok(result) => result,
        Err(_) => Err(IconError::Timeout { key: path.to_string(), timeout }),
    }
}

/// Custom mapping first, then the provider. Failures of either are logged
/// and end in `None`; the caller picks the fallback.
pub struct IconLookup {
    provider: Arc<dyn IconProvider>,
    mappings: IconMappingFile,
    timeout: Duration,
}

impl IconLookup {
    pub fn new(provider: Arc<dyn IconProvider>, mappings: IconMappingFile, timeout: Duration) -> Self {
        Self { provider, mappings, timeout }
    }

    pub async fn lookup(&self, custom: &CustomIconMap, process: &ProcessDetails) -> Option<Icon> {
        if let Some(icon_name) = custom.lookup(&process.path, &process.name) {
            match self.mappings.load_icon(icon_name).await {
                Ok(icon) => return Some(icon),
                Err(err) => warn!("Custom icon for '{}' unavailable: {}", process.path, err),
            }
        }
        match resolve_with_timeout(self.provider.as_ref(), &process.path, &process.name, self.timeout).await {
            Ok(icon) => icon,
            Err(err) => {
                debug!("Icon lookup for '{}' failed: {}", process.path, err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct SlowProvider;

    #[async_trait]
    impl IconProvider for SlowProvider {
        async fn resolve(&self, _path: &str, _process_name: &str) -> Result<Option<Icon>, IconError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }
    }

    fn process(name: &str, path: &str) -> ProcessDetails {
        ProcessDetails { pid: 1, name: name.into(), path: path.into(), elevated: false }
    }

    #[test]
    fn test_candidate_names_are_deduplicated() {
        assert_eq!(
            ThemeIconProvider::candidate_names("/usr/bin/Gimp-2.10", "Gimp"),
            vec!["Gimp".to_string(), "gimp".to_string(), "Gimp-2".to_string(), "gimp-2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_theme_provider_searches_dirs_in_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        std::fs::write(second.path().join("htop.svg"), b"<svg/>").unwrap();
        let provider = ThemeIconProvider::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);

        let icon = provider.resolve("/usr/bin/htop", "htop").await.unwrap().unwrap();
        assert_eq!(icon.format, "svg");
        assert_eq!(icon.source, IconSource::Provider);
        assert!(provider.resolve("/usr/bin/none", "none").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_timeout_becomes_error() {
        let result = resolve_with_timeout(&SlowProvider, "/bin/slow", "slow", Duration::from_millis(10)).await;
        assert!(matches!(result, Err(IconError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_custom_mapping_wins_over_provider() {
        let dir = TempDir::new().unwrap();
        let icons = dir.path().join("icons");
        std::fs::create_dir_all(&icons).unwrap();
        std::fs::write(icons.join("shell.png"), [0x89, b'P', b'N', b'G']).unwrap();
        let theme = dir.path().join("theme");
        std::fs::create_dir_all(&theme).unwrap();
        std::fs::write(theme.join("bash.png"), b"theme").unwrap();

        let lookup = IconLookup::new(
            Arc::new(ThemeIconProvider::new(vec![theme])),
            IconMappingFile::new(dir.path().join("custom_icons.txt"), &icons),
            Duration::from_secs(1),
        );
        let custom = CustomIconMap::parse("bash,shell\n");

        let icon = lookup.lookup(&custom, &process("bash", "/bin/bash")).await.unwrap();
        assert_eq!(icon.source, IconSource::Custom { icon_name: "shell".into() });

        let icon = lookup.lookup(&CustomIconMap::default(), &process("bash", "/bin/bash")).await.unwrap();
        assert_eq!(icon.data, b"theme".to_vec());
    }

    #[tokio::test]
    async fn test_lookup_failure_yields_none() {
        let dir = TempDir::new().unwrap();
        let lookup = IconLookup::new(
            Arc::new(SlowProvider),
            IconMappingFile::new(dir.path().join("custom_icons.txt"), dir.path()),
            Duration::from_millis(10),
        );
        let custom = CustomIconMap::parse("app,missing\n");
        assert!(lookup.lookup(&custom, &process("app", "/bin/app")).await.is_none());
    }
}
