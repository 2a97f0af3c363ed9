//! pip's own configuration file (~/.pip/pip.conf)
//!
//! Only `global.index-url` is ever changed. Every other section and key is
//! carried through a rewrite in its original order, including indented
//! multi-line values such as a list of `extra-index-url`s. Comments are not
//! kept, the file is rewritten whole.

use anyhow::{Context, Result};
use ini::{Ini, ParseOption};
use std::path::Path;
use tracing::debug;

const GLOBAL_SECTION: &str = "global";
const INDEX_URL_KEY: &str = "index-url";

/// In-memory view of pip.conf
#[derive(Debug, Clone)]
pub struct PipConfig {
    ini: Ini,
}

impl Default for PipConfig {
    fn default() -> Self {
        Self { ini: Ini::new() }
    }
}

impl PipConfig {
    /// Parse pip.conf content
    ///
    /// Backslashes and quotes are taken literally, matching how pip reads
    /// the file (Windows paths and quoted values survive untouched).
    /// Indented lines continue the previous value.
    pub fn parse(content: &str) -> Result<Self> {
        let opt = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            enabled_indented_mutiline_value: true,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(content, opt).context("Malformed pip configuration")?;
        Ok(Self { ini })
    }

    /// Render the configuration back to text
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (section, props) in &self.ini {
            if section.is_none() && props.iter().next().is_none() {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            if let Some(name) = section {
                out.push_str(&format!("[{}]\n", name));
            }
            for (key, value) in props.iter() {
                push_entry(&mut out, key, value);
            }
        }
        out
    }

    /// Read pip.conf, returning an empty config if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "pip config missing, starting empty");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pip config: {:?}", path))?;

        Self::parse(&content).with_context(|| format!("Failed to parse pip config: {:?}", path))
    }

    /// Write pip.conf atomically, creating its directory if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create pip config directory: {:?}", parent))?;
        }

        let content = self.render();

        let temp_path = path.with_extension("conf.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("Failed to write temp pip config: {:?}", temp_path))?;

        std::fs::rename(&temp_path, path).with_context(|| {
            format!("Failed to rename pip config: {:?} -> {:?}", temp_path, path)
        })?;

        debug!(path = %path.display(), index_url = ?self.index_url(), "saved pip config");
        Ok(())
    }

    /// Value of `global.index-url`, if set
    pub fn index_url(&self) -> Option<&str> {
        self.get(GLOBAL_SECTION, INDEX_URL_KEY)
    }

    /// Set `global.index-url`, creating the `global` section if absent
    ///
    /// pip lowercases option names, so any spelling of the key is replaced
    /// rather than left next to the new one.
    pub fn set_index_url(&mut self, url: &str) {
        if let Some(props) = self.ini.section_mut(Some(GLOBAL_SECTION)) {
            let stale: Vec<String> = props
                .iter()
                .filter(|(key, _)| key.eq_ignore_ascii_case(INDEX_URL_KEY))
                .map(|(key, _)| key.to_string())
                .collect();
            for key in stale {
                while props.remove(&key).is_some() {}
            }
        }

        self.ini
            .with_section(Some(GLOBAL_SECTION))
            .set(INDEX_URL_KEY, url);
    }

    /// Look up any key in a named section, ignoring the key's case like pip
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.ini
            .section(Some(section))?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }
}

/// Write `key = value`, indenting continuation lines so pip reads them as
/// part of the same value
fn push_entry(out: &mut String, key: &str, value: &str) {
    let mut lines = value.lines();
    match lines.next().map(str::trim).unwrap_or("") {
        "" => out.push_str(&format!("{} =\n", key)),
        first => out.push_str(&format!("{} = {}\n", key, first)),
    }
    for line in lines.map(str::trim).filter(|line| !line.is_empty()) {
        out.push_str(&format!("    {}\n", line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_index_url_on_empty() {
        let mut config = PipConfig::default();
        assert!(config.index_url().is_none());

        config.set_index_url("https://test.com");
        assert_eq!(config.index_url(), Some("https://test.com"));

        let rendered = config.render();
        assert!(rendered.contains("[global]"));
        assert!(rendered.contains("index-url = https://test.com"));
    }

    #[test]
    fn test_other_keys_are_preserved() {
        let content = "\
[global]
timeout = 60
index-url = https://old.example/simple

[install]
trusted-host = old.example
";
        let mut config = PipConfig::parse(content).unwrap();
        config.set_index_url("https://new.example/simple");

        let reparsed = PipConfig::parse(&config.render()).unwrap();
        assert_eq!(reparsed.index_url(), Some("https://new.example/simple"));
        assert_eq!(reparsed.get("global", "timeout"), Some("60"));
        assert_eq!(reparsed.get("install", "trusted-host"), Some("old.example"));
    }

    #[test]
    fn test_backslashes_are_literal() {
        let content = "[global]\ncert = C:\\certs\\corp.pem\n";
        let config = PipConfig::parse(content).unwrap();
        assert_eq!(config.get("global", "cert"), Some("C:\\certs\\corp.pem"));
        assert!(config.render().contains("C:\\certs\\corp.pem"));
    }

    #[test]
    fn test_multiline_values_survive_rewrite() {
        let content = "\
[global]
extra-index-url =
    https://a.example/simple
    https://b.example/simple
timeout = 60
";
        let mut config = PipConfig::parse(content).unwrap();
        config.set_index_url("https://test.com");
        let rendered = config.render();
        assert!(rendered.contains("\n    https://b.example/simple\n"));

        let reparsed = PipConfig::parse(&rendered).unwrap();
        let extra: Vec<&str> = reparsed
            .get("global", "extra-index-url")
            .unwrap()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        assert_eq!(
            extra,
            vec!["https://a.example/simple", "https://b.example/simple"]
        );
        assert!(reparsed.get("global", "https").is_none());
        assert_eq!(reparsed.get("global", "timeout"), Some("60"));
        assert_eq!(reparsed.index_url(), Some("https://test.com"));
    }

    #[test]
    fn test_set_index_url_replaces_any_case() {
        let mut config = PipConfig::parse("[global]\nIndex-URL = https://old.example\n").unwrap();
        assert_eq!(config.index_url(), Some("https://old.example"));

        config.set_index_url("https://test.com");
        let rendered = config.render();
        assert!(!rendered.contains("Index-URL"));
        assert!(!rendered.contains("https://old.example"));
        assert_eq!(rendered.matches("index-url").count(), 1);
        assert_eq!(config.index_url(), Some("https://test.com"));
    }

    #[test]
    fn test_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let config = PipConfig::load(&temp_dir.path().join("pip.conf")).unwrap();
        assert!(config.index_url().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".pip").join("pip.conf");

        let mut config = PipConfig::default();
        config.set_index_url("https://mirror.example/simple");
        config.save(&path).unwrap();

        assert!(!path.with_extension("conf.tmp").exists());
        let loaded = PipConfig::load(&path).unwrap();
        assert_eq!(loaded.index_url(), Some("https://mirror.example/simple"));
    }
}
