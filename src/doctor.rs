//! Diagnostic tool for chpip.
//!
//! This module implements the `chpip doctor` command, which checks:
//! - That the pip config directory exists.
//! - That the registry parses and its current/last pointers resolve.
//! - That pip.conf parses and agrees with the registry.
//! - That every stored index URL is usable.
//!
//! It reports issues to the user with a pass/fail/warn status.

use anstyle::AnsiColor;

use crate::manager::{self, validate_index_url};
use crate::paths::Paths;
use crate::pip_config::PipConfig;
use crate::registry::{DEFAULT_INDEX_NAME, Registry};
use crate::ui::Ui;

/// Result of a doctor run
#[derive(Debug, Default)]
pub struct DoctorReport {
    /// Names of the steps that found problems
    pub failed: Vec<&'static str>,
}

impl DoctorReport {
    pub fn is_healthy(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run the doctor diagnostics
pub fn run_doctor(paths: &Paths, ui: &Ui) -> DoctorReport {
    let mut report = DoctorReport::default();

    ui.section("chpip Doctor");
    ui.newline();

    // 1. Check directories
    check_step(ui, &mut report, "Directories", || {
        if paths.pip_dir.exists() {
            ui.println(format!(
                "  {} pip config directory exists: {}",
                ui.icon_ok(),
                paths.pip_dir.display()
            ));
        } else {
            ui.println(format!(
                "  {} pip config directory missing: {} (created on first `chpip set`)",
                ui.icon_warn(),
                paths.pip_dir.display()
            ));
        }
        true
    });

    let registry = Registry::load(&paths.registry_file);

    // 2. Check registry
    check_step(ui, &mut report, "Registry", || match &registry {
        Ok(registry) => {
            if paths.registry_file.exists() {
                ui.println(format!(
                    "  {} Registry readable ({} indexes)",
                    ui.icon_ok(),
                    registry.indexes.len()
                ));
            } else {
                ui.println(format!(
                    "  {} Registry file missing (fresh install?)",
                    ui.icon_warn()
                ));
            }

            let mut ok = true;
            for (label, pointer) in [
                ("Current", &registry.current_index_name),
                ("Last", &registry.last_index_name),
            ] {
                match pointer.as_deref() {
                    None => ui.println(format!("  {} {} index not set", ui.icon_info(), label)),
                    Some(name) if registry.contains(name) || name == DEFAULT_INDEX_NAME => {
                        ui.println(format!("  {} {} index: {}", ui.icon_ok(), label, name))
                    }
                    Some(name) => {
                        ui.println(format!(
                            "  {} {} index '{}' is not registered",
                            ui.icon_err(),
                            label,
                            name
                        ));
                        ok = false;
                    }
                }
            }
            ok
        }
        Err(e) => {
            ui.println(format!("  {} Registry corrupt: {:#}", ui.icon_err(), e));
            false
        }
    });

    // 3. Check pip.conf against the registry
    check_step(ui, &mut report, "pip Config", || {
        if let Err(e) = PipConfig::load(&paths.pip_conf) {
            ui.println(format!("  {} pip.conf unreadable: {:#}", ui.icon_err(), e));
            return false;
        }

        let status = match manager::current(paths) {
            Ok(status) => status,
            Err(_) => {
                ui.println(format!(
                    "  {} Skipped: registry could not be read",
                    ui.icon_warn()
                ));
                return true;
            }
        };

        match &status.configured_url {
            Some(url) => ui.println(format!("  {} index-url = {}", ui.icon_ok(), url)),
            None => ui.println(format!(
                "  {} index-url not set (pip uses {})",
                ui.icon_info(),
                status.effective_url()
            )),
        }

        if status.in_sync() {
            ui.println(format!(
                "  {} Matches active index '{}'",
                ui.icon_ok(),
                status.name
            ));
        } else {
            ui.println(format!(
                "  {} Does not match active index '{}' ({}); run `chpip -n {}` to reapply",
                ui.icon_warn(),
                status.name,
                status.index_url.as_deref().unwrap_or("?"),
                status.name
            ));
        }
        true
    });

    // 4. Check stored indexes
    check_step(ui, &mut report, "Indexes", || {
        let Ok(registry) = &registry else {
            ui.println(format!(
                "  {} Skipped: registry could not be read",
                ui.icon_warn()
            ));
            return true;
        };

        if registry.is_empty() {
            ui.println(format!("  {} No indexes registered", ui.icon_warn()));
            return true;
        }

        ui.println(format!("  Found {} indexes:", registry.indexes.len()));
        let mut all_valid = true;
        for (name, entry) in &registry.indexes {
            match validate_index_url(&entry.index_url) {
                Ok(()) => ui.println(format!("    {} {}", ui.icon_ok(), name)),
                Err(e) => {
                    ui.println(format!("    {} {} ({})", ui.icon_err(), name, e));
                    all_valid = false;
                }
            }
        }
        all_valid
    });

    report
}

fn check_step<F>(ui: &Ui, report: &mut DoctorReport, name: &'static str, check_fn: F)
where
    F: FnOnce() -> bool,
{
    ui.println(ui.bold(format!("Checking {}...", name)));
    if !check_fn() {
        ui.println(ui.colored("  Issues detected!", AnsiColor::Red));
        report.failed.push(name);
    }
    ui.newline();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_paths;
    use crate::ui::ColorMode;
    use std::fs;
    use tempfile::TempDir;

    fn test_ui() -> Ui {
        Ui::new(ColorMode::Never, false)
    }

    #[test]
    fn test_doctor_fresh_install_is_healthy() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);

        let report = run_doctor(&paths, &test_ui());
        assert!(report.is_healthy());
    }

    #[test]
    fn test_doctor_after_activation_is_healthy() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        manager::register(&paths, "corp", "https://pypi.corp.example/simple").unwrap();
        manager::activate(&paths, None).unwrap();

        let report = run_doctor(&paths, &test_ui());
        assert!(report.is_healthy());
    }

    #[test]
    fn test_doctor_corrupt_registry() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        paths.ensure_dirs().unwrap();
        fs::write(&paths.registry_file, "indexes: [[[").unwrap();

        let report = run_doctor(&paths, &test_ui());
        assert_eq!(report.failed, vec!["Registry"]);
    }

    #[test]
    fn test_doctor_dangling_pointer_and_bad_url() {
        let temp_dir = TempDir::new().unwrap();
        let paths = setup_test_paths(&temp_dir);
        paths.ensure_dirs().unwrap();
        fs::write(
            &paths.registry_file,
            "indexes:\n  t:\n    index_url: ftp://test.com\ncurrent_index_name: gone\n",
        )
        .unwrap();

        let report = run_doctor(&paths, &test_ui());
        assert_eq!(report.failed, vec!["Registry", "Indexes"]);
    }
}
