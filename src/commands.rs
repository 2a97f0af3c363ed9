//! Command handlers for the CLI.
//!
//! Each function here corresponds to one invocation in `main.rs`. Handlers
//! call into `crate::manager` and render the outcome through `crate::ui`.
//! Errors are returned untouched so `main` can print them and exit non-zero.

use anstyle::AnsiColor;
use anyhow::{Context, Result, bail};

use crate::doctor::run_doctor;
use crate::manager;
use crate::paths::Paths;
use crate::ui::Ui;

/// Switch to a named index, or toggle back to the previous one
pub fn activate(paths: &Paths, name: Option<&str>, ui: &Ui) -> Result<()> {
    let spinner = ui.spinner("Switching Python package index...");

    match manager::activate(paths, name) {
        Ok(activation) => {
            ui.spinner_finish_ok(
                &spinner,
                format!(
                    "Change Python package index to `{}` successful.",
                    activation.display_name()
                ),
            );
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e)
        }
    }
}

/// Register or update a named index
pub fn register(paths: &Paths, name: &str, index_url: &str, ui: &Ui) -> Result<()> {
    let name = manager::register(paths, name, index_url)?;
    ui.ok(format!(
        "Set Python package index with name `{}` successful.",
        name
    ));
    Ok(())
}

/// List all registered indexes
pub fn list(paths: &Paths, ui: &Ui, json: bool) -> Result<()> {
    let indexes = manager::list(paths)?;

    if json {
        let out = serde_json::to_string_pretty(&indexes).context("Failed to serialize indexes")?;
        ui.println(out);
        return Ok(());
    }

    if indexes.is_empty() {
        ui.warn("No indexes registered.");
        ui.newline();
        ui.println("Register one with:");
        ui.println(format!(
            "  {} set -n <name> -i <index-url>",
            ui.bold("chpip")
        ));
        return Ok(());
    }

    let mut table = ui.table();
    table.set_header(vec![
        ui.header_cell(""),
        ui.header_cell("Name"),
        ui.header_cell("Index URL"),
        ui.header_cell("Status"),
    ]);

    for index in &indexes {
        let (icon, status) = if index.is_current {
            (ui.icon_ok(), ui.colored_cell("active", AnsiColor::Green))
        } else {
            (" ", ui.cell("-"))
        };
        table.add_row(vec![
            ui.cell(icon),
            ui.cell(&index.name),
            ui.cell(&index.index_url),
            status,
        ]);
    }

    ui.section("Indexes");
    ui.println(table.to_string());
    Ok(())
}

/// Show the active index and what pip.conf holds
pub fn current(paths: &Paths, ui: &Ui) -> Result<()> {
    let status = manager::current(paths)?;

    ui.section("Current Index");
    ui.newline();

    let mut table = ui.simple_table();
    table.add_row(vec![ui.cell("Active index:"), ui.header_cell(&status.name)]);
    table.add_row(vec![
        ui.cell("Registered URL:"),
        match &status.index_url {
            Some(url) => ui.cell(url),
            None => ui.colored_cell("(not registered)", AnsiColor::Red),
        },
    ]);
    table.add_row(vec![
        ui.cell("pip index-url:"),
        match &status.configured_url {
            Some(url) => ui.cell(url),
            None => ui.cell(format!("(unset, pip uses {})", status.effective_url())),
        },
    ]);
    table.add_row(vec![
        ui.cell("Previous index:"),
        ui.cell(status.last_name.as_deref().unwrap_or("(none)")),
    ]);
    ui.println(table.to_string());

    if !status.in_sync() {
        ui.newline();
        ui.warn(format!(
            "pip.conf does not match `{}`. Run `chpip -n {}` to reapply it.",
            status.name, status.name
        ));
    }

    Ok(())
}

/// Run diagnostics; fails if any check found a problem
pub fn doctor(paths: &Paths, ui: &Ui) -> Result<()> {
    let report = run_doctor(paths, ui);
    if !report.is_healthy() {
        bail!("Doctor found issues in: {}", report.failed.join(", "));
    }
    ui.println(format!("{} {}", ui.icon_ok(), ui.dim("All checks passed")));
    Ok(())
}
