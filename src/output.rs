//! Output formatting for scan results

use crate::error::{Error, Result};
use crate::registry::{self, ClaimStatus};
use crate::report::{Report, SiteInventory};
use colored::Colorize;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL,
};
use std::io::Write;
use std::path::Path;

/// Width of the rule drawn between report entries
const RULE_WIDTH: usize = 50;

/// Render the vulnerability report as console output
pub fn render_report<W: Write>(report: &Report, writer: &mut W) -> Result<()> {
    write_report(report, writer).map_err(Error::OutputFailed)
}

fn write_report<W: Write>(report: &Report, writer: &mut W) -> std::io::Result<()> {
    if report.is_empty() {
        writeln!(
            writer,
            "{} Scan finished. No unclaimed plugin slugs were found.",
            "[+]".green()
        )?;
        return Ok(());
    }

    writeln!(writer, "{}", "[!!!] VULNERABILITIES FOUND [!!!]".red().bold())?;
    writeln!(writer, "{}", "-".repeat(RULE_WIDTH))?;
    for entry in &report.sites {
        writeln!(writer, "{} {}", "Vulnerable Site:".yellow(), entry.site)?;
        for slug in &entry.unclaimed_plugins {
            writeln!(writer, "    {} {}", "-> Unclaimed Plugin:".red(), slug)?;
            writeln!(
                writer,
                "       {} {}",
                "Claim URL:".blue(),
                registry::claim_url(slug)
            )?;
        }
        writeln!(writer, "{}", "-".repeat(RULE_WIDTH))?;
    }
    Ok(())
}

/// Render the verbose per-site plugin inventory as a table
pub fn render_inventory<W: Write>(inventories: &[SiteInventory], writer: &mut W) -> Result<()> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Site").add_attribute(Attribute::Bold),
            Cell::new("Plugin").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    for inventory in inventories {
        if inventory.plugins.is_empty() {
            // Placeholder row so the site still shows up
            table.add_row(vec![
                Cell::new(&inventory.site),
                Cell::new("-"),
                Cell::new("-").set_alignment(CellAlignment::Center),
            ]);
            continue;
        }
        for plugin in &inventory.plugins {
            table.add_row(vec![
                Cell::new(&inventory.site),
                Cell::new(&plugin.slug),
                status_cell(plugin.status),
            ]);
        }
    }

    writeln!(writer, "{}", table).map_err(Error::OutputFailed)
}

/// Status cell with the color matching the severity
fn status_cell(status: ClaimStatus) -> Cell {
    let cell = Cell::new(status.to_string().to_uppercase()).set_alignment(CellAlignment::Center);
    match status {
        ClaimStatus::Unclaimed => cell.fg(Color::Red),
        ClaimStatus::Claimed => cell.fg(Color::Green),
        ClaimStatus::Error => cell.fg(Color::Yellow),
    }
}

/// Render the report as JSON
pub fn render_json<W: Write>(report: &Report, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, report)?;
    writeln!(writer).map_err(Error::OutputFailed)?;
    Ok(())
}

/// Save the report as a JSON file
pub fn write_json_report(report: &Report, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(Error::OutputFailed)?;
    let mut writer = std::io::BufWriter::new(file);
    render_json(report, &mut writer)?;
    writer.flush().map_err(Error::OutputFailed)
}
