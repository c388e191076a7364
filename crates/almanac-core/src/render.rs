use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::category::WindowPreview;
use crate::config::Config;
use crate::resolver::Activation;
use crate::snapshot::ScheduleSnapshot;
use crate::templates::Template;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self {
            color: color && io::stdout().is_terminal(),
        })
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip_all)]
    pub fn print_status<W: Write>(
        &self,
        out: &mut W,
        snapshot: &ScheduleSnapshot,
    ) -> anyhow::Result<()> {
        let headers = vec![
            "ID".to_string(),
            "Name".to_string(),
            "Status".to_string(),
            "Window".to_string(),
            "Priority".to_string(),
            "Warnings".to_string(),
        ];

        let rows = snapshot
            .entries()
            .iter()
            .map(|entry| {
                let priority = if entry.seasonal {
                    entry.priority.to_string()
                } else {
                    "-".to_string()
                };
                let warnings = if entry.warnings.is_empty() {
                    String::new()
                } else {
                    self.paint(&entry.warnings.len().to_string(), "33")
                };
                vec![
                    self.paint(&entry.id.to_string(), "33"),
                    entry.name.clone(),
                    self.paint(entry.status, status_color(entry.activation)),
                    entry.label.clone(),
                    priority,
                    warnings,
                ]
            })
            .collect();

        write_table(&mut *out, headers, rows)?;
        writeln!(out)?;
        writeln!(out, "{}", snapshot.summary())?;
        writeln!(
            out,
            "as of {} (reference year {})",
            snapshot.as_of(),
            snapshot.reference_year()
        )?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn print_check<W: Write>(
        &self,
        out: &mut W,
        snapshot: &ScheduleSnapshot,
    ) -> anyhow::Result<()> {
        if snapshot.warning_count() == 0 {
            writeln!(out, "no issues found")?;
            return Ok(());
        }

        for entry in snapshot.entries() {
            for warning in &entry.warnings {
                writeln!(
                    out,
                    "{} {}: {}",
                    self.paint(&entry.id.to_string(), "33"),
                    entry.name,
                    warning
                )?;
            }
        }
        Ok(())
    }

    pub fn print_preview<W: Write>(
        &self,
        out: &mut W,
        preview: &WindowPreview,
    ) -> anyhow::Result<()> {
        writeln!(out, "range          {}", preview.label)?;
        writeln!(
            out,
            "stored as      {} .. {}",
            preview.window.start, preview.window.end
        )?;
        writeln!(
            out,
            "spans new year {}",
            if preview.spans_new_year { "yes" } else { "no" }
        )?;
        let in_season = if preview.in_season {
            self.paint("yes", "32")
        } else {
            self.paint("no", "31")
        };
        writeln!(out, "in season      {in_season}")?;
        for warning in &preview.warnings {
            writeln!(out, "{} {warning}", self.paint("warning:", "33"))?;
        }
        Ok(())
    }

    pub fn print_templates<W: Write>(
        &self,
        out: &mut W,
        snapshot: &ScheduleSnapshot,
        templates: &[&Template],
    ) -> anyhow::Result<()> {
        let headers = vec![
            "ID".to_string(),
            "Template".to_string(),
            "Category".to_string(),
        ];
        let rows = templates
            .iter()
            .map(|template| {
                let category = snapshot
                    .entry(template.category_id)
                    .map(|entry| entry.name.clone())
                    .unwrap_or_default();
                vec![
                    self.paint(&template.id.to_string(), "33"),
                    template.name.clone(),
                    category,
                ]
            })
            .collect();
        write_table(&mut *out, headers, rows)?;
        writeln!(out)?;
        writeln!(out, "{} templates visible", templates.len())?;
        Ok(())
    }

    pub fn print_json<W: Write, T: Serialize>(&self, out: &mut W, value: &T) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut *out, value)?;
        writeln!(out)?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn status_color(activation: Activation) -> &'static str {
    match activation {
        Activation::AlwaysOn | Activation::InSeason => "32",
        Activation::OutOfSeason => "33",
        Activation::Disabled | Activation::Unresolvable => "31",
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| format!("{header:width$}"))
        .collect();
    writeln!(writer, "{}", header_line.join(" ").trim_end())?;

    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    writeln!(writer, "{}", rule.join(" "))?;

    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
                format!("{cell}{}", " ".repeat(width.saturating_sub(visible_width)))
            })
            .collect();
        writeln!(writer, "{}", cells.join(" ").trim_end())?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
