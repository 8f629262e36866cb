// ABOUTME: This module handles output formatting for the bgfade harness
// ABOUTME: It renders composition steps and reports as colored tables or JSON

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::constants::ui;
use crate::session::{ChangeReport, CompositionStep, InitialReport};

pub trait OutputFormat {
    fn format_steps(&self, steps: &[CompositionStep]) -> Result<String>;
    fn format_initial(&self, report: &InitialReport) -> Result<String>;
    fn format_change(&self, report: &ChangeReport) -> Result<String>;
}

pub struct TableFormatter {
    use_color: bool,
}

impl TableFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn truncate_value(value: &str, max_len: usize) -> String {
        if value.chars().count() <= max_len {
            value.to_string()
        } else {
            let kept: String = value.chars().take(max_len - 3).collect();
            format!("{}...", kept)
        }
    }

    fn format_flag(&self, flag: bool) -> String {
        let text = if flag { "yes" } else { "no" };
        if !self.use_color {
            text.to_string()
        } else if flag {
            text.green().to_string()
        } else {
            text.dimmed().to_string()
        }
    }

    fn format_value(&self, value: &str) -> String {
        if value.is_empty() {
            let text = "(none)";
            return if self.use_color {
                text.dimmed().to_string()
            } else {
                text.to_string()
            };
        }
        Self::truncate_value(value, ui::MAX_VALUE_WIDTH)
    }
}

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Loaded")]
    loaded: String,
    #[tabled(rename = "Visible")]
    visible: String,
    #[tabled(rename = "State")]
    state: u32,
    #[tabled(rename = "Opacity")]
    opacity: u8,
    #[tabled(rename = "Value")]
    value: String,
}

impl OutputFormat for TableFormatter {
    fn format_steps(&self, steps: &[CompositionStep]) -> Result<String> {
        let rows: Vec<StepRow> = steps
            .iter()
            .map(|step| StepRow {
                event: step.event.clone(),
                loaded: self.format_flag(step.has_loaded),
                visible: self.format_flag(step.is_visible),
                state: step.image_state,
                opacity: step.after_opacity,
                value: self.format_value(&step.next_value),
            })
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::psql());
        Ok(table.to_string())
    }

    fn format_initial(&self, report: &InitialReport) -> Result<String> {
        if report.css.is_empty() {
            return Ok(self.format_value(&report.css));
        }
        Ok(report.css.clone())
    }

    fn format_change(&self, report: &ChangeReport) -> Result<String> {
        let verdict = match (report.changed, self.use_color) {
            (true, true) => "changed".yellow().bold().to_string(),
            (true, false) => "changed".to_string(),
            (false, true) => "unchanged".green().to_string(),
            (false, false) => "unchanged".to_string(),
        };
        Ok(format!(
            "{} ({} -> {} layers)",
            verdict, report.previous_layers, report.next_layers
        ))
    }
}

pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormat for JsonFormatter {
    fn format_steps(&self, steps: &[CompositionStep]) -> Result<String> {
        self.render(steps)
    }

    fn format_initial(&self, report: &InitialReport) -> Result<String> {
        self.render(report)
    }

    fn format_change(&self, report: &ChangeReport) -> Result<String> {
        self.render(report)
    }
}
