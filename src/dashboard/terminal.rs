//! Plain-terminal rendering of a [`DashboardView`]

use std::fmt::{self, Write};

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use super::{ComparisonView, DashboardView, VisionPanelView, VoicePanelView};
use crate::core::{Role, VisionOutcome};

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: &'static str,
    #[tabled(rename = "Change")]
    delta: &'static str,
}

#[derive(Tabled)]
struct UsageRow {
    #[tabled(rename = "Provider")]
    provider: &'static str,
    #[tabled(rename = "Share")]
    share: String,
    #[tabled(rename = "")]
    bar: String,
}

#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Time")]
    elapsed: String,
    #[tabled(rename = "Response")]
    response: String,
}

fn on_off(value: bool) -> String {
    if value {
        "on".green().to_string()
    } else {
        "off".dimmed().to_string()
    }
}

/// Render every visible panel as terminal text
pub fn to_terminal(view: &DashboardView) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_dashboard(&mut out, view);
    out
}

fn write_dashboard(out: &mut String, view: &DashboardView) -> fmt::Result {
    writeln!(out, "{}", view.header.title.bold().cyan())?;
    writeln!(out, "{}\n", view.header.subtitle.dimmed())?;
    write_sidebar(out, view)?;
    write_chat(out, view)?;
    if let Some(voice) = &view.voice {
        write_voice(out, voice)?;
    }
    if let Some(vision) = &view.vision {
        write_vision(out, vision)?;
    }
    if let Some(comparison) = &view.comparison {
        write_comparison(out, comparison)?;
    }
    write_metrics(out, view)
}

fn write_sidebar(out: &mut String, view: &DashboardView) -> fmt::Result {
    writeln!(out, "{}", "=== AI PROVIDERS ===".bold().cyan())?;
    for provider in &view.sidebar.providers {
        let marker = if provider.selected { "●" } else { "○" };
        writeln!(out, "  {} {} {}", marker, provider.icon, provider.name)?;
    }
    let models: Vec<String> = view
        .sidebar
        .models
        .iter()
        .map(|m| {
            if m.selected {
                format!("[{}]", m.id).green().to_string()
            } else {
                m.id.clone()
            }
        })
        .collect();
    writeln!(out, "  Models: {}", models.join("  "))?;
    let toggles = &view.sidebar.toggles;
    writeln!(
        out,
        "  Voice: {}  Vision: {}  Multi-provider: {}",
        on_off(toggles.voice_enabled),
        on_off(toggles.vision_enabled),
        on_off(toggles.multi_provider_enabled)
    )?;
    writeln!(
        out,
        "  Temperature: {:.1}  Max tokens: {}\n",
        view.sidebar.temperature, view.sidebar.max_tokens
    )
}

fn write_chat(out: &mut String, view: &DashboardView) -> fmt::Result {
    writeln!(out, "{}", "=== AI CHAT ===".bold().cyan())?;
    if view.chat.is_empty() {
        writeln!(out, "  {}", "No messages yet".dimmed())?;
    }
    for entry in &view.chat {
        let who = match entry.role {
            Role::User => "You".bold().to_string(),
            Role::Assistant => "Assistant".bold().blue().to_string(),
        };
        let content = if entry.is_error {
            entry.content.yellow().to_string()
        } else {
            entry.content.clone()
        };
        writeln!(out, "  {}: {}", who, content)?;
        if let Some(caption) = &entry.caption {
            writeln!(out, "    {}", caption.dimmed())?;
        }
    }
    writeln!(out)
}

fn write_voice(out: &mut String, voice: &VoicePanelView) -> fmt::Result {
    writeln!(out, "{}", "=== VOICE CONTROLS ===".bold().cyan())?;
    let status = if voice.recording {
        "recording".red().to_string()
    } else {
        "idle".to_string()
    };
    writeln!(
        out,
        "  Status: {}  Speed: {:.1}  Pitch: {:.1}\n",
        status, voice.speed, voice.pitch
    )
}

fn write_vision(out: &mut String, vision: &VisionPanelView) -> fmt::Result {
    writeln!(out, "{}", "=== VISION ANALYSIS ===".bold().cyan())?;
    writeln!(out, "  Accepted: {}", vision.accepted_formats.join(", "))?;
    if let Some(upload) = &vision.last_upload {
        writeln!(out, "  Image: {} ({} bytes)", upload.name, upload.size_bytes)?;
    }
    match &vision.last_result {
        Some(VisionOutcome::Analysis(text)) => writeln!(out, "  {}", text)?,
        Some(VisionOutcome::Error(e)) => writeln!(out, "  {}", e.yellow())?,
        None => {}
    }
    writeln!(out)
}

fn write_comparison(out: &mut String, comparison: &ComparisonView) -> fmt::Result {
    writeln!(out, "{}", "=== MULTI-PROVIDER COMPARISON ===".bold().cyan())?;
    if let Some(prompt) = &comparison.prompt {
        writeln!(out, "  Prompt: {}", prompt)?;
    }
    if comparison.tabs.is_empty() {
        writeln!(out, "  {}", "No comparison yet".dimmed())?;
    } else {
        let rows: Vec<ComparisonRow> = comparison
            .tabs
            .iter()
            .map(|tab| ComparisonRow {
                provider: if comparison.fastest == Some(tab.provider) {
                    format!("{} {} (fastest)", tab.icon, tab.provider)
                } else {
                    format!("{} {}", tab.icon, tab.provider)
                },
                model: tab.model.clone(),
                elapsed: format!("{}ms", tab.elapsed_ms),
                response: match (&tab.response, &tab.error) {
                    (Some(text), _) => text.clone(),
                    (None, Some(e)) => format!("⚠️ {}", e),
                    (None, None) => String::new(),
                },
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        writeln!(out, "{}", table)?;
    }
    if let Some(consensus) = &comparison.consensus {
        writeln!(out, "  {}", consensus.cyan())?;
    }
    writeln!(out)
}

fn write_metrics(out: &mut String, view: &DashboardView) -> fmt::Result {
    writeln!(out, "{}", "=== REAL-TIME METRICS ===".bold().cyan())?;
    let rows: Vec<MetricRow> = view
        .metrics
        .iter()
        .map(|m| MetricRow {
            metric: m.label,
            value: m.value,
            delta: m.delta,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    writeln!(out, "{}\n", table)?;

    writeln!(out, "{}", "=== PROVIDER USAGE ===".bold().cyan())?;
    let rows: Vec<UsageRow> = view
        .usage_chart
        .iter()
        .map(|u| UsageRow {
            provider: u.provider,
            share: format!("{}%", u.share),
            bar: "█".repeat((u.share / 5) as usize),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    writeln!(out, "{}\n", table)?;

    writeln!(out, "{}", "=== RESPONSE TIMES (s) ===".bold().cyan())?;
    writeln!(out, "  {:<10} {}", "", view.response_times.times.join("  "))?;
    for series in &view.response_times.series {
        let values: Vec<String> = series.values.iter().map(|v| format!("{:>5.1}", v)).collect();
        writeln!(out, "  {:<10} {}", series.provider, values.join("  "))?;
    }
    Ok(())
}
