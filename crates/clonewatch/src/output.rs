//! Output formatting for cards and backport reports

use clonewatch_core::{BackportReport, CardView, DocumentGaps};
use eyre::Result;
use facet::Facet;
use owo_colors::OwoColorize;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            "markdown" | "md" => Some(Self::Markdown),
            _ => None,
        }
    }
}

/// Render the visible cards in the specified format
pub fn render_cards(cards: &[CardView], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_cards_text(cards)),
        OutputFormat::Json => facet_json::to_string_pretty(&cards.to_vec())
            .map_err(|e| eyre::eyre!("Failed to encode cards: {e}")),
        OutputFormat::Markdown => Ok(render_cards_markdown(cards)),
    }
}

/// Render a backport report in the specified format
pub fn render_report(report: &BackportReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_report_text(report)),
        OutputFormat::Json => render_report_json(report),
        OutputFormat::Markdown => Ok(render_report_markdown(report)),
    }
}

fn render_cards_text(cards: &[CardView]) -> String {
    let mut output = String::new();

    if cards.is_empty() {
        output.push_str(&format!("{}\n", "No documents match the current filter".dimmed()));
        return output;
    }

    for card in cards {
        let marker = if card.completed {
            "✓".green().to_string()
        } else {
            "○".dimmed().to_string()
        };
        output.push_str(&format!(
            "{} {} {}\n",
            marker,
            card.id.cyan().bold(),
            card.summary
        ));

        let status = if card.status.is_empty() {
            "-".to_string()
        } else {
            card.status.yellow().to_string()
        };
        output.push_str(&format!(
            "    Status: {}  Assignee: {}  Target: {}\n",
            status,
            card.assignee,
            card.target_version
        ));

        if !card.backport_versions.is_empty() {
            output.push_str(&format!(
                "    Backports: {}\n",
                card.backport_versions.dimmed()
            ));
        }

        for clone in &card.clones {
            output.push_str(&format!(
                "    {} {} {} {}\n",
                "↳".dimmed(),
                clone.id.as_deref().unwrap_or("?"),
                clone.target_version.as_deref().unwrap_or("-"),
                clone.status.as_deref().unwrap_or("").dimmed()
            ));
        }

        for warning in card.warnings() {
            output.push_str(&format!("    {} {}\n", "!".red().bold(), warning.red()));
        }

        output.push_str(&format!("    {}\n\n", card.link.dimmed()));
    }

    output
}

fn render_cards_markdown(cards: &[CardView]) -> String {
    let mut output = String::new();

    output.push_str("| Issue | Summary | Status | Assignee | Target | Backports | Missing | Done |\n");
    output.push_str("|-------|---------|--------|----------|--------|-----------|---------|------|\n");

    for card in cards {
        let missing = if card.missing_backports.is_empty() {
            "-".to_string()
        } else {
            card.missing_backports.join(", ")
        };
        output.push_str(&format!(
            "| [{}]({}) | {} | {} | {} | {} | {} | {} | {} |\n",
            card.id,
            card.link,
            card.summary.replace('|', "\\|"),
            card.status,
            card.assignee,
            card.target_version,
            card.backport_versions,
            missing,
            if card.completed { "yes" } else { "no" }
        ));
    }

    output
}

fn render_report_text(report: &BackportReport) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!("{} Backport Report\n", "##".bold()));
    output.push('\n');

    let percent = report.coverage_percent();
    let percent_str = format!("{:.1}%", percent);
    let color_percent = if percent >= 80.0 {
        percent_str.green().to_string()
    } else if percent >= 50.0 {
        percent_str.yellow().to_string()
    } else {
        percent_str.red().to_string()
    };

    output.push_str(&format!(
        "Coverage: {} ({}/{} documents with backports)\n",
        color_percent,
        report.tracked_documents - report.incomplete.len(),
        report.tracked_documents
    ));
    output.push_str(&format!(
        "  Documents: {}\n",
        report.total_documents.to_string().dimmed()
    ));
    output.push('\n');

    if !report.incomplete.is_empty() {
        output.push_str(&format!(
            "{} Missing Backports ({}):\n",
            "?".yellow().bold(),
            report.missing_count()
        ));
        for DocumentGaps { id, missing } in &report.incomplete {
            output.push_str(&format!(
                "  {} {} - {}\n",
                "-".yellow(),
                id.cyan(),
                missing.join(", ").dimmed()
            ));
        }
        output.push('\n');
    }

    if report.is_passing() {
        output.push_str(&format!("{} All required backports exist\n", "OK".green().bold()));
    }

    output
}

#[derive(Facet)]
struct JsonReport {
    total_documents: usize,
    tracked_documents: usize,
    coverage_percent: f64,
    missing_count: usize,
    incomplete: Vec<DocumentGaps>,
}

fn render_report_json(report: &BackportReport) -> Result<String> {
    let json_report = JsonReport {
        total_documents: report.total_documents,
        tracked_documents: report.tracked_documents,
        coverage_percent: report.coverage_percent(),
        missing_count: report.missing_count(),
        incomplete: report.incomplete.clone(),
    };

    facet_json::to_string_pretty(&json_report)
        .map_err(|e| eyre::eyre!("Failed to encode report: {e}"))
}

fn render_report_markdown(report: &BackportReport) -> String {
    let mut output = String::new();

    output.push_str("# Backport Report\n\n");
    output.push_str(&format!(
        "**Coverage:** {:.1}% ({}/{} documents with backports)\n\n",
        report.coverage_percent(),
        report.tracked_documents - report.incomplete.len(),
        report.tracked_documents
    ));

    if !report.incomplete.is_empty() {
        output.push_str(&format!(
            "## Missing Backports ({})\n\n",
            report.missing_count()
        ));
        for gaps in &report.incomplete {
            output.push_str(&format!("- `{}`: {}\n", gaps.id, gaps.missing.join(", ")));
        }
        output.push('\n');
    }

    output
}
