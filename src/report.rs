/*!
 * Copy report
 *
 * Summarises what a command placed on the clipboard as console tables
 * rendered with tabled.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::commands::Copied;

/// Size of one copied block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReportInfo {
    /// Number of lines in the block
    pub lines: usize,
    /// Number of characters in the block
    pub chars: usize,
}

impl FileReportInfo {
    pub fn measure(text: &str) -> Self {
        Self {
            lines: text.lines().count(),
            chars: text.chars().count(),
        }
    }
}

/// Statistics for one copy
#[derive(Debug, Clone)]
pub struct CopyReport {
    /// Status line of the command
    pub status: String,
    /// Where the text went
    pub destination: String,
    /// Time taken by the command
    pub duration: Duration,
    /// Totals over the whole copied text
    pub total: FileReportInfo,
    /// Per-file details in copy order
    pub files: Vec<(String, FileReportInfo)>,
}

impl CopyReport {
    /// Build a report from a command outcome
    pub fn from_copied(copied: &Copied, destination: impl Into<String>, duration: Duration) -> Self {
        Self {
            status: copied.status.to_string(),
            destination: destination.into(),
            duration,
            total: FileReportInfo::measure(&copied.text),
            files: copied
                .blocks
                .iter()
                .map(|b| (b.path.clone(), FileReportInfo::measure(&b.text)))
                .collect(),
        }
    }
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator
pub struct Reporter {
    format: ReportFormat,
}

/// Rough token estimate used for LLM context budgeting
pub fn estimate_tokens(chars: usize) -> usize {
    chars / 4
}

/// Format a number with human-readable units
pub fn format_number(num: usize) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Padding::new(1, 1, 0, 0))
        .with(Modify::new(Columns::new(..)).with(Alignment::left()));
    table.to_string()
}

impl Reporter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Generate the report text
    pub fn generate_report(&self, report: &CopyReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
        }
    }

    /// Print the report to stderr, keeping stdout for copied text
    pub fn print_report(&self, report: &CopyReport) {
        eprintln!("\n{}", self.generate_report(report));
    }

    fn create_summary_table(&self, report: &CopyReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let rows = vec![
            SummaryRow {
                key: "📋 Destination".to_string(),
                value: report.destination.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "📄 Files".to_string(),
                value: format_number(report.files.len()),
            },
            SummaryRow {
                key: "📝 Total Lines".to_string(),
                value: format_number(report.total.lines),
            },
            SummaryRow {
                key: "📦 LLM Tokens".to_string(),
                value: format!(
                    "{} tokens (estimated)",
                    format_number(estimate_tokens(report.total.chars))
                ),
            },
        ];

        styled(Table::new(rows))
    }

    fn create_files_table(&self, report: &CopyReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Est. Tokens")]
            tokens: String,
        }

        let rows: Vec<FileRow> = report
            .files
            .iter()
            .map(|(path, info)| FileRow {
                path: path.clone(),
                lines: format_number(info.lines),
                tokens: format_number(estimate_tokens(info.chars)),
            })
            .collect();

        styled(Table::new(rows))
    }

    fn generate_console_report(&self, report: &CopyReport) -> String {
        let summary = self.create_summary_table(report);
        let title = format!("✅  {}", report.status);

        if report.files.is_empty() {
            return format!("{}\n{}", title, summary);
        }

        format!(
            "📋  COPIED FILES\n{}\n\n{}\n{}",
            self.create_files_table(report),
            title,
            summary
        )
    }
}
