//! Console output formatter for batch results

use colored::Colorize;
use udc_application::BatchItem;
use udc_domain::GateVerdict;

/// Formats batch results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format every document with its gate verdicts
    pub fn format(items: &[BatchItem]) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Conversion Results"));
        output.push('\n');

        for item in items {
            output.push_str(&format!("\n{}\n", format!("── {} ──", item.name).yellow().bold()));

            match &item.outcome {
                Ok(run) => {
                    for verdict in run.log.verdicts() {
                        output.push_str(&Self::verdict_line(verdict));
                    }
                    for call in run.log.calls().filter(|c| !c.success) {
                        output.push_str(&format!(
                            "  {} {}: {}\n",
                            "!".red(),
                            call.agent,
                            call.failure_message()
                        ));
                    }
                    output.push_str(&format!("  {}\n", Self::status(&run.result)));
                }
                Err(e) => {
                    output.push_str(&format!("  {} {}\n", "Error:".red().bold(), e));
                }
            }
        }

        output.push_str(&Self::totals(items));
        output.push_str(&Self::footer());
        output
    }

    /// One line per document (concise output)
    pub fn format_summary(items: &[BatchItem]) -> String {
        let mut output = String::new();
        for item in items {
            let status = match &item.outcome {
                Ok(run) => Self::status(&run.result),
                Err(e) => format!("{} {}", "error:".red(), e),
            };
            output.push_str(&format!("{} {}\n", item.name.bold(), status));
        }
        output.push_str(&Self::totals(items));
        output
    }

    /// Format as JSON
    pub fn format_json(items: &[BatchItem]) -> String {
        let documents: Vec<serde_json::Value> = items
            .iter()
            .map(|item| match &item.outcome {
                Ok(run) => serde_json::json!({
                    "document": item.name,
                    "result": run.result,
                    "verdicts": run.log.verdicts().collect::<Vec<_>>(),
                }),
                Err(e) => serde_json::json!({
                    "document": item.name,
                    "error": e.to_string(),
                }),
            })
            .collect();

        serde_json::to_string_pretty(&documents).unwrap_or_else(|_| "[]".to_string())
    }

    /// Number of documents that converted successfully
    pub fn succeeded_count(items: &[BatchItem]) -> usize {
        items
            .iter()
            .filter(|item| matches!(&item.outcome, Ok(run) if run.result.succeeded))
            .count()
    }

    fn verdict_line(verdict: &GateVerdict) -> String {
        let outcome = if verdict.final_approved {
            "approved".green()
        } else {
            "rejected".red()
        };
        let mut line = format!(
            "  {:<12} {} {} ({} of {})",
            verdict.gate.to_string(),
            verdict.vote_summary(),
            outcome,
            verdict.approve_count,
            verdict.panel_size
        );
        if verdict.early_exited {
            line.push_str(&format!(" {}", "early exit".dimmed()));
        }
        line.push('\n');

        for (agent, message) in verdict
            .votes
            .iter()
            .filter(|v| !v.approved)
            .map(|v| (&v.agent, &v.message))
        {
            line.push_str(&format!(
                "    {} {}\n",
                format!("{}:", agent).dimmed(),
                Self::first_line(message)
            ));
        }
        line
    }

    fn status(result: &udc_domain::ConversionResult) -> String {
        if result.succeeded {
            format!(
                "{} ({} attempt(s))",
                "converted".green().bold(),
                result.attempts_used
            )
        } else {
            format!(
                "{} ({}, {} attempt(s))",
                "failed".red().bold(),
                result.failure_text().unwrap_or_default(),
                result.attempts_used
            )
        }
    }

    fn totals(items: &[BatchItem]) -> String {
        format!(
            "\n{} {}/{} converted\n",
            "Total:".cyan().bold(),
            Self::succeeded_count(items),
            items.len()
        )
    }

    fn first_line(text: &str) -> &str {
        text.lines().next().unwrap_or_default()
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
