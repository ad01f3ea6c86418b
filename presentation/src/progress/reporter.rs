//! Progress reporting for conversion runs

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use udc_application::ProgressNotifier;
use udc_domain::{AgentId, ConversionResult, GateKind, GateVerdict};

fn gate_display_name(gate: Option<GateKind>) -> &'static str {
    match gate {
        Some(GateKind::Verification) => "Verification",
        Some(GateKind::Validation) => "Validation",
        None => "Conversion",
    }
}

fn outcome_label(verdict: &GateVerdict) -> colored::ColoredString {
    if verdict.final_approved {
        "approved".green()
    } else {
        "rejected".red()
    }
}

fn run_label(result: &ConversionResult) -> String {
    if result.succeeded {
        format!(
            "{} after {} attempt(s)",
            "Converted".green().bold(),
            result.attempts_used
        )
    } else {
        format!(
            "{}: {}",
            "Failed".red().bold(),
            result.failure_text().unwrap_or_default()
        )
    }
}

/// Reports progress with one progress bar per gate
///
/// Suited to one document at a time; use [`SimpleProgress`] when documents
/// run concurrently.
pub struct ProgressReporter {
    multi: MultiProgress,
    gate_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            gate_bar: Mutex::new(None),
        }
    }

    fn gate_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_gate_start(&self, gate: GateKind, panel_size: usize) {
        let pb = self.multi.add(ProgressBar::new(panel_size as u64));
        pb.set_style(Self::gate_style());
        pb.set_prefix(gate_display_name(Some(gate)));
        pb.set_message("Starting...");

        if let Ok(mut bar) = self.gate_bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_agent_complete(&self, gate: Option<GateKind>, agent: &AgentId, success: bool) {
        let status = if success {
            format!("{} {}", "v".green(), agent)
        } else {
            format!("{} {}", "x".red(), agent)
        };

        if gate.is_none() {
            let _ = self
                .multi
                .println(format!("  {} {}", gate_display_name(None).bold(), status));
            return;
        }

        if let Ok(bar) = self.gate_bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_gate_complete(&self, verdict: &GateVerdict) {
        if let Ok(mut bar) = self.gate_bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_with_message(format!(
                "{} {}{}",
                verdict.vote_summary(),
                outcome_label(verdict),
                if verdict.early_exited { " (early exit)" } else { "" }
            ));
        }
    }

    fn on_attempt_start(&self, attempt: usize, max_attempts: usize) {
        let _ = self.multi.println(format!(
            "{} attempt {}/{}",
            "->".cyan(),
            attempt,
            max_attempts
        ));
    }

    fn on_run_complete(&self, result: &ConversionResult) {
        let _ = self.multi.println(run_label(result));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_gate_start(&self, gate: GateKind, panel_size: usize) {
        println!(
            "{} {} ({} agents)",
            "->".cyan(),
            gate_display_name(Some(gate)).bold(),
            panel_size
        );
    }

    fn on_agent_complete(&self, gate: Option<GateKind>, agent: &AgentId, success: bool) {
        let indent = if gate.is_some() { "  " } else { "" };
        if success {
            println!("{}  {} {}", indent, "v".green(), agent);
        } else {
            println!("{}  {} {} (failed)", indent, "x".red(), agent);
        }
    }

    fn on_gate_complete(&self, verdict: &GateVerdict) {
        println!(
            "  {} {} {}",
            gate_display_name(Some(verdict.gate)),
            verdict.vote_summary(),
            outcome_label(verdict)
        );
    }

    fn on_attempt_start(&self, attempt: usize, max_attempts: usize) {
        println!("{} Attempt {}/{}", "->".cyan(), attempt, max_attempts);
    }

    fn on_run_complete(&self, result: &ConversionResult) {
        println!("{}", run_label(result));
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_label_mentions_failure_reason() {
        colored::control::set_override(false);
        assert_eq!(
            run_label(&ConversionResult::succeeded("{}", 2)),
            "Converted after 2 attempt(s)"
        );
        assert_eq!(
            run_label(&ConversionResult::input_rejected()),
            "Failed: input rejected by the verification panel"
        );
    }

    #[test]
    fn test_gate_display_names() {
        assert_eq!(gate_display_name(Some(GateKind::Verification)), "Verification");
        assert_eq!(gate_display_name(None), "Conversion");
    }
}
