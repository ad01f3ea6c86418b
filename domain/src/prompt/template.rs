//! Placeholder rendering for prompt templates
//!
//! Templates carry HTML-comment placeholders such as `{<!--Data-->}` that are
//! substituted just before an agent is dispatched.

use chrono::Local;
use std::borrow::Cow;

const TOKEN_OPEN: &str = "{<!--";

/// Placeholders understood by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// The input document
    Data,
    /// Local wall-clock time
    DateTime,
    /// Zero-based conversion attempt index
    RunIndex,
    /// Conversion output (validation requests only)
    Output,
    /// Feedback from the previous rejected attempt (conversion requests only)
    PreviousConversionNotes,
}

impl Placeholder {
    pub const ALL: [Placeholder; 5] = [
        Placeholder::Data,
        Placeholder::DateTime,
        Placeholder::RunIndex,
        Placeholder::Output,
        Placeholder::PreviousConversionNotes,
    ];

    /// The literal token as it appears in a template
    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::Data => "{<!--Data-->}",
            Placeholder::DateTime => "{<!--DateTime-->}",
            Placeholder::RunIndex => "{<!--RunIndex-->}",
            Placeholder::Output => "{<!--Output-->}",
            Placeholder::PreviousConversionNotes => "{<!--PreviousConversionNotes-->}",
        }
    }
}

/// Values available when rendering one request
///
/// Placeholders without a value are left untouched, so a template that uses
/// `{<!--Output-->}` outside validation is detectable (see
/// [`PromptSet::check_placeholders`](super::PromptSet::check_placeholders)).
#[derive(Debug, Clone, Default)]
pub struct PromptContext<'a> {
    pub data: &'a str,
    pub output: Option<&'a str>,
    pub run_index: Option<usize>,
    pub previous_notes: Option<&'a str>,
    /// Overrides the current time, mainly for deterministic tests
    pub now: Option<String>,
}

impl<'a> PromptContext<'a> {
    /// Context for a verification request
    pub fn verification(data: &'a str) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    /// Context for a conversion request on attempt `run_index`
    pub fn conversion(data: &'a str, run_index: usize, previous_notes: &'a str) -> Self {
        Self {
            data,
            run_index: Some(run_index),
            previous_notes: Some(previous_notes),
            ..Default::default()
        }
    }

    /// Context for a validation request
    pub fn validation(data: &'a str, output: &'a str) -> Self {
        Self {
            data,
            output: Some(output),
            ..Default::default()
        }
    }

    pub fn with_now(mut self, now: impl Into<String>) -> Self {
        self.now = Some(now.into());
        self
    }

    /// Substitute every placeholder this context has a value for
    ///
    /// The template is scanned once, so tokens inside substituted values
    /// (an input document that happens to contain `{<!--Output-->}`) are
    /// copied verbatim.
    pub fn render(&self, template: &str) -> String {
        let now = self
            .now
            .clone()
            .unwrap_or_else(|| Local::now().format("%Y-%m-%d %H:%M:%S").to_string());

        let mut rendered = String::with_capacity(template.len() + self.data.len());
        let mut rest = template;
        while let Some(start) = rest.find(TOKEN_OPEN) {
            rendered.push_str(&rest[..start]);
            rest = &rest[start..];

            let token = match Placeholder::ALL.into_iter().find(|p| rest.starts_with(p.token())) {
                Some(placeholder) => {
                    match self.value(placeholder, &now) {
                        Some(value) => rendered.push_str(&value),
                        None => rendered.push_str(placeholder.token()),
                    }
                    placeholder.token()
                }
                None => {
                    rendered.push_str(TOKEN_OPEN);
                    TOKEN_OPEN
                }
            };
            rest = &rest[token.len()..];
        }
        rendered.push_str(rest);
        rendered
    }

    fn value<'s>(&'s self, placeholder: Placeholder, now: &'s str) -> Option<Cow<'s, str>> {
        match placeholder {
            Placeholder::Data => Some(Cow::Borrowed(self.data)),
            Placeholder::DateTime => Some(Cow::Borrowed(now)),
            Placeholder::RunIndex => self.run_index.map(|index| Cow::Owned(index.to_string())),
            Placeholder::Output => self.output.map(Cow::Borrowed),
            Placeholder::PreviousConversionNotes => self.previous_notes.map(Cow::Borrowed),
        }
    }
}

/// Placeholders still present in `text`
pub fn unrendered_placeholders(text: &str) -> Vec<Placeholder> {
    Placeholder::ALL
        .into_iter()
        .filter(|p| text.contains(p.token()))
        .collect()
}
