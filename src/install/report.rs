//! Run classification and the final summary shown to the user

use std::fmt::Display;
use std::io::{IsTerminal, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use super::download::{OsBucket, Version};
use super::orchestration::RunResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    AllSuccess,
    Partial,
    AllFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub status: RunStatus,
    pub messages: Vec<Message>,
    /// 0 iff nothing failed. Partial success still exits 1.
    pub exit_code: i32,
}

/// Classify a run and build its summary lines.
///
/// Failures come first, then the successes (if any).
pub fn summarize(result: &RunResult) -> Summary {
    let successes = result.successes();
    let failures = result.failures();

    let status = match (failures.is_empty(), successes.is_empty()) {
        (true, _) => RunStatus::AllSuccess,
        (false, false) => RunStatus::Partial,
        (false, true) => RunStatus::AllFailed,
    };

    let mut messages = Vec::with_capacity(2);
    if !failures.is_empty() {
        messages.push(Message {
            kind: MessageKind::Failure,
            text: format!(
                "Geckodriver binary installation failed for {}.",
                join(&failures)
            ),
        });
    }
    if !successes.is_empty() {
        messages.push(Message {
            kind: MessageKind::Success,
            text: success_text(&result.version, &successes),
        });
    }

    Summary {
        status,
        messages,
        exit_code: if failures.is_empty() { 0 } else { 1 },
    }
}

fn success_text(version: &Version, buckets: &[OsBucket]) -> String {
    let noun = if buckets.len() == 1 { "binary" } else { "binaries" };
    format!(
        "Geckodriver {noun} successfully installed for version {version} on {}.",
        join(buckets)
    )
}

fn join(buckets: &[OsBucket]) -> String {
    buckets
        .iter()
        .map(|b| b.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Colour only when the stream is a terminal; piped output stays plain.
fn color_choice(is_terminal: bool) -> ColorChoice {
    if is_terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

impl Summary {
    pub fn print(&self) {
        let mut stdout = StandardStream::stdout(color_choice(std::io::stdout().is_terminal()));
        for message in &self.messages {
            let color = match message.kind {
                MessageKind::Success => Color::Green,
                MessageKind::Failure => Color::Yellow,
            };
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)));
            let _ = writeln!(stdout, "{}", message.text);
            let _ = stdout.reset();
        }
    }
}

/// Print an error that ended the run before any bucket was attempted.
pub fn print_fatal(error: &dyn Display) {
    let mut stderr = StandardStream::stderr(color_choice(std::io::stderr().is_terminal()));
    let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = writeln!(stderr, "{error}");
    let _ = stderr.reset();
}
