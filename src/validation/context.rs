use derive_more::Display;
use snafu::Snafu;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum Severity {
    #[display("warning")]
    Warning,
    #[display("error")]
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{severity}: {text}")]
pub struct Message {
    pub severity: Severity,
    pub text: String,
}

/// Sink for validation findings.
pub trait Reporter {
    fn error(&mut self, message: String);
    fn warning(&mut self, message: String);
}

/// Collects messages in the order they were reported. Messages reported while
/// a [`prefix`](ValidationContext::prefix) scope is active are qualified with
/// every active prefix, outermost first.
#[derive(Debug, Default)]
pub struct ValidationContext {
    messages: Vec<Message>,
    prefixes: Vec<String>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix<T>(
        &mut self,
        prefix: impl Into<String>,
        scope: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.prefixes.push(prefix.into());
        let out = scope(self);
        self.prefixes.pop();
        out
    }

    pub fn error_count(&self) -> usize {
        count_errors(&self.messages)
    }

    pub fn result(&self) -> ValidationResult {
        ValidationResult {
            messages: self.messages.clone(),
        }
    }

    fn record(&mut self, severity: Severity, message: String) {
        let text = format!("{}{}", self.prefixes.concat(), message);
        debug!("Recorded validation {severity}: {text}");
        self.messages.push(Message { severity, text });
    }
}

impl Reporter for ValidationContext {
    fn error(&mut self, message: String) {
        self.record(Severity::Error, message);
    }

    fn warning(&mut self, message: String) {
        self.record(Severity::Warning, message);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub messages: Vec<Message>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Message> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Message> {
        self.with_severity(Severity::Warning)
    }

    /// Turns every warning into an error.
    pub fn promote_warnings(mut self) -> Self {
        for message in &mut self.messages {
            message.severity = Severity::Error;
        }
        self
    }

    /// Fails with every accumulated message when at least one error was
    /// reported.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.has_errors() {
            Err(ValidationError {
                messages: self.messages,
            })
        } else {
            Ok(())
        }
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(move |message| message.severity == severity)
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("Validation failed with {} error(s)", count_errors(messages)))]
pub struct ValidationError {
    messages: Vec<Message>,
}

impl ValidationError {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

fn count_errors(messages: &[Message]) -> usize {
    messages
        .iter()
        .filter(|message| message.severity == Severity::Error)
        .count()
}
