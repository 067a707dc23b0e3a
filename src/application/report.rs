use colored::Colorize;

use crate::validation::{Message, Severity};

/// Renders a validation message as a single terminal line.
pub fn render_message(message: &Message) -> String {
    let label = match message.severity {
        Severity::Error => "error".red().bold(),
        Severity::Warning => "warning".yellow().bold(),
    };
    format!("{label}: {}", message.text)
}

pub fn print_messages<'a>(messages: impl IntoIterator<Item = &'a Message>) {
    for message in messages {
        println!("{}", render_message(message));
    }
}
