/// Quotes text the way diagnostic messages expect it: single quotes unless the
/// text contains a single quote and no double quote, with escapes for the
/// chosen quote, backslashes and non-printable characters. Non-printable
/// characters are rendered as `\xNN`, `\uNNNN` or `\UNNNNNNNN`.
pub fn quoted(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if is_printable(c) => out.push(c),
            c => out.push_str(&escape_code_point(c)),
        }
    }
    out.push(quote);
    out
}

/// Controls, separators other than the plain space, and the invisible
/// formatting characters are not printable.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !(c.is_control()
        || c.is_whitespace()
        || matches!(
            c,
            '\u{ad}'
                | '\u{600}'..='\u{605}'
                | '\u{61c}'
                | '\u{6dd}'
                | '\u{70f}'
                | '\u{180e}'
                | '\u{200b}'..='\u{200f}'
                | '\u{202a}'..='\u{202e}'
                | '\u{2060}'..='\u{2064}'
                | '\u{2066}'..='\u{206f}'
                | '\u{e000}'..='\u{f8ff}'
                | '\u{feff}'
                | '\u{fff9}'..='\u{fffb}'
                | '\u{e0001}'
                | '\u{e0020}'..='\u{e007f}'
                | '\u{f0000}'..='\u{10ffff}'
        ))
}

fn escape_code_point(c: char) -> String {
    match c as u32 {
        code @ 0..=0xff => format!("\\x{code:02x}"),
        code @ 0x100..=0xffff => format!("\\u{code:04x}"),
        code => format!("\\U{code:08x}"),
    }
}

/// Renders items as a bracketed list of quoted strings, e.g. `['a', 'b']`.
pub fn quoted_list<'a>(items: impl IntoIterator<Item = &'a str>) -> String {
    let inner = items.into_iter().map(quoted).collect::<Vec<_>>().join(", ");
    format!("[{inner}]")
}

pub trait QuoteExt {
    fn quoted(&self) -> String;
}

impl QuoteExt for str {
    fn quoted(&self) -> String {
        quoted(self)
    }
}

impl QuoteExt for String {
    fn quoted(&self) -> String {
        quoted(self)
    }
}
