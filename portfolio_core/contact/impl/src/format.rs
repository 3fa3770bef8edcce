use chrono::{DateTime, Utc};
use portfolio_models::contact::ContactSubmission;
use url::Url;

/// Renders a submission as a Telegram `MarkdownV2` message.
pub fn telegram_message(
    submission: &ContactSubmission,
    submitted_at: DateTime<Utc>,
    portfolio_url: Option<&Url>,
) -> String {
    let mut text = format!(
        "*🌟 New Contact Form Submission 🌟*\n\
         \n\
         👤 *Name:* {name}\n\
         📧 *Email:* {email}\n\
         📌 *Subject:* {subject}\n\
         \n\
         💬 *Message:*\n\
         ```\n\
         {message}\n\
         ```\n\
         \n\
         📅 *Submitted on:* {submitted_at}\n",
        name = escape(&submission.name),
        email = escape(submission.email.as_str()),
        subject = escape(&submission.subject),
        message = escape_code(&submission.message),
        submitted_at = escape(&submitted_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
    );

    if let Some(url) = portfolio_url {
        text.push_str(&format!(
            "\n[View Portfolio]({})\n",
            escape_link(url.as_str())
        ));
    }

    text
}

fn escape(text: &str) -> String {
    escape_chars(text, |c| {
        matches!(
            c,
            '_' | '*'
                | '['
                | ']'
                | '('
                | ')'
                | '~'
                | '`'
                | '>'
                | '#'
                | '+'
                | '-'
                | '='
                | '|'
                | '{'
                | '}'
                | '.'
                | '!'
                | '\\'
        )
    })
}

fn escape_code(text: &str) -> String {
    escape_chars(text, |c| matches!(c, '`' | '\\'))
}

fn escape_link(url: &str) -> String {
    escape_chars(url, |c| matches!(c, ')' | '\\'))
}

fn escape_chars(text: &str, special: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if special(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
