//! Classification of what the user is asking about.
//!
//! Precedence: the current message wins when it has any non-blank text,
//! otherwise the most recent message in the caller's history is used.
//! Within that text, any keyword from [`EMAIL_KEYWORDS`] (case-insensitive)
//! selects [`Intent::Email`]. The first run of digits, if any, is the number
//! of emails wanted, clamped to `1..=MAX_EMAIL_LIMIT`.

use super::context::CallerContext;
use serde::Serialize;
use utoipa::ToSchema;

pub const EMAIL_KEYWORDS: &[&str] = &["email", "gmail"];
pub const DEFAULT_EMAIL_LIMIT: usize = 5;
pub const MAX_EMAIL_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Intent {
    General,
    Email { limit: usize },
}

impl Intent {
    pub fn is_email(&self) -> bool {
        matches!(self, Intent::Email { .. })
    }
}

/// The text the classifier should look at.
pub fn message_to_classify<'a>(current: Option<&'a str>, caller: &'a CallerContext) -> &'a str {
    match current {
        Some(text) if !text.trim().is_empty() => text,
        _ => caller
            .previous_messages
            .last()
            .map(|message| message.content.as_str())
            .unwrap_or_default(),
    }
}

pub fn classify(text: &str) -> Intent {
    let lowered = text.to_lowercase();
    if !EMAIL_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
        return Intent::General;
    }
    Intent::Email {
        limit: requested_count(text).unwrap_or(DEFAULT_EMAIL_LIMIT),
    }
}

fn requested_count(text: &str) -> Option<usize> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return None;
    }
    let count = digits.parse::<usize>().unwrap_or(MAX_EMAIL_LIMIT);
    Some(count.clamp(1, MAX_EMAIL_LIMIT))
}
