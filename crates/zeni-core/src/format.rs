//! Lightweight markup for assistant replies
//!
//! Replies come back as loosely markdown-flavoured text. Renderers get a small
//! HTML subset: `<b>`, `<i>` and `<br/>` line breaks before list items.

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^• (.+)$").unwrap());
static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(\d+)\. (.+)$").unwrap());

/// Convert reply text into renderer markup.
pub fn to_markup(text: &str) -> String {
    let text = BOLD.replace_all(text, "<b>${1}</b>");
    let text = ITALIC.replace_all(&text, "<i>${1}</i>");
    let text = BULLET.replace_all(&text, "<br/>• ${1}");
    let text = NUMBERED.replace_all(&text, "<br/><b>${1}.</b> ${2}");

    match text.strip_prefix("<br/>") {
        Some(rest) => rest.to_string(),
        None => text.into_owned(),
    }
}
