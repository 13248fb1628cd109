// Screen rendering. Everything here is a pure function returning text;
// the navigator decides where it is written.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::menu::{MenuNode, MenuOption};

/// Fixed console width shared by every screen.
pub const SCREEN_WIDTH: usize = 110;

// terminal columns, so wide glyphs count double
fn text_len(text: &str) -> usize {
    text.width()
}

fn pad_right(text: &str, width: usize) -> String {
    format!("{text}{}", " ".repeat(width.saturating_sub(text_len(text))))
}

fn pad_left(text: &str, width: usize) -> String {
    format!("{}{text}", " ".repeat(width.saturating_sub(text_len(text))))
}

/// A full-width rule of `ch` with `above` blank lines before it and `below`
/// after it. Every line ends with a newline.
pub fn border(ch: char, above: usize, below: usize) -> String {
    let mut out = "\n".repeat(above);
    out.extend(std::iter::repeat(ch).take(SCREEN_WIDTH));
    out.push('\n');
    out.push_str(&"\n".repeat(below));
    out
}

/// Left and right padding that centers `text` on the screen. An odd leftover
/// column goes to the right.
pub fn center_padding(text: &str) -> (usize, usize) {
    let len = text_len(text);
    let left = SCREEN_WIDTH.saturating_sub(len) / 2;
    let right = SCREEN_WIDTH.saturating_sub(len + left);
    (left, right)
}

/// `text` padded on both sides to the screen width (no trailing newline).
pub fn centered(text: &str) -> String {
    let (left, right) = center_padding(text);
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

/// The "Options" heading followed by one centered `label. text` line per
/// entry. Labels are right-aligned and texts left-aligned to the widest of
/// each, so the longest entry is centered and the rest line up with it.
pub fn options_block(options: &[MenuOption]) -> Vec<String> {
    let label_width = options.iter().map(|o| text_len(&o.label)).max().unwrap_or(0);
    let text_width = options.iter().map(|o| text_len(&o.text)).max().unwrap_or(0);

    let mut lines = vec![centered("Options"), String::new()];
    lines.extend(options.iter().map(|o| {
        centered(&format!(
            "{}. {}",
            pad_left(&o.label, label_width),
            pad_right(&o.text, text_width)
        ))
    }));
    lines
}

/// Heading shown at the top of every screen.
pub fn title_block(node: &MenuNode) -> String {
    let welcome = if node.is_main() { "Welcome to the " } else { "" };
    let mut out = border('*', 1, 1);
    out.push_str(&centered(&format!("{welcome}{}", node.title())));
    out.push('\n');
    out.push_str(&border('*', 1, 1));
    out
}

/// Query rows in a single column: one `Label: value` line per cell, labels
/// padded to the widest, a `-` rule after each row.
pub fn result_rows(columns: &[String], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "No results.\n\n".to_string();
    }
    let labels: Vec<String> = columns.iter().map(|c| format!("{c}: ")).collect();
    let label_width = labels.iter().map(|l| text_len(l)).max().unwrap_or(0);

    let mut out = String::new();
    for row in rows {
        for (col, value) in row.iter().enumerate() {
            let label = labels.get(col).map(String::as_str).unwrap_or("");
            let line = format!("{}{value}", pad_right(label, label_width));
            out.push_str(&wrap_line(&line, label_width));
        }
        out.push_str(&border('-', 0, 0));
    }
    out.push('\n');
    out
}

/// Split a line wider than the screen; continuation lines are indented to
/// the label column. A wide glyph that would straddle the edge moves to the
/// next line.
fn wrap_line(line: &str, indent: usize) -> String {
    if text_len(line) <= SCREEN_WIDTH {
        return format!("{line}\n");
    }
    let indent = indent.min(SCREEN_WIDTH - 2);
    let mut out = String::new();
    let mut used = 0;
    for ch in line.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > SCREEN_WIDTH {
            out.push('\n');
            out.push_str(&" ".repeat(indent));
            used = indent;
        }
        out.push(ch);
        used += w;
    }
    out.push('\n');
    out
}

/// Message printed once when the session ends.
pub fn farewell(root_title: &str) -> String {
    format!("\nThank you for using the {root_title}\nGoodbye.\n\n")
}
