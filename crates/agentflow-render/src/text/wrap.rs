//! Label wrapping for trace nodes.
//!
//! Labels are wrapped per character rather than per word: trace text is frequently Chinese or
//! Japanese with no spaces at all, so a word splitter would never find a break. Natural break
//! characters (spaces and ASCII/full-width punctuation) are still preferred when one sits close
//! to the end of the line.

use agentflow_core::NodeType;

/// Characters after which a line may be broken softly.
pub const BREAK_CHARS: [char; 14] = [
    ' ', '，', '。', ',', '.', '、', ':', '：', ';', '；', ')', '）', '}', ']',
];

/// How far back from the end of a full line to look for a break character.
pub const BREAK_LOOKBACK: usize = 5;

/// Maximum characters per line for a node type.
///
/// Diamond, hexagon, octagon and ellipse nodes lose usable width to their outline, so they get
/// fewer characters to keep the visual line width roughly constant across shapes.
pub fn char_budget(node_type: &NodeType) -> usize {
    match node_type {
        NodeType::Decision | NodeType::Thinking => 18,
        NodeType::Error | NodeType::Tool => 20,
        NodeType::Info | NodeType::Data | NodeType::Metric | NodeType::Other => 19,
        NodeType::Start
        | NodeType::End
        | NodeType::Action
        | NodeType::Result
        | NodeType::Unknown(_) => 22,
    }
}

/// Wraps `raw` for `node_type` and joins the lines with `\n`.
pub fn wrap_label(raw: &str, node_type: &NodeType) -> String {
    wrap_label_lines(raw, char_budget(node_type)).join("\n")
}

/// Wraps `raw` into trimmed lines of at most `budget` characters each.
///
/// Existing line breaks in the input are kept as hard breaks, so wrapping an already wrapped
/// label at the same budget is a no-op. Whitespace-only lines are dropped.
pub fn wrap_label_lines(raw: &str, budget: usize) -> Vec<String> {
    let budget = budget.max(1);
    let mut out = Vec::new();
    for paragraph in raw.split('\n') {
        wrap_paragraph(paragraph, budget, &mut out);
    }
    out
}

/// Number of lines in a wrapped label. An empty label has zero lines.
pub fn line_count(wrapped: &str) -> usize {
    if wrapped.is_empty() {
        0
    } else {
        wrapped.split('\n').count()
    }
}

fn wrap_paragraph(text: &str, budget: usize, out: &mut Vec<String>) {
    let mut cur: Vec<char> = Vec::with_capacity(budget);
    for ch in text.chars() {
        if cur.len() + 1 > budget {
            let window_start = cur.len().saturating_sub(BREAK_LOOKBACK);
            // Leftmost break character in the window wins; one in the last slot hard-breaks.
            let soft_break = (window_start..cur.len())
                .find(|&j| BREAK_CHARS.contains(&cur[j]))
                .filter(|&j| j + 1 < cur.len());
            match soft_break {
                Some(j) => {
                    let carry = cur.split_off(j + 1);
                    push_line(out, &cur);
                    cur = carry;
                }
                None => {
                    push_line(out, &cur);
                    cur.clear();
                }
            }
        }
        cur.push(ch);
    }
    push_line(out, &cur);
}

fn push_line(out: &mut Vec<String>, chars: &[char]) {
    let line = chars.iter().collect::<String>();
    let line = line.trim();
    if !line.is_empty() {
        out.push(line.to_string());
    }
}
