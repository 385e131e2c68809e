use super::*;
use agentflow_core::NodeType;
use proptest::prelude::*;

fn non_ws(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[test]
fn budgets_follow_node_shape() {
    assert_eq!(char_budget(&NodeType::Decision), 18);
    assert_eq!(char_budget(&NodeType::Thinking), 18);
    assert_eq!(char_budget(&NodeType::Error), 20);
    assert_eq!(char_budget(&NodeType::Tool), 20);
    for t in [
        NodeType::Info,
        NodeType::Data,
        NodeType::Metric,
        NodeType::Other,
    ] {
        assert_eq!(char_budget(&t), 19);
    }
    for t in [
        NodeType::Start,
        NodeType::End,
        NodeType::Action,
        NodeType::Result,
        NodeType::parse("observation"),
    ] {
        assert_eq!(char_budget(&t), 22);
    }
}

#[test]
fn action_label_breaks_at_word_boundaries() {
    let wrapped = wrap_label(
        "deep analysis of the codebase structure and dependencies",
        &NodeType::Action,
    );
    assert_eq!(
        wrapped,
        "deep analysis of the\ncodebase structure\nand dependencies"
    );
    assert_eq!(line_count(&wrapped), 3);
    assert!(wrapped.split('\n').all(|l| l.chars().count() <= 22));
}

#[test]
fn first_break_in_lookback_wins() {
    let lines = wrap_label_lines("hello, world. this is a test of things", 18);
    assert_eq!(lines, vec!["hello, world.", "this is a test", "of things"]);

    let lines = wrap_label_lines("abcdefghijklmnopq r s,tuvwxyz", 22);
    assert_eq!(lines, vec!["abcdefghijklmnopq", "r s,tuvwxyz"]);
}

#[test]
fn break_in_last_slot_hard_breaks() {
    // Only the final character of the full line is a break character.
    let lines = wrap_label_lines("abcdefghi, jk", 10);
    assert_eq!(lines, vec!["abcdefghi,", "jk"]);
}

#[test]
fn cjk_text_wraps_per_character() {
    let lines = wrap_label_lines("分析用户需求：需要查找Python文件中的错误", 18);
    assert_eq!(lines, vec!["分析用户需求：需要查找Python文", "件中的错误"]);

    let lines = wrap_label_lines("修复失败：权限不足，请求写入权限后重新尝试修复空指针异常", 20);
    assert_eq!(
        lines,
        vec!["修复失败：权限不足，请求写入权限后重新尝", "试修复空指针异常"]
    );
}

#[test]
fn unbreakable_runs_hard_break_at_budget() {
    let lines = wrap_label_lines(&"a".repeat(50), 22);
    assert_eq!(
        lines,
        vec!["a".repeat(22), "a".repeat(22), "a".repeat(6)]
    );

    let exact = "x".repeat(22);
    assert_eq!(wrap_label_lines(&exact, 22), vec![exact.clone()]);
}

#[test]
fn empty_and_blank_input_yield_nothing() {
    assert_eq!(wrap_label("", &NodeType::Action), "");
    assert_eq!(wrap_label("   ", &NodeType::Action), "");
    assert_eq!(line_count(""), 0);
}

#[test]
fn existing_breaks_are_hard_breaks() {
    let wrapped = wrap_label("Log Start\nline two", &NodeType::Start);
    assert_eq!(wrapped, "Log Start\nline two");
    assert_eq!(
        wrap_label(&wrapped, &NodeType::Start),
        wrapped,
        "re-wrapping at the same budget must not change the label"
    );
}

#[test]
fn deterministic_measurer_counts_wide_columns() {
    let m = DeterministicTextMeasurer::default();
    let style = TextStyle::with_font_size(10.0);

    let ascii = m.measure("abcd", &style);
    assert_eq!(ascii.line_count, 1);
    assert!((ascii.width - 24.0).abs() < 1e-9);
    assert!((ascii.height - 12.0).abs() < 1e-9);

    let wide = m.measure("分析\nab", &style);
    assert_eq!(wide.line_count, 2);
    assert!((wide.width - 24.0).abs() < 1e-9);
    assert!((wide.height - 24.0).abs() < 1e-9);

    let empty = m.measure("", &style);
    assert_eq!(empty.line_count, 0);
    assert_eq!(empty.width, 0.0);
}

fn label_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just(' '),
            Just(','),
            Just('。'),
            Just('：'),
            Just(')'),
            prop::char::range('a', 'z'),
            prop::char::range('一', '龥'),
        ],
        0..120,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn lines_never_exceed_budget(label in label_strategy(), budget in 1usize..30) {
        for line in wrap_label_lines(&label, budget) {
            prop_assert!(line.chars().count() <= budget, "{line:?} > {budget}");
            prop_assert!(!line.trim().is_empty());
            prop_assert_eq!(line.trim(), line.as_str());
        }
    }

    #[test]
    fn wrapping_keeps_every_visible_character(label in label_strategy(), budget in 1usize..30) {
        let lines = wrap_label_lines(&label, budget);
        prop_assert_eq!(non_ws(&lines.concat()), non_ws(&label));
    }

    #[test]
    fn rewrapping_keeps_content(label in label_strategy(), budget in 1usize..30) {
        let once = wrap_label_lines(&label, budget).join("\n");
        let twice = wrap_label_lines(&once, budget).join("\n");
        prop_assert_eq!(non_ws(&twice), non_ws(&once));
        prop_assert_eq!(twice, once);
    }
}
