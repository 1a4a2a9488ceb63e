// Property-based tests for the formatter:
// 1. Formatting never fails on markdown-like input
// 2. Output has no trailing blanks and exactly one final newline
// 3. Formatting twice gives the same result, including for text full of
//    escapes, pipes and back-to-back emphasis

use mdtidy_lib::format_source;
use proptest::prelude::*;

fn words() -> impl Strategy<Value = String> {
    "[a-z]{1,8}( [a-z]{1,8}){0,4}"
}

/// Lines that combine into well-formed documents
fn markdown_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (1..7usize, words()).prop_map(|(level, text)| format!("{} {text}", "#".repeat(level))),
        words().prop_map(|text| format!("- {text}")),
        words().prop_map(|text| format!("* {text}")),
        words().prop_map(|text| format!("1. {text}")),
        words().prop_map(|text| format!("> {text}")),
        words(),
        words().prop_map(|text| format!("_{text}_ and __{text}__")),
        words().prop_map(|text| format!("`{text}` ~~{text}~~")),
        Just("***".to_string()),
        Just("___".to_string()),
        Just(String::new()),
        prop::collection::vec(words(), 1..4).prop_map(|lines| format!("\n```\n{}\n```\n", lines.join("\n"))),
        prop::collection::vec(words(), 1..4).prop_map(|lines| {
            let body: Vec<_> = lines.iter().map(|line| format!("    {line}")).collect();
            format!("\n{}\n", body.join("\n"))
        }),
    ]
}

/// Inline pieces whose escaping and delimiter choice the renderer must get right
fn punctuated_fragment() -> impl Strategy<Value = String> {
    let word = "[a-z]{1,6}";
    prop_oneof![
        word.prop_map(String::from),
        Just("|".to_string()),
        Just("\\|".to_string()),
        Just("\\*".to_string()),
        Just("\\_".to_string()),
        Just("\\\\".to_string()),
        Just("\\#".to_string()),
        Just("\\-".to_string()),
        Just("\\>".to_string()),
        Just("1\\.".to_string()),
        (word, word).prop_map(|(a, b)| format!("{a}_{b}")),
        (word, word).prop_map(|(a, b)| format!("*{a}*_{b}_")),
        (word, word).prop_map(|(a, b)| format!("_{a}_*{b}*")),
        (word, word).prop_map(|(a, b)| format!("**{a}**__{b}__")),
    ]
}

/// Paragraphs of punctuated lines, optionally inside a list item or quote
fn punctuated_content_strategy() -> impl Strategy<Value = String> {
    let line = prop::collection::vec(punctuated_fragment(), 1..6).prop_map(|parts| parts.join(" "));
    let paragraph = prop::collection::vec(line, 1..4);
    let block = (paragraph, 0..3usize).prop_map(|(lines, container)| match container {
        0 => lines.join("\n"),
        1 => format!("- x\n\n  {}", lines.join("\n  ")),
        _ => format!("> {}", lines.join("\n> ")),
    });
    prop::collection::vec(block, 1..5).prop_map(|blocks| blocks.join("\n\n"))
}

fn markdown_content_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(markdown_line_strategy(), 0..20).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn formatting_is_idempotent(source in markdown_content_strategy()) {
        let once = format_source(&source).unwrap();
        prop_assert!(!once.fell_back);
        let twice = format_source(&once.content).unwrap();
        prop_assert_eq!(&once.content, &twice.content, "input:\n{}", source);
    }

    #[test]
    fn punctuated_text_is_idempotent(source in punctuated_content_strategy()) {
        let once = format_source(&source).unwrap();
        let twice = format_source(&once.content).unwrap();
        prop_assert_eq!(&once.content, &twice.content, "input:\n{}", source);
    }

    #[test]
    fn output_has_clean_whitespace(source in "[ -~\t\n\u{a0}é中]{0,200}") {
        let output = format_source(&source).unwrap().content;
        prop_assert!(output.ends_with('\n'));
        prop_assert!(!output.ends_with("\n\n") || output == "\n");
        for line in output.split('\n') {
            prop_assert!(!line.ends_with(' ') && !line.ends_with('\t'), "line {:?} in {:?}", line, output);
        }
    }
}

#[test]
fn test_pipe_and_emphasis_edge_cases_are_idempotent() {
    let cases = [
        "\\| a |\n\\|---|\n",
        "a\n\\| b |\n\\| - |\n",
        "- x\n\n  \\| a |\n  \\|---|\n",
        "*a*_b_\n",
        "**a**__b__ and _c_*d*\n",
    ];
    for source in cases {
        let once = format_source(source).unwrap().content;
        let twice = format_source(&once).unwrap().content;
        assert_eq!(once, twice, "input: {source:?}");
    }
    assert_eq!(format_source("*a*_b_\n").unwrap().content, "*a*_b_\n");
    assert_eq!(
        format_source("a\n\\| b |\n\\| - |\n").unwrap().content,
        "a\n\\| b \\|\n\\| - \\|\n"
    );
}
