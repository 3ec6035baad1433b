//! Property tests for the region patcher.

use proptest::prelude::*;
use variant_compiler::{patch_text, CompilerConfig, FileType, PatchRules};

const START: &str = "/*Daddy start*/";
const END: &str = "/*Daddy end*/";
const IMPORT: &str = "import de.jeff_media.daddy.Daddy;";

fn rules() -> PatchRules {
    PatchRules::new(START, END, IMPORT, "Daddy.allows").unwrap()
}

/// Lines that can never contain a marker, gate call or the import.
fn plain_line() -> impl Strategy<Value = String> {
    "[a-z0-9 ;(){}=]{0,24}"
}

/// Input line paired with the line the patcher should emit for it
/// (`None` when the line is dropped), and whether it carries a gate call.
#[derive(Debug, Clone)]
struct Line {
    input: String,
    output: Option<String>,
    gated: bool,
}

fn line_without_markers() -> impl Strategy<Value = Line> {
    prop_oneof![
        4 => plain_line().prop_map(|l| Line {
            output: Some(l.clone()),
            input: l,
            gated: false,
        }),
        2 => ("[a-z ]{0,8}", prop::collection::vec("[A-Z_, ]{0,10}", 1..4)).prop_map(
            |(prefix, args)| {
                let input = args
                    .iter()
                    .map(|arg| format!("{prefix}Daddy.allows({arg})"))
                    .collect::<Vec<_>>()
                    .join(" && ");
                let output = args
                    .iter()
                    .map(|_| format!("{prefix}false"))
                    .collect::<Vec<_>>()
                    .join(" && ");
                Line {
                    input,
                    output: Some(output),
                    gated: true,
                }
            }
        ),
        1 => Just(Line {
            input: IMPORT.to_string(),
            output: None,
            gated: false,
        }),
    ]
}

#[derive(Debug, Clone)]
enum Block {
    Common(Vec<String>),
    Stripped(Vec<String>),
}

fn blocks() -> impl Strategy<Value = Vec<Block>> {
    prop::collection::vec(
        prop_oneof![
            prop::collection::vec(plain_line(), 0..5).prop_map(Block::Common),
            prop::collection::vec(plain_line(), 0..5).prop_map(Block::Stripped),
        ],
        0..6,
    )
}

fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines.iter().map(|l| format!("{}\n", l.as_ref())).collect()
}

proptest! {
    #[test]
    fn files_without_markers_only_lose_imports_and_gates(
        lines in prop::collection::vec(line_without_markers(), 0..20)
    ) {
        let input = join_lines(&lines.iter().map(|l| l.input.as_str()).collect::<Vec<_>>());
        let expected = join_lines(&lines.iter().filter_map(|l| l.output.as_deref()).collect::<Vec<_>>());

        let outcome = patch_text(&input, FileType::Java, &rules());

        prop_assert_eq!(outcome.text, expected);
        prop_assert_eq!(outcome.stats.lines_commented, 0);
        prop_assert_eq!(
            outcome.stats.gates_neutralized,
            lines.iter().filter(|l| l.gated).count()
        );
    }

    #[test]
    fn java_regions_are_commented_line_by_line(blocks in blocks()) {
        let mut input = Vec::new();
        let mut expected = Vec::new();
        let mut stripped = 0;

        for block in &blocks {
            match block {
                Block::Common(lines) => {
                    input.extend(lines.iter().cloned());
                    expected.extend(lines.iter().cloned());
                }
                Block::Stripped(lines) => {
                    input.push(START.to_string());
                    expected.push(START.to_string());
                    for line in lines {
                        input.push(line.clone());
                        expected.push(format!("//{line}"));
                    }
                    input.push(END.to_string());
                    expected.push(END.to_string());
                    stripped += lines.len();
                }
            }
        }

        let outcome = patch_text(&join_lines(&input), FileType::Java, &rules());

        prop_assert_eq!(outcome.text, join_lines(&expected));
        prop_assert_eq!(outcome.stats.lines_commented, stripped);
    }

    #[test]
    fn xml_regions_wrap_each_line(lines in prop::collection::vec(plain_line(), 0..8)) {
        let mut input = vec![format!("<!--{START}-->")];
        input.extend(lines.iter().cloned());
        input.push(format!("<!--{END}-->"));

        let outcome = patch_text(&join_lines(&input), FileType::Xml, &rules());
        let output: Vec<&str> = outcome.text.lines().collect();

        prop_assert_eq!(output.len(), lines.len() + 2);
        prop_assert_eq!(output[0], input[0].as_str());
        prop_assert_eq!(output[output.len() - 1], input[input.len() - 1].as_str());
        for (line, patched) in lines.iter().zip(&output[1..output.len() - 1]) {
            prop_assert_eq!(*patched, format!("<!--{line}-->"));
        }
        prop_assert_eq!(outcome.stats.lines_commented, lines.len());
    }

    #[test]
    fn marker_lines_are_never_wrapped(blocks in blocks()) {
        let mut input = Vec::new();
        for block in &blocks {
            match block {
                Block::Common(lines) => input.extend(lines.iter().cloned()),
                Block::Stripped(lines) => {
                    input.push(format!("x(); {START}"));
                    input.extend(lines.iter().cloned());
                    input.push(format!("{END} y();"));
                }
            }
        }

        let outcome = patch_text(&join_lines(&input), FileType::Java, &rules());

        for line in outcome.text.lines() {
            if line.contains(START) || line.contains(END) {
                prop_assert!(!line.starts_with("//"), "marker line wrapped: {}", line);
            }
        }
    }
}

#[test]
fn stepsister_scenario_from_plugin_sources() {
    let rules = PatchRules::from_config(&CompilerConfig::default()).unwrap();
    let input = join_lines(&[
        "import de.jeff_media.daddy.Stepsister;",
        "x();",
        "/*Daddy start*/",
        "premiumCall();",
        "/*Daddy end*/",
        "y();",
    ]);

    let outcome = patch_text(&input, FileType::Java, &rules);

    assert_eq!(
        outcome.text.lines().collect::<Vec<_>>(),
        vec!["x();", "/*Daddy start*/", "//premiumCall();", "/*Daddy end*/", "y();"]
    );
    assert_eq!(outcome.stats.lines_commented, 1);
    assert_eq!(outcome.stats.gates_neutralized, 0);
}

#[test]
fn stepsister_gate_becomes_false() {
    let rules = PatchRules::from_config(&CompilerConfig::default()).unwrap();
    let outcome = patch_text(
        "if (Stepsister.allows(PREMIUM_X)) { doThing(); }\n",
        FileType::Java,
        &rules,
    );

    assert_eq!(outcome.text, "if (false) { doThing(); }\n");
    assert_eq!(outcome.stats.gates_neutralized, 1);
}
