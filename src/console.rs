//! Console progress output.

use crate::patcher::PatchStats;
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::path::Path;

const BANNER_WIDTH: usize = 80;

/// `"[ text ]"` centered in a line of `=`.
pub fn banner_line(text: &str) -> String {
    format!("{:=^width$}", format!("[ {text} ]"), width = BANNER_WIDTH)
}

pub fn banner(text: &str) {
    println!("{}", banner_line(text).bold());
}

pub fn done() {
    println!("{}", "Done.".green());
}

pub fn note(message: &str) {
    println!("{}", message.dimmed());
}

pub fn warn(message: &str) {
    eprintln!("{}", format!("Warning: {message}").yellow());
}

/// Per-file patch counters, one line per non-zero counter.
pub fn file_stats(file: &Path, gate_call: &str, stats: PatchStats) {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| file.to_string_lossy());

    if stats.gates_neutralized > 0 {
        println!(
            "{}: Replaced {} {}(...) checks with false",
            name,
            stats.gates_neutralized.to_string().cyan(),
            gate_call
        );
    }
    if stats.lines_commented > 0 {
        println!(
            "{}: Commented out {} lines",
            name,
            stats.lines_commented.to_string().cyan()
        );
    }
}

const DIFF_CONTEXT: usize = 2;

/// Hunk-based unified diff of a Free file against its Plus original, one
/// entry per output line, uncolored.
pub fn diff_lines(file: &Path, original: &str, modified: &str) -> Vec<String> {
    let text_diff = TextDiff::from_lines(original, modified);
    let mut lines = vec![
        format!("--- {} (plus)", file.display()),
        format!("+++ {} (free)", file.display()),
    ];

    let mut unified = text_diff.unified_diff();
    unified.context_radius(DIFF_CONTEXT);
    for hunk in unified.iter_hunks() {
        lines.push(hunk.header().to_string());
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => '-',
                ChangeTag::Insert => '+',
                ChangeTag::Equal => ' ',
            };
            lines.push(format!("{sign}{}", change.value().trim_end_matches(['\r', '\n'])));
        }
    }

    lines
}

pub fn diff(file: &Path, original: &str, modified: &str) {
    println!();
    for (i, line) in diff_lines(file, original, modified).into_iter().enumerate() {
        let styled = match line.chars().next() {
            _ if i < 2 => line.dimmed(),
            Some('@') => line.cyan(),
            Some('-') => line.red(),
            Some('+') => line.green(),
            _ => line.normal(),
        };
        println!("{styled}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_is_centered() {
        let line = banner_line("Copying source code...");
        assert_eq!(line.chars().count(), BANNER_WIDTH);
        assert!(line.starts_with("===="));
        assert!(line.ends_with("===="));
        assert!(line.contains("[ Copying source code... ]"));
    }

    #[test]
    fn test_banner_longer_than_width() {
        let text = "x".repeat(100);
        assert_eq!(banner_line(&text), format!("[ {text} ]"));
    }

    #[test]
    fn test_diff_lines_only_show_changed_hunks() {
        let original = "a\nb\nc\nd\ne\nf\ng\npremium();\nh\n";
        let modified = "a\nb\nc\nd\ne\nf\ng\n//premium();\nh\n";

        let lines = diff_lines(Path::new("Main.java"), original, modified);

        assert_eq!(lines[0], "--- Main.java (plus)");
        assert_eq!(lines[1], "+++ Main.java (free)");
        assert!(lines[2].starts_with("@@"));
        assert!(lines.contains(&"-premium();".to_string()));
        assert!(lines.contains(&"+//premium();".to_string()));
        // Far context is left out
        assert!(!lines.contains(&" a".to_string()));
        assert!(lines.contains(&" f".to_string()));
    }

    #[test]
    fn test_diff_lines_identical_has_no_hunks() {
        let lines = diff_lines(Path::new("A.java"), "x\n", "x\n");
        assert_eq!(lines.len(), 2);
    }
}
