//! Region patcher: turns a Plus source file into its Free counterpart.
//!
//! Works on raw text, one line at a time. Nothing here understands the
//! language being patched; markers and gate calls are found by substring and
//! regex matching only.

use crate::config::CompilerConfig;
use crate::filetype::FileType;
use regex::{NoExpand, Regex};
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Text every gate call is replaced with.
pub const GATE_REPLACEMENT: &str = "false";

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("invalid gate call pattern: {0}")]
    InvalidGate(#[from] regex::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Literal patterns recognised by the patcher.
#[derive(Debug, Clone)]
pub struct PatchRules {
    start_marker: String,
    end_marker: String,
    forbidden_import: Option<String>,
    gate: Regex,
}

impl PatchRules {
    /// Build rules from literal markers, the import line to drop and the
    /// qualified gate call name (e.g. `Stepsister.allows`).
    ///
    /// An empty `forbidden_import` disables import removal.
    pub fn new(
        start_marker: impl Into<String>,
        end_marker: impl Into<String>,
        forbidden_import: impl Into<String>,
        gate_call: &str,
    ) -> Result<Self, PatchError> {
        let forbidden_import = forbidden_import.into();
        let gate = Regex::new(&format!(r"{}\((.*?)\)", regex::escape(gate_call)))?;

        Ok(Self {
            start_marker: start_marker.into(),
            end_marker: end_marker.into(),
            forbidden_import: (!forbidden_import.is_empty()).then_some(forbidden_import),
            gate,
        })
    }

    pub fn from_config(config: &CompilerConfig) -> Result<Self, PatchError> {
        Self::new(
            config.markers.start.as_str(),
            config.markers.end.as_str(),
            config.gate.import.as_str(),
            &config.gate.call,
        )
    }

    fn is_forbidden_import(&self, line: &str) -> bool {
        self.forbidden_import.as_deref() == Some(line)
    }
}

/// Per-file counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchStats {
    /// Lines on which at least one gate call was replaced
    pub gates_neutralized: usize,
    /// Lines inside a marked region
    pub lines_commented: usize,
}

impl PatchStats {
    pub fn is_empty(&self) -> bool {
        self.gates_neutralized == 0 && self.lines_commented == 0
    }
}

impl AddAssign for PatchStats {
    fn add_assign(&mut self, rhs: Self) {
        self.gates_neutralized += rhs.gates_neutralized;
        self.lines_commented += rhs.lines_commented;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub text: String,
    pub stats: PatchStats,
}

/// Patch the full text of one file.
///
/// The end marker is checked before a line is emitted and the start marker
/// after, so marker lines themselves are never commented out. Every emitted
/// line is terminated, using `\r\n` if the input already does.
pub fn patch_text(input: &str, file_type: FileType, rules: &PatchRules) -> PatchOutcome {
    let terminator = if input.contains("\r\n") { "\r\n" } else { "\n" };
    let mut text = String::with_capacity(input.len());
    let mut stats = PatchStats::default();
    let mut inside = false;

    for line in input.lines() {
        if line.contains(rules.end_marker.as_str()) {
            inside = false;
        }

        if rules.is_forbidden_import(line) {
            continue;
        }

        let line = rules.gate.replace_all(line, NoExpand(GATE_REPLACEMENT));
        if matches!(line, Cow::Owned(_)) {
            stats.gates_neutralized += 1;
        }

        if inside {
            stats.lines_commented += 1;
            text.push_str(file_type.start_token());
            text.push_str(&line);
            text.push_str(file_type.end_token());
        } else {
            text.push_str(&line);
        }
        text.push_str(terminator);

        if line.contains(rules.start_marker.as_str()) {
            inside = true;
        }
    }

    PatchOutcome { text, stats }
}

/// What happened to a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePatch {
    /// Content changed and was written back
    Rewritten {
        stats: PatchStats,
        before: String,
        after: String,
    },
    /// Output identical to input; file not touched
    Unchanged { stats: PatchStats },
    /// Not valid UTF-8; left byte-identical
    NotText,
}

impl FilePatch {
    pub fn stats(&self) -> PatchStats {
        match self {
            FilePatch::Rewritten { stats, .. } | FilePatch::Unchanged { stats } => *stats,
            FilePatch::NotText => PatchStats::default(),
        }
    }
}

/// Patch one file in place.
pub fn patch_file(path: &Path, rules: &PatchRules) -> Result<FilePatch, PatchError> {
    let io_err = |source| PatchError::Io {
        path: path.to_path_buf(),
        source,
    };

    let bytes = fs::read(path).map_err(io_err)?;
    let Ok(before) = String::from_utf8(bytes) else {
        return Ok(FilePatch::NotText);
    };

    let PatchOutcome { text: after, stats } = patch_text(&before, FileType::classify(path), rules);
    if after == before {
        return Ok(FilePatch::Unchanged { stats });
    }

    atomic_write(path, after.as_bytes()).map_err(io_err)?;

    Ok(FilePatch::Rewritten {
        stats,
        before,
        after,
    })
}

/// Totals for a whole tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSummary {
    pub files_visited: usize,
    pub files_rewritten: usize,
    pub totals: PatchStats,
    /// Files with non-zero counters, in walk order
    pub per_file: Vec<(PathBuf, PatchStats)>,
}

/// Patch every regular file under `root`, one at a time in file-name order.
///
/// `on_file` is called after each file is processed.
pub fn patch_tree<F>(
    root: &Path,
    rules: &PatchRules,
    mut on_file: F,
) -> Result<TreeSummary, PatchError>
where
    F: FnMut(&Path, &FilePatch),
{
    let mut summary = TreeSummary::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let patch = patch_file(path, rules)?;
        on_file(path, &patch);

        summary.files_visited += 1;
        if matches!(patch, FilePatch::Rewritten { .. }) {
            summary.files_rewritten += 1;
        }
        let stats = patch.stats();
        if !stats.is_empty() {
            summary.totals += stats;
            summary.per_file.push((path.to_path_buf(), stats));
        }
    }

    Ok(summary)
}

/// Atomic file write: tempfile + fsync + rename, keeping the original
/// permissions.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        )
    })?;
    let permissions = fs::metadata(path)?.permissions();

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), permissions)?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
