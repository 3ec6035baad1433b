//! File classification by name.
//!
//! The patcher needs to know how to comment out a line in a given file. Only
//! two languages are recognised; everything else passes through unchanged.

use std::path::Path;

/// Comment syntax used when stripping a line from a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// `.java` sources: end-of-line `//` comments
    Java,
    /// `.xml` resources and descriptors: `<!-- ... -->`
    Xml,
    /// Anything else: no comment support, lines are emitted as-is
    Unknown,
}

impl FileType {
    /// Classify a file by the suffix of its name.
    ///
    /// Matching is case-sensitive and looks at the whole file name, so a file
    /// literally named `.java` is still treated as Java.
    pub fn classify(path: impl AsRef<Path>) -> Self {
        let Some(name) = path.as_ref().file_name().and_then(|n| n.to_str()) else {
            return FileType::Unknown;
        };

        if name.ends_with(".java") {
            FileType::Java
        } else if name.ends_with(".xml") {
            FileType::Xml
        } else {
            FileType::Unknown
        }
    }

    pub fn start_token(self) -> &'static str {
        match self {
            FileType::Java => "//",
            FileType::Xml => "<!--",
            FileType::Unknown => "",
        }
    }

    pub fn end_token(self) -> &'static str {
        match self {
            FileType::Xml => "-->",
            FileType::Java | FileType::Unknown => "",
        }
    }

    /// Whether stripped lines are actually disabled in this file type.
    pub fn supports_comments(self) -> bool {
        !matches!(self, FileType::Unknown)
    }
}
