use crate::config::Obfuscation;
use std::fmt;
use std::path::{Path, PathBuf};

/// One of the two editions built from a source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Free,
    Plus,
}

impl Variant {
    /// Build order: Plus first, then Free.
    pub const ALL: [Variant; 2] = [Variant::Plus, Variant::Free];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Free => "Free",
            Variant::Plus => "Plus",
        }
    }

    /// Output directory for this variant: a sibling of `source` whose name
    /// is the source directory's name followed by ` Free` or ` Plus`.
    pub fn output_dir(self, source: &Path) -> PathBuf {
        let mut name = source
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(" ");
        name.push(self.name());
        source.with_file_name(name)
    }

    /// File name of this variant's obfuscation profile.
    pub fn profile_name(self, obfuscation: &Obfuscation) -> &str {
        match self {
            Variant::Free => &obfuscation.free_profile,
            Variant::Plus => &obfuscation.plus_profile,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
