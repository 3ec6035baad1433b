use serde::Deserialize;
use std::fmt;

/// Top-level compiler configuration, usually read from `variants.toml`.
///
/// Every section is optional; missing sections fall back to the defaults the
/// plugin sources were written against.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    #[serde(default)]
    pub markers: Markers,
    #[serde(default)]
    pub gate: Gate,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub build: Build,
    #[serde(default)]
    pub obfuscation: Obfuscation,
}

impl CompilerConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.markers.start.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "markers.start",
            });
        }
        if self.markers.end.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "markers.end",
            });
        }
        if !self.markers.start.is_empty() && self.markers.start == self.markers.end {
            issues.push(ValidationIssue::InvalidCombo {
                message: "markers.start and markers.end must differ".to_string(),
            });
        }

        if self.gate.call.trim().is_empty() {
            issues.push(ValidationIssue::MissingField { field: "gate.call" });
        }

        if self.layout.build_descriptor.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "layout.build_descriptor",
            });
        }
        if self.layout.source_dir.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "layout.source_dir",
            });
        }
        for path in &self.layout.free_only {
            if path.trim().is_empty() || path.split(['/', '\\']).any(|part| part == "..") {
                issues.push(ValidationIssue::InvalidPath {
                    field: "layout.free_only",
                    path: path.clone(),
                });
            }
        }

        if self.build.program.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "build.program",
            });
        }
        if self.build.goals.is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "build.goals",
            });
        }

        if self.obfuscation.enabled {
            if self.obfuscation.program.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    field: "obfuscation.program",
                });
            }
            if self.obfuscation.jar.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    field: "obfuscation.jar",
                });
            }
            if self.layout.obfuscation_dir.is_none() {
                issues.push(ValidationIssue::InvalidCombo {
                    message: "obfuscation is enabled but layout.obfuscation_dir is not set"
                        .to_string(),
                });
            }
            if self.obfuscation.free_profile == self.obfuscation.plus_profile {
                issues.push(ValidationIssue::InvalidCombo {
                    message: "obfuscation.free_profile and obfuscation.plus_profile must differ"
                        .to_string(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// Region markers delimiting Plus-only code.
#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Markers {
    pub start: String,
    pub end: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            start: "/*Daddy start*/".to_string(),
            end: "/*Daddy end*/".to_string(),
        }
    }
}

/// The feature-gate check neutralized in the Free edition.
#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Gate {
    /// Qualified call name, matched literally and followed by `(...)`
    pub call: String,
    /// Import line dropped from Free sources
    pub import: String,
}

impl Default for Gate {
    fn default() -> Self {
        Self {
            call: "Stepsister.allows".to_string(),
            import: "import de.jeff_media.daddy.Stepsister;".to_string(),
        }
    }
}

/// What gets copied into each variant directory.
#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    pub build_descriptor: String,
    pub source_dir: String,
    pub obfuscation_dir: Option<String>,
    /// Paths relative to the variant root removed from the Free tree
    pub free_only: Vec<String>,
}

impl Layout {
    /// Entries copied from the source directory into each variant.
    pub fn entries(&self) -> Vec<&str> {
        let mut entries = vec![self.build_descriptor.as_str(), self.source_dir.as_str()];
        if let Some(dir) = &self.obfuscation_dir {
            entries.push(dir.as_str());
        }
        entries
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            build_descriptor: "pom.xml".to_string(),
            source_dir: "src".to_string(),
            obfuscation_dir: Some("obfuscation".to_string()),
            free_only: vec!["src/main/resources/discord-verification.html".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Build {
    pub program: String,
    pub goals: Vec<String>,
    /// Extra arguments placed before the goals (e.g. `-B`, `-q`)
    pub args: Vec<String>,
}

impl Default for Build {
    fn default() -> Self {
        Self {
            program: "mvn".to_string(),
            goals: vec![
                "clean".to_string(),
                "compile".to_string(),
                "package".to_string(),
            ],
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Obfuscation {
    pub enabled: bool,
    /// JVM launcher used to run the obfuscator jar
    pub program: String,
    pub jvm_args: Vec<String>,
    /// Obfuscator jar, relative to the variant's obfuscation directory
    pub jar: String,
    pub free_profile: String,
    pub plus_profile: String,
    pub placeholder: String,
}

impl Default for Obfuscation {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "java".to_string(),
            jvm_args: vec!["-Xms512m".to_string(), "-Xmx2g".to_string()],
            jar: "proguard.jar".to_string(),
            free_profile: "free.pro".to_string(),
            plus_profile: "plus.pro".to_string(),
            placeholder: "${project.version}".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    MissingField { field: &'static str },
    InvalidPath { field: &'static str, path: String },
    InvalidCombo { message: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => {
                write!(f, "missing or empty required field '{field}'")
            }
            ValidationIssue::InvalidPath { field, path } => {
                write!(f, "'{field}' contains invalid relative path '{path}'")
            }
            ValidationIssue::InvalidCombo { message } => {
                write!(f, "invalid configuration: {message}")
            }
        }
    }
}
