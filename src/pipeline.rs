//! Variant pipeline: copy, patch, build and obfuscate both editions.
//!
//! Every phase runs to completion before the next starts. The first error
//! aborts the run; whatever was already written to disk stays there.

use crate::config::CompilerConfig;
use crate::console;
use crate::filetype::FileType;
use crate::patcher::{self, FilePatch, PatchError, PatchRules, TreeSummary};
use crate::toolchain::{substitute_version, ToolError, Toolchain};
use crate::tree::{self, TreeError};
use crate::variant::Variant;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// External phase that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Build,
    Obfuscate,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Build => f.write_str("build"),
            Phase::Obfuscate => f.write_str("obfuscation"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Directory {} not found.", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error("{variant} {phase} failed: {source}")]
    Tool {
        variant: Variant,
        phase: Phase,
        source: ToolError,
    },
}

/// Resolve `dir` against `cwd` and make sure it is an existing directory.
pub fn resolve_source(cwd: &Path, dir: &Path) -> Result<PathBuf, PipelineError> {
    let path = cwd.join(dir);
    if !path.is_dir() {
        return Err(PipelineError::DirectoryNotFound { path });
    }
    path.canonicalize()
        .map_err(|source| PipelineError::Io { path, source })
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub source: PathBuf,
    pub plus_dir: PathBuf,
    pub free_dir: PathBuf,
    /// Free-only assets deleted from the Free tree
    pub removed: Vec<PathBuf>,
    pub patch: TreeSummary,
    /// Free files with a marked region but no comment syntax; those lines
    /// are still active
    pub uncommented: Vec<PathBuf>,
    pub built: Vec<Variant>,
    pub obfuscated: Vec<Variant>,
}

impl RunReport {
    pub fn dir(&self, variant: Variant) -> &Path {
        match variant {
            Variant::Free => &self.free_dir,
            Variant::Plus => &self.plus_dir,
        }
    }
}

pub struct Pipeline<'a> {
    config: &'a CompilerConfig,
    rules: PatchRules,
    show_diff: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a CompilerConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            config,
            rules: PatchRules::from_config(config)?,
            show_diff: false,
        })
    }

    /// Print a unified diff for every rewritten Free file.
    pub fn show_diff(mut self, show_diff: bool) -> Self {
        self.show_diff = show_diff;
        self
    }

    /// Run the whole pipeline for `source`, resolved against the current
    /// directory.
    ///
    /// Without `tools` the run stops after the patch pass.
    pub fn run(
        &self,
        source: &Path,
        version: Option<&str>,
        tools: Option<&mut dyn Toolchain>,
    ) -> Result<RunReport, PipelineError> {
        let cwd = env::current_dir().map_err(|source| PipelineError::Io {
            path: PathBuf::from("."),
            source,
        })?;
        let source = resolve_source(&cwd, source)?;
        let plus_dir = Variant::Plus.output_dir(&source);
        let free_dir = Variant::Free.output_dir(&source);

        console::banner("Cleaning up old build directories...");
        tree::remove_dir_if_exists(&free_dir)?;
        tree::remove_dir_if_exists(&plus_dir)?;
        console::done();

        console::banner("Copying source code...");
        let entries = self.config.layout.entries();
        for variant in Variant::ALL {
            let missing = tree::materialize(&source, &variant.output_dir(&source), &entries)?;
            if variant == Variant::Plus {
                for entry in missing {
                    console::warn(&format!("{entry} not found in {}", source.display()));
                }
            }
        }
        console::done();

        console::banner("Removing files from free version...");
        let removed = tree::delete_paths(&free_dir, &self.config.layout.free_only)?;
        for path in &removed {
            console::note(&format!("Removed {}", path.display()));
        }
        console::done();

        console::banner("Patching source code for free version...");
        let mut uncommented = Vec::new();
        let patch = patcher::patch_tree(&free_dir, &self.rules, |path, result| {
            let stats = result.stats();
            console::file_stats(path, &self.config.gate.call, stats);
            if stats.lines_commented > 0 && !FileType::classify(path).supports_comments() {
                console::warn(&format!(
                    "{}: marked region left active, no comment syntax for this file type",
                    path.display()
                ));
                uncommented.push(path.to_path_buf());
            }
            if self.show_diff {
                if let FilePatch::Rewritten { before, after, .. } = result {
                    console::diff(path, before, after);
                }
            }
        })?;
        console::done();

        let mut report = RunReport {
            source,
            plus_dir,
            free_dir,
            removed,
            patch,
            uncommented,
            built: Vec::new(),
            obfuscated: Vec::new(),
        };

        let Some(tools) = tools else {
            console::note("Skipping build and obfuscation.");
            return Ok(report);
        };

        for variant in Variant::ALL {
            let dir = report.dir(variant).to_path_buf();
            self.build_variant(variant, &dir, version, tools, &mut report)?;
        }

        Ok(report)
    }

    fn build_variant(
        &self,
        variant: Variant,
        dir: &Path,
        version: Option<&str>,
        tools: &mut dyn Toolchain,
        report: &mut RunReport,
    ) -> Result<(), PipelineError> {
        let tool_err = move |phase: Phase| move |source: ToolError| PipelineError::Tool {
            variant,
            phase,
            source,
        };

        console::banner(&format!("Compiling {variant} version..."));
        let descriptor = dir.join(&self.config.layout.build_descriptor);
        tools
            .build(variant, &descriptor)
            .map_err(tool_err(Phase::Build))?;
        report.built.push(variant);
        console::done();

        let obfuscation = &self.config.obfuscation;
        let Some(assets) = self.config.layout.obfuscation_dir.as_deref() else {
            return Ok(());
        };
        if !obfuscation.enabled {
            return Ok(());
        }

        let assets = dir.join(assets);
        let profile = assets.join(variant.profile_name(obfuscation));
        if !profile.is_file() {
            console::warn(&format!(
                "No obfuscation profile at {}, skipping obfuscation",
                profile.display()
            ));
            return Ok(());
        }

        console::banner(&format!("Obfuscating {variant} version..."));
        match version {
            Some(version) => {
                let count = substitute_version(&profile, &obfuscation.placeholder, version)
                    .map_err(tool_err(Phase::Obfuscate))?;
                console::note(&format!(
                    "Substituted {} with {version} ({count} occurrences)",
                    obfuscation.placeholder
                ));
            }
            None => console::warn(&format!(
                "No version given, {} left unchanged",
                obfuscation.placeholder
            )),
        }

        tools
            .obfuscate(variant, dir, &assets.join(&obfuscation.jar), &profile)
            .map_err(tool_err(Phase::Obfuscate))?;
        report.obfuscated.push(variant);
        console::done();

        Ok(())
    }
}
