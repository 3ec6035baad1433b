//! Variant Compiler: Free and Plus editions from one annotated source tree
//!
//! Plus-only code is marked in the sources with a pair of region markers and
//! guarded at runtime by feature-gate calls. The Free edition is produced by
//! copying the project and patching the copy line by line: marked regions are
//! commented out, gate calls become `false` and the gate import disappears.
//! Both copies are then handed to an external build tool and, optionally, an
//! obfuscator.
//!
//! # Architecture
//!
//! - [`filetype`] picks the comment syntax for a file.
//! - [`patcher`] is the line-based rewriting engine.
//! - [`tree`] copies and prunes variant directories.
//! - [`toolchain`] runs the build tool and the obfuscator.
//! - [`pipeline`] sequences all of the above for both variants.
//!
//! # Example
//!
//! ```
//! use variant_compiler::{patch_text, CompilerConfig, FileType, PatchRules};
//!
//! let rules = PatchRules::from_config(&CompilerConfig::default()).unwrap();
//! let input = "x();\n/*Daddy start*/\npremiumCall();\n/*Daddy end*/\n";
//! let outcome = patch_text(input, FileType::Java, &rules);
//!
//! assert_eq!(
//!     outcome.text,
//!     "x();\n/*Daddy start*/\n//premiumCall();\n/*Daddy end*/\n"
//! );
//! assert_eq!(outcome.stats.lines_commented, 1);
//! ```

pub mod config;
pub mod console;
pub mod filetype;
pub mod patcher;
pub mod pipeline;
pub mod toolchain;
pub mod tree;
pub mod variant;

// Re-exports
pub use config::{load_from_path, load_from_str, load_or_default, CompilerConfig, ConfigError};
pub use filetype::FileType;
pub use patcher::{
    patch_file, patch_text, patch_tree, FilePatch, PatchError, PatchOutcome, PatchRules,
    PatchStats, TreeSummary,
};
pub use pipeline::{resolve_source, Phase, Pipeline, PipelineError, RunReport};
pub use toolchain::{find_executable, substitute_version, ExternalToolchain, ToolError, Toolchain};
pub use tree::TreeError;
pub use variant::Variant;
