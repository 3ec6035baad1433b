//! External build tool and obfuscator invocation.
//!
//! Both tools are opaque: they are started with inherited stdio, awaited to
//! completion, and judged only by their exit status. There is no timeout.

use crate::config::CompilerConfig;
use crate::variant::Variant;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("could not find executable '{name}' on PATH")]
    ExecutableNotFound { name: String },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed { program: PathBuf, status: ExitStatus },

    #[error("{tool} was not located; it is disabled in the configuration")]
    Unavailable { tool: &'static str },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The two external collaborators the pipeline drives.
pub trait Toolchain {
    /// Run the build against the descriptor file of a variant.
    fn build(&mut self, variant: Variant, descriptor: &Path) -> Result<(), ToolError>;

    /// Run the obfuscator jar with a variant's profile from `work_dir`.
    fn obfuscate(
        &mut self,
        variant: Variant,
        work_dir: &Path,
        jar: &Path,
        profile: &Path,
    ) -> Result<(), ToolError>;
}

/// Toolchain backed by real processes found on `PATH`.
#[derive(Debug, Clone)]
pub struct ExternalToolchain {
    build_program: PathBuf,
    build_args: Vec<String>,
    goals: Vec<String>,
    jvm: Option<PathBuf>,
    jvm_args: Vec<String>,
}

impl ExternalToolchain {
    /// Resolve every program the configuration needs.
    ///
    /// Called before any filesystem mutation so a missing tool aborts the
    /// run early.
    pub fn locate(config: &CompilerConfig) -> Result<Self, ToolError> {
        let build_program = find_executable(&config.build.program)?;
        let jvm = if config.obfuscation.enabled {
            Some(find_executable(&config.obfuscation.program)?)
        } else {
            None
        };

        Ok(Self {
            build_program,
            build_args: config.build.args.clone(),
            goals: config.build.goals.clone(),
            jvm,
            jvm_args: config.obfuscation.jvm_args.clone(),
        })
    }
}

impl Toolchain for ExternalToolchain {
    fn build(&mut self, _variant: Variant, descriptor: &Path) -> Result<(), ToolError> {
        let mut command = Command::new(&self.build_program);
        command.arg("-f").arg(descriptor).args(&self.build_args).args(&self.goals);
        if let Some(dir) = descriptor.parent() {
            command.current_dir(dir);
        }

        run(command, &self.build_program)
    }

    fn obfuscate(
        &mut self,
        _variant: Variant,
        work_dir: &Path,
        jar: &Path,
        profile: &Path,
    ) -> Result<(), ToolError> {
        let jvm = self
            .jvm
            .as_ref()
            .ok_or(ToolError::Unavailable { tool: "obfuscator" })?;

        let mut profile_arg = OsString::from("@");
        profile_arg.push(profile);

        let mut command = Command::new(jvm);
        command
            .current_dir(work_dir)
            .args(&self.jvm_args)
            .arg("-jar")
            .arg(jar)
            .arg(profile_arg);

        run(command, jvm)
    }
}

fn run(mut command: Command, program: &Path) -> Result<(), ToolError> {
    let status = command.status().map_err(|source| ToolError::Spawn {
        program: program.to_path_buf(),
        source,
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(ToolError::Failed {
            program: program.to_path_buf(),
            status,
        })
    }
}

/// Find an executable by name on `PATH`.
///
/// A name containing a path separator is checked as-is instead.
pub fn find_executable(name: &str) -> Result<PathBuf, ToolError> {
    let not_found = || ToolError::ExecutableNotFound {
        name: name.to_string(),
    };

    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return is_executable(candidate)
            .then(|| candidate.to_path_buf())
            .ok_or_else(not_found);
    }

    let path_var = env::var_os("PATH").unwrap_or_default();
    find_in_dirs(name, env::split_paths(&path_var)).ok_or_else(not_found)
}

fn find_in_dirs(name: &str, dirs: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    let extensions: &[&str] = if cfg!(windows) {
        &["", ".exe", ".cmd", ".bat"]
    } else {
        &[""]
    };

    dirs.into_iter()
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| {
            extensions
                .iter()
                .map(move |ext| dir.join(format!("{name}{ext}")))
        })
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Replace every `placeholder` in `profile` with `version`, in place.
///
/// Returns the number of replacements; the file is not rewritten when there
/// are none.
pub fn substitute_version(
    profile: &Path,
    placeholder: &str,
    version: &str,
) -> Result<usize, ToolError> {
    let io_err = |source| ToolError::Io {
        path: profile.to_path_buf(),
        source,
    };

    if placeholder.is_empty() {
        return Ok(0);
    }

    let content = fs::read_to_string(profile).map_err(io_err)?;
    let count = content.matches(placeholder).count();
    if count > 0 {
        fs::write(profile, content.replace(placeholder, version)).map_err(io_err)?;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_version() {
        let temp = tempfile::tempdir().unwrap();
        let profile = temp.path().join("plus.pro");
        fs::write(
            &profile,
            "-injars target/Plugin-${project.version}.jar\n-outjars out/Plugin-${project.version}.jar\n",
        )
        .unwrap();

        let count = substitute_version(&profile, "${project.version}", "2.4.1").unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            fs::read_to_string(&profile).unwrap(),
            "-injars target/Plugin-2.4.1.jar\n-outjars out/Plugin-2.4.1.jar\n"
        );
    }

    #[test]
    fn test_substitute_version_without_placeholder() {
        let temp = tempfile::tempdir().unwrap();
        let profile = temp.path().join("free.pro");
        fs::write(&profile, "-dontwarn\n").unwrap();

        assert_eq!(substitute_version(&profile, "${project.version}", "1.0").unwrap(), 0);
        assert_eq!(fs::read_to_string(&profile).unwrap(), "-dontwarn\n");
    }

    #[test]
    fn test_substitute_version_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let result = substitute_version(&temp.path().join("none.pro"), "${project.version}", "1");
        assert!(matches!(result, Err(ToolError::Io { .. })));
    }

    #[test]
    fn test_find_executable_missing() {
        let result = find_executable("definitely-not-a-real-tool-3f9a");
        assert!(matches!(result, Err(ToolError::ExecutableNotFound { .. })));
    }

    #[test]
    #[cfg(unix)]
    fn test_find_in_dirs() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let empty = temp.path().join("empty");
        let bin = temp.path().join("bin");
        fs::create_dir_all(&empty).unwrap();
        fs::create_dir_all(&bin).unwrap();

        let tool = bin.join("mvn");
        fs::write(&tool, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

        let plain = bin.join("readme");
        fs::write(&plain, "not executable").unwrap();
        fs::set_permissions(&plain, fs::Permissions::from_mode(0o644)).unwrap();

        assert_eq!(
            find_in_dirs("mvn", vec![empty.clone(), bin.clone()]),
            Some(tool.clone())
        );
        assert_eq!(find_in_dirs("readme", vec![empty, bin]), None);
        assert_eq!(find_executable(tool.to_str().unwrap()).unwrap(), tool);
    }

    #[test]
    fn test_locate_fails_on_missing_build_tool() {
        let mut config = CompilerConfig::default();
        config.build.program = "definitely-not-a-real-tool-3f9a".to_string();
        let err = ExternalToolchain::locate(&config).unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-real-tool-3f9a"));
    }

    #[test]
    #[cfg(unix)]
    fn test_failed_build_reports_status() {
        let mut config = CompilerConfig::default();
        config.build.program = "false".to_string();
        config.obfuscation.enabled = false;

        // `false` is present on any unix PATH and always exits 1.
        let Ok(mut tools) = ExternalToolchain::locate(&config) else {
            return;
        };
        let temp = tempfile::tempdir().unwrap();
        let err = tools
            .build(Variant::Plus, &temp.path().join("pom.xml"))
            .unwrap_err();
        assert!(matches!(err, ToolError::Failed { .. }));

        let err = tools
            .obfuscate(
                Variant::Plus,
                temp.path(),
                Path::new("proguard.jar"),
                Path::new("plus.pro"),
            )
            .unwrap_err();
        assert!(matches!(err, ToolError::Unavailable { .. }));
    }
}
