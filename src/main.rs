use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::env;
use std::path::PathBuf;
use variant_compiler::config::{load_from_path, load_or_default};
use variant_compiler::{resolve_source, ExternalToolchain, Pipeline, Toolchain, Variant};

#[derive(Parser)]
#[command(name = "variant-compiler")]
#[command(about = "Build Free and Plus editions of a plugin from one source tree", long_about = None)]
#[command(version)]
struct Cli {
    /// Plugin project directory, relative to the current directory
    source: PathBuf,

    /// Version substituted for the placeholder in obfuscation profiles
    #[arg(value_name = "VERSION")]
    plugin_version: Option<String>,

    /// Compiler config file (defaults to <SOURCE>/variants.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show unified diff of every patched Free file
    #[arg(short, long)]
    diff: bool,

    /// Stop after patching; do not run the build tool or the obfuscator
    #[arg(long)]
    skip_build: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Resolve the project before touching anything
    let source = resolve_source(&env::current_dir()?, &cli.source)?;

    // 2. Load configuration
    let (config, origin) = match cli.config {
        Some(path) => (load_from_path(&path)?, Some(path)),
        None => load_or_default(&source)?,
    };

    println!("Source: {}", source.display());
    match &origin {
        Some(path) => println!("Config: {}", path.display()),
        None => println!("Config: {}", "built-in defaults".dimmed()),
    }
    match &cli.plugin_version {
        Some(version) => println!("Version: {}", version),
        None => println!("Version: {}", "not set".dimmed()),
    }
    println!();

    // 3. Locate external tools, still before any mutation
    let mut tools = if cli.skip_build {
        None
    } else {
        Some(ExternalToolchain::locate(&config)?)
    };

    // 4. Run
    let pipeline = Pipeline::new(&config)?.show_diff(cli.diff);
    let report = pipeline.run(
        &source,
        cli.plugin_version.as_deref(),
        tools.as_mut().map(|t| t as &mut dyn Toolchain),
    )?;

    // 5. Summary
    println!();
    println!("{}", "Summary:".bold());
    println!(
        "  {} files patched ({} scanned)",
        report.patch.files_rewritten.to_string().green(),
        report.patch.files_visited
    );
    println!(
        "  {} gate checks replaced",
        report.patch.totals.gates_neutralized.to_string().cyan()
    );
    println!(
        "  {} lines commented out",
        report.patch.totals.lines_commented.to_string().cyan()
    );
    for variant in Variant::ALL {
        let status = if report.obfuscated.contains(&variant) {
            "built, obfuscated".green()
        } else if report.built.contains(&variant) {
            "built".green()
        } else {
            "not built".yellow()
        };
        println!(
            "  {}: {} ({})",
            variant,
            report.dir(variant).display(),
            status
        );
    }

    Ok(())
}
