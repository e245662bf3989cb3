//! # zerodep CLI Entry Point
//!
//! Parses arguments with clap and dispatches to the library:
//!
//! - `vendor` - relocate a module into a fresh destination directory
//! - `plan` - show what `vendor` would do, without writing anything
//! - `completion` - print a shell completion script

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use zerodep::config::{FileConfig, VendorConfig};
use zerodep::imports::ReferenceClass;
use zerodep::ui;
use zerodep::vendor::{self, Action, Plan, VendorReport};

#[derive(Parser)]
#[command(name = "zerodep")]
#[command(about = "Vendor a Go module into another project with zero dependencies", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Root of the module to relocate (must contain go.mod)
    #[arg(long)]
    src: PathBuf,
    /// New module path for the copy [default: keep the original]
    #[arg(long = "mod", default_value = "")]
    module: String,
    /// Directory external packages are nested under [default: zero-dep-vendor]
    #[arg(long)]
    vendor: Option<String>,
    /// Extra directory (relative to --src) to leave out; repeatable
    #[arg(long)]
    exclude: Vec<String>,
    /// Read defaults from a zerodep.toml file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy a module into a new directory, rewriting its imports
    Vendor {
        #[command(flatten)]
        source: SourceArgs,
        /// Destination directory (must not exist)
        #[arg(long)]
        dst: PathBuf,
        /// List every file as it is written
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show the rewrites `vendor` would perform
    Plan {
        #[command(flatten)]
        source: SourceArgs,
        /// Emit the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completion {
        /// Target shell (bash, zsh, fish, powershell, elvish)
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Vendor {
            source,
            dst,
            verbose,
        } => run_vendor(&source, &dst, verbose),
        Commands::Plan { source, json } => run_plan(&source, json),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
    }
}

fn load_config(args: &SourceArgs) -> Result<VendorConfig> {
    let mut config = VendorConfig::new(&args.src)?;

    if let Some(path) = &args.config {
        let file = FileConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        config = config.with_file(&file)?;
    }
    if !args.module.is_empty() {
        config = config.with_module(args.module.as_str())?;
    }
    if let Some(dir) = &args.vendor {
        config = config.with_vendor_dir(dir.as_str())?;
    }

    Ok(config.with_excludes(&args.exclude))
}

fn run_vendor(args: &SourceArgs, dst: &Path, verbose: bool) -> Result<()> {
    let config = load_config(args)?;

    println!(
        "{} Vendoring {} into {}...",
        "📦".blue(),
        config.source_root.display(),
        dst.display()
    );

    let pb = if verbose || !console::Term::stdout().is_term() {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        pb
    };

    let result = vendor::run(&config, dst, &pb);
    pb.finish_and_clear();
    let report =
        result.with_context(|| format!("Failed to vendor {}", config.source_root.display()))?;

    if verbose {
        print_files(&report);
    }
    print_summary(&report);

    println!(
        "{} Vendored {} as {}",
        "✓".green(),
        report.original_identity.bold(),
        report.effective_identity.bold().green()
    );
    Ok(())
}

fn print_files(report: &VendorReport) {
    for file in &report.files {
        let dest = file.dest.as_deref().unwrap_or("-");
        match &file.action {
            Action::Rewritten(changes) => {
                println!("   {} {} ({} imports)", "~".yellow(), dest, changes.len());
                for change in changes {
                    println!(
                        "       {} {} -> {}",
                        format!("{}:", change.line).dimmed(),
                        change.from.dimmed(),
                        change.to
                    );
                }
            }
            Action::Unchanged => println!("   {} {}", "=".dimmed(), dest),
            Action::Copied => println!("   {} {}", "+".green(), dest),
            Action::Skipped => println!("   {} {}", "-".dimmed(), file.rel.dimmed()),
        }
    }
}

fn print_summary(report: &VendorReport) {
    let mut table = ui::Table::new(&["Metric", "Count"]);
    table.add_row(vec![
        "Go files".dimmed().to_string(),
        report.sources().to_string(),
    ]);
    table.add_row(vec![
        "Go files rewritten".green().to_string(),
        report.rewritten_files().to_string(),
    ]);
    table.add_row(vec![
        "Imports rewritten".green().to_string(),
        report.rewritten_imports().to_string(),
    ]);
    table.add_row(vec![
        "Files copied".dimmed().to_string(),
        report.copied().to_string(),
    ]);
    table.add_row(vec![
        "Skipped".dimmed().to_string(),
        report.skipped().to_string(),
    ]);
    table.print();
}

fn run_plan(args: &SourceArgs, json: bool) -> Result<()> {
    let config = load_config(args)?;
    let plan = vendor::plan(&config)
        .with_context(|| format!("Failed to plan {}", config.source_root.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    print_plan(&plan);
    Ok(())
}

fn print_plan(plan: &Plan) {
    println!(
        "{} {} -> {}",
        "📦".blue(),
        plan.original_identity.bold(),
        plan.effective_identity.bold().green()
    );
    println!();
    println!("{}", "go.mod".bold());
    for line in plan.manifest.lines() {
        println!("   {}", line.dimmed());
    }
    println!();

    let moved: Vec<_> = plan
        .files
        .iter()
        .filter(|f| f.to.as_deref().is_some_and(|to| to != f.from))
        .collect();
    if !moved.is_empty() {
        println!("{} {} files move under the vendor directory", "!".yellow(), moved.len());
    }

    let mut table = ui::Table::new(&["File", "Import", "Class", "Rewritten To"]);
    for import in &plan.imports {
        let class = match import.class {
            ReferenceClass::StandardLibrary => import.class.to_string().dimmed().to_string(),
            ReferenceClass::SelfReferential => import.class.to_string().cyan().to_string(),
            ReferenceClass::External => import.class.to_string().yellow().to_string(),
        };
        let to = if import.from == import.to {
            "(unchanged)".dimmed().to_string()
        } else {
            import.to.clone()
        };
        table.add_row(vec![
            format!("{}:{}", import.file, import.line),
            import.from.clone(),
            class,
            to,
        ]);
    }

    if table.is_empty() {
        println!("{} No imports found.", "ℹ".blue());
    } else {
        table.print();
    }

    println!(
        "{} {} of {} imports would be rewritten.",
        "✓".green(),
        plan.changes().count(),
        plan.imports.len()
    );
}
