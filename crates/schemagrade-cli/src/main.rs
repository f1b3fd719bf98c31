use clap::{Parser, Subcommand};
use colored::Colorize;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schemagrade_core::{Config, Report, Severity};
use schemagrade_engine::{BatchGrader, BatchSummary, ReconcileOptions, SubmissionOutcome};
use schemagrade_model::{load_model, Model};

/// SchemaGrade - grade conceptual schema diagrams against a solution
#[derive(Parser)]
#[command(name = "schemagrade")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schemagrade.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one submission against the solution
    Grade {
        /// Submission schema document
        submission: PathBuf,

        /// Solution schema document
        #[arg(short, long)]
        solution: PathBuf,

        /// Output file for report.json
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Also output markdown report
        #[arg(short, long)]
        markdown: Option<PathBuf>,
    },

    /// Grade every submission in a directory
    Batch {
        /// Directory of submission documents
        dir: PathBuf,

        /// Solution schema document
        #[arg(short, long)]
        solution: PathBuf,

        /// Directory for per-submission reports (default: next to each submission)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Print a summary of one schema document
    Inspect {
        /// Schema document to inspect
        model: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if Path::new("schemagrade.toml").exists() {
        Config::from_file(Path::new("schemagrade.toml")).context("Failed to load schemagrade.toml")?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    if cli.verbose {
        eprintln!("{} name threshold: {}", "Using".cyan(), config.matching.name_threshold);
    }

    match cli.command {
        Commands::Grade { submission, solution, output, markdown } => {
            grade_command(&config, &submission, &solution, &output, markdown.as_deref(), cli.verbose)
        }
        Commands::Batch { dir, solution, output_dir } => {
            batch_command(&config, &dir, &solution, output_dir.as_deref(), cli.verbose)
        }
        Commands::Inspect { model } => inspect_command(&model, cli.verbose),
    }
}

fn load(path: &Path, verbose: bool) -> Result<Model> {
    if verbose {
        eprintln!("{} {}", "Loading schema from:".cyan(), path.display());
    }

    load_model(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Grade command - reconcile one submission against the solution
fn grade_command(
    config: &Config,
    submission_path: &Path,
    solution_path: &Path,
    output: &Path,
    markdown: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let solution = load(solution_path, verbose)?;
    let submission = load(submission_path, verbose)?;

    if verbose {
        eprintln!("{}", "Reconciling submission against solution...".cyan());
    }

    let grader = BatchGrader::new(solution, ReconcileOptions::from_config(config))
        .with_solution_label(solution_path.display().to_string());
    let report = grader
        .grade_model(submission_path.display().to_string(), &submission)
        .context("Reconciliation failed")?;

    report
        .save_to_file(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if verbose {
        eprintln!("{} {}", "Report saved to:".green(), output.display());
    }

    if let Some(md_path) = markdown {
        std::fs::write(md_path, report.to_markdown())
            .with_context(|| format!("Failed to write {}", md_path.display()))?;
        if verbose {
            eprintln!("{} {}", "Markdown report saved to:".green(), md_path.display());
        }
    }

    print_report_summary(&report);

    // Exit with error code if there are errors
    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Batch command - grade a directory of submissions
fn batch_command(
    config: &Config,
    dir: &Path,
    solution_path: &Path,
    output_dir: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    let solution = load(solution_path, verbose)?;
    let grader = BatchGrader::new(solution, ReconcileOptions::from_config(config))
        .with_solution_label(solution_path.display().to_string());

    let mut paths = BatchGrader::discover(dir, &config.batch);
    // Skip the solution itself and reports from earlier runs
    let solution_canonical = solution_path.canonicalize().ok();
    paths.retain(|p| {
        p.canonicalize().ok() != solution_canonical
            && !p.to_string_lossy().ends_with(".report.json")
    });

    if verbose {
        eprintln!("{} {} submissions in {}", "Found".cyan(), paths.len(), dir.display());
    }

    let summary = grader.grade_all(&paths);

    for result in &summary.results {
        let SubmissionOutcome::Graded { report } = &result.outcome else {
            continue;
        };

        let report_path = report_path_for(&result.path, dir, output_dir);
        if let Some(parent) = report_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        report
            .save_to_file(&report_path)
            .with_context(|| format!("Failed to write {}", report_path.display()))?;

        if verbose {
            eprintln!("  {} {}", "Report saved to:".green(), report_path.display());
        }
    }

    print_batch_summary(&summary);

    Ok(())
}

/// `<stem>.report.json`, next to the submission unless an output directory is given
///
/// Under an output directory the submission's folder relative to `root` is kept,
/// so same-named submissions in different subfolders get distinct reports.
fn report_path_for(submission: &Path, root: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = submission
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "submission".to_string());
    let file_name = format!("{}.report.json", stem);

    match (output_dir, submission.parent()) {
        (Some(out), Some(parent)) => match parent.strip_prefix(root) {
            Ok(relative) => out.join(relative).join(file_name),
            Err(_) => out.join(file_name),
        },
        (Some(out), None) => out.join(file_name),
        (None, Some(parent)) => parent.join(file_name),
        (None, None) => PathBuf::from(file_name),
    }
}

/// Inspect command - print per-category counts of one document
fn inspect_command(path: &Path, verbose: bool) -> Result<()> {
    let model = load(path, verbose)?;
    let summary = model.summary();

    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Schema Summary".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("{} {} ({})", "Model:".bold(), model.name.green(), model.id);
    println!();
    println!("  Entities:          {}", summary.entities);
    println!("  Attributes:        {}", summary.attributes);
    println!("  Identifiers:       {}", summary.identifiers);
    println!("  Relationships:     {}", summary.relationships);
    println!("  Inheritances:      {}", summary.inheritances);
    println!("  Associations:      {}", summary.associations);
    println!("  Association links: {}", summary.association_links);
    println!("  Domains:           {}", summary.domains);
    println!("  Packages:          {}", summary.packages);

    if verbose {
        println!();
        println!("{}", "Entities:".bold());
        for entity in &model.entities {
            let marker = if entity.is_child { " (child)" } else { "" };
            println!(
                "  {}{} - {} attributes, {} identifiers",
                entity.name.yellow(),
                marker,
                entity.attributes.len(),
                entity.identifiers.len()
            );
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());

    Ok(())
}

fn print_report_summary(report: &Report) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Schema Grading Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Submission: {}", report.submission);
    println!("Solution:   {}", report.solution);
    println!("Timestamp:  {}", report.timestamp);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Total diagnostics: {}", report.summary.total);

    if report.summary.errors > 0 {
        println!("  Errors:   {}", format!("{}", report.summary.errors).red().bold());
    } else {
        println!("  Errors:   {}", format!("{}", report.summary.errors).green());
    }

    if report.summary.warnings > 0 {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).yellow());
    } else {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).green());
    }

    println!("  Info:     {}", report.summary.info);
    println!();

    if report.diagnostics.is_empty() {
        println!("{}", "✓ Submission matches the solution!".green().bold());
    } else {
        println!("{}", "Diagnostics:".bold());
        for diag in &report.diagnostics {
            let severity_str = match diag.severity {
                Severity::Error => "ERROR".red().bold(),
                Severity::Warn => "WARN".yellow().bold(),
                Severity::Info => "INFO".cyan(),
            };

            println!("  [{}] {}: {}", severity_str, diag.code, diag.message);

            if let (Some(exp), Some(act)) = (&diag.expected, &diag.actual) {
                println!("    expected: {}", exp.green());
                println!("    actual:   {}", act.red());
            }
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

fn print_batch_summary(summary: &BatchSummary) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Batch Grading Summary".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    for result in &summary.results {
        let name = result.path.display().to_string();
        match &result.outcome {
            SubmissionOutcome::Graded { report } if report.diagnostics.is_empty() => {
                println!("  {} {}", "✓".green(), name);
            }
            SubmissionOutcome::Graded { report } => {
                println!(
                    "  {} {} - {} errors, {} warnings",
                    "✗".red(),
                    name,
                    report.summary.errors.to_string().red(),
                    report.summary.warnings.to_string().yellow()
                );
            }
            SubmissionOutcome::Failed { error } => {
                println!("  {} {} - {}", "!".yellow().bold(), name, error.yellow());
            }
        }
    }

    println!();
    println!(
        "Graded {} submissions ({} clean, {} with errors), {} failed",
        summary.graded(),
        summary.clean().to_string().green(),
        summary.with_errors().to_string().red(),
        summary.failed()
    );
    println!("{}", "=".repeat(60).bright_blue());
}
