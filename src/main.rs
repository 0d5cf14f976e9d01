use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use iniedit::args::{build_query, comment_changes, property_changes, single_line};
use iniedit::config::{load_from_env, Settings};
use iniedit::{IniEditor, Positioning, Query, SourceFile, WriteResult};
use similar::{ChangeTag, TextDiff};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "iniedit")]
#[command(about = "Add, delete, modify and read sections of INI files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// The input file in common INI format
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Only act on sections with this name (repeatable; any may match)
    #[arg(short = 'x', long = "require-section", global = true)]
    require_section: Vec<String>,

    /// Only act on sections containing this key=value line (repeatable; all must match)
    #[arg(short = 'n', long = "require-line", global = true)]
    require_line: Vec<String>,

    /// Only act on sections containing this comment (repeatable; all must match)
    #[arg(short = 'm', long = "require-comment", global = true)]
    require_comment: Vec<String>,

    /// Interpret key/value and comment criteria as regular expressions
    #[arg(short, long, global = true)]
    regex: bool,

    /// Write the result back to the input file instead of standard output
    #[arg(short, long, global = true)]
    in_place: bool,

    /// Show a diff of the changes on standard error
    #[arg(long, global = true)]
    diff: bool,

    /// Exit with status 1 when no section matched
    #[arg(long, global = true)]
    strict: bool,

    /// Settings file (defaults to $INIEDIT_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Prefix for new comments, e.g. "# "
    #[arg(long, global = true)]
    comment_prefix: Option<String>,

    /// Report match counts on standard error
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an entire section to an INI file
    Add {
        /// The name of the section to add
        #[arg(short, long)]
        section: String,

        /// A key=value line to add; KEY alone or - reads from standard input
        #[arg(short, long = "line")]
        lines: Vec<String>,

        /// A comment string to add
        #[arg(short, long = "comment")]
        comments: Vec<String>,

        /// Add the section at the top of the file
        #[arg(short, long)]
        top: bool,
    },

    /// Delete an entire section of an INI file
    Delete,

    /// Modify properties in an INI file section
    Modify {
        /// A key=value line to set; KEY alone or - reads from standard input
        #[arg(short, long = "line")]
        lines: Vec<String>,

        /// A comment string to add
        #[arg(short, long = "comment")]
        comments: Vec<String>,

        /// A property name to delete
        #[arg(short, long = "delete")]
        delete: Vec<String>,

        /// A comment to delete
        #[arg(long = "delete-comment")]
        delete_comments: Vec<String>,

        /// Rename matched sections
        #[arg(long)]
        rename: Option<String>,
    },

    /// Print property values from matching sections
    Get {
        /// A property name to print
        #[arg(short, long = "property")]
        properties: Vec<String>,

        /// Also print every comment of matching sections
        #[arg(long)]
        comments: bool,

        /// Print the values as a JSON array
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;

    let file = cli
        .file
        .clone()
        .context("no input file given; pass -f/--file <PATH>")?;

    // Criteria are built before anything is read or changed so a bad
    // pattern aborts the run cleanly.
    let query = build_query(
        &cli.require_section,
        &cli.require_line,
        &cli.require_comment,
        settings.regex,
    )
    .context("invalid match criteria")?;

    let source = SourceFile::read(&file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let mut editor = IniEditor::with_options(source.content(), settings.editor_options())
        .with_context(|| format!("failed to parse {}", file.display()))?;

    let count = match &cli.command {
        Commands::Get {
            properties,
            comments,
            json,
        } => return cmd_get(&cli, &settings, &editor, &query, properties, *comments, *json),
        Commands::Add {
            section,
            lines,
            comments,
            top,
        } => cmd_add(&mut editor, &query, section, lines, comments, *top)?,
        Commands::Delete => editor.delete_section(&query),
        Commands::Modify {
            lines,
            comments,
            delete,
            delete_comments,
            rename,
        } => cmd_modify(
            &mut editor,
            &query,
            lines,
            comments,
            delete,
            delete_comments,
            rename.as_deref(),
        )?,
    };

    report_count(cli.verbose, settings.strict, count);

    let output = editor.to_string();

    if cli.diff && source.content() != output {
        display_diff(&file, source.content(), &output);
    }

    if cli.in_place {
        match source.write_back(&output)? {
            WriteResult::Written { path, bytes } => {
                if cli.verbose {
                    eprintln!(
                        "{}",
                        format!("Wrote {} bytes to {}", bytes, path.display()).dimmed()
                    );
                }
            }
            WriteResult::Unchanged { path } => {
                if cli.verbose {
                    eprintln!("{}", format!("{} unchanged", path.display()).dimmed());
                }
            }
        }
    } else {
        print!("{}", output);
    }

    if settings.strict && count == 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Settings file first, then command-line overrides.
fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = load_from_env(cli.config.as_deref())?;

    if let Some(prefix) = &cli.comment_prefix {
        settings.comment_prefix = prefix.clone();
        settings
            .validate()
            .context("invalid --comment-prefix")?;
    }

    settings.regex |= cli.regex;
    settings.strict |= cli.strict;

    Ok(settings)
}

fn report_count(verbose: bool, strict: bool, count: usize) {
    if count == 0 {
        if verbose || strict {
            eprintln!("{}", "Warning: no section matched".yellow());
        }
    } else if verbose {
        eprintln!(
            "{}",
            format!(
                "{} section{} matched",
                count,
                if count == 1 { "" } else { "s" }
            )
            .dimmed()
        );
    }
}

fn cmd_add(
    editor: &mut IniEditor,
    query: &Query,
    section: &str,
    lines: &[String],
    comments: &[String],
    top: bool,
) -> Result<usize> {
    let properties = property_changes(lines, &[], &mut io::stdin().lock())?;
    let comments = comments
        .iter()
        .map(|text| single_line(text))
        .collect::<Result<Vec<_>, _>>()?;

    editor
        .add_section(
            section,
            &properties,
            &comments,
            Positioning::from_prepend(top),
            Some(query),
        )
        .with_context(|| format!("cannot add section '{}'", section))
}

fn cmd_modify(
    editor: &mut IniEditor,
    query: &Query,
    lines: &[String],
    comments: &[String],
    delete: &[String],
    delete_comments: &[String],
    rename: Option<&str>,
) -> Result<usize> {
    let properties = property_changes(lines, delete, &mut io::stdin().lock())?;
    let comments = comment_changes(comments, delete_comments)?;

    editor
        .modify_section(query, &properties, &comments, rename)
        .context("cannot modify sections")
}

fn cmd_get(
    cli: &Cli,
    settings: &Settings,
    editor: &IniEditor,
    query: &Query,
    properties: &[String],
    include_comments: bool,
    json: bool,
) -> Result<()> {
    let names: Vec<&str> = properties.iter().map(String::as_str).collect();
    let mut values = Vec::new();
    let count = editor.read_properties(query, &names, include_comments, |value| {
        values.push(value.to_string())
    });

    report_count(cli.verbose, settings.strict, count);

    if json {
        println!("{}", serde_json::to_string(&values)?);
    } else {
        for value in &values {
            println!("{}", value);
        }
    }

    if settings.strict && count == 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    eprintln!("{}", format!("--- {} (original)", file.display()).dimmed());
    eprintln!("{}", format!("+++ {} (edited)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        eprint!("{}", sign);
    }
}
