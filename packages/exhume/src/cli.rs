//! Command-line interface for exhume.

use std::cell::RefCell;
use std::path::{Path as FsPath, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use serde::Serialize;

use crate::config::ParseOptions;
use crate::dispatch::Dispatcher;
use crate::error::{ExhumeError, Result};
use crate::path::Path;
use crate::registry::HandlerSet;
use crate::value::{Value, ValueKind};

/// exhume - Pull values out of XML documents by element path.
#[derive(Parser)]
#[command(name = "exhume")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the value of every element matching a pattern.
    Select {
        /// XML file to read
        file: PathBuf,

        /// Element pattern (e.g., /Inventory/Books/Book/Title or Price)
        pattern: String,

        /// Root path the pattern is relative to
        #[arg(short, long)]
        root: Option<String>,

        /// Convert values to this type (string, integer, float, decimal, boolean, date)
        #[arg(short, long = "type")]
        r#type: Option<String>,

        /// Print this attribute instead of the element text
        #[arg(short, long)]
        attribute: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Resolve namespace URIs
        #[arg(long)]
        namespaces: bool,
    },

    /// Count the elements matching each pattern.
    Count {
        /// XML file to read
        file: PathBuf,

        /// One or more element patterns
        #[arg(required = true)]
        patterns: Vec<String>,

        /// Root path the patterns are relative to
        #[arg(short, long)]
        root: Option<String>,
    },
}

/// How `select` prints its matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One value per line
    Text,
    /// One JSON object per line
    Json,
}

/// A selected value and where it was found.
#[derive(Debug, Serialize)]
struct Selection {
    path: Path,
    value: Value,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Select {
            file,
            pattern,
            root,
            r#type,
            attribute,
            format,
            namespaces,
        } => select_command(
            &file,
            &pattern,
            root.as_deref(),
            r#type.as_deref(),
            attribute.as_deref(),
            format,
            namespaces,
        ),
        Commands::Count {
            file,
            patterns,
            root,
        } => count_command(&file, &patterns, root.as_deref()),
    }
}

fn handler_set<'h>(root: Option<&str>) -> HandlerSet<'h> {
    match root {
        Some(root) => HandlerSet::rooted(root),
        None => HandlerSet::new(),
    }
}

/// Execute the select command.
fn select_command(
    file: &FsPath,
    pattern: &str,
    root: Option<&str>,
    type_name: Option<&str>,
    attribute: Option<&str>,
    format: OutputFormat,
    namespaces: bool,
) -> Result<()> {
    let kind = type_name
        .map(ValueKind::from_name)
        .transpose()?
        .unwrap_or(ValueKind::Text);
    let matches = RefCell::new(Vec::new());

    let set = match attribute {
        Some(attribute) => handler_set(root).on_start(pattern, |event| {
            if let Some(text) = event.attribute_value(attribute) {
                matches
                    .borrow_mut()
                    .push((event.path().clone(), text.to_string()));
            }
            Ok(())
        }),
        None => handler_set(root).on_end_element(pattern, |event| {
            matches
                .borrow_mut()
                .push((event.path().clone(), event.value().to_string()));
            Ok(())
        }),
    };

    let options = ParseOptions::new().with_namespaces(namespaces);
    let mut dispatcher = Dispatcher::with_options(options);
    dispatcher.register(set)?;
    dispatcher.parse_file(file)?;
    drop(dispatcher);

    let selections = convert_matches(kind, matches.into_inner())?;
    match format {
        OutputFormat::Text => {
            for selection in &selections {
                println!("{}", selection.value);
            }
            eprintln!(
                "{} {} in {}",
                style(selections.len()).bold(),
                style("matches").green(),
                style(file.display()).cyan()
            );
        }
        OutputFormat::Json => {
            for selection in &selections {
                println!("{}", serde_json::to_string(selection)?);
            }
        }
    }

    Ok(())
}

/// Convert matched text, failing on the first value that does not conform.
fn convert_matches(kind: ValueKind, matches: Vec<(Path, String)>) -> Result<Vec<Selection>> {
    matches
        .into_iter()
        .map(|(path, text)| match kind.convert(&text) {
            Ok(value) => Ok(Selection { path, value }),
            Err(source) => Err(ExhumeError::Conversion {
                path: path.to_string(),
                source,
            }),
        })
        .collect()
}

/// Execute the count command.
fn count_command(file: &FsPath, patterns: &[String], root: Option<&str>) -> Result<()> {
    let counts = RefCell::new(vec![0usize; patterns.len()]);

    let set = patterns
        .iter()
        .enumerate()
        .fold(handler_set(root), |set, (index, pattern)| {
            let counts = &counts;
            set.on_start(pattern.as_str(), move |_| {
                counts.borrow_mut()[index] += 1;
                Ok(())
            })
        });

    let mut dispatcher = Dispatcher::new();
    dispatcher.register(set)?;
    dispatcher.parse_file(file)?;
    let elements = dispatcher.stats().elements;
    drop(dispatcher);

    println!(
        "{} {}",
        style("Counted").bold(),
        style(file.display()).cyan()
    );
    for (pattern, count) in patterns.iter().zip(counts.into_inner()) {
        println!("  {}: {}", pattern, style(count).green());
    }
    println!("  Elements: {elements}");

    Ok(())
}
