use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Display results in a human-readable table
    Table,
    /// Display results as JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Renders command results as a table or JSON, honoring `--quiet`.
pub struct OutputManager {
    format: OutputFormat,
    quiet: bool,
}

impl OutputManager {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Print a single-record result.
    pub fn print_record<T>(&self, record: &T) -> anyhow::Result<()>
    where
        T: Serialize + Tabled,
    {
        if self.quiet {
            return Ok(());
        }
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(record)?);
            }
            OutputFormat::Table => {
                println!("{}", Table::new([record]));
            }
        }
        Ok(())
    }

    /// Print a list result.
    pub fn print_rows<T>(&self, rows: &[T]) -> anyhow::Result<()>
    where
        T: Serialize + Tabled,
    {
        if self.quiet {
            return Ok(());
        }
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(rows)?);
            }
            OutputFormat::Table => {
                if rows.is_empty() {
                    println!("{}", "No results found".dimmed());
                } else {
                    println!("{}", Table::new(rows));
                }
            }
        }
        Ok(())
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{}", message.green());
        }
    }

    pub fn warn(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}: {}", "Warning".yellow().bold(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}: {}", "Error".red().bold(), message);
    }
}
