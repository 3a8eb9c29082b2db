//! Output formatting

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Yaml => "yaml",
        })
    }
}

impl OutputFormat {
    /// Print rows as a table, or the rows themselves as JSON/YAML
    pub fn print<T: Serialize + Tabled>(&self, rows: &[T]) -> Result<()> {
        match self {
            OutputFormat::Table if rows.is_empty() => println!("{}", "(none)".dimmed()),
            OutputFormat::Table => {
                let mut table = Table::new(rows);
                table.with(Style::rounded());
                println!("{}", table);
            }
            _ => self.print_value(rows)?,
        }
        Ok(())
    }

    /// JSON/YAML rendering of any value
    pub fn print_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        match self {
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
            _ => println!("{}", serde_json::to_string_pretty(value)?),
        }
        Ok(())
    }
}

pub fn check(granted: bool) -> String {
    if granted {
        "✓".green().to_string()
    } else {
        "·".dimmed().to_string()
    }
}
