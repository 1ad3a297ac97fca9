//! Rendering of dice rolls as CSV, a text table or JSON.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use stockdice_core::DiceRoll;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Text,
    Json,
}

/// Where rolls are written. `-` and `--` mean standard output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("-") | Some("--") => OutputTarget::Stdout,
            Some(path) => OutputTarget::File(PathBuf::from(path)),
        }
    }
}

pub fn emit(rolls: &[DiceRoll], format: OutputFormat, target: &OutputTarget) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            let stdout = io::stdout();
            write_rolls(rolls, format, stdout.lock())
        }
        OutputTarget::File(path) => {
            if format == OutputFormat::Text {
                bail!("text output to a file is not supported");
            }
            let file = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            write_rolls(rolls, format, BufWriter::new(file))
        }
    }
}

pub fn write_rolls<W: Write>(rolls: &[DiceRoll], format: OutputFormat, mut writer: W) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut csv_writer = csv::Writer::from_writer(writer);
            for roll in rolls {
                csv_writer.serialize(roll)?;
            }
            csv_writer.flush()?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, rolls)?;
            writeln!(writer)?;
            writer.flush()?;
        }
        OutputFormat::Text => {
            let width = rolls
                .iter()
                .map(|roll| roll.symbol.len())
                .max()
                .unwrap_or(0)
                .max("SYMBOL".len());
            writeln!(writer, "{:<width$}  {:>20}  COMPANY", "SYMBOL", "MARKET CAP (USD)")?;
            for roll in rolls {
                writeln!(
                    writer,
                    "{:<width$}  {:>20.0}  {}",
                    roll.symbol,
                    roll.market_cap_usd,
                    roll.company_name.as_deref().unwrap_or("")
                )?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}
