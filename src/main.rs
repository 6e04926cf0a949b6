//! dwarf-headers - rebuild C headers from DWARF debug info
//!
//! Usage:
//!   dwarf-headers dwarf -i <binary> [-o <dir>]   Write enums.h and udts.h
//!   dwarf-headers rtti -i <binary>               List RTTI symbols

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dwarf_headers::io::{IOLimits, SafeReader};
use dwarf_headers::{emit, logging, symbols, ExtractConfig, Session};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "dwarf-headers")]
#[command(about = "Rebuild C/C++ type declarations from DWARF debug info", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract enums and structs/classes into C headers
    #[command(alias = "d")]
    Dwarf {
        /// Binary carrying DWARF debug info
        #[arg(short, long)]
        input: PathBuf,
        /// Directory receiving enums.h and udts.h
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Also print models, stats and anomalies as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// List RTTI symbols with their demangled names
    Rtti {
        /// Binary to scan
        #[arg(short, long)]
        input: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.json_logs {
        logging::init_tracing_json();
    } else {
        logging::init_tracing();
    }

    let result = match cli.command {
        Commands::Dwarf {
            input,
            output,
            config,
            json,
        } => cmd_dwarf(input, output, config, json),
        Commands::Rtti { input, json } => cmd_rtti(input, json),
    };
    result.map_err(|e| dwarf_headers::log_error!(e))
}

fn cmd_dwarf(input: PathBuf, output: PathBuf, config: Option<PathBuf>, json: bool) -> Result<()> {
    let config = match config {
        Some(path) => ExtractConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ExtractConfig::default(),
    };

    let session = Session::open(&input, &config.io)
        .with_context(|| format!("Failed to read debug info: {}", input.display()))?;
    let outcome = session
        .extract(&config)
        .with_context(|| format!("Extraction failed: {}", input.display()))?;

    let (enums_path, udts_path) = emit::write_headers(&output, &outcome.registry, &config.emit)
        .with_context(|| format!("Failed to write headers into {}", output.display()))?;
    info!(
        enums = outcome.registry.enum_count(),
        udts = outcome.registry.udt_count(),
        anomalies = outcome.anomalies.len(),
        "Done"
    );

    if json {
        let report = json!({
            "source": session.source(),
            "headers": [enums_path, udts_path],
            "stats": outcome.stats,
            "anomalies": outcome.anomalies,
            "models": outcome.registry,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn cmd_rtti(input: PathBuf, json: bool) -> Result<()> {
    let reader = SafeReader::open(&input, &IOLimits::default())
        .with_context(|| format!("Failed to read binary: {}", input.display()))?;
    let found = symbols::rtti_symbols(reader.contents())
        .with_context(|| format!("Failed to parse symbols: {}", input.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }
    for sym in &found {
        match &sym.demangled {
            Some(d) => println!("{}\t{}", sym.name, d),
            None => println!("{}", sym.name),
        }
    }
    Ok(())
}
