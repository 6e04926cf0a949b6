//! Configuration for extraction and header emission.
//!
//! Every section has working defaults; a JSON file may override any subset
//! of fields.

use crate::error::{ExtractError, Result};
use crate::io::IOLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Master configuration for an extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Type-name resolution settings.
    pub resolver: ResolverConfig,
    /// Header emitter settings.
    pub emit: EmitConfig,
    /// Input file limits.
    pub io: IOLimits,
    /// Anomalies kept verbatim in the outcome; the rest are only counted.
    pub max_recorded_anomalies: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            emit: EmitConfig::default(),
            io: IOLimits::default(),
            max_recorded_anomalies: 1000,
        }
    }
}

impl ExtractConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| ExtractError::Config(e.to_string()))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Type-name resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Maximum reference hops before a chain is treated as cyclic (default: 64).
    pub max_depth: usize,
    /// Name used when a type reference dangles or cycles (default: "void**").
    pub unresolved_marker: String,
    /// Field type used when a member's type cannot be found (default: "NoSupport").
    pub unsupported_marker: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            unresolved_marker: "void**".to_string(),
            unsupported_marker: "NoSupport".to_string(),
        }
    }
}

/// Header emitter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitConfig {
    /// Start each header with `#pragma once`.
    pub pragma_once: bool,
    /// UDTs whose name contains any of these substrings are not emitted.
    pub skip_name_patterns: Vec<String>,
    /// Emit a `//size: N` comment above each UDT.
    pub emit_size_comment: bool,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            pragma_once: true,
            skip_name_patterns: vec!["std::".to_string(), "__gnu_cxx".to_string()],
            emit_size_comment: true,
        }
    }
}
