//! Rebuild C/C++ enum and struct/class declarations from DWARF debug info.
//!
//! The pipeline is: [`dwarf::Session`] decodes a binary's debug entries into
//! an arena, [`extract::extract_models`] indexes them and builds enum and UDT
//! models into a [`registry::ModelRegistry`], and [`emit`] renders the
//! registry as `enums.h` / `udts.h`.

pub mod config;
pub mod demangle;
pub mod dwarf;
pub mod emit;
pub mod error;
pub mod extract;
pub mod hashing;
pub mod io;
pub mod logging;
pub mod model;
pub mod registry;
pub mod symbols;

pub use config::{EmitConfig, ExtractConfig, ResolverConfig};
pub use dwarf::Session;
pub use error::{Anomaly, ExtractError, Result};
pub use extract::{extract_models, ExtractOutcome, ExtractStats};
pub use registry::ModelRegistry;

use std::path::Path;
use tracing::info_span;

/// Open `path`, decode its debug info and extract every model.
pub fn extract_from_path<P: AsRef<Path>>(path: P, config: &ExtractConfig) -> Result<ExtractOutcome> {
    let path = path.as_ref();
    let _span = info_span!("extract_file", path = %path.display()).entered();
    let session = Session::open(path, &config.io)?;
    session.extract(config)
}
