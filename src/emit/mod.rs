//! C header text generation from a populated registry.
//!
//! `enums.h` carries one `enum [class] NAME : TYPE { ... };` block per enum
//! with values in uppercase hex, masked to the underlying width. `udts.h`
//! carries one `struct|class NAME [: BASES] { ... };` block per exportable
//! UDT with the byte offset of every field in a trailing comment.

use crate::config::EmitConfig;
use crate::error::Result;
use crate::model::{EnumModel, FieldModel, UdtModel};
use crate::registry::ModelRegistry;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ENUMS_HEADER: &str = "enums.h";
pub const UDTS_HEADER: &str = "udts.h";

pub fn render_enums(registry: &ModelRegistry, config: &EmitConfig) -> String {
    let mut out = preamble(config);
    for model in registry.enums() {
        render_enum(&mut out, model);
    }
    out
}

pub fn render_udts(registry: &ModelRegistry, config: &EmitConfig) -> String {
    let mut out = preamble(config);
    for model in registry.udts() {
        if is_skipped(&model.name, config) {
            debug!(name = %model.name, "Skipping UDT by name filter");
            continue;
        }
        render_udt(&mut out, model, config);
    }
    out
}

/// Write `enums.h` and `udts.h` into `dir`, creating it if needed.
pub fn write_headers(
    dir: &Path,
    registry: &ModelRegistry,
    config: &EmitConfig,
) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let enums_path = dir.join(ENUMS_HEADER);
    let udts_path = dir.join(UDTS_HEADER);
    std::fs::write(&enums_path, render_enums(registry, config))?;
    std::fs::write(&udts_path, render_udts(registry, config))?;
    info!(
        enums = %enums_path.display(),
        udts = %udts_path.display(),
        "Headers written"
    );
    Ok((enums_path, udts_path))
}

fn preamble(config: &EmitConfig) -> String {
    if config.pragma_once {
        "#pragma once\n".to_string()
    } else {
        String::new()
    }
}

fn is_skipped(name: &str, config: &EmitConfig) -> bool {
    name.is_empty()
        || config
            .skip_name_patterns
            .iter()
            .any(|p| name.contains(p.as_str()))
}

fn render_enum(out: &mut String, model: &EnumModel) {
    let keyword = if model.is_scoped { "enum class" } else { "enum" };
    out.push_str(&format!(
        "{keyword} {} : {} {{\n",
        model.name,
        model.underlying_type.c_name()
    ));
    for member in &model.members {
        out.push_str(&format!(
            "\t{} = 0x{:X},\n",
            member.name,
            model.underlying_type.mask(member.value)
        ));
    }
    out.push_str("};\n\n");
}

fn render_udt(out: &mut String, model: &UdtModel, config: &EmitConfig) {
    if config.emit_size_comment {
        out.push_str(&format!("//size: {}\n", model.size_bytes));
    }
    out.push_str(&format!("{} {}", model.kind.keyword(), model.name));
    if !model.bases.is_empty() {
        out.push_str(" : ");
        out.push_str(&model.bases.join(", "));
    }
    out.push_str(" {\n");
    for field in &model.fields {
        render_field(out, field);
    }
    out.push_str("};\n\n");
}

fn render_field(out: &mut String, field: &FieldModel) {
    if field.is_bitfield() {
        out.push_str(&format!(
            "\t{} {} : {}; // {}\n",
            field.type_name, field.name, field.bit_size, field.byte_offset
        ));
    } else {
        out.push_str(&format!(
            "\t{} {}; // {}\n",
            field.type_name, field.name, field.byte_offset
        ));
    }
}
