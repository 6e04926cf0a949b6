//! Opening a binary and decoding its DWARF into an entry arena.
//!
//! Sections are located through `object` (with `.zdebug_*` fallbacks and
//! transparent decompression) and every unit is read with gimli's raw entry
//! reader, so the arena mirrors `.debug_info` exactly: entries in definition
//! order, null entries kept as end-of-children markers.

use crate::config::ExtractConfig;
use crate::dwarf::entry::{Attr, DebugEntry, Offset, Tag};
use crate::dwarf::stream::{ArenaStream, EntryArena};
use crate::error::{Anomaly, ExtractError, Result};
use crate::extract::{extract_models, ExtractOutcome};
use crate::io::{IOLimits, SafeReader};
use gimli::{AttributeValue, EndianSlice, Reader, RunTimeEndian};
use object::{Object, ObjectSection};
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info, warn};

type Slice<'d> = EndianSlice<'d, RunTimeEndian>;

/// Magic that prefixes GNU-style zlib-compressed debug sections.
pub const ZLIB_MAGIC: &[u8; 4] = b"ZLIB";
/// Magic plus the 8-byte big-endian uncompressed length.
const ZLIB_HEADER_LEN: usize = 12;

/// Decoded debug info of one binary.
#[derive(Debug, Clone)]
pub struct Session {
    source: String,
    arena: EntryArena,
    units: usize,
    decode_anomalies: Vec<Anomaly>,
}

impl Session {
    /// Map `path` and decode its debug info.
    pub fn open<P: AsRef<Path>>(path: P, limits: &IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let reader =
            SafeReader::open(path, limits).map_err(|e| ExtractError::open_failure(&source, e))?;
        Self::decode(reader.contents(), source, limits)
    }

    /// Decode debug info from an in-memory binary.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_limits(data, &IOLimits::default())
    }

    pub fn from_bytes_with_limits(data: &[u8], limits: &IOLimits) -> Result<Self> {
        Self::decode(data, "<memory>".to_string(), limits)
    }

    /// A fresh stream positioned at the first entry.
    pub fn reader(&self) -> ArenaStream<'_> {
        self.arena.stream()
    }

    pub fn arena(&self) -> &EntryArena {
        &self.arena
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn unit_count(&self) -> usize {
        self.units
    }

    /// Attributes dropped during decoding because of an unexpected form.
    pub fn decode_anomalies(&self) -> &[Anomaly] {
        &self.decode_anomalies
    }

    /// Run both extraction passes, folding decode-time anomalies into the
    /// outcome.
    pub fn extract(&self, config: &ExtractConfig) -> Result<ExtractOutcome> {
        let mut outcome = extract_models(&mut self.reader(), config)?;
        if !self.decode_anomalies.is_empty() {
            outcome.stats.malformed_entries += self.decode_anomalies.len();
            let room = config
                .max_recorded_anomalies
                .saturating_sub(outcome.anomalies.len());
            let mut merged: Vec<Anomaly> =
                self.decode_anomalies.iter().take(room).cloned().collect();
            merged.append(&mut outcome.anomalies);
            outcome.anomalies = merged;
        }
        Ok(outcome)
    }

    fn decode(data: &[u8], source: String, limits: &IOLimits) -> Result<Self> {
        let file =
            object::File::parse(data).map_err(|e| ExtractError::open_failure(&source, e))?;
        let endian = if file.is_little_endian() {
            RunTimeEndian::Little
        } else {
            RunTimeEndian::Big
        };

        let dwarf_cow = gimli::Dwarf::load(|id| load_section(&file, id, limits))?;
        let dwarf = dwarf_cow.borrow(|section| EndianSlice::new(section, endian));

        let mut arena = EntryArena::new();
        let mut anomalies = Vec::new();
        let mut units = 0usize;
        let mut next_base = 0u64;

        let mut headers = dwarf.units();
        while let Some(header) = headers
            .next()
            .map_err(|e| ExtractError::section(".debug_info", e))?
        {
            // Units are laid out back to back from the start of the section.
            let base = next_base;
            next_base += header.length_including_self() as u64;

            let unit = dwarf
                .unit(header)
                .map_err(|e| ExtractError::section(".debug_info", e))?;
            decode_unit(&dwarf, &unit, base, &mut arena, &mut anomalies)?;
            units += 1;
        }

        if units == 0 {
            warn!(source = %source, "No DWARF units found");
        }
        info!(
            source = %source,
            units,
            entries = arena.entry_count(),
            dropped_attributes = anomalies.len(),
            "Decoded debug info"
        );

        Ok(Self {
            source,
            arena,
            units,
            decode_anomalies: anomalies,
        })
    }
}

fn load_section<'d>(
    file: &object::File<'d>,
    id: gimli::SectionId,
    limits: &IOLimits,
) -> Result<Cow<'d, [u8]>> {
    let name = id.name();
    let section = file.section_by_name(name).or_else(|| {
        name.strip_prefix(".debug_")
            .and_then(|suffix| file.section_by_name(&format!(".zdebug_{suffix}")))
    });
    let Some(section) = section else {
        return Ok(Cow::Borrowed(&[]));
    };

    let data = section
        .uncompressed_data()
        .map_err(|e| ExtractError::section(name, e))?;
    debug!(section = name, size = data.len(), "Loaded section");
    inflate_zlib_section(name, data, limits)
}

/// Inflate a section carrying the `ZLIB` + big-endian length header; any
/// other data is returned untouched.
pub fn inflate_zlib_section<'d>(
    section: &str,
    data: Cow<'d, [u8]>,
    limits: &IOLimits,
) -> Result<Cow<'d, [u8]>> {
    if !data.starts_with(ZLIB_MAGIC) {
        return Ok(data);
    }
    if data.len() < ZLIB_HEADER_LEN {
        return Err(ExtractError::section(section, "truncated ZLIB header"));
    }

    let mut size = [0u8; 8];
    size.copy_from_slice(&data[4..ZLIB_HEADER_LEN]);
    let uncompressed_size = u64::from_be_bytes(size);
    if uncompressed_size > limits.max_file_size {
        return Err(ExtractError::section(
            section,
            format!("declared size {uncompressed_size} exceeds limit {}", limits.max_file_size),
        ));
    }

    let compressed = object::read::CompressedData {
        format: object::read::CompressionFormat::Zlib,
        data: &data[ZLIB_HEADER_LEN..],
        uncompressed_size,
    };
    let inflated = compressed
        .decompress()
        .map_err(|e| ExtractError::section(section, e))?
        .into_owned();
    debug!(section, compressed = data.len(), inflated = inflated.len(), "Inflated ZLIB section");
    Ok(Cow::Owned(inflated))
}

fn decode_unit(
    dwarf: &gimli::Dwarf<Slice<'_>>,
    unit: &gimli::Unit<Slice<'_>>,
    base: u64,
    arena: &mut EntryArena,
    anomalies: &mut Vec<Anomaly>,
) -> Result<()> {
    let decode_err = |e: gimli::Error| ExtractError::section(".debug_info", e);
    let mut raw = unit.entries_raw(None).map_err(decode_err)?;

    while !raw.is_empty() {
        let offset = Offset(base + raw.next_offset().0 as u64);
        let Some(abbrev) = raw.read_abbreviation().map_err(decode_err)? else {
            arena.push_end();
            continue;
        };

        let mut entry = DebugEntry {
            offset,
            tag: Tag::from_dw(abbrev.tag()),
            name: None,
            has_children: abbrev.has_children(),
            attrs: Vec::new(),
        };
        for spec in abbrev.attributes() {
            let attr = raw.read_attribute(*spec).map_err(decode_err)?;
            if let Err(detail) = decode_attribute(dwarf, unit, base, &attr, &mut entry) {
                anomalies.push(Anomaly::malformed(offset, detail));
            }
        }
        arena.push_entry(entry);
    }
    Ok(())
}

/// Translate one attribute into the entry; `Err` carries why it was dropped.
fn decode_attribute(
    dwarf: &gimli::Dwarf<Slice<'_>>,
    unit: &gimli::Unit<Slice<'_>>,
    base: u64,
    attr: &gimli::Attribute<Slice<'_>>,
    entry: &mut DebugEntry,
) -> std::result::Result<(), String> {
    let at = attr.name();
    let value = attr.value();
    let unexpected = || format!("{at} has unexpected form");

    let decoded = match at {
        gimli::DW_AT_name => {
            let s = dwarf
                .attr_string(unit, value)
                .map_err(|e| format!("{at}: {e}"))?;
            entry.name = Some(s.to_string_lossy().into_owned());
            return Ok(());
        }
        gimli::DW_AT_type => Attr::TypeRef(reference(base, value).ok_or_else(unexpected)?),
        gimli::DW_AT_containing_type => {
            Attr::ContainingType(reference(base, value).ok_or_else(unexpected)?)
        }
        gimli::DW_AT_byte_size => Attr::ByteSize(unsigned(&value).ok_or_else(unexpected)?),
        gimli::DW_AT_bit_offset => Attr::BitOffset(unsigned(&value).ok_or_else(unexpected)?),
        gimli::DW_AT_bit_size => Attr::BitSize(unsigned(&value).ok_or_else(unexpected)?),
        gimli::DW_AT_declaration => Attr::Declaration(flag(&value).ok_or_else(unexpected)?),
        gimli::DW_AT_enum_class => Attr::EnumClass(flag(&value).ok_or_else(unexpected)?),
        gimli::DW_AT_const_value => Attr::ConstValue(constant(&value).ok_or_else(unexpected)?),
        gimli::DW_AT_data_member_location => {
            let loc = match value {
                AttributeValue::Exprloc(expr) => plus_uconst(expr),
                other => constant(&other),
            };
            Attr::DataMemberLocation(loc.ok_or_else(unexpected)?)
        }
        _ => return Ok(()),
    };
    entry.attrs.push(decoded);
    Ok(())
}

fn reference(base: u64, value: AttributeValue<Slice<'_>>) -> Option<Offset> {
    match value {
        AttributeValue::UnitRef(o) => Some(Offset(base + o.0 as u64)),
        AttributeValue::DebugInfoRef(o) => Some(Offset(o.0 as u64)),
        _ => None,
    }
}

/// Fixed-size data forms are zero-extended; only `sdata` carries a sign.
fn constant(value: &AttributeValue<Slice<'_>>) -> Option<i64> {
    match *value {
        AttributeValue::Data1(v) => Some(i64::from(v)),
        AttributeValue::Data2(v) => Some(i64::from(v)),
        AttributeValue::Data4(v) => Some(i64::from(v)),
        AttributeValue::Data8(v) => Some(v as i64),
        AttributeValue::Sdata(v) => Some(v),
        AttributeValue::Udata(v) => Some(v as i64),
        _ => None,
    }
}

fn unsigned(value: &AttributeValue<Slice<'_>>) -> Option<i64> {
    value.udata_value().map(|v| v as i64)
}

fn flag(value: &AttributeValue<Slice<'_>>) -> Option<bool> {
    match *value {
        AttributeValue::Flag(f) => Some(f),
        _ => None,
    }
}

/// Member offset encoded as the DWARF 2 style `DW_OP_plus_uconst N`.
fn plus_uconst(expr: gimli::Expression<Slice<'_>>) -> Option<i64> {
    let mut r = expr.0;
    if r.read_u8().ok()? != gimli::DW_OP_plus_uconst.0 {
        return None;
    }
    let v = r.read_uleb128().ok()?;
    r.is_empty().then_some(v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_an_open_failure() {
        let err = Session::from_bytes(b"definitely not an object file").unwrap_err();
        assert!(matches!(err, ExtractError::OpenFailure { .. }));
    }

    #[test]
    fn missing_file_is_an_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = Session::open(dir.path().join("nope.elf"), &IOLimits::default()).unwrap_err();
        assert!(matches!(err, ExtractError::OpenFailure { .. }));
    }

    #[test]
    fn plain_section_data_passes_through() {
        let data = Cow::Borrowed(&b"\x07\x00\x00\x00abc"[..]);
        let out = inflate_zlib_section(".debug_info", data, &IOLimits::default()).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(&out[..], b"\x07\x00\x00\x00abc");
    }

    #[test]
    fn inflates_zlib_prefixed_section() {
        let mut data = b"ZLIB".to_vec();
        data.extend_from_slice(&3u64.to_be_bytes());
        // zlib stream with one stored deflate block holding "abc"
        data.extend_from_slice(&[0x78, 0x01, 0x01, 0x03, 0x00, 0xfc, 0xff, b'a', b'b', b'c']);
        data.extend_from_slice(&[0x02, 0x4d, 0x01, 0x27]);
        let out = inflate_zlib_section(".debug_str", Cow::Owned(data), &IOLimits::default()).unwrap();
        assert_eq!(&out[..], b"abc");
    }

    #[test]
    fn truncated_zlib_header_fails() {
        let data = Cow::Borrowed(&b"ZLIB\x00\x00"[..]);
        let err = inflate_zlib_section(".debug_info", data, &IOLimits::default()).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::SectionDecodeFailure { ref section, .. } if section == ".debug_info"
        ));
    }

    #[test]
    fn corrupt_zlib_payload_fails() {
        let mut data = b"ZLIB".to_vec();
        data.extend_from_slice(&16u64.to_be_bytes());
        data.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x11]);
        let err = inflate_zlib_section(".debug_abbrev", Cow::Owned(data), &IOLimits::default())
            .unwrap_err();
        assert!(matches!(err, ExtractError::SectionDecodeFailure { .. }));
    }

    #[test]
    fn oversized_declared_length_is_rejected() {
        let mut data = b"ZLIB".to_vec();
        data.extend_from_slice(&u64::MAX.to_be_bytes());
        data.extend_from_slice(&[0x78, 0x01]);
        let err = inflate_zlib_section(".debug_info", Cow::Owned(data), &IOLimits { max_file_size: 1024 })
            .unwrap_err();
        assert!(matches!(err, ExtractError::SectionDecodeFailure { .. }));
    }
}
