//! Common test utilities and helpers.
//!
//! A small DWARF 4 producer: describe a tree of entries, get back
//! `.debug_info` / `.debug_abbrev` bytes, and wrap them in a relocatable ELF.
//! Every entry gets its own abbreviation code, so abbreviations never need to
//! be shared or deduplicated.

#![allow(dead_code)]

use std::collections::HashMap;

use gimli::{DwAt, DwTag};
use object::write::{Object, Symbol, SymbolSection};
use object::{Architecture, BinaryFormat, Endianness, SectionKind, SymbolFlags, SymbolKind, SymbolScope};

const DW_FORM_STRING: u64 = 0x08;
const DW_FORM_DATA1: u64 = 0x0b;
const DW_FORM_DATA2: u64 = 0x05;
const DW_FORM_DATA4: u64 = 0x06;
const DW_FORM_SDATA: u64 = 0x0d;
const DW_FORM_UDATA: u64 = 0x0f;
const DW_FORM_REF_ADDR: u64 = 0x10;
const DW_FORM_REF4: u64 = 0x13;
const DW_FORM_EXPRLOC: u64 = 0x18;
const DW_FORM_FLAG_PRESENT: u64 = 0x19;

/// Size of a 32-bit DWARF 4 compile unit header.
pub const CU_HEADER_LEN: usize = 11;

#[derive(Debug, Clone)]
pub enum Value {
    Str(String),
    Data1(u8),
    Data2(u16),
    Data4(u32),
    Sdata(i64),
    Udata(u64),
    /// Unit-relative reference to a labelled entry in the same unit
    Ref(&'static str),
    /// Section-relative reference, may cross units
    RefAddr(&'static str),
    Exprloc(Vec<u8>),
    Flag,
}

impl Value {
    fn form(&self) -> u64 {
        match self {
            Value::Str(_) => DW_FORM_STRING,
            Value::Data1(_) => DW_FORM_DATA1,
            Value::Data2(_) => DW_FORM_DATA2,
            Value::Data4(_) => DW_FORM_DATA4,
            Value::Sdata(_) => DW_FORM_SDATA,
            Value::Udata(_) => DW_FORM_UDATA,
            Value::Ref(_) => DW_FORM_REF4,
            Value::RefAddr(_) => DW_FORM_REF_ADDR,
            Value::Exprloc(_) => DW_FORM_EXPRLOC,
            Value::Flag => DW_FORM_FLAG_PRESENT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Die {
    tag: DwTag,
    label: Option<&'static str>,
    attrs: Vec<(DwAt, Value)>,
    children: Vec<Die>,
    force_children: bool,
}

pub fn die(tag: DwTag) -> Die {
    Die {
        tag,
        label: None,
        attrs: Vec::new(),
        children: Vec::new(),
        force_children: false,
    }
}

impl Die {
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn name(self, name: &str) -> Self {
        self.attr(gimli::DW_AT_name, Value::Str(name.to_string()))
    }

    pub fn ty(self, label: &'static str) -> Self {
        self.attr(gimli::DW_AT_type, Value::Ref(label))
    }

    pub fn byte_size(self, size: u8) -> Self {
        self.attr(gimli::DW_AT_byte_size, Value::Data1(size))
    }

    pub fn location(self, offset: u8) -> Self {
        self.attr(gimli::DW_AT_data_member_location, Value::Data1(offset))
    }

    pub fn attr(mut self, at: DwAt, value: Value) -> Self {
        self.attrs.push((at, value));
        self
    }

    pub fn child(mut self, child: Die) -> Self {
        self.children.push(child);
        self
    }

    /// Mark the entry as having children even when none are added.
    pub fn has_children(mut self) -> Self {
        self.force_children = true;
        self
    }

    fn declares_children(&self) -> bool {
        self.force_children || !self.children.is_empty()
    }
}

pub fn compile_unit() -> Die {
    die(gimli::DW_TAG_compile_unit).name("test.cpp")
}

pub fn base_type(label: &'static str, name: &str, size: u8) -> Die {
    die(gimli::DW_TAG_base_type).label(label).name(name).byte_size(size)
}

pub fn member(name: &str, ty: &'static str, offset: u8) -> Die {
    die(gimli::DW_TAG_member).name(name).ty(ty).location(offset)
}

pub fn enumerator(name: &str, value: i64) -> Die {
    die(gimli::DW_TAG_enumerator)
        .name(name)
        .attr(gimli::DW_AT_const_value, Value::Sdata(value))
}

/// Encoded sections plus the `.debug_info` offset of every labelled entry.
pub struct Encoded {
    pub info: Vec<u8>,
    pub abbrev: Vec<u8>,
    pub labels: HashMap<&'static str, u64>,
}

#[derive(Default)]
pub struct DwarfBuilder {
    units: Vec<Die>,
}

enum Fixup {
    Unit { pos: usize, unit_base: usize, label: &'static str },
    Section { pos: usize, label: &'static str },
}

impl DwarfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit(mut self, root: Die) -> Self {
        self.units.push(root);
        self
    }

    pub fn encode(&self) -> Encoded {
        let mut abbrev = Vec::new();
        let mut info = Vec::new();
        let mut labels = HashMap::new();
        let mut fixups = Vec::new();
        let mut next_code = 1u64;

        for root in &self.units {
            let unit_base = info.len();
            info.extend_from_slice(&0u32.to_le_bytes());
            info.extend_from_slice(&4u16.to_le_bytes());
            info.extend_from_slice(&0u32.to_le_bytes());
            info.push(8);
            encode_die(
                root,
                unit_base,
                &mut next_code,
                &mut abbrev,
                &mut info,
                &mut labels,
                &mut fixups,
            );
            let length = (info.len() - unit_base - 4) as u32;
            info[unit_base..unit_base + 4].copy_from_slice(&length.to_le_bytes());
        }
        abbrev.push(0);

        for fixup in fixups {
            let (pos, value) = match fixup {
                Fixup::Unit { pos, unit_base, label } => (pos, labels[label] - unit_base as u64),
                Fixup::Section { pos, label } => (pos, labels[label]),
            };
            info[pos..pos + 4].copy_from_slice(&(value as u32).to_le_bytes());
        }

        Encoded { info, abbrev, labels }
    }

    /// Relocatable x86-64 ELF carrying `.debug_info` and `.debug_abbrev`.
    pub fn elf(&self) -> (Vec<u8>, HashMap<&'static str, u64>) {
        let enc = self.encode();
        let bytes = elf_with_sections(&[(".debug_info", enc.info), (".debug_abbrev", enc.abbrev)]);
        (bytes, enc.labels)
    }
}

fn encode_die(
    die: &Die,
    unit_base: usize,
    next_code: &mut u64,
    abbrev: &mut Vec<u8>,
    info: &mut Vec<u8>,
    labels: &mut HashMap<&'static str, u64>,
    fixups: &mut Vec<Fixup>,
) {
    let code = *next_code;
    *next_code += 1;

    uleb(abbrev, code);
    uleb(abbrev, u64::from(die.tag.0));
    abbrev.push(u8::from(die.declares_children()));
    for (at, value) in &die.attrs {
        uleb(abbrev, u64::from(at.0));
        uleb(abbrev, value.form());
    }
    abbrev.extend_from_slice(&[0, 0]);

    if let Some(label) = die.label {
        labels.insert(label, info.len() as u64);
    }
    uleb(info, code);
    for (_, value) in &die.attrs {
        match value {
            Value::Str(s) => {
                info.extend_from_slice(s.as_bytes());
                info.push(0);
            }
            Value::Data1(v) => info.push(*v),
            Value::Data2(v) => info.extend_from_slice(&v.to_le_bytes()),
            Value::Data4(v) => info.extend_from_slice(&v.to_le_bytes()),
            Value::Sdata(v) => sleb(info, *v),
            Value::Udata(v) => uleb(info, *v),
            Value::Ref(label) => {
                fixups.push(Fixup::Unit { pos: info.len(), unit_base, label });
                info.extend_from_slice(&[0; 4]);
            }
            Value::RefAddr(label) => {
                fixups.push(Fixup::Section { pos: info.len(), label });
                info.extend_from_slice(&[0; 4]);
            }
            Value::Exprloc(expr) => {
                uleb(info, expr.len() as u64);
                info.extend_from_slice(expr);
            }
            Value::Flag => {}
        }
    }

    if die.declares_children() {
        for child in &die.children {
            encode_die(child, unit_base, next_code, abbrev, info, labels, fixups);
        }
        info.push(0);
    }
}

pub fn uleb(out: &mut Vec<u8>, mut v: u64) {
    loop {
        let byte = (v & 0x7f) as u8;
        v >>= 7;
        if v == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

pub fn sleb(out: &mut Vec<u8>, mut v: i64) {
    loop {
        let byte = (v & 0x7f) as u8;
        v >>= 7;
        let done = (v == 0 && byte & 0x40 == 0) || (v == -1 && byte & 0x40 != 0);
        if done {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

pub fn elf_with_sections(sections: &[(&str, Vec<u8>)]) -> Vec<u8> {
    elf_with_symbols(sections, &[])
}

/// ELF with the given sections plus data symbols (defined in the first
/// section) under `symbols`.
pub fn elf_with_symbols(sections: &[(&str, Vec<u8>)], symbols: &[&str]) -> Vec<u8> {
    let mut obj = Object::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);
    let mut ids = Vec::new();
    for (name, data) in sections {
        let id = obj.add_section(Vec::new(), name.as_bytes().to_vec(), SectionKind::Debug);
        obj.append_section_data(id, data, 1);
        ids.push(id);
    }
    if !symbols.is_empty() {
        let data = obj.add_section(Vec::new(), b".rodata".to_vec(), SectionKind::ReadOnlyData);
        obj.append_section_data(data, &[0u8; 16], 8);
        for name in symbols {
            obj.add_symbol(Symbol {
                name: name.as_bytes().to_vec(),
                value: 0,
                size: 16,
                kind: SymbolKind::Data,
                scope: SymbolScope::Linkage,
                weak: false,
                section: SymbolSection::Section(data),
                flags: SymbolFlags::None,
            });
        }
    }
    obj.write().expect("write test ELF")
}

/// GNU `ZLIB` section framing around a stored (uncompressed) zlib stream.
pub fn gnu_zlib(data: &[u8]) -> Vec<u8> {
    let mut out = b"ZLIB".to_vec();
    out.extend_from_slice(&(data.len() as u64).to_be_bytes());
    out.extend_from_slice(&zlib_stored(data));
    out
}

/// zlib stream made only of stored deflate blocks.
pub fn zlib_stored(data: &[u8]) -> Vec<u8> {
    let mut out = vec![0x78, 0x01];
    let mut chunks = data.chunks(0xffff).peekable();
    if chunks.peek().is_none() {
        out.extend_from_slice(&[0x01, 0x00, 0x00, 0xff, 0xff]);
    }
    while let Some(chunk) = chunks.next() {
        let last = chunks.peek().is_none();
        out.push(u8::from(last));
        let len = chunk.len() as u16;
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(!len).to_le_bytes());
        out.extend_from_slice(chunk);
    }
    out.extend_from_slice(&adler32(data).to_be_bytes());
    out
}

fn adler32(data: &[u8]) -> u32 {
    let (mut a, mut b) = (1u32, 0u32);
    for &byte in data {
        a = (a + u32::from(byte)) % 65521;
        b = (b + a) % 65521;
    }
    (b << 16) | a
}
