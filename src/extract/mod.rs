//! Two-pass model extraction over an entry stream.
//!
//! Pass one builds the [`OffsetIndex`]. Pass two re-walks the stream in
//! order; every enumeration and class/struct entry has its direct children
//! collected and is handed to the matching extractor, whose model is merged
//! into the [`ModelRegistry`].

pub mod enums;
pub mod udt;

pub use enums::EnumExtractor;
pub use udt::UdtExtractor;

use crate::config::ExtractConfig;
use crate::dwarf::entry::{DebugEntry, Tag};
use crate::dwarf::index::OffsetIndex;
use crate::dwarf::resolver::TypeNameResolver;
use crate::dwarf::stream::{EntryStream, StreamItem};
use crate::dwarf::walker::TreeWalker;
use crate::error::{Anomaly, Result};
use crate::registry::ModelRegistry;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

/// Counters for one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractStats {
    pub entries_scanned: usize,
    pub entries_indexed: usize,
    pub enums_extracted: usize,
    pub udts_extracted: usize,
    pub forward_declarations_skipped: usize,
    pub unresolved_references: usize,
    pub malformed_entries: usize,
    pub reference_cycles: usize,
}

/// Sink for non-fatal anomalies: logs each one, counts all of them and keeps
/// the first `cap` for the caller.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    recorded: Vec<Anomaly>,
    cap: usize,
    dropped: usize,
    unresolved: usize,
    malformed: usize,
    cycles: usize,
}

impl Diagnostics {
    pub fn new(cap: usize) -> Self {
        Self {
            recorded: Vec::new(),
            cap,
            dropped: 0,
            unresolved: 0,
            malformed: 0,
            cycles: 0,
        }
    }

    pub fn record(&mut self, anomaly: Anomaly) {
        warn!(%anomaly, "Debug-info anomaly");
        match anomaly {
            Anomaly::UnresolvedTypeReference { .. } => self.unresolved += 1,
            Anomaly::MalformedEntry { .. } => self.malformed += 1,
            Anomaly::ReferenceCycle { .. } => self.cycles += 1,
        }
        if self.recorded.len() < self.cap {
            self.recorded.push(anomaly);
        } else {
            self.dropped += 1;
        }
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.recorded
    }

    /// Anomalies counted past the cap.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn total(&self) -> usize {
        self.unresolved + self.malformed + self.cycles
    }

    fn fill(&self, stats: &mut ExtractStats) {
        stats.unresolved_references = self.unresolved;
        stats.malformed_entries = self.malformed;
        stats.reference_cycles = self.cycles;
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(usize::MAX)
    }
}

/// Everything an extraction run hands to the emitter and the caller.
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub registry: ModelRegistry,
    pub stats: ExtractStats,
    pub anomalies: Vec<Anomaly>,
}

/// Run both passes over `stream`.
///
/// Only stream failures abort; entry-level anomalies are recorded and the
/// affected member, field or base is skipped or defaulted.
pub fn extract_models<'a, S: EntryStream<'a>>(
    stream: &mut S,
    config: &ExtractConfig,
) -> Result<ExtractOutcome> {
    let index = OffsetIndex::build(stream)?;
    let mut diagnostics = Diagnostics::new(config.max_recorded_anomalies);
    let mut registry = ModelRegistry::new();
    let mut stats = ExtractStats {
        entries_indexed: index.len(),
        ..ExtractStats::default()
    };

    {
        let _span = info_span!("extract_pass").entered();
        let resolver = TypeNameResolver::new(&index, &config.resolver);
        let enum_extractor = EnumExtractor::new();
        let udt_extractor = UdtExtractor::new(&resolver, &config.resolver);

        while let Some(item) = stream.next_item()? {
            let StreamItem::Entry(entry) = item else {
                continue;
            };
            stats.entries_scanned += 1;

            match entry.tag {
                Tag::EnumerationType => {
                    let children = collect_children(entry, stream)?;
                    let model = enum_extractor.extract(entry, &children, &mut diagnostics);
                    let name = model.name.clone();
                    let stored = registry.upsert_enum(&name, model);
                    debug!(offset = %entry.offset, name = %stored, "Extracted enum");
                    stats.enums_extracted += 1;
                }
                Tag::ClassType | Tag::StructType => {
                    let children = collect_children(entry, stream)?;
                    match udt_extractor.extract(entry, &children, &mut diagnostics) {
                        Some(model) => {
                            let name = model.name.clone();
                            registry.upsert_udt(&name, model);
                            stats.udts_extracted += 1;
                        }
                        None => stats.forward_declarations_skipped += 1,
                    }
                }
                _ => {}
            }
        }
    }

    diagnostics.fill(&mut stats);
    info!(
        enums = registry.enum_count(),
        udts = registry.udt_count(),
        anomalies = diagnostics.total(),
        "Extraction finished"
    );

    Ok(ExtractOutcome {
        registry,
        stats,
        anomalies: diagnostics.anomalies().to_vec(),
    })
}

fn collect_children<'a, S: EntryStream<'a>>(
    parent: &DebugEntry,
    stream: &mut S,
) -> Result<Vec<&'a DebugEntry>> {
    TreeWalker::direct_children(parent, stream).collect()
}
