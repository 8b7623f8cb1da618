use std::collections::BTreeMap;

use crate::decision::{Decision, Verdict};
use crate::level::SpecificityLevel;
use crate::operation::Operation;
use crate::pattern::{Catalog, PatternEntry};

/// Resolve a decision for a canonical path using specificity precedence.
///
/// `restrictive_mode` is the permission probe's contribution: `Some(mode)`
/// when the path exists and its others-read bit is cleared. It enters the
/// lattice at the PERMISSIONS position, below SECURITY_DIRECTORY and the
/// trusted-dir gate, above DIR_GLOB. Within a level any DENY entry beats
/// every PASS entry.
///
/// For a fixed catalog and probe input this is a pure function.
pub fn resolve(
    path: &str,
    op: Operation,
    restrictive_mode: Option<u32>,
    catalog: &Catalog,
) -> Decision {
    let mut by_level: BTreeMap<SpecificityLevel, Vec<&PatternEntry>> = BTreeMap::new();
    for entry in catalog.matching(path, op) {
        by_level.entry(entry.level()).or_default().push(entry);
    }

    for level in SpecificityLevel::BEFORE_TRUSTED {
        if let Some(decision) = decide_at(&by_level, level) {
            return decision;
        }
    }

    // Trusted directories are allow-only and read-shaped only; a trusted
    // read also preempts the permission probe.
    if op.is_read_shaped() {
        if let Some(entries) = by_level.get(&SpecificityLevel::TrustedDir) {
            if let Some(entry) = entries.iter().find(|e| e.verdict() == Verdict::Pass) {
                return Decision::allowed_by_pattern(
                    entry.source(),
                    entry.description(),
                    SpecificityLevel::TrustedDir,
                );
            }
        }
    }

    if let Some(mode) = restrictive_mode {
        return Decision::denied_by_probe(mode);
    }

    for level in SpecificityLevel::AFTER_PERMISSIONS {
        if let Some(decision) = decide_at(&by_level, level) {
            return decision;
        }
    }

    Decision::pass_unmatched()
}

/// Decision at a single level, DENY superseding PASS.
fn decide_at(
    by_level: &BTreeMap<SpecificityLevel, Vec<&PatternEntry>>,
    level: SpecificityLevel,
) -> Option<Decision> {
    let entries = by_level.get(&level)?;

    if let Some(entry) = entries.iter().find(|e| e.verdict() == Verdict::Deny) {
        return Some(Decision::denied_by_pattern(
            entry.source(),
            entry.description(),
            level,
        ));
    }
    entries
        .iter()
        .find(|e| e.verdict() == Verdict::Pass)
        .map(|entry| Decision::allowed_by_pattern(entry.source(), entry.description(), level))
}
