/*
 * source_registry.rs
 *
 * Copyright (C) 2026 Nucleus Contributors. All rights reserved.
 *
 */

use std::collections::HashMap;

use crate::compiler::CompiledUnit;

/// Maps a compiled unit's identity to the exact source text that produced
/// it, so that tracebacks can show what actually ran rather than whatever
/// the editor buffer currently holds (P4).
///
/// Entries are inserted only for block submissions (§4.3); single
/// interactive lines have no meaningful editor origin and are never
/// registered. Never pruned during a session — bounded only by how long
/// the kernel runs.
#[derive(Default)]
pub struct SourceRegistry {
    entries: HashMap<UnitId, String>,
}

/// Stable identity derived from a [`CompiledUnit`]: conceptually the pair
/// `(object-identity, origin-tag)`. We use the unit's own monotonic id
/// together with its origin tag rather than a raw memory address, since
/// Rust gives us no stable notion of object identity to hash on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnitId {
    id: u64,
    origin: String,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the source text for a freshly compiled block.
    pub fn insert(&mut self, unit: &CompiledUnit, source: String) {
        let key = UnitId {
            id: unit.id(),
            origin: unit.origin().to_string(),
        };
        self.entries.insert(key, source);
    }

    /// Look up the source text by the unit identity encoded in a
    /// traceback frame: the unit's id and its origin tag.
    pub fn lookup(&self, id: u64, origin: &str) -> Option<&str> {
        let key = UnitId {
            id,
            origin: origin.to_string(),
        };
        self.entries.get(&key).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Mode;
    use crate::compiler::OriginTag;

    fn unit(id: u64, origin: &str) -> CompiledUnit {
        CompiledUnit::new_for_test(id, OriginTag::parse(origin), Mode::Exec)
    }

    #[test]
    fn block_submissions_are_retrievable_by_identity() {
        let mut registry = SourceRegistry::new();
        let unit = unit(1, "ex.py+10");
        registry.insert(&unit, "a=1\nb=1/0\n".to_string());

        assert_eq!(
            registry.lookup(1, "ex.py+10"),
            Some("a=1\nb=1/0\n")
        );
        assert_eq!(registry.lookup(2, "ex.py+10"), None);
        assert_eq!(registry.lookup(1, "other.py"), None);
    }

    #[test]
    fn edits_to_the_editor_copy_never_touch_the_registry() {
        // P4: once a source is registered it is immutable from the
        // registry's point of view; mutating some external string later
        // (simulated here by just not writing to the registry again)
        // cannot change what lookup returns.
        let mut registry = SourceRegistry::new();
        let unit = unit(7, "cell.py");
        registry.insert(&unit, "print(1)\n".to_string());
        let mut edited = "print(1)\n".to_string();
        edited.push_str("print(2)\n");
        assert_eq!(registry.lookup(7, "cell.py"), Some("print(1)\n"));
    }
}
