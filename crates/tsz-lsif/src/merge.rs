//! Merge engine.
//!
//! Decides which symbols share a ResultSet. Symbols are grouped with a
//! union-find whose representative is always the first symbol visited:
//! declaration-merged members, structural duplicates and symbols sharing a
//! declaration span all collapse onto whichever symbol the run met first.
//! Export entries are classified into [`ExportBinding`]s, and renamed
//! exports are recorded so their reference aggregates can be bridged.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{Level, debug, span, trace, warn};
use tsz_common::limits;

use crate::checker::{Checker, DocumentId, ExportEntry, ExportKind, SymbolId, symbol_flags};

/// How an export entry binds its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportBinding {
    /// `export function foo() {}`
    Direct { symbol: SymbolId },
    /// `export * from "./a"`; `symbol` is the original declaration.
    ReExported { symbol: SymbolId },
    /// `export { foo }`, `export default foo`, `export = foo`
    Aliased { alias: SymbolId, target: SymbolId },
    /// `export { _foo as foo }`
    Renamed { alias: SymbolId, target: SymbolId },
}

/// An export alias whose references stay separate from its target's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameBridge {
    pub alias: SymbolId,
    /// Document owning the alias's reference aggregate.
    pub shard: DocumentId,
}

#[derive(Debug, Default)]
pub struct MergeEngine {
    parent: FxHashMap<SymbolId, SymbolId>,
    /// Symbols absorbed into each representative, in union order.
    absorbed: FxHashMap<SymbolId, Vec<SymbolId>>,
    members: FxHashMap<SymbolId, Vec<SymbolId>>,
    renames: IndexMap<SymbolId, Vec<RenameBridge>>,
}

impl MergeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Representative of `symbol`'s group.
    pub fn find(&self, symbol: SymbolId) -> SymbolId {
        let mut current = symbol;
        while let Some(&next) = self.parent.get(&current) {
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// Merge `absorbed` into `keep`'s group. `keep` must be the symbol that
    /// was visited first; its representative stays the representative.
    /// Returns `false` when both were already in one group.
    pub fn union(&mut self, keep: SymbolId, absorbed: SymbolId) -> bool {
        let keep_root = self.find(keep);
        let absorbed_root = self.find(absorbed);
        if keep_root == absorbed_root {
            return false;
        }
        trace!(keep = keep_root.0, absorbed = absorbed_root.0, "union");
        self.parent.insert(absorbed_root, keep_root);
        let mut moved = self.absorbed.remove(&absorbed_root).unwrap_or_default();
        moved.insert(0, absorbed_root);
        self.absorbed.entry(keep_root).or_default().extend(moved);
        // Compress the absorbed chain.
        let mut current = absorbed;
        while current != absorbed_root {
            let next = self.parent.get(&current).copied().unwrap_or(absorbed_root);
            self.parent.insert(current, keep_root);
            current = next;
        }
        true
    }

    pub fn same_group(&self, a: SymbolId, b: SymbolId) -> bool {
        self.find(a) == self.find(b)
    }

    /// Every symbol in `symbol`'s group, representative first.
    pub fn group_of(&self, symbol: SymbolId) -> Vec<SymbolId> {
        let root = self.find(symbol);
        let mut group = vec![root];
        if let Some(absorbed) = self.absorbed.get(&root) {
            group.extend(absorbed.iter().copied());
        }
        group
    }

    /// Publicly addressable members of `container`, unioned across all of
    /// its declarations in declaration order.
    ///
    /// When two declarations contribute a member with the same name, the
    /// first one wins and the later one joins its group.
    pub fn merged_members<C: Checker + ?Sized>(
        &mut self,
        checker: &C,
        container: SymbolId,
    ) -> Vec<SymbolId> {
        let container = self.find(container);
        if let Some(members) = self.members.get(&container) {
            return members.clone();
        }

        let mut by_name: IndexMap<String, SymbolId> = IndexMap::new();
        let mut seen: FxHashSet<SymbolId> = FxHashSet::default();
        for declaration in checker.declarations_of(container) {
            for member in declaration.members {
                if !seen.insert(member) {
                    continue;
                }
                let Some(data) = checker.symbol(member) else {
                    warn!(container = container.0, member = member.0, "member symbol unavailable");
                    continue;
                };
                match by_name.get(&data.name) {
                    Some(&first) => {
                        debug!(
                            "[MERGE] member '{}' of {} collides: {} joins {}",
                            data.name, container.0, member.0, first.0
                        );
                        self.union(first, member);
                    }
                    None => {
                        by_name.insert(data.name, member);
                    }
                }
            }
        }

        let members: Vec<SymbolId> = by_name.into_values().collect();
        self.members.insert(container, members.clone());
        members
    }

    /// Follow alias hops until a non-alias symbol.
    ///
    /// Fails for unresolvable hops, cycles, and chains longer than
    /// [`limits::MAX_ALIAS_CHAIN_DEPTH`].
    pub fn resolve_alias_chain<C: Checker + ?Sized>(
        &self,
        checker: &C,
        symbol: SymbolId,
    ) -> Option<SymbolId> {
        let _span = span!(Level::TRACE, "resolve_alias_chain", symbol = symbol.0).entered();

        let mut visited: FxHashSet<SymbolId> = FxHashSet::default();
        let mut current = symbol;
        let mut hops = 0;
        loop {
            let data = checker.symbol(current)?;
            if !data.has_flags(symbol_flags::ALIAS) {
                return Some(current);
            }
            if !visited.insert(current) {
                warn!(symbol = symbol.0, at = current.0, "alias chain is cyclic");
                return None;
            }
            if hops >= limits::MAX_ALIAS_CHAIN_DEPTH {
                warn!(symbol = symbol.0, "alias chain exceeds {} hops", hops);
                return None;
            }
            hops += 1;
            let Some(next) = checker.resolve_alias(current) else {
                warn!(symbol = symbol.0, at = current.0, "alias does not resolve");
                return None;
            };
            trace!(from = current.0, to = next.0, "alias hop");
            current = next;
        }
    }

    /// Classify one export table entry.
    pub fn classify<C: Checker + ?Sized>(
        &self,
        checker: &C,
        entry: &ExportEntry,
    ) -> Option<ExportBinding> {
        let data = checker.symbol(entry.symbol)?;
        let is_alias = data.has_flags(symbol_flags::ALIAS);

        let binding = match entry.kind {
            ExportKind::Declaration => ExportBinding::Direct {
                symbol: entry.symbol,
            },
            ExportKind::ReExport => ExportBinding::ReExported {
                symbol: self.resolve_alias_chain(checker, entry.symbol)?,
            },
            ExportKind::Named | ExportKind::Default | ExportKind::Assignment if !is_alias => {
                ExportBinding::Direct {
                    symbol: entry.symbol,
                }
            }
            ExportKind::Named => {
                let target = self.resolve_alias_chain(checker, entry.symbol)?;
                let target_name = checker.symbol(target)?.name;
                if target_name == entry.name {
                    ExportBinding::Aliased {
                        alias: entry.symbol,
                        target,
                    }
                } else {
                    ExportBinding::Renamed {
                        alias: entry.symbol,
                        target,
                    }
                }
            }
            ExportKind::Default | ExportKind::Assignment => ExportBinding::Aliased {
                alias: entry.symbol,
                target: self.resolve_alias_chain(checker, entry.symbol)?,
            },
        };
        trace!(name = %entry.name, ?binding, "classified export");
        Some(binding)
    }

    /// Remember that `alias` renames `original`.
    pub fn record_rename(&mut self, original: SymbolId, alias: SymbolId, shard: DocumentId) {
        let original = self.find(original);
        let bridges = self.renames.entry(original).or_default();
        if !bridges.iter().any(|bridge| bridge.alias == alias) {
            bridges.push(RenameBridge { alias, shard });
        }
    }

    pub fn renames_of(&self, original: SymbolId) -> &[RenameBridge] {
        self.renames
            .get(&self.find(original))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All recorded renames, in recording order.
    pub fn renames(&self) -> impl Iterator<Item = (SymbolId, &[RenameBridge])> {
        self.renames
            .iter()
            .map(|(&original, bridges)| (original, bridges.as_slice()))
    }
}

#[cfg(test)]
#[path = "../tests/merge_tests.rs"]
mod merge_tests;
