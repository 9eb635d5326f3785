//! Export walker.
//!
//! Visits a module's exports and every structural member reachable from
//! them, producing `(node, export path)` pairs in a deterministic order:
//! export table order first, then depth-first in member/signature order.
//!
//! Traversal uses an explicit task stack. A node is identified by
//! `(symbol or type, kind of the segment that entered it)`; re-entering a
//! node that is still on the ancestor chain ends that branch. Descent into a
//! referenced type stops at nominal types (interfaces, classes, enums, type
//! aliases) unless that type is the subject of the path, i.e. the type the
//! exported declaration itself introduces.
//!
//! The walker only computes; emission happens in the indexer.

use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};
use tsz_common::limits;

use crate::checker::{Checker, DocumentId, SymbolId, TypeId, TypeShape, symbol_flags};
use crate::export_path::{ExportPath, Segment, SegmentKind};
use crate::merge::{ExportBinding, MergeEngine};

/// What a walk item names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalkNode {
    Symbol(SymbolId),
    /// Export alias standing for `target`. `renamed` aliases keep their own
    /// references.
    Alias {
        alias: SymbolId,
        target: SymbolId,
        renamed: bool,
    },
}

impl WalkNode {
    /// Symbol that receives the path's moniker.
    pub fn subject(&self) -> SymbolId {
        match *self {
            WalkNode::Symbol(symbol) => symbol,
            WalkNode::Alias { alias, .. } => alias,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkItem {
    pub node: WalkNode,
    pub path: ExportPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NodeKey {
    Symbol(SymbolId),
    Type(TypeId),
}

type VisitKey = (NodeKey, SegmentKind);

enum Task {
    Symbol {
        symbol: SymbolId,
        path: ExportPath,
        /// `false` when only the children are wanted (alias targets).
        emit: bool,
    },
    Type {
        ty: TypeId,
        path: ExportPath,
        /// Nominal type allowed to be expanded.
        subject: Option<TypeId>,
        /// Object members already came from the container's declarations.
        skip_members: bool,
    },
    Exit(VisitKey),
}

pub struct ExportWalker<'a, C: Checker + ?Sized> {
    checker: &'a C,
    merge: &'a mut MergeEngine,
    max_depth: u32,
    item_budget: usize,
}

impl<'a, C: Checker + ?Sized> ExportWalker<'a, C> {
    pub fn new(checker: &'a C, merge: &'a mut MergeEngine, max_depth: u32) -> Self {
        ExportWalker {
            checker,
            merge,
            max_depth,
            item_budget: limits::MAX_EXPORT_WALK_ITEMS,
        }
    }

    pub fn with_item_budget(mut self, budget: usize) -> Self {
        self.item_budget = budget;
        self
    }

    /// Walk all exports of `module`. Non-modules yield nothing.
    pub fn walk_module(&mut self, module: DocumentId) -> Vec<WalkItem> {
        let Some(entries) = self.checker.exports_of_module(module) else {
            trace!(module = module.0, "not a module");
            return Vec::new();
        };

        let mut walk = ModuleWalk {
            items: Vec::new(),
            produced: FxHashSet::default(),
            visiting: FxHashSet::default(),
            exhausted: false,
        };

        for entry in &entries {
            if walk.exhausted {
                break;
            }
            let Some(binding) = self.merge.classify(self.checker, entry) else {
                warn!(module = module.0, name = %entry.name, "export could not be classified");
                continue;
            };
            let path = ExportPath::root().child(Segment::for_export_name(&entry.name));
            let root_task = match binding {
                ExportBinding::Direct { symbol } | ExportBinding::ReExported { symbol } => {
                    Task::Symbol {
                        symbol,
                        path,
                        emit: true,
                    }
                }
                ExportBinding::Aliased { alias, target } | ExportBinding::Renamed { alias, target } => {
                    let renamed = matches!(binding, ExportBinding::Renamed { .. });
                    let node = WalkNode::Alias {
                        alias,
                        target,
                        renamed,
                    };
                    if !walk.push_item(node, &path, self.item_budget) {
                        continue;
                    }
                    Task::Symbol {
                        symbol: target,
                        path,
                        emit: false,
                    }
                }
            };
            self.run(root_task, &mut walk);
        }

        if walk.exhausted {
            warn!(
                module = module.0,
                budget = self.item_budget,
                "export walk stopped at item budget"
            );
        }
        debug!(module = module.0, items = walk.items.len(), "module walked");
        walk.items
    }

    fn run(&mut self, root: Task, walk: &mut ModuleWalk) {
        let mut stack = vec![root];
        while let Some(task) = stack.pop() {
            if walk.exhausted {
                return;
            }
            match task {
                Task::Exit(key) => {
                    walk.visiting.remove(&key);
                }
                Task::Symbol { symbol, path, emit } => {
                    self.visit_symbol(symbol, path, emit, walk, &mut stack);
                }
                Task::Type {
                    ty,
                    path,
                    subject,
                    skip_members,
                } => {
                    self.visit_type(ty, path, subject, skip_members, walk, &mut stack);
                }
            }
        }
    }

    fn visit_symbol(
        &mut self,
        symbol: SymbolId,
        path: ExportPath,
        emit: bool,
        walk: &mut ModuleWalk,
        stack: &mut Vec<Task>,
    ) {
        if path.len() > self.max_depth as usize {
            debug!(symbol = symbol.0, %path, "export path depth limit reached");
            return;
        }
        let symbol = self.merge.find(symbol);
        let key = (NodeKey::Symbol(symbol), path.last_kind());
        if walk.visiting.contains(&key) {
            trace!(symbol = symbol.0, %path, "cycle");
            return;
        }
        if emit && !walk.push_item(WalkNode::Symbol(symbol), &path, self.item_budget) {
            return;
        }

        let Some(data) = self.checker.symbol(symbol) else {
            warn!(symbol = symbol.0, "symbol unavailable");
            return;
        };

        walk.visiting.insert(key);
        stack.push(Task::Exit(key));

        let mut children = Vec::new();
        let is_container = data.has_flags(symbol_flags::CONTAINER);
        if is_container {
            for member in self.merge.merged_members(self.checker, symbol) {
                let Some(member_data) = self.checker.symbol(member) else {
                    continue;
                };
                children.push(Task::Symbol {
                    symbol: member,
                    path: path.child(Segment::for_member_name(&member_data.name)),
                    emit: true,
                });
            }
        }

        match self.checker.type_of_symbol(symbol) {
            Some(ty) => {
                let declares_type = data.has_flags(symbol_flags::NOMINAL | symbol_flags::CONTAINER);
                children.push(Task::Type {
                    ty,
                    path,
                    subject: declares_type.then_some(ty),
                    skip_members: is_container,
                });
            }
            None => debug!(symbol = symbol.0, "type unavailable, not descending"),
        }

        stack.extend(children.into_iter().rev());
    }

    fn visit_type(
        &mut self,
        ty: TypeId,
        path: ExportPath,
        subject: Option<TypeId>,
        skip_members: bool,
        walk: &mut ModuleWalk,
        stack: &mut Vec<Task>,
    ) {
        if path.len() > self.max_depth as usize {
            debug!(ty = ty.0, %path, "export path depth limit reached");
            return;
        }
        let key = (NodeKey::Type(ty), path.last_kind());
        if walk.visiting.contains(&key) {
            trace!(ty = ty.0, %path, "cycle");
            return;
        }
        let Some(shape) = self.checker.type_shape(ty) else {
            debug!(ty = ty.0, "type shape unavailable, not descending");
            return;
        };

        let mut children = Vec::new();
        match shape {
            TypeShape::Primitive { .. } => return,
            TypeShape::Object {
                members,
                call_signatures,
                construct_signatures,
                ..
            } => {
                if !self.checker.is_structural(ty) && subject != Some(ty) {
                    trace!(ty = ty.0, %path, "nominal boundary");
                    return;
                }
                if !skip_members {
                    for member in members {
                        let Some(member_data) = self.checker.symbol(member) else {
                            continue;
                        };
                        children.push(Task::Symbol {
                            symbol: member,
                            path: path.child(Segment::for_member_name(&member_data.name)),
                            emit: true,
                        });
                    }
                }
                for signature in &call_signatures {
                    self.push_parameters(&signature.parameters, &path, &mut children);
                    children.push(Task::Type {
                        ty: signature.return_type,
                        path: path.child(Segment::ReturnType),
                        subject: None,
                        skip_members: false,
                    });
                }
                for signature in &construct_signatures {
                    self.push_parameters(&signature.parameters, &path, &mut children);
                }
            }
            TypeShape::Union { types } | TypeShape::Intersection { types } => {
                for constituent in types {
                    children.push(Task::Type {
                        ty: constituent,
                        path: path.clone(),
                        subject: None,
                        skip_members: false,
                    });
                }
            }
            TypeShape::Array { element, .. } => {
                children.push(Task::Type {
                    ty: element,
                    path: path.clone(),
                    subject: None,
                    skip_members: false,
                });
            }
        }

        walk.visiting.insert(key);
        stack.push(Task::Exit(key));
        stack.extend(children.into_iter().rev());
    }

    fn push_parameters(&self, parameters: &[SymbolId], path: &ExportPath, children: &mut Vec<Task>) {
        for &parameter in parameters {
            let Some(data) = self.checker.symbol(parameter) else {
                continue;
            };
            let Some(ty) = self.checker.type_of_symbol(parameter) else {
                debug!(parameter = parameter.0, "parameter type unavailable");
                continue;
            };
            children.push(Task::Type {
                ty,
                path: path.child(Segment::Argument(data.name)),
                subject: None,
                skip_members: false,
            });
        }
    }
}

struct ModuleWalk {
    items: Vec<WalkItem>,
    produced: FxHashSet<(WalkNode, ExportPath)>,
    visiting: FxHashSet<VisitKey>,
    exhausted: bool,
}

impl ModuleWalk {
    /// Record an item unless it was already produced. Returns `false` when
    /// the item is a duplicate or the budget is spent.
    fn push_item(&mut self, node: WalkNode, path: &ExportPath, budget: usize) -> bool {
        if self.items.len() >= budget {
            self.exhausted = true;
            return false;
        }
        if !self.produced.insert((node, path.clone())) {
            trace!(?node, %path, "duplicate walk item");
            return false;
        }
        self.items.push(WalkItem {
            node,
            path: path.clone(),
        });
        true
    }
}

#[cfg(test)]
#[path = "../tests/export_walker_tests.rs"]
mod export_walker_tests;
