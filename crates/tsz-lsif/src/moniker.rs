//! Moniker synthesis.
//!
//! Symbols reachable through an export path are named by that path
//! (`a:foo.__rt.touch`). Everything else gets a content hash over the
//! declaring document and the symbol's canonical structural signature.
//! Members of identical anonymous shapes in one document collapse to one
//! identifier; other symbols are further keyed by their declaration.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use tracing::trace;
use tsz_common::limits;

use crate::checker::{
    Checker, DocumentInfo, Signature, SymbolId, SymbolKind, TypeId, TypeShape, symbol_flags,
};
use crate::export_path::ExportPath;
use crate::protocol::{Moniker, MonikerKind, UniquenessLevel};

const SOURCE_EXTENSIONS: [&str; 7] = [".d.ts", ".tsx", ".ts", ".jsx", ".js", ".mts", ".cts"];

const CYCLE_MARKER: &str = "<cycle>";
const DEPTH_MARKER: &str = "...";
const UNKNOWN_MARKER: &str = "?";

/// Module alias for a document: its path relative to `project_root`, without
/// a leading `/` and without a source extension. An explicit module name
/// (package documents) wins.
pub fn module_alias(document: &DocumentInfo, project_root: &str) -> String {
    if let Some(name) = &document.module_name {
        return name.clone();
    }

    let uri = strip_scheme(&document.uri);
    let root = strip_scheme(project_root).trim_end_matches('/');
    let relative = match uri.strip_prefix(root) {
        Some(rest) if root.is_empty() || rest.starts_with('/') => rest,
        _ => uri,
    };
    let relative = relative.trim_start_matches('/');

    for extension in SOURCE_EXTENSIONS {
        if let Some(stem) = relative.strip_suffix(extension) {
            return stem.to_string();
        }
    }
    relative.to_string()
}

fn strip_scheme(uri: &str) -> &str {
    uri.strip_prefix("file://").unwrap_or(uri)
}

/// Moniker naming an export path.
pub fn path_moniker(scheme: &str, module_alias: &str, path: &ExportPath, kind: MonikerKind) -> Moniker {
    Moniker {
        scheme: scheme.to_string(),
        identifier: path.identifier(module_alias),
        unique: UniquenessLevel::Group,
        kind,
    }
}

/// Document-scoped moniker for a content hash.
pub fn local_moniker(scheme: &str, identifier: String) -> Moniker {
    Moniker {
        scheme: scheme.to_string(),
        identifier,
        unique: UniquenessLevel::Document,
        kind: MonikerKind::Local,
    }
}

/// SHA-256 over `uri` and `signature`, truncated and base64 encoded.
pub fn digest_identifier(uri: &str, signature: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(uri.as_bytes());
    hasher.update(b"\n");
    hasher.update(signature.as_bytes());
    let digest = hasher.finalize();
    STANDARD.encode(&digest[..limits::LOCAL_MONIKER_DIGEST_BYTES])
}

/// Renders canonical structural signatures.
///
/// Canonical text is independent of member order and source formatting:
/// object members are sorted by name, union and intersection constituents
/// are sorted, nominal types render as a reference to their name.
pub struct StructuralHasher<'a, C: Checker + ?Sized> {
    checker: &'a C,
}

impl<'a, C: Checker + ?Sized> StructuralHasher<'a, C> {
    pub fn new(checker: &'a C) -> Self {
        StructuralHasher { checker }
    }

    /// Hash identifier for `symbol` declared in `uri`, or `None` when its
    /// type cannot be resolved.
    ///
    /// Members of anonymous types are identified by their shape alone.
    /// Every other symbol also hashes the start of its first declaration, so
    /// two same-shaped declarations never share an identifier.
    pub fn local_identifier(&self, uri: &str, symbol: SymbolId) -> Option<String> {
        let mut signature = self.symbol_signature(symbol)?;
        if !self.is_structural_member(symbol)
            && let Some(decl) = self.checker.declarations_of(symbol).first()
        {
            use std::fmt::Write;
            let start = decl.range.start;
            let _ = write!(signature, "@{}:{}", start.line, start.character);
        }
        trace!(symbol = symbol.0, %signature, "local moniker signature");
        Some(digest_identifier(uri, &signature))
    }

    /// Hash identifier for a type alone.
    pub fn hash_type(&self, uri: &str, ty: TypeId) -> Option<String> {
        self.checker.type_shape(ty)?;
        let text = self.canonical_type(ty);
        Some(digest_identifier(uri, &text))
    }

    /// Whether `symbol` is a member of an anonymous type or object literal.
    pub fn is_structural_member(&self, symbol: SymbolId) -> bool {
        self.checker
            .symbol(symbol)
            .and_then(|data| data.parent)
            .and_then(|parent| self.checker.symbol(parent))
            .is_some_and(|parent| parent.has_flags(symbol_flags::ANONYMOUS))
    }

    /// `container chain | kind | name | canonical type`
    pub fn symbol_signature(&self, symbol: SymbolId) -> Option<String> {
        let data = self.checker.symbol(symbol)?;
        let ty = self.checker.type_of_symbol(symbol)?;
        self.checker.type_shape(ty)?;

        let kind = self
            .checker
            .declarations_of(symbol)
            .first()
            .map(|decl| decl.kind)
            .unwrap_or_else(|| SymbolKind::from_flags(data.flags));

        Some(format!(
            "{}|{}|{}|{}",
            self.container_chain(data.parent),
            kind as u8,
            data.name,
            self.canonical_type(ty)
        ))
    }

    pub fn canonical_type(&self, ty: TypeId) -> String {
        let mut visiting = Vec::new();
        self.render_type(ty, 0, &mut visiting)
    }

    fn container_chain(&self, mut parent: Option<SymbolId>) -> String {
        let mut chain = Vec::new();
        let mut hops = 0;
        while let Some(id) = parent {
            if hops >= limits::MAX_STRUCTURAL_HASH_DEPTH {
                chain.push(DEPTH_MARKER.to_string());
                break;
            }
            hops += 1;
            let Some(data) = self.checker.symbol(id) else {
                chain.push(UNKNOWN_MARKER.to_string());
                break;
            };
            if data.has_flags(symbol_flags::ANONYMOUS) {
                let shape = self
                    .checker
                    .type_of_symbol(id)
                    .map(|ty| self.canonical_type(ty))
                    .unwrap_or_else(|| UNKNOWN_MARKER.to_string());
                chain.push(shape);
            } else {
                chain.push(data.name);
            }
            parent = data.parent;
        }
        chain.reverse();
        chain.join("/")
    }

    fn render_type(&self, ty: TypeId, depth: u32, visiting: &mut Vec<TypeId>) -> String {
        if visiting.contains(&ty) {
            return CYCLE_MARKER.to_string();
        }
        if depth >= limits::MAX_STRUCTURAL_HASH_DEPTH {
            return DEPTH_MARKER.to_string();
        }
        let Some(shape) = self.checker.type_shape(ty) else {
            return UNKNOWN_MARKER.to_string();
        };

        visiting.push(ty);
        let text = match shape {
            TypeShape::Primitive { name } => name,
            TypeShape::Object {
                symbol,
                alias,
                members,
                call_signatures,
                construct_signatures,
            } => {
                if !self.checker.is_structural(ty) {
                    let name = alias
                        .or(symbol)
                        .and_then(|id| self.checker.symbol(id))
                        .map(|data| data.name)
                        .unwrap_or_else(|| UNKNOWN_MARKER.to_string());
                    format!("ref({name})")
                } else {
                    self.render_object(&members, &call_signatures, &construct_signatures, depth, visiting)
                }
            }
            TypeShape::Union { types } => self.render_constituents(&types, "|", depth, visiting),
            TypeShape::Intersection { types } => {
                self.render_constituents(&types, "&", depth, visiting)
            }
            TypeShape::Array { element, readonly } => {
                let element = self.render_type(element, depth + 1, visiting);
                if readonly {
                    format!("readonly {element}[]")
                } else {
                    format!("{element}[]")
                }
            }
        };
        visiting.pop();
        text
    }

    fn render_object(
        &self,
        members: &[SymbolId],
        call_signatures: &[Signature],
        construct_signatures: &[Signature],
        depth: u32,
        visiting: &mut Vec<TypeId>,
    ) -> String {
        let mut parts: Vec<String> = members
            .iter()
            .map(|&member| {
                let name = self
                    .checker
                    .symbol(member)
                    .map(|data| data.name)
                    .unwrap_or_else(|| UNKNOWN_MARKER.to_string());
                let ty = self
                    .checker
                    .type_of_symbol(member)
                    .map(|ty| self.render_type(ty, depth + 1, visiting))
                    .unwrap_or_else(|| UNKNOWN_MARKER.to_string());
                format!("{name}:{ty}")
            })
            .collect();
        parts.sort();

        for signature in call_signatures {
            parts.push(self.render_signature("", signature, depth, visiting));
        }
        for signature in construct_signatures {
            parts.push(self.render_signature("new", signature, depth, visiting));
        }
        format!("{{{}}}", parts.join(";"))
    }

    fn render_signature(
        &self,
        prefix: &str,
        signature: &Signature,
        depth: u32,
        visiting: &mut Vec<TypeId>,
    ) -> String {
        let parameters: Vec<String> = signature
            .parameters
            .iter()
            .map(|&parameter| {
                let name = self
                    .checker
                    .symbol(parameter)
                    .map(|data| data.name)
                    .unwrap_or_else(|| UNKNOWN_MARKER.to_string());
                let ty = self
                    .checker
                    .type_of_symbol(parameter)
                    .map(|ty| self.render_type(ty, depth + 1, visiting))
                    .unwrap_or_else(|| UNKNOWN_MARKER.to_string());
                format!("{name}:{ty}")
            })
            .collect();
        let ret = self.render_type(signature.return_type, depth + 1, visiting);
        format!("{prefix}({})=>{ret}", parameters.join(","))
    }

    fn render_constituents(
        &self,
        types: &[TypeId],
        separator: &str,
        depth: u32,
        visiting: &mut Vec<TypeId>,
    ) -> String {
        let mut parts: Vec<String> = types
            .iter()
            .map(|&ty| self.render_type(ty, depth + 1, visiting))
            .collect();
        parts.sort();
        parts.join(separator)
    }
}

#[cfg(test)]
#[path = "../tests/moniker_tests.rs"]
mod moniker_tests;
