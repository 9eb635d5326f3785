//! Checker capability interface.
//!
//! The indexer never parses or type-checks anything itself. Everything it
//! knows about the program comes through the [`Checker`] trait: symbols,
//! their declarations, resolved types, module exports and references.
//! Implementations must answer deterministically: the same question asked
//! twice returns the same answer in the same order.

use serde::{Deserialize, Serialize};
use tsz_common::position::{Position, Range};

/// Opaque symbol handle owned by the checker.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SymbolId(pub u32);

/// Opaque type handle owned by the checker.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TypeId(pub u32);

/// Opaque document handle owned by the checker.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DocumentId(pub u32);

/// Symbol flags, bit-compatible in spirit with TypeScript's `SymbolFlags`.
pub mod symbol_flags {
    pub const NONE: u32 = 0;
    pub const FUNCTION_SCOPED_VARIABLE: u32 = 1 << 0;
    pub const BLOCK_SCOPED_VARIABLE: u32 = 1 << 1;
    pub const PROPERTY: u32 = 1 << 2;
    pub const ENUM_MEMBER: u32 = 1 << 3;
    pub const FUNCTION: u32 = 1 << 4;
    pub const CLASS: u32 = 1 << 5;
    pub const INTERFACE: u32 = 1 << 6;
    pub const CONST_ENUM: u32 = 1 << 7;
    pub const REGULAR_ENUM: u32 = 1 << 8;
    pub const VALUE_MODULE: u32 = 1 << 9;
    pub const NAMESPACE_MODULE: u32 = 1 << 10;
    pub const TYPE_LITERAL: u32 = 1 << 11;
    pub const OBJECT_LITERAL: u32 = 1 << 12;
    pub const METHOD: u32 = 1 << 13;
    pub const CONSTRUCTOR: u32 = 1 << 14;
    pub const GET_ACCESSOR: u32 = 1 << 15;
    pub const SET_ACCESSOR: u32 = 1 << 16;
    pub const SIGNATURE: u32 = 1 << 17;
    pub const TYPE_PARAMETER: u32 = 1 << 18;
    pub const TYPE_ALIAS: u32 = 1 << 19;
    pub const EXPORT_VALUE: u32 = 1 << 20;
    pub const ALIAS: u32 = 1 << 21;
    pub const PROTOTYPE: u32 = 1 << 22;
    pub const EXPORT_STAR: u32 = 1 << 23;
    pub const OPTIONAL: u32 = 1 << 24;
    pub const TRANSIENT: u32 = 1 << 25;

    pub const VARIABLE: u32 = FUNCTION_SCOPED_VARIABLE | BLOCK_SCOPED_VARIABLE;
    pub const ENUM: u32 = REGULAR_ENUM | CONST_ENUM;
    pub const NAMESPACE: u32 = VALUE_MODULE | NAMESPACE_MODULE;
    pub const ACCESSOR: u32 = GET_ACCESSOR | SET_ACCESSOR;

    /// Symbols whose members are addressed through their declarations
    /// rather than through their type.
    pub const CONTAINER: u32 = CLASS | INTERFACE | ENUM | NAMESPACE;

    /// Symbols that give a type a name of its own.
    pub const NOMINAL: u32 = CLASS | INTERFACE | ENUM | TYPE_ALIAS;

    /// Symbols standing for anonymous object shapes.
    pub const ANONYMOUS: u32 = TYPE_LITERAL | OBJECT_LITERAL;
}

/// LSP `SymbolKind`, serialized as its numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SymbolKind {
    File = 1,
    Module = 2,
    Namespace = 3,
    Package = 4,
    Class = 5,
    Method = 6,
    Property = 7,
    Field = 8,
    Constructor = 9,
    Enum = 10,
    Interface = 11,
    Function = 12,
    Variable = 13,
    Constant = 14,
    String = 15,
    Number = 16,
    Boolean = 17,
    Array = 18,
    Object = 19,
    Key = 20,
    Null = 21,
    EnumMember = 22,
    Struct = 23,
    Event = 24,
    Operator = 25,
    TypeParameter = 26,
}

impl SymbolKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        use SymbolKind::*;
        const ALL: [SymbolKind; 26] = [
            File, Module, Namespace, Package, Class, Method, Property, Field, Constructor, Enum,
            Interface, Function, Variable, Constant, String, Number, Boolean, Array, Object, Key,
            Null, EnumMember, Struct, Event, Operator, TypeParameter,
        ];
        ALL.get(usize::from(value).checked_sub(1)?).copied()
    }

    /// Best-effort kind for a symbol given only its flags.
    pub fn from_flags(flags: u32) -> Self {
        use symbol_flags as f;
        if flags & f::CLASS != 0 {
            SymbolKind::Class
        } else if flags & f::INTERFACE != 0 {
            SymbolKind::Interface
        } else if flags & f::ENUM != 0 {
            SymbolKind::Enum
        } else if flags & f::ENUM_MEMBER != 0 {
            SymbolKind::EnumMember
        } else if flags & f::FUNCTION != 0 {
            SymbolKind::Function
        } else if flags & f::METHOD != 0 {
            SymbolKind::Method
        } else if flags & f::CONSTRUCTOR != 0 {
            SymbolKind::Constructor
        } else if flags & (f::PROPERTY | f::ACCESSOR) != 0 {
            SymbolKind::Property
        } else if flags & f::NAMESPACE != 0 {
            SymbolKind::Namespace
        } else if flags & f::TYPE_PARAMETER != 0 {
            SymbolKind::TypeParameter
        } else {
            SymbolKind::Variable
        }
    }
}

impl Serialize for SymbolKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for SymbolKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        SymbolKind::from_u8(value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid symbol kind {value}")))
    }
}

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub uri: String,
    #[serde(default = "default_language_id")]
    pub language_id: String,
    /// Library documents (`.d.ts` from packages) are walked for export paths
    /// but never emitted.
    #[serde(default)]
    pub external: bool,
    /// Overrides the module alias derived from the URI (package names).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
}

fn default_language_id() -> String {
    "typescript".to_string()
}

/// Basic symbol data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolData {
    /// Escaped name. Well-known symbols use the `__@name` form.
    pub name: String,
    pub flags: u32,
    /// Lexically enclosing symbol (namespace, class, type literal, function).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<SymbolId>,
}

impl SymbolData {
    pub fn has_flags(&self, flags: u32) -> bool {
        self.flags & flags != 0
    }
}

/// One declaration of a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub document: DocumentId,
    /// Span of the declaration's name.
    pub range: Range,
    /// Span of the whole declaration.
    pub full_range: Range,
    /// Source text of the name.
    pub text: String,
    pub kind: SymbolKind,
    /// `false` for declarations without a body (overload signatures,
    /// `declare` statements, interface members).
    #[serde(default = "default_true")]
    pub is_definition: bool,
    /// Publicly addressable members contributed by this declaration
    /// (class/interface members, exported namespace members, enum members),
    /// in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<SymbolId>,
}

fn default_true() -> bool {
    true
}

/// A call or construct signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub parameters: Vec<SymbolId>,
    pub return_type: TypeId,
}

/// Structure of a resolved type, as far as the indexer cares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeShape {
    /// `number`, `string`, `void`, literal types, ...
    Primitive { name: String },
    /// Object, function, class and interface types.
    #[serde(rename_all = "camelCase")]
    Object {
        /// Symbol the type was declared by (interface, class, type literal,
        /// object literal, function).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        symbol: Option<SymbolId>,
        /// Type alias naming this type, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alias: Option<SymbolId>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        members: Vec<SymbolId>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        call_signatures: Vec<Signature>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        construct_signatures: Vec<Signature>,
    },
    Union { types: Vec<TypeId> },
    Intersection { types: Vec<TypeId> },
    /// `T[]`, `Array<T>`, `ReadonlyArray<T>`
    Array {
        element: TypeId,
        #[serde(default)]
        readonly: bool,
    },
}

/// How a module exposes one of its exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportKind {
    /// Declaration exported in place: `export function foo() {}`
    Declaration,
    /// Export specifier: `export { foo }` or `export { _foo as foo }`
    Named,
    /// `export default foo`
    Default,
    /// `export = foo`
    Assignment,
    /// Wildcard re-export: `export * from "./a"`
    ReExport,
}

/// One entry of a module's export table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEntry {
    /// Name visible to importers (`default` and `export=` included).
    pub name: String,
    /// Export symbol. For specifiers, defaults and assignments this is the
    /// alias symbol; for re-exports it is the original symbol.
    pub symbol: SymbolId,
    pub kind: ExportKind,
}

/// A reference to a symbol somewhere in the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceSite {
    pub document: DocumentId,
    pub range: Range,
    pub text: String,
}

/// Query interface over a fully checked program.
///
/// Every method may return `None`/empty when the checker cannot answer; the
/// indexer treats that as a failure of the current branch only.
pub trait Checker {
    /// Program documents in a fixed order.
    fn documents(&self) -> Vec<DocumentId>;

    fn document(&self, id: DocumentId) -> Option<DocumentInfo>;

    /// Resolve the symbol whose name occupies `position`.
    fn symbol_at(&self, document: DocumentId, position: Position) -> Option<SymbolId>;

    fn symbol(&self, id: SymbolId) -> Option<SymbolData>;

    fn type_of_symbol(&self, id: SymbolId) -> Option<TypeId>;

    fn type_shape(&self, id: TypeId) -> Option<TypeShape>;

    /// Export table of a module, in declaration order.
    fn exports_of_module(&self, document: DocumentId) -> Option<Vec<ExportEntry>>;

    /// Declarations of a symbol, in source order.
    fn declarations_of(&self, id: SymbolId) -> Vec<Declaration>;

    /// Whether `id` is an anonymous (structural) type rather than one named
    /// by an interface, class, enum or type alias.
    fn is_structural(&self, id: TypeId) -> bool;

    /// Follow one alias hop.
    fn resolve_alias(&self, id: SymbolId) -> Option<SymbolId>;

    /// Project-wide references to a symbol, excluding its declarations.
    fn references_to(&self, id: SymbolId) -> Vec<ReferenceSite>;

    /// Symbols declared in a document, in source order.
    fn symbols_in_document(&self, document: DocumentId) -> Vec<SymbolId>;

    /// Quick-info text for hovers.
    fn hover(&self, _id: SymbolId) -> Option<String> {
        None
    }
}
