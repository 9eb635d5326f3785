//! Export paths: the route from a module root to a symbol.
//!
//! ```text
//! a:foo.__rt.touch
//! ^ ^   ^    ^
//! | |   |    member of the anonymous return type
//! | |   return type of `foo`
//! | declaration name
//! module alias
//! ```

use smallvec::SmallVec;
use std::fmt;

/// One step of an export path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// Declaration or member name.
    Name(String),
    /// `export default`
    Default,
    /// `export =`
    ExportEquals,
    /// Return type of a callable.
    ReturnType,
    /// Structural shape of the named parameter.
    Argument(String),
    /// Computed or well-known member (`[Symbol.toStringTag]`), name without
    /// the `__@` prefix.
    WellKnown(String),
}

/// Discriminant of a [`Segment`], used as the "path shape" half of the
/// walker's visiting key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SegmentKind {
    Root,
    Name,
    Default,
    ExportEquals,
    ReturnType,
    Argument,
    WellKnown,
}

impl Segment {
    /// Segment for an export table name. `default` and `export=` map to
    /// their dedicated segments.
    pub fn for_export_name(name: &str) -> Segment {
        match name {
            "default" => Segment::Default,
            "export=" => Segment::ExportEquals,
            _ => Segment::for_member_name(name),
        }
    }

    /// Segment for a member name. Escaped well-known names (`__@iterator`)
    /// become [`Segment::WellKnown`].
    pub fn for_member_name(name: &str) -> Segment {
        match name.strip_prefix("__@") {
            Some(rest) => Segment::WellKnown(rest.to_string()),
            None => Segment::Name(name.to_string()),
        }
    }

    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Name(_) => SegmentKind::Name,
            Segment::Default => SegmentKind::Default,
            Segment::ExportEquals => SegmentKind::ExportEquals,
            Segment::ReturnType => SegmentKind::ReturnType,
            Segment::Argument(_) => SegmentKind::Argument,
            Segment::WellKnown(_) => SegmentKind::WellKnown,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Name(name) => f.write_str(name),
            Segment::Default => f.write_str("default"),
            Segment::ExportEquals => f.write_str("export="),
            Segment::ReturnType => f.write_str("__rt"),
            Segment::Argument(name) => write!(f, "__arg.{name}"),
            Segment::WellKnown(name) => write!(f, "__@{name}"),
        }
    }
}

/// Ordered segments from a module root. Most paths are short.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExportPath {
    segments: SmallVec<[Segment; 4]>,
}

impl ExportPath {
    pub fn root() -> Self {
        ExportPath::default()
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        ExportPath { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last_kind(&self) -> SegmentKind {
        self.segments
            .last()
            .map(Segment::kind)
            .unwrap_or(SegmentKind::Root)
    }

    /// Dot-joined rendering without the module alias.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            use fmt::Write;
            let _ = write!(out, "{segment}");
        }
        out
    }

    /// Full moniker identifier: `<moduleAlias>:<segments>`.
    pub fn identifier(&self, module_alias: &str) -> String {
        format!("{module_alias}:{}", self.render())
    }
}

impl FromIterator<Segment> for ExportPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        ExportPath {
            segments: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ExportPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
#[path = "../tests/export_path_tests.rs"]
mod export_path_tests;
