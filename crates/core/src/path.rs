//! Node paths: the stable identity scheme for test nodes
//!
//! A [`NodePath`] is an ordered sequence of typed segments that uniquely
//! identifies a node within a test tree, independent of display text.
//! Appending a segment yields a child path; removing the last segment yields
//! the parent path. Paths are the only legal way to re-identify a node across
//! tree rebuilds.
//!
//! ## Contract
//!
//! The string format is FROZEN: `[type:value]/[type:value]/...`. Segment
//! types must not contain `[`, `]`, `:`, or `/`; segment values must not
//! contain `[`, `]`, or `/`. `parse` round-trips `Display` exactly.

use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

/// Segment type used for engine root nodes.
pub const ENGINE_SEGMENT_TYPE: &str = "engine";

/// One typed element of a [`NodePath`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Segment {
    segment_type: String,
    value: String,
}

impl Segment {
    /// Create a new segment, validating the frozen character rules.
    pub fn new(
        segment_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, PathParseError> {
        let segment_type = segment_type.into();
        let value = value.into();
        if segment_type.is_empty() {
            return Err(PathParseError::EmptySegmentType);
        }
        if value.is_empty() {
            return Err(PathParseError::EmptySegmentValue);
        }
        if segment_type.contains(['[', ']', ':', '/']) {
            return Err(PathParseError::InvalidSegmentType(segment_type));
        }
        if value.contains(['[', ']', '/']) {
            return Err(PathParseError::InvalidSegmentValue(value));
        }
        Ok(Segment {
            segment_type,
            value,
        })
    }

    /// The segment's type (e.g. `engine`, `group`, `test`).
    pub fn segment_type(&self) -> &str {
        &self.segment_type
    }

    /// The segment's value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.segment_type, self.value)
    }
}

/// Errors produced when constructing or parsing a [`NodePath`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathParseError {
    /// The path string was empty.
    #[error("node path cannot be empty")]
    Empty,

    /// A segment was not enclosed in `[...]` or lacked a `:` separator.
    #[error("malformed path segment: '{0}'")]
    MalformedSegment(String),

    /// A segment type was empty.
    #[error("segment type cannot be empty")]
    EmptySegmentType,

    /// A segment value was empty.
    #[error("segment value cannot be empty")]
    EmptySegmentValue,

    /// A segment type contained a reserved character.
    #[error("segment type contains reserved character: '{0}'")]
    InvalidSegmentType(String),

    /// A segment value contained a reserved character.
    #[error("segment value contains reserved character: '{0}'")]
    InvalidSegmentValue(String),
}

/// Stable, human-readable identity of a node in a test tree.
///
/// Paths form a total order (lexicographic over segments) and hash cheaply,
/// so they can key maps across the whole platform.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodePath {
    segments: SmallVec<[Segment; 4]>,
}

impl NodePath {
    /// Create a single-segment root path.
    pub fn root(
        segment_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, PathParseError> {
        let segment = Segment::new(segment_type, value)?;
        let mut segments = SmallVec::new();
        segments.push(segment);
        Ok(NodePath { segments })
    }

    /// Create the root path for a backend engine.
    pub fn for_engine(engine_id: &str) -> Result<Self, PathParseError> {
        NodePath::root(ENGINE_SEGMENT_TYPE, engine_id)
    }

    /// Append a segment, yielding a child path.
    pub fn append(
        &self,
        segment_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, PathParseError> {
        let segment = Segment::new(segment_type, value)?;
        let mut segments = self.segments.clone();
        segments.push(segment);
        Ok(NodePath { segments })
    }

    /// The parent path, or `None` for a root path.
    pub fn parent(&self) -> Option<NodePath> {
        if self.segments.len() <= 1 {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(NodePath { segments })
    }

    /// The last segment of this path.
    pub fn last_segment(&self) -> &Segment {
        // segments is never empty by construction
        self.segments.last().unwrap()
    }

    /// All segments, root first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Paths always have at least one segment.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `self` is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &NodePath) -> bool {
        other.segments.len() > self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Whether `self` equals `other` or is an ancestor of it.
    pub fn is_prefix_of(&self, other: &NodePath) -> bool {
        self == other || self.is_ancestor_of(other)
    }

    /// Parse a path from its frozen string format.
    pub fn parse(input: &str) -> Result<Self, PathParseError> {
        if input.is_empty() {
            return Err(PathParseError::Empty);
        }
        let mut segments = SmallVec::new();
        for raw in input.split('/') {
            let inner = raw
                .strip_prefix('[')
                .and_then(|s| s.strip_suffix(']'))
                .ok_or_else(|| PathParseError::MalformedSegment(raw.to_string()))?;
            let (segment_type, value) = inner
                .split_once(':')
                .ok_or_else(|| PathParseError::MalformedSegment(raw.to_string()))?;
            segments.push(Segment::new(segment_type, value)?);
        }
        Ok(NodePath { segments })
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
