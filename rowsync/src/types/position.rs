use std::fmt;

/// A resumable location in the upstream log.
///
/// Positions are (segment, offset) pairs. Offsets grow monotonically within a segment;
/// a rotation starts a new segment and resets offset semantics, which is the
/// transport's concern. The relay only ever persists the segment component (see the
/// checkpoint store) and re-enters a resumed segment from offset 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPosition {
    /// Name of the log segment.
    pub segment: String,
    /// Byte offset within the segment.
    pub offset: u32,
}

impl StreamPosition {
    pub fn new(segment: impl Into<String>, offset: u32) -> StreamPosition {
        Self {
            segment: segment.into(),
            offset,
        }
    }

    /// Returns the position at the start of the given segment.
    pub fn segment_start(segment: impl Into<String>) -> StreamPosition {
        Self::new(segment, 0)
    }
}

impl fmt::Display for StreamPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{0}:{1}", self.segment, self.offset))
    }
}
