//! Source-location augmentation attached to emitted events.

/// Begin/end line and column of one emitted event. Lines and columns are
/// 1-based.
///
/// Invariant: one pooled instance is reused for element/text/comment events;
/// attribute locations are fresh instances because they outlive the scanner
/// scratch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocationItem {
    pub begin_line: u32,
    pub begin_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl LocationItem {
    pub fn new(begin_line: u32, begin_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            begin_line,
            begin_column,
            end_line,
            end_column,
        }
    }

    pub(crate) fn set(
        &mut self,
        begin_line: u32,
        begin_column: u32,
        end_line: u32,
        end_column: u32,
    ) {
        self.begin_line = begin_line;
        self.begin_column = begin_column;
        self.end_line = end_line;
        self.end_column = end_column;
    }
}
