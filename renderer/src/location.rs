//! Maps positions reported against augmented source back to coordinates in
//! the author's template.

use std::ops::Range;

use crate::compiler::{POSTAMBLE_LINES, PREAMBLE_LINES};

/// A source position in 1-based lines, optionally carrying the reported
/// script-lines snippet. Expressed in augmented-source coordinates until
/// run through [`translate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub first_line: usize,
    pub last_line: usize,
    pub script_lines: Option<Vec<String>>,
}

impl Location {
    pub fn lines(first_line: usize, last_line: usize) -> Self {
        Location {
            first_line,
            last_line,
            script_lines: None,
        }
    }

    pub fn with_script_lines(mut self, lines: Vec<String>) -> Self {
        self.script_lines = Some(lines);
        self
    }
}

/// Subtract the preamble offset from a reported position and trim the
/// injected lines from the snippet. Positions at or inside the injected
/// region clamp to line 1; translation never fails or underflows.
pub fn translate(loc: Location) -> Location {
    let first_line = loc.first_line.saturating_sub(PREAMBLE_LINES).max(1);
    let last_line = loc.last_line.saturating_sub(PREAMBLE_LINES).max(1);
    let script_lines = loc.script_lines.map(|lines| {
        let keep = lines.len().saturating_sub(PREAMBLE_LINES + POSTAMBLE_LINES);
        lines
            .into_iter()
            .skip(PREAMBLE_LINES)
            .take(keep)
            .collect()
    });
    Location {
        first_line,
        last_line,
        script_lines,
    }
}

/// 1-based line number of a byte offset.
pub fn line_of_offset(source: &str, offset: usize) -> usize {
    let offset = offset.min(source.len());
    source[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}

/// Byte range covering the given 1-based line span, for diagnostic labels.
pub fn span_of_lines(source: &str, first_line: usize, last_line: usize) -> Range<usize> {
    let mut start = 0;
    let mut end = source.len();
    let mut line = 1;
    let mut offset = 0;
    for segment in source.split_inclusive('\n') {
        if line == first_line {
            start = offset;
        }
        if line == last_line {
            end = offset + segment.trim_end_matches('\n').len();
            break;
        }
        offset += segment.len();
        line += 1;
    }
    start..end
}
