use crate::ini::document::{Document, Section};
use crate::query::Query;
use crate::transform::matcher::section_matches;

/// Returned by a transform callback to continue or end the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Flow {
    Continue,
    Stop,
}

/// Walk `document` in order and call `f(document, index)` for every section
/// matching `query`. Returns the number of matches, counted before each
/// callback runs.
///
/// The callback may remove or insert sections. Any change in section count
/// is taken to have happened at or before `index`, and the cursor moves by
/// the same amount, so deleting the current section never skips the next
/// one.
pub fn run<F>(document: &mut Document, query: &Query, mut f: F) -> usize
where
    F: FnMut(&mut Document, usize) -> Flow,
{
    let mut matched = 0;
    let mut index = 0;

    while index < document.len() {
        if !section_matches(query, &document.sections()[index]) {
            index += 1;
            continue;
        }

        matched += 1;
        let before = document.len();
        let flow = f(document, index);
        let after = document.len();

        // Next cursor: index + 1, shifted by however many sections the
        // callback added or removed.
        index = (index + 1 + after).saturating_sub(before);

        if flow == Flow::Stop {
            break;
        }
    }

    matched
}

/// Read-only twin of [`run`].
pub fn scan<F>(document: &Document, query: &Query, mut f: F) -> usize
where
    F: FnMut(usize, &Section) -> Flow,
{
    let mut matched = 0;

    for (index, section) in document.sections().iter().enumerate() {
        if !section_matches(query, section) {
            continue;
        }

        matched += 1;
        if f(index, section) == Flow::Stop {
            break;
        }
    }

    matched
}
