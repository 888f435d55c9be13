//! Edit-time marking
//!
//! Rather than re-scanning a whole buffer on every keystroke, the edit-time
//! transform looks only at the inserted fragment plus whatever RTL characters
//! and marks touch it on either side. Inside that window it computes the same
//! marks [`mark_directional_runs`](crate::marks::mark_directional_runs) would,
//! and returns the insertions and removals needed to get there. Outside the
//! window the characters next to the boundary are neither RTL nor marks, so
//! runs there are unaffected by the change.

use crate::error::EditError;
use crate::marks::LRO;
use crate::profile::EncodingProfile;

/// A fragment inserted into the live buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDelta {
    /// Byte offset at which `inserted_text` starts in the buffer
    pub insertion_point: usize,
    /// The inserted fragment; empty for a pure deletion at `insertion_point`
    pub inserted_text: String,
}

impl EditDelta {
    pub fn new(insertion_point: usize, inserted_text: impl Into<String>) -> Self {
        Self {
            insertion_point,
            inserted_text: inserted_text.into(),
        }
    }

    /// A deletion that left the cursor at `point`
    pub fn deletion(point: usize) -> Self {
        Self::new(point, String::new())
    }

    fn end(&self) -> usize {
        self.insertion_point + self.inserted_text.len()
    }
}

/// One mark change, with offsets into the buffer as it was when computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MarkEdit {
    /// Insert an LRO at this byte offset
    Insert { offset: usize },
    /// Remove the LRO starting at this byte offset
    Remove { offset: usize },
}

impl MarkEdit {
    pub fn offset(&self) -> usize {
        match *self {
            MarkEdit::Insert { offset } | MarkEdit::Remove { offset } => offset,
        }
    }
}

/// Compute the mark edits needed after `delta` was applied to `text`.
///
/// `text` is the buffer *including* the inserted fragment. Edits are returned
/// in ascending offset order and never share an offset. Applying them (see
/// [`apply_mark_edits`]) to a buffer that was correctly marked before the
/// change leaves it correctly marked: one LRO in front of every RTL run,
/// including every run of a multi-run paste.
pub fn mark_inserted_runs(
    text: &str,
    delta: &EditDelta,
    profile: &EncodingProfile,
) -> Result<Vec<MarkEdit>, EditError> {
    validate(text, delta)?;

    let is_rtl_or_mark = |c: char| c == LRO || profile.is_script_char(c);

    let mut start = delta.insertion_point;
    while let Some(c) = text[..start].chars().next_back().filter(|&c| is_rtl_or_mark(c)) {
        start -= c.len_utf8();
    }

    let mut end = delta.end();
    while let Some(c) = text[end..].chars().next().filter(|&c| is_rtl_or_mark(c)) {
        end += c.len_utf8();
    }

    let mut edits = Vec::new();
    let mut pending_marks = Vec::new();
    // The character before the window is neither RTL nor a mark
    let mut prev_rtl = false;

    for (i, c) in text[start..end].char_indices() {
        let offset = start + i;
        if c == LRO {
            pending_marks.push(offset);
            continue;
        }

        let is_rtl = profile.is_script_char(c);
        let mut marks = pending_marks.drain(..);
        if is_rtl && !prev_rtl && marks.next().is_none() {
            edits.push(MarkEdit::Insert { offset });
        }
        edits.extend(marks.map(|offset| MarkEdit::Remove { offset }));
        prev_rtl = is_rtl;
    }

    // Trailing marks are followed by a non-RTL character or the end of the buffer
    edits.extend(pending_marks.into_iter().map(|offset| MarkEdit::Remove { offset }));
    edits.sort_by_key(MarkEdit::offset);

    if !edits.is_empty() {
        tracing::debug!(
            point = delta.insertion_point,
            window = end - start,
            "computed {} mark edit(s)",
            edits.len()
        );
    }

    Ok(edits)
}

fn validate(text: &str, delta: &EditDelta) -> Result<(), EditError> {
    let point = delta.insertion_point;
    if point > text.len() {
        return Err(EditError::OutOfBounds {
            point,
            len: text.len(),
        });
    }
    if !text.is_char_boundary(point) {
        return Err(EditError::NotCharBoundary { point });
    }
    if !text[point..].starts_with(delta.inserted_text.as_str()) {
        return Err(EditError::FragmentMismatch { point });
    }
    Ok(())
}

/// Apply edits computed by [`mark_inserted_runs`] against the same buffer.
///
/// Every offset is checked before anything changes, so an edit that does not
/// fit `text` leaves it untouched. A `Remove` whose offset holds no mark is
/// skipped.
pub fn apply_mark_edits(text: &mut String, edits: &[MarkEdit]) -> Result<(), EditError> {
    for edit in edits {
        let point = edit.offset();
        if point > text.len() {
            return Err(EditError::OutOfBounds {
                point,
                len: text.len(),
            });
        }
        if !text.is_char_boundary(point) {
            return Err(EditError::NotCharBoundary { point });
        }
    }

    let mut ordered = edits.to_vec();
    ordered.sort_by_key(|edit| std::cmp::Reverse(edit.offset()));

    for edit in ordered {
        match edit {
            MarkEdit::Insert { offset } => text.insert(offset, LRO),
            MarkEdit::Remove { offset } => {
                if text[offset..].starts_with(LRO) {
                    text.replace_range(offset..offset + LRO.len_utf8(), "");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marks::{mark_directional_runs, strip_directional_marks};
    use proptest::prelude::*;

    fn hebrew() -> EncodingProfile {
        EncodingProfile::default_profile()
    }

    /// Insert `fragment` at `point` in `buffer`, then apply the computed edits
    fn type_into(buffer: &str, point: usize, fragment: &str) -> (String, Vec<MarkEdit>) {
        let mut text = buffer.to_string();
        text.insert_str(point, fragment);
        let edits = mark_inserted_runs(&text, &EditDelta::new(point, fragment), &hebrew()).unwrap();
        apply_mark_edits(&mut text, &edits).unwrap();
        (text, edits)
    }

    #[test]
    fn test_insert_rtl_into_plain_text() {
        let (text, edits) = type_into("MOVE  TO X", 5, "שם");
        assert_eq!(edits, vec![MarkEdit::Insert { offset: 5 }]);
        assert_eq!(text, "MOVE \u{202D}שם TO X");
    }

    #[test]
    fn test_insert_plain_text_needs_nothing() {
        let (text, edits) = type_into("ABC \u{202D}אב", 0, "Z");
        assert!(edits.is_empty());
        assert_eq!(text, "ZABC \u{202D}אב");
    }

    #[test]
    fn test_paste_with_two_runs_gets_mark_per_run() {
        // A single leading mark would leave the second run unmarked
        let (text, edits) = type_into("X ", 2, "אבג XYZ דהו");
        assert_eq!(edits.len(), 2);
        assert_eq!(text, "X \u{202D}אבג XYZ \u{202D}דהו");
    }

    #[test]
    fn test_typing_at_end_of_marked_run() {
        let buffer = "A \u{202D}אב C";
        let point = buffer.find(" C").unwrap();
        let (text, edits) = type_into(buffer, point, "ג");
        assert!(edits.is_empty());
        assert_eq!(text, "A \u{202D}אבג C");
    }

    #[test]
    fn test_typing_right_after_mark() {
        let buffer = "A \u{202D}אב";
        let point = buffer.find('א').unwrap();
        let (text, edits) = type_into(buffer, point, "ג");
        assert!(edits.is_empty());
        assert_eq!(text, "A \u{202D}גאב");
    }

    #[test]
    fn test_typing_before_mark_moves_it() {
        let buffer = "A \u{202D}אב";
        let (text, _) = type_into(buffer, 2, "ג");
        assert_eq!(text, "A \u{202D}גאב");
    }

    #[test]
    fn test_splitting_run_marks_second_half() {
        let buffer = "\u{202D}אב";
        let point = buffer.find('ב').unwrap();
        let (text, edits) = type_into(buffer, point, " x ");
        assert_eq!(edits.len(), 1);
        assert_eq!(text, "\u{202D}א x \u{202D}ב");
    }

    #[test]
    fn test_plain_text_after_mark_orphans_it() {
        let buffer = "A \u{202D}אב";
        let point = buffer.find('א').unwrap();
        let (text, _) = type_into(buffer, point, "x");
        assert_eq!(text, "A x\u{202D}אב");
    }

    #[test]
    fn test_deletion_joining_runs_drops_inner_mark() {
        let mut text = "\u{202D}א x \u{202D}ב".to_string();
        let point = text.find(" x ").unwrap();
        text.replace_range(point..point + 3, "");
        assert_eq!(text, "\u{202D}א\u{202D}ב");

        let edits = mark_inserted_runs(&text, &EditDelta::deletion(point), &hebrew()).unwrap();
        apply_mark_edits(&mut text, &edits).unwrap();
        assert_eq!(text, "\u{202D}אב");
    }

    #[test]
    fn test_pasting_marked_text_keeps_single_marks() {
        let (text, _) = type_into("\u{202D}א ", 6, "\u{202D}\u{202D}בג");
        assert_eq!(text, "\u{202D}א \u{202D}בג");
    }

    #[test]
    fn test_invalid_deltas() {
        let text = "אב";
        assert_eq!(
            mark_inserted_runs(text, &EditDelta::new(9, ""), &hebrew()),
            Err(EditError::OutOfBounds { point: 9, len: 4 })
        );
        assert_eq!(
            mark_inserted_runs(text, &EditDelta::new(1, ""), &hebrew()),
            Err(EditError::NotCharBoundary { point: 1 })
        );
        assert_eq!(
            mark_inserted_runs(text, &EditDelta::new(0, "ב"), &hebrew()),
            Err(EditError::FragmentMismatch { point: 0 })
        );
    }

    #[test]
    fn test_apply_ignores_stale_remove() {
        let mut text = "abc".to_string();
        apply_mark_edits(&mut text, &[MarkEdit::Remove { offset: 1 }]).unwrap();
        assert_eq!(text, "abc");
    }

    #[test]
    fn test_apply_rejects_offset_past_end() {
        let mut text = "abc".to_string();
        assert_eq!(
            apply_mark_edits(&mut text, &[MarkEdit::Remove { offset: 10 }]),
            Err(EditError::OutOfBounds { point: 10, len: 3 })
        );
        assert_eq!(
            apply_mark_edits(&mut text, &[MarkEdit::Insert { offset: 4 }]),
            Err(EditError::OutOfBounds { point: 4, len: 3 })
        );
        assert_eq!(text, "abc");
    }

    #[test]
    fn test_apply_rejects_offset_inside_char() {
        let mut text = "אב".to_string();
        assert_eq!(
            apply_mark_edits(&mut text, &[MarkEdit::Remove { offset: 1 }]),
            Err(EditError::NotCharBoundary { point: 1 })
        );
        // Nothing is applied when any edit is bad
        assert_eq!(
            apply_mark_edits(&mut text, &[MarkEdit::Insert { offset: 0 }, MarkEdit::Insert { offset: 3 }]),
            Err(EditError::NotCharBoundary { point: 3 })
        );
        assert_eq!(text, "אב");
    }

    fn buffer_text() -> impl Strategy<Value = String> {
        proptest::collection::vec(prop_oneof![Just('a'), Just(' '), Just('א'), Just('ב'), Just('ع')], 0..12)
            .prop_map(|chars| chars.into_iter().collect::<String>())
    }

    fn fragment_text() -> impl Strategy<Value = String> {
        proptest::collection::vec(
            prop_oneof![Just('b'), Just('.'), Just('ג'), Just('ر'), Just(LRO)],
            0..8,
        )
        .prop_map(|chars| chars.into_iter().collect::<String>())
    }

    proptest! {
        #[test]
        fn prop_insertion_matches_full_rescan(base in buffer_text(), fragment in fragment_text(), at in any::<prop::sample::Index>()) {
            let profile = hebrew();
            let mut text = mark_directional_runs(&base, &profile).into_string();
            let boundaries: Vec<usize> = text
                .char_indices()
                .map(|(i, _)| i)
                .chain(std::iter::once(text.len()))
                .collect();
            let point = boundaries[at.index(boundaries.len())];

            text.insert_str(point, &fragment);
            let edits = mark_inserted_runs(&text, &EditDelta::new(point, fragment.clone()), &profile).unwrap();
            apply_mark_edits(&mut text, &edits).unwrap();

            let expected = mark_directional_runs(&strip_directional_marks(&text), &profile);
            prop_assert_eq!(text, expected.into_string());
        }

        #[test]
        fn prop_deletion_matches_full_rescan(base in buffer_text(), a in any::<prop::sample::Index>(), b in any::<prop::sample::Index>()) {
            let profile = hebrew();
            let mut text = mark_directional_runs(&base, &profile).into_string();
            let boundaries: Vec<usize> = text
                .char_indices()
                .map(|(i, _)| i)
                .chain(std::iter::once(text.len()))
                .collect();
            let (x, y) = (boundaries[a.index(boundaries.len())], boundaries[b.index(boundaries.len())]);
            let (from, to) = (x.min(y), x.max(y));

            text.replace_range(from..to, "");
            let edits = mark_inserted_runs(&text, &EditDelta::deletion(from), &profile).unwrap();
            apply_mark_edits(&mut text, &edits).unwrap();

            let expected = mark_directional_runs(&strip_directional_marks(&text), &profile);
            prop_assert_eq!(text, expected.into_string());
        }
    }
}
