//! Tests for unit navigation and collapse detection.

use horizon_doctext::memory::{MemoryDocument, MemoryRange};
use horizon_doctext::navigator::Direction;
use horizon_doctext::prelude::*;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn word(config: &TextModelConfig) -> WordDocument {
    WordDocument::new(config).unwrap()
}

/// A cursor over the character at `offset`.
fn character_at(document: &MemoryDocument, offset: usize) -> Cursor<MemoryRange> {
    let mut range = MemoryRange::caret(offset);
    document
        .expand_to_unit(&mut range, TextUnit::Character)
        .unwrap();
    Cursor::new(range)
}

/// Move `cursor` by `count` characters.
fn move_chars<B>(
    model: &TextModel<'_, MemoryDocument, B>,
    cursor: &mut Cursor<MemoryRange>,
    count: i32,
) -> i32
where
    B: DocumentBehavior + ?Sized,
{
    model
        .move_cursor(cursor, TextUnit::Character, count, None)
        .unwrap()
}

fn raw(document: &MemoryDocument, cursor: &Cursor<MemoryRange>) -> String {
    document.text(cursor.range(), None).unwrap()
}

#[test]
fn test_forward_move_skips_row_end() {
    init_tracing();
    let document = MemoryDocument::from_text("ab\u{07}cd");
    let config = TextModelConfig::default();
    let word = word(&config);
    let model = TextModel::new(&document, &word, &config);

    let mut cursor = character_at(&document, 1);
    assert_eq!(move_chars(&model, &mut cursor, 1), 1);
    assert_eq!(raw(&document, &cursor), "c");
    assert_eq!(cursor.direction(), Some(Direction::Forward));
}

#[test]
fn test_backward_move_skips_row_end() {
    let document = MemoryDocument::from_text("ab\u{07}cd");
    let config = TextModelConfig::default();
    let word = word(&config);
    let model = TextModel::new(&document, &word, &config);

    let mut cursor = character_at(&document, 3);
    assert_eq!(move_chars(&model, &mut cursor, -1), -1);
    assert_eq!(raw(&document, &cursor), "b");
    assert_eq!(cursor.direction(), Some(Direction::Backward));
}

#[test]
fn test_multi_unit_move_reports_requested_count() {
    let document = MemoryDocument::from_text("ab\u{07}cd");
    let config = TextModelConfig::default();
    let word = word(&config);
    let model = TextModel::new(&document, &word, &config);

    let mut cursor = character_at(&document, 0);
    assert_eq!(move_chars(&model, &mut cursor, 2), 2);
    assert_eq!(raw(&document, &cursor), "c");
}

#[test]
fn test_consecutive_sentinels() {
    let document = MemoryDocument::from_text("a\u{07}\u{07}b");
    let config = TextModelConfig::default();
    let word = word(&config);
    let model = TextModel::new(&document, &word, &config);

    let mut cursor = character_at(&document, 0);
    move_chars(&model, &mut cursor, 1);
    assert_eq!(raw(&document, &cursor), "b");
}

#[test]
fn test_skip_limit_bounds_sentinel_run() {
    let document = MemoryDocument::from_text("a\u{07}\u{07}b");
    let config = TextModelConfig {
        sentinel_skip_limit: 1,
        ..TextModelConfig::default()
    };
    let word = word(&config);
    let model = TextModel::new(&document, &word, &config);

    let mut cursor = character_at(&document, 0);
    move_chars(&model, &mut cursor, 1);
    assert_eq!(*cursor.range(), MemoryRange::new(2, 3));
}

#[test]
fn test_sentinel_at_end_keeps_position() {
    let document = MemoryDocument::from_text("ab\u{07}");
    let config = TextModelConfig::default();
    let word = word(&config);
    let model = TextModel::new(&document, &word, &config);

    // A character range cannot move past the last character.
    let mut cursor = character_at(&document, 1);
    assert_eq!(move_chars(&model, &mut cursor, 1), 1);
    assert_eq!(*cursor.range(), MemoryRange::new(2, 3));

    // A caret can move to the end of the document.
    let mut caret = Cursor::new(MemoryRange::caret(1));
    assert_eq!(move_chars(&model, &mut caret, 1), 1);
    assert_eq!(*caret.range(), MemoryRange::caret(3));
}

#[test]
fn test_generic_document_stops_on_row_end() {
    let document = MemoryDocument::from_text("ab\u{07}cd");
    let config = TextModelConfig::default();
    let model = TextModel::new(&document, &GenericDocument, &config);

    let mut cursor = character_at(&document, 1);
    move_chars(&model, &mut cursor, 1);
    assert_eq!(raw(&document, &cursor), "\u{07}");
}

#[test]
fn test_endpoint_move_does_not_skip() {
    let document = MemoryDocument::from_text("ab\u{07}cd");
    let config = TextModelConfig::default();
    let word = word(&config);
    let model = TextModel::new(&document, &word, &config);

    let mut cursor = character_at(&document, 0);
    let moved = model
        .move_cursor(&mut cursor, TextUnit::Character, 2, Some(Endpoint::End))
        .unwrap();
    assert_eq!(moved, 2);
    assert_eq!(*cursor.range(), MemoryRange::new(0, 3));
}

#[test]
fn test_forward_then_back_returns_to_start() {
    let document = MemoryDocument::from_text("hello brave new world");
    let config = TextModelConfig::default();
    let word = word(&config);
    let model = TextModel::new(&document, &word, &config);

    for unit in [TextUnit::Character, TextUnit::Word] {
        let mut range = MemoryRange::caret(0);
        document.expand_to_unit(&mut range, unit).unwrap();
        let mut cursor = Cursor::new(range);
        let start = range;

        for _ in 0..3 {
            assert_eq!(model.move_cursor(&mut cursor, unit, 1, None).unwrap(), 1);
        }
        assert_ne!(*cursor.range(), start);
        for _ in 0..3 {
            assert_eq!(model.move_cursor(&mut cursor, unit, -1, None).unwrap(), -1);
        }
        assert_eq!(*cursor.range(), start, "{unit:?}");
    }
}

#[test]
fn test_boundary_is_no_movement() {
    let document = MemoryDocument::from_text("ab");
    let config = TextModelConfig::default();
    let word = word(&config);
    let model = TextModel::new(&document, &word, &config);

    let mut cursor = character_at(&document, 0);
    assert_eq!(move_chars(&model, &mut cursor, -1), 0);
    assert_eq!(*cursor.range(), MemoryRange::new(0, 1));
    assert_eq!(cursor.direction(), None);
}

#[test]
fn test_collapse_correction() {
    let document = MemoryDocument::from_text("ab\u{07}cd");
    let config = TextModelConfig::default();
    let word = word(&config);
    let row_end = MemoryRange::new(2, 3);

    let model = TextModel::new(&document, &word, &config);
    assert!(!document.is_degenerate(&row_end).unwrap());
    assert!(model.is_range_collapsed(&row_end).unwrap());
    assert!(model.is_range_collapsed(&MemoryRange::caret(1)).unwrap());
    assert!(!model.is_range_collapsed(&MemoryRange::new(0, 1)).unwrap());

    let mut cursor = Cursor::new(row_end);
    assert_eq!(cursor.last_collapsed(), None);
    assert!(model.is_collapsed(&mut cursor).unwrap());
    assert_eq!(cursor.last_collapsed(), Some(true));

    let generic = TextModel::new(&document, &GenericDocument, &config);
    assert!(!generic.is_range_collapsed(&row_end).unwrap());
}

#[test]
fn test_provider_failure_leaves_cursor_unchanged() {
    let document = MemoryDocument::from_text("abcdef");
    let config = TextModelConfig::default();
    let word = word(&config);
    let model = TextModel::new(&document, &word, &config);

    let mut cursor = character_at(&document, 0);
    move_chars(&model, &mut cursor, 2);
    let before = *cursor.range();

    document.disconnect();
    let err = model
        .move_cursor(&mut cursor, TextUnit::Character, 1, None)
        .unwrap_err();
    assert!(err.is_provider_failure());
    assert_eq!(*cursor.range(), before);

    document.reconnect();
    assert_eq!(move_chars(&model, &mut cursor, 1), 1);
    assert_eq!(raw(&document, &cursor), "d");
}

#[test]
fn test_unit_navigator() {
    let document = MemoryDocument::from_text("one two\rthree");
    let config = TextModelConfig::default();
    let word = word(&config);
    let model = TextModel::new(&document, &word, &config);

    let mut navigator = UnitNavigator::new(&model, MemoryRange::caret(0));
    navigator.expand(TextUnit::Word).unwrap();
    assert_eq!(navigator.text().unwrap(), "one ");

    assert_eq!(navigator.move_by(TextUnit::Line, 1).unwrap(), 1);
    assert_eq!(navigator.text().unwrap(), "three");

    navigator.collapse(Endpoint::End).unwrap();
    assert!(navigator.is_collapsed().unwrap());
    assert_eq!(*navigator.range(), MemoryRange::caret(13));

    let moved = navigator.move_endpoint(Endpoint::Start, TextUnit::Word, -1);
    assert_eq!(moved.unwrap(), -1);
    assert_eq!(navigator.text().unwrap(), "three");
}
