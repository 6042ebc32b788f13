//! Draft Statistics Tests
//!
//! Tests verify:
//! - Word counting over arbitrary whitespace
//! - Reading time rounding

use bookorigins::draft::{count_words, reading_time_minutes, DraftStats, WORDS_PER_MINUTE};

#[test]
fn test_count_words_ignores_surrounding_whitespace() {
    assert_eq!(count_words(""), 0);
    assert_eq!(count_words("   \n\t "), 0);
    assert_eq!(count_words("  the spice\nmust   flow  "), 4);
}

#[test]
fn test_count_words_unicode_text() {
    assert_eq!(count_words("Ça va très bien"), 4);
}

#[test]
fn test_reading_time_rounds_up() {
    assert_eq!(reading_time_minutes(0), 0);
    assert_eq!(reading_time_minutes(1), 1);
    assert_eq!(reading_time_minutes(WORDS_PER_MINUTE), 1);
    assert_eq!(reading_time_minutes(WORDS_PER_MINUTE + 1), 2);
}

#[test]
fn test_stats_from_text() {
    let text = "word ".repeat(450);
    let stats = DraftStats::from_text(&text);

    assert_eq!(stats.word_count, 450);
    assert_eq!(stats.reading_minutes, 3);
}
