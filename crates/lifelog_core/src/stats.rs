//! crates/lifelog_core/src/stats.rs
//!
//! Pure aggregation helpers over an in-memory entry set: mood statistics,
//! time/mood-filtered views, the per-day mood series behind the trend chart
//! and the word-frequency dataset behind the word cloud. All functions take
//! `now` explicitly where time matters, so the same inputs always yield the
//! same result.

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::domain::{JournalEntry, MoodFilter, MoodStats, TimeWindow};

/// One point of the mood-trend chart: a calendar day with the average mood
/// over that day's entries, or `None` for a day without entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMood {
    pub date: NaiveDate,
    pub average_mood: Option<f64>,
    pub entry_count: usize,
}

/// A word and its occurrence count, ordered most frequent first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
}

/// How many words the word-cloud dataset is capped at.
pub const WORD_CLOUD_LIMIT: usize = 100;

/// Common words excluded from the word cloud.
const STOP_WORDS: &[&str] = &[
    "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
    "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we",
    "say", "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their",
    "what", "so", "up", "out", "if", "about", "who", "get", "which", "go", "me", "when", "make",
    "can", "like", "time", "no", "just", "him", "know", "take", "people", "into", "year", "your",
    "good", "some", "could", "them", "see", "other", "than", "then", "now", "look", "only",
    "come", "its", "over", "think", "also", "back", "after", "use", "two", "how", "our", "work",
    "first", "well", "way", "even", "new", "want", "because", "any", "these", "give", "day",
    "most", "us", "is", "was", "are", "were", "been", "being", "am", "has", "had", "does", "did",
    "doing", "should", "might", "must", "shall", "may", "need", "ought", "dare", "used",
];

/// Counts entries per mood level, the total, and the arithmetic mean of the
/// levels. `total` always equals the entry count; the per-level counts sum
/// to the total.
pub fn mood_stats(entries: &[JournalEntry]) -> MoodStats {
    let mut by_mood = BTreeMap::new();
    let mut sum = 0u64;
    for entry in entries {
        *by_mood.entry(entry.mood).or_insert(0) += 1;
        sum += u64::from(entry.mood.level());
    }
    let total = entries.len();
    let average_mood = if total > 0 {
        sum as f64 / total as f64
    } else {
        0.0
    };
    MoodStats {
        total,
        by_mood,
        average_mood,
    }
}

/// Retains entries whose `date` falls on or after the window's cutoff day.
pub fn filter_by_window(
    entries: &[JournalEntry],
    window: TimeWindow,
    now: DateTime<Utc>,
) -> Vec<JournalEntry> {
    match window_start(window, now) {
        Some(cutoff) => entries
            .iter()
            .filter(|entry| entry.date >= cutoff)
            .cloned()
            .collect(),
        None => entries.to_vec(),
    }
}

/// Retains entries with the selected mood level, or everything for `All`.
pub fn filter_by_mood(entries: &[JournalEntry], filter: MoodFilter) -> Vec<JournalEntry> {
    match filter {
        MoodFilter::All => entries.to_vec(),
        MoodFilter::Level(level) => entries
            .iter()
            .filter(|entry| entry.mood == level)
            .cloned()
            .collect(),
    }
}

/// One data point per calendar day from the window's start through today:
/// entry count and average mood for the day.
pub fn daily_mood_series(
    entries: &[JournalEntry],
    window: TimeWindow,
    now: DateTime<Utc>,
) -> Vec<DailyMood> {
    let end = now.date_naive();
    let start = window_start(window, now)
        .or_else(|| entries.iter().map(|entry| entry.date).min())
        .unwrap_or(end);

    let mut series = Vec::new();
    let mut day = start;
    while day <= end {
        let mut count = 0usize;
        let mut sum = 0u64;
        for entry in entries.iter().filter(|entry| entry.date == day) {
            count += 1;
            sum += u64::from(entry.mood.level());
        }
        let average_mood = (count > 0).then(|| sum as f64 / count as f64);
        series.push(DailyMood {
            date: day,
            average_mood,
            entry_count: count,
        });
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    series
}

/// Counts word occurrences across the given texts: tokens are lower-cased
/// alphabetic runs, stop words and tokens of two characters or fewer are
/// discarded, and the result is the top `limit` words by descending count
/// with ties kept in first-encounter order.
pub fn word_frequencies<'a, I>(texts: I, limit: usize) -> Vec<WordFrequency>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for text in texts {
        for raw in text.split(|c: char| !c.is_alphabetic() && c != '\'') {
            let word = raw.trim_matches('\'').to_lowercase();
            if word.chars().count() <= 2 || STOP_WORDS.contains(&word.as_str()) {
                continue;
            }
            match counts.get_mut(&word) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(word.clone(), 1);
                    order.push(word);
                }
            }
        }
    }

    let mut frequencies: Vec<WordFrequency> = order
        .into_iter()
        .map(|word| {
            let count = counts[&word];
            WordFrequency { word, count }
        })
        .collect();
    // Stable sort: ties keep first-encounter order.
    frequencies.sort_by(|a, b| b.count.cmp(&a.count));
    frequencies.truncate(limit);
    frequencies
}

fn window_start(window: TimeWindow, now: DateTime<Utc>) -> Option<NaiveDate> {
    let today = now.date_naive();
    match window {
        TimeWindow::All => None,
        TimeWindow::Day => Some(today - Duration::days(1)),
        TimeWindow::Week => Some(today - Duration::days(7)),
        TimeWindow::Month => Some(today.checked_sub_months(Months::new(1)).unwrap_or(today)),
        TimeWindow::Year => Some(today.checked_sub_months(Months::new(12)).unwrap_or(today)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MoodLevel;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn entry(mood: MoodLevel, date: &str, content: &str) -> JournalEntry {
        JournalEntry {
            id: Some(Uuid::new_v4()),
            user_id: Uuid::new_v4(),
            content: content.to_string(),
            mood,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn mood_stats_counts_and_averages() {
        let entries = vec![
            entry(MoodLevel::VeryHappy, "2024-01-01", "a"),
            entry(MoodLevel::VerySad, "2024-01-02", "b"),
        ];

        let stats = mood_stats(&entries);

        assert_eq!(stats.total, 2);
        assert_eq!(stats.average_mood, 3.0);
        assert_eq!(stats.by_mood[&MoodLevel::VeryHappy], 1);
        assert_eq!(stats.by_mood[&MoodLevel::VerySad], 1);
        assert_eq!(stats.by_mood.values().sum::<usize>(), stats.total);
    }

    #[test]
    fn mood_stats_of_empty_set_is_zero() {
        let stats = mood_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_mood, 0.0);
        assert!(stats.by_mood.is_empty());
    }

    #[test]
    fn mood_filter_selects_a_subset_and_all_passes_through() {
        let entries = vec![
            entry(MoodLevel::Happy, "2024-03-01", "a"),
            entry(MoodLevel::Sad, "2024-03-02", "b"),
            entry(MoodLevel::Happy, "2024-03-03", "c"),
        ];

        let happy = filter_by_mood(&entries, MoodFilter::Level(MoodLevel::Happy));
        assert_eq!(happy.len(), 2);
        assert!(happy.iter().all(|e| e.mood == MoodLevel::Happy));
        assert!(happy.iter().all(|e| entries.contains(e)));

        assert_eq!(filter_by_mood(&entries, MoodFilter::All), entries);
    }

    #[test]
    fn window_filter_keeps_entries_on_or_after_the_cutoff() {
        let entries = vec![
            entry(MoodLevel::Neutral, "2024-03-14", "yesterday"),
            entry(MoodLevel::Neutral, "2024-03-10", "last week"),
            entry(MoodLevel::Neutral, "2024-02-01", "last month"),
            entry(MoodLevel::Neutral, "2023-03-15", "last year"),
        ];
        let now = fixed_now();

        assert_eq!(filter_by_window(&entries, TimeWindow::Day, now).len(), 1);
        assert_eq!(filter_by_window(&entries, TimeWindow::Week, now).len(), 2);
        assert_eq!(filter_by_window(&entries, TimeWindow::Month, now).len(), 2);
        assert_eq!(filter_by_window(&entries, TimeWindow::Year, now).len(), 4);
        assert_eq!(filter_by_window(&entries, TimeWindow::All, now).len(), 4);
    }

    #[test]
    fn window_filter_is_idempotent() {
        let entries = vec![
            entry(MoodLevel::Neutral, "2024-03-14", "a"),
            entry(MoodLevel::Neutral, "2024-01-01", "b"),
        ];
        let now = fixed_now();

        let once = filter_by_window(&entries, TimeWindow::Week, now);
        let twice = filter_by_window(&once, TimeWindow::Week, now);
        assert_eq!(once, twice);
    }

    #[test]
    fn daily_series_covers_every_day_in_the_window() {
        let entries = vec![
            entry(MoodLevel::VeryHappy, "2024-03-14", "a"),
            entry(MoodLevel::VerySad, "2024-03-14", "b"),
            entry(MoodLevel::Happy, "2024-03-15", "c"),
        ];
        let now = fixed_now();

        let series = daily_mood_series(&entries, TimeWindow::Week, now);

        // 2024-03-08 through 2024-03-15 inclusive.
        assert_eq!(series.len(), 8);
        assert_eq!(series[0].date.to_string(), "2024-03-08");
        assert_eq!(series[0].average_mood, None);

        let march_14 = &series[6];
        assert_eq!(march_14.entry_count, 2);
        assert_eq!(march_14.average_mood, Some(3.0));

        let march_15 = &series[7];
        assert_eq!(march_15.entry_count, 1);
        assert_eq!(march_15.average_mood, Some(4.0));
    }

    #[test]
    fn word_frequencies_counts_and_filters_stop_words() {
        let frequencies =
            word_frequencies(["I am grateful for my grateful family"], WORD_CLOUD_LIMIT);

        assert_eq!(frequencies.len(), 2);
        assert_eq!(frequencies[0].word, "grateful");
        assert_eq!(frequencies[0].count, 2);
        assert_eq!(frequencies[1].word, "family");
        assert_eq!(frequencies[1].count, 1);
    }

    #[test]
    fn word_frequency_ties_keep_first_encounter_order() {
        let frequencies = word_frequencies(["quiet morning walk", "quiet morning walk"], 10);

        let words: Vec<&str> = frequencies.iter().map(|f| f.word.as_str()).collect();
        assert_eq!(words, vec!["quiet", "morning", "walk"]);
        assert!(frequencies.iter().all(|f| f.count == 2));
    }

    #[test]
    fn word_frequencies_respects_the_limit_and_short_tokens() {
        let frequencies = word_frequencies(["up at it ok sunrise sunrise coffee"], 1);

        assert_eq!(frequencies.len(), 1);
        assert_eq!(frequencies[0].word, "sunrise");
        assert_eq!(frequencies[0].count, 2);
    }
}
