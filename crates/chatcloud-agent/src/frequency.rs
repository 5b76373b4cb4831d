use chatcloud_core::{Event, WordCount};
use indexmap::IndexMap;

/// Exact-string token counts, highest first; ties keep first-seen order.
pub fn frequencies(events: &[Event]) -> Vec<WordCount> {
    let mut counts: IndexMap<&str, u32> = IndexMap::new();
    for word in events.iter().flat_map(|e| e.words.iter()) {
        *counts.entry(word.as_str()).or_insert(0) += 1;
    }
    let mut out: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount::new(word, count))
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatcloud_core::{Selection, Timestamp};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(h, m, 0))
            .expect("valid time")
    }

    fn event(time: Timestamp, words: &[&str]) -> Event {
        Event {
            time,
            user_id: "u".into(),
            text: words.join(" "),
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    #[test]
    fn counts_and_orders_with_stable_ties() {
        let events = vec![event(at(9, 0), &["a", "a", "b"]), event(at(9, 30), &["a", "c"])];
        let counts = frequencies(&events);
        assert_eq!(
            counts,
            vec![
                WordCount::new("a", 3),
                WordCount::new("b", 1),
                WordCount::new("c", 1),
            ]
        );
    }

    #[test]
    fn tokens_are_not_normalized() {
        let events = vec![event(at(9, 0), &["Word", "word", "word"])];
        let counts = frequencies(&events);
        assert_eq!(counts, vec![WordCount::new("word", 2), WordCount::new("Word", 1)]);
    }

    #[test]
    fn output_is_sorted_descending() {
        let words = ["x", "y", "z", "y", "w", "z", "z", "q", "y", "z"];
        let events: Vec<Event> = words
            .chunks(3)
            .enumerate()
            .map(|(i, chunk)| event(at(9, i as u32), chunk))
            .collect();
        let counts = frequencies(&events);
        assert!(counts.windows(2).all(|pair| pair[0].count >= pair[1].count));
        assert_eq!(counts[0], WordCount::new("z", 4));
    }

    #[test]
    fn narrowing_then_counting_matches_counting_the_narrow_range() {
        let events = vec![
            event(at(8, 0), &["early"]),
            event(at(9, 0), &["a", "b"]),
            event(at(9, 45), &["b", "c"]),
            event(at(10, 0), &["c", "c"]),
            event(at(11, 0), &["late"]),
        ];
        let narrow = Selection::new(at(9, 0), at(10, 0));
        let wide = Selection::new(at(7, 0), at(12, 0));

        let direct: Vec<Event> = events
            .iter()
            .filter(|e| narrow.contains(e.time))
            .cloned()
            .collect();
        let via_wide: Vec<Event> = events
            .iter()
            .filter(|e| wide.contains(e.time))
            .filter(|e| narrow.contains(e.time))
            .cloned()
            .collect();

        assert_eq!(frequencies(&direct), frequencies(&via_wide));
        assert_eq!(
            frequencies(&direct),
            vec![
                WordCount::new("c", 3),
                WordCount::new("b", 2),
                WordCount::new("a", 1),
            ]
        );
    }

    #[test]
    fn empty_events_have_no_words() {
        assert!(frequencies(&[]).is_empty());
    }
}
