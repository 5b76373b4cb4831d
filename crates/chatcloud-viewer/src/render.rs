use chatcloud_core::TimeScale;
use std::fmt::Write;

use crate::state::ViewerState;

const TIME_FMT: &str = "%Y-%m-%d %H:%M";

pub fn render_status(state: &ViewerState) -> String {
    let mut out = String::new();
    let link = if state.connected { "connected" } else { "disconnected" };
    let _ = write!(out, "agent: {link}");
    if let Some(version) = &state.agent_version {
        let _ = write!(out, " (v{version})");
    }
    if let Some(err) = &state.last_error {
        let _ = write!(out, "\nerror: {err}");
    }
    out
}

/// One row per axis bucket: brush pixel, bucket start, and a bar whose `#`
/// part is the active count and whose `.` part is the rest of the full count.
pub fn render_timeline(state: &ViewerState, timeline_width: f64, bar_width: usize) -> String {
    let mut out = String::new();
    let Some(scale) = TimeScale::from_buckets(&state.axis, timeline_width) else {
        out.push_str("timeline: no records");
        return out;
    };

    match state.selection {
        Some(sel) => {
            let _ = writeln!(
                out,
                "timeline: {} .. {} selected",
                sel.start.format(TIME_FMT),
                sel.end.format(TIME_FMT)
            );
        }
        None => {
            let _ = writeln!(out, "timeline: all records");
        }
    }

    let max = state.axis.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let cells = |count: usize| (count * bar_width + max - 1) / max;
    for (bucket, active) in state.axis.iter().zip(state.active_counts()) {
        let full = cells(bucket.count);
        let lit = cells(active).min(full);
        let _ = writeln!(
            out,
            "{:>7.1}px  {}  {}{} {}",
            scale.apply(bucket.start),
            bucket.start.format(TIME_FMT),
            "#".repeat(lit),
            ".".repeat(full - lit),
            active
        );
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn render_cloud(state: &ViewerState, top: usize) -> String {
    let mut out = String::new();
    let Some(cloud) = &state.cloud else {
        out.push_str("cloud: waiting for layout");
        return out;
    };
    let _ = write!(
        out,
        "cloud (pass {}): {} placed, {} dropped",
        cloud.pass,
        cloud.placements.len(),
        cloud.dropped
    );
    if let Some(p) = state.progress {
        let _ = write!(
            out,
            "  [pass {} at {}/{}, {} placed]",
            p.pass, p.attempted, p.total, p.placed
        );
    }
    for p in cloud.placements.iter().take(top) {
        let _ = write!(
            out,
            "\n  {:<16} {:>5}  {:>5.1}px  ({:>7.1}, {:>7.1})",
            p.word.word, p.word.count, p.font_size, p.x, p.y
        );
        if p.rotation != 0.0 {
            let _ = write!(out, "  {}°", p.rotation);
        }
    }
    if cloud.placements.len() > top {
        let _ = write!(out, "\n  … {} more", cloud.placements.len() - top);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::Incoming;
    use chatcloud_core::{Msg, Placement, Rect, Selection, TimeBucket, Timestamp, WordCount};
    use chrono::NaiveDate;

    fn hour(h: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(h, 0, 0))
            .expect("valid time")
    }

    fn state_with_timeline() -> ViewerState {
        let mut st = ViewerState::default();
        st.apply(Incoming::message(
            "s".into(),
            Msg::Timeline {
                buckets: vec![
                    TimeBucket { start: hour(9), count: 4 },
                    TimeBucket { start: hour(10), count: 2 },
                ],
                selection: None,
            },
        ));
        st
    }

    #[test]
    fn timeline_rows_show_pixels_and_bars() {
        let st = state_with_timeline();
        let text = render_timeline(&st, 100.0, 4);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "timeline: all records");
        assert_eq!(lines[1], "    0.0px  2024-03-01 09:00  #### 4");
        assert_eq!(lines[2], "  100.0px  2024-03-01 10:00  ## 2");
    }

    #[test]
    fn brushed_timeline_dims_unselected_buckets() {
        let mut st = state_with_timeline();
        st.apply(Incoming::message(
            "s".into(),
            Msg::Timeline {
                buckets: vec![TimeBucket { start: hour(10), count: 2 }],
                selection: Some(Selection::new(hour(10), hour(10))),
            },
        ));
        let text = render_timeline(&st, 100.0, 4);
        assert!(text.starts_with("timeline: 2024-03-01 10:00 .. 2024-03-01 10:00 selected"));
        assert!(text.contains("09:00  .... 0"));
        assert!(text.contains("10:00  ## 2"));
    }

    #[test]
    fn empty_timeline_and_cloud_have_placeholders() {
        let st = ViewerState::default();
        assert_eq!(render_timeline(&st, 100.0, 10), "timeline: no records");
        assert_eq!(render_cloud(&st, 5), "cloud: waiting for layout");
        assert_eq!(render_status(&st), "agent: disconnected");
    }

    #[test]
    fn cloud_lists_top_words() {
        let mut st = ViewerState::default();
        let placements = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, w)| Placement {
                word: WordCount::new(*w, 3 - i as u32),
                x: i as f64 * 10.0,
                y: 0.0,
                font_size: 20.0,
                rotation: 0.0,
                bounds: Rect::centered(0.0, 0.0, 1.0, 1.0),
            })
            .collect();
        st.apply(Incoming::message(
            "s".into(),
            Msg::LayoutDone {
                pass: 4,
                placements,
                dropped: 1,
            },
        ));
        let text = render_cloud(&st, 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "cloud (pass 4): 3 placed, 1 dropped");
        assert!(lines[1].trim_start().starts_with("a "));
        assert!(lines[2].trim_start().starts_with("b "));
        assert_eq!(lines[3], "  … 1 more");
    }
}
