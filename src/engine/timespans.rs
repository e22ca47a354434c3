//! Reference time spans.

use super::voice::VoiceActivity;
use alass_core::{TimePoint, TimeSpan as AlignSpan};

/// A closed-open interval of time in milliseconds, `start_ms <= end_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeSpan {
    /// Creates a span, swapping the bounds if they are reversed.
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self {
            start_ms: start_ms.min(end_ms),
            end_ms: start_ms.max(end_ms),
        }
    }

    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    /// Converts to aligner units of `interval_ms` milliseconds.
    pub fn to_units(self, interval_ms: i64) -> AlignSpan {
        AlignSpan::new_safe(
            TimePoint::from(self.start_ms.div_euclid(interval_ms)),
            TimePoint::from(self.end_ms.div_euclid(interval_ms)),
        )
    }

    /// Scales both bounds by `factor` and then shifts them by `delta_ms`,
    /// clamping the result at zero.
    pub fn rescaled(self, factor: f64, delta_ms: i64) -> Self {
        let move_point = |ms: i64| {
            ((ms as f64 * factor).round() as i64)
                .saturating_add(delta_ms)
                .max(0)
        };
        Self::new(move_point(self.start_ms), move_point(self.end_ms))
    }
}

/// Ordered set of reference intervals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeSpans(Vec<TimeSpan>);

impl TimeSpans {
    pub fn new(spans: Vec<TimeSpan>) -> Self {
        Self(spans)
    }

    pub fn push(&mut self, span: TimeSpan) {
        self.0.push(span);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeSpan> {
        self.0.iter()
    }

    /// Sum of all span durations.
    pub fn total_duration_ms(&self) -> i64 {
        self.0.iter().map(TimeSpan::duration_ms).sum()
    }

    pub fn to_units(&self, interval_ms: i64) -> Vec<AlignSpan> {
        self.0.iter().map(|span| span.to_units(interval_ms)).collect()
    }
}

/// One span per maximal run of speech frames.
impl From<&VoiceActivity> for TimeSpans {
    fn from(activity: &VoiceActivity) -> Self {
        let frame_ms = i64::from(activity.frame_ms());
        let mut spans = Vec::new();
        let mut run_start = None;

        for (i, &active) in activity.frames().iter().enumerate() {
            match (active, run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    spans.push(TimeSpan::new(start as i64 * frame_ms, i as i64 * frame_ms));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            let end = activity.len() as i64 * frame_ms;
            spans.push(TimeSpan::new(start as i64 * frame_ms, end));
        }

        Self(spans)
    }
}

impl FromIterator<TimeSpan> for TimeSpans {
    fn from_iter<I: IntoIterator<Item = TimeSpan>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for TimeSpans {
    type Item = TimeSpan;
    type IntoIter = std::vec::IntoIter<TimeSpan>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TimeSpans {
    type Item = &'a TimeSpan;
    type IntoIter = std::slice::Iter<'a, TimeSpan>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
