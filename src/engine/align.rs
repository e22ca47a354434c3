//! Subtitle alignment on top of `alass-core`.
//!
//! All spans are in aligner units (one unit = the configured interval) and
//! every delta returned is in the same units.

use crate::defaults::{FRAMERATES, MAX_FPS_RATIO};
use alass_core::{NoProgressHandler, TimeSpan, overlap_scoring, standard_scoring};
use log::debug;

/// Best constant shift of `incorrect` onto `reference`, with its score.
///
/// Empty input leaves timing unchanged.
pub fn align_constant(reference: &[TimeSpan], incorrect: &[TimeSpan]) -> (i64, f64) {
    if reference.is_empty() || incorrect.is_empty() {
        return (0, 0.0);
    }
    let (delta, score) =
        alass_core::align_nosplit(reference, incorrect, standard_scoring, NoProgressHandler);
    (i64::from(delta), score)
}

/// One shift per incorrect span, in input order.
///
/// Every change of shift between consecutive spans costs `split_penalty`.
/// An `optimization` of zero runs the exact search.
pub fn align_split(
    reference: &[TimeSpan],
    incorrect: &[TimeSpan],
    split_penalty: f64,
    optimization: f64,
) -> Vec<i64> {
    if reference.is_empty() || incorrect.is_empty() {
        return vec![0; incorrect.len()];
    }
    let speed_optimization = (optimization > 0.0).then_some(optimization);
    let (deltas, score) = alass_core::align(
        incorrect,
        reference,
        split_penalty,
        speed_optimization,
        standard_scoring,
        NoProgressHandler,
    );
    debug!("split alignment score: {:.4}", score);
    deltas.into_iter().map(i64::from).collect()
}

/// A candidate framerate and its ratio to the reference framerate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramerateRatio {
    pub fps: f64,
    pub ratio: f64,
}

impl FramerateRatio {
    fn new(fps: f64, ref_fps: f64) -> Self {
        Self {
            fps,
            ratio: fps / ref_fps,
        }
    }

    /// Whether rescaling by this ratio keeps the timeline within
    /// `MAX_FPS_RATIO` of its length either way.
    fn is_plausible(&self) -> bool {
        self.ratio.is_finite() && (1.0 / MAX_FPS_RATIO..=MAX_FPS_RATIO).contains(&self.ratio)
    }

    fn distance_from_unity(&self) -> f64 {
        (self.ratio - 1.0).abs()
    }
}

/// Tries every standard framerate and keeps the one whose rescaled
/// subtitles align best with a constant shift. Ties go to the ratio closest
/// to one.
///
/// Returns `None` when there is nothing to align or no candidate ratio is
/// plausible for `ref_fps`.
pub fn guess_fps_ratio(
    reference: &[TimeSpan],
    incorrect: &[TimeSpan],
    ref_fps: f64,
) -> Option<FramerateRatio> {
    if reference.is_empty() || incorrect.is_empty() {
        return None;
    }

    FRAMERATES
        .iter()
        .map(|&fps| FramerateRatio::new(fps, ref_fps))
        .filter(|candidate| {
            let plausible = candidate.is_plausible();
            if !plausible {
                debug!(
                    "skipping framerate {:.4}fps (ratio {:.4} out of range)",
                    candidate.fps, candidate.ratio
                );
            }
            plausible
        })
        .map(|candidate| {
            let scaled: Vec<TimeSpan> =
                incorrect.iter().map(|s| s.scaled(candidate.ratio)).collect();
            let (delta, score) =
                alass_core::align_nosplit(reference, &scaled, overlap_scoring, NoProgressHandler);
            debug!(
                "checking framerate {:.4}fps (score: {:.4}, delta: {})",
                candidate.fps,
                score,
                i64::from(delta)
            );
            (score, candidate)
        })
        .max_by(|(score_a, a), (score_b, b)| {
            score_a
                .total_cmp(score_b)
                .then_with(|| b.distance_from_unity().total_cmp(&a.distance_from_unity()))
        })
        .map(|(_, best)| best)
}
