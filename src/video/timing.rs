use rand::Rng;
use tracing::debug;

use crate::error::{InvalidArgumentError, Result, VideoError};
use crate::video::types::TimeWindow;

/// Durations closer than this are treated as equal (seconds)
pub const DURATION_EPSILON: f64 = 1e-6;

/// Match a source clip's duration to the target duration
///
/// Short sources loop from the start and the looped stream is cut at
/// exactly `target_duration`. Long sources get a trim window whose start
/// is drawn uniformly from `[0, source_duration - target_duration]`.
pub fn reconcile_duration<R: Rng + ?Sized>(
    source_duration: f64,
    target_duration: f64,
    rng: &mut R,
) -> Result<TimeWindow> {
    if !target_duration.is_finite() || target_duration <= 0.0 {
        return Err(InvalidArgumentError::NonPositiveDuration { value: target_duration }.into());
    }
    if !source_duration.is_finite() || source_duration <= 0.0 {
        return Err(VideoError::ProbeFailed {
            path: "<source clip>".to_string(),
            reason: format!("unusable clip duration {}", source_duration),
        }
        .into());
    }

    if (source_duration - target_duration).abs() <= DURATION_EPSILON {
        return Ok(TimeWindow { start: 0.0, end: target_duration, repeats: 0 });
    }

    if source_duration < target_duration {
        let plays = (target_duration / source_duration).ceil() as u32;
        let repeats = plays.saturating_sub(1).max(1);
        debug!(
            "Source {:.3}s shorter than target {:.3}s, looping {} extra time(s)",
            source_duration, target_duration, repeats
        );
        return Ok(TimeWindow { start: 0.0, end: target_duration, repeats });
    }

    let max_start = source_duration - target_duration;
    let start = rng.gen_range(0.0..=max_start);
    Ok(TimeWindow {
        start,
        end: start + target_duration,
        repeats: 0,
    })
}
