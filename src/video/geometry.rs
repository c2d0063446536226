use crate::error::{InvalidArgumentError, Result};
use crate::video::types::CropRect;

/// Compute a centered "cover" crop of the source for the target size
///
/// The crop keeps the full source extent on one axis and trims the other
/// so its aspect matches `target_width / target_height`. It only removes
/// pixels; scaling to the exact target size happens afterwards.
pub fn compute_cover_crop(
    source_width: u32,
    source_height: u32,
    target_width: u32,
    target_height: u32,
) -> Result<CropRect> {
    if source_width == 0 || source_height == 0 {
        return Err(InvalidArgumentError::NonPositiveDimensions {
            width: source_width,
            height: source_height,
        }
        .into());
    }
    if target_width == 0 || target_height == 0 {
        return Err(InvalidArgumentError::NonPositiveDimensions {
            width: target_width,
            height: target_height,
        }
        .into());
    }

    let source_aspect = source_width as f64 / source_height as f64;
    let target_aspect = target_width as f64 / target_height as f64;

    let rect = if source_aspect > target_aspect {
        // Source is wider: trim the sides
        let crop_width = (source_height as f64 * target_aspect).floor() as u32;
        let x1 = (source_width - crop_width) / 2;
        CropRect {
            x1,
            y1: 0,
            x2: x1 + crop_width,
            y2: source_height,
        }
    } else {
        // Source is taller (or equal): trim top and bottom
        let crop_height = (source_width as f64 / target_aspect).floor() as u32;
        let y1 = (source_height - crop_height) / 2;
        CropRect {
            x1: 0,
            y1,
            x2: source_width,
            y2: y1 + crop_height,
        }
    };

    if rect.x1 >= rect.x2 || rect.y1 >= rect.y2 {
        return Err(InvalidArgumentError::DegenerateCrop {
            source_width,
            source_height,
            target_width,
            target_height,
        }
        .into());
    }

    Ok(rect)
}
