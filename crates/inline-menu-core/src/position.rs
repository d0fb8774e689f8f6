//! Screen positions of the two surfaces relative to the focused field.

use inline_menu_protocols::{FieldRects, FieldStyles, PositionStyles, SubFrameOffsets};

/// Fraction of the field height left as margin around the button.
fn button_offset_ratio(height: f64) -> f64 {
    if height >= 50.0 {
        0.47
    } else if height >= 35.0 {
        0.42
    } else {
        0.37
    }
}

/// Square button inside the right edge of the field.
///
/// When the field carries more right padding than left padding the button is
/// pulled left of that padding so it does not sit over the page's own icon.
pub fn button_position(
    rects: &FieldRects,
    styles: &FieldStyles,
    frame: &SubFrameOffsets,
) -> PositionStyles {
    let offset = rects.height * button_offset_ratio(rects.height);
    let size = rects.height - offset;
    let top = frame.top + rects.top + offset / 2.0;

    let mut left = rects.left + rects.width - rects.height + offset / 2.0;
    if let (Some(padding_right), Some(padding_left)) =
        (styles.padding_right_px(), styles.padding_left_px())
    {
        if padding_right > padding_left {
            left = rects.left + rects.width - rects.height - (padding_right - offset + 2.0);
        }
    }

    PositionStyles {
        top: Some(top.round() as i64),
        left: Some((left + frame.left).round() as i64),
        width: Some(size.round() as i64),
        height: Some(size.round() as i64),
    }
}

/// List directly under the field, as wide as the field. Height is owned by
/// the list surface itself.
pub fn list_position(rects: &FieldRects, frame: &SubFrameOffsets) -> PositionStyles {
    PositionStyles {
        top: Some((frame.top + rects.top + rects.height).round() as i64),
        left: Some((frame.left + rects.left).round() as i64),
        width: Some(rects.width.round() as i64),
        height: None,
    }
}
