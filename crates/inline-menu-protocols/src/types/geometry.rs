//! Field geometry reported by page frames and positions pushed to surfaces.

use serde::{Deserialize, Serialize};

use super::FrameId;

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;

/// Bounding box of a form field, relative to its own frame's viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldRects {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Subset of the field's computed styles the positioning math needs.
///
/// Values arrive as CSS strings (`"12px"`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_left: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_right: Option<String>,
}

impl FieldStyles {
    pub fn padding_left_px(&self) -> Option<f64> {
        self.padding_left.as_deref().and_then(parse_css_px)
    }

    pub fn padding_right_px(&self) -> Option<f64> {
        self.padding_right.as_deref().and_then(parse_css_px)
    }
}

/// Parse the leading integer of a CSS length (`"12px"` -> 12, `"auto"` -> None).
pub fn parse_css_px(value: &str) -> Option<f64> {
    let trimmed = value.trim_start();
    let end = trimmed
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse::<i64>().ok().map(|v| v as f64)
}

/// Focused field data as reported by the frame that owns the field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusedFieldData {
    pub focused_field_rects: FieldRects,
    #[serde(default)]
    pub focused_field_styles: FieldStyles,
}

/// Cumulative offset of a sub-frame relative to the top-level viewport.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubFrameOffsets {
    #[serde(default)]
    pub url: String,
    pub top: f64,
    pub left: f64,
    /// Ancestor chain from the top-level frame down to the direct parent.
    #[serde(default)]
    pub parent_frame_ids: Vec<FrameId>,
}

impl SubFrameOffsets {
    /// Offsets of the top-level frame itself.
    pub fn top_level(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            top: 0.0,
            left: 0.0,
            parent_frame_ids: Vec::new(),
        }
    }
}

/// Offset of a child frame element inside its parent's viewport, as answered
/// by the parent frame for one hop of the ancestry walk.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct LocalFrameOffset {
    pub top: f64,
    pub left: f64,
}

/// Style update pushed to a surface. Unset fields are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PositionStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
}
