//! Board labels.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ids::{BoardId, LabelId};

/// Colors offered by the label picker, as `#RRGGBB`.
pub const PRESET_COLORS: [&str; 8] = [
    "#EF4444", // red
    "#F59E0B", // amber
    "#10B981", // emerald
    "#3B82F6", // blue
    "#6366F1", // indigo
    "#8B5CF6", // violet
    "#EC4899", // pink
    "#6B7280", // gray
];

fn color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"))
}

/// Returns true if `color` is a `#RRGGBB` hex string.
pub fn is_valid_color(color: &str) -> bool {
    color_pattern().is_match(color)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: LabelId,
    pub name: String,
    pub color: String,
    pub board_id: BoardId,
}

/// Label as embedded in task payloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelBrief {
    pub id: LabelId,
    pub name: String,
    pub color: String,
}

impl From<&Label> for LabelBrief {
    fn from(label: &Label) -> Self {
        Self {
            id: label.id,
            name: label.name.clone(),
            color: label.color.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLabelRequest {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLabelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for color in PRESET_COLORS {
            assert!(is_valid_color(color), "{color}");
        }
    }

    #[test]
    fn test_invalid_colors() {
        assert!(is_valid_color("#abcdef"));
        assert!(!is_valid_color("abcdef"));
        assert!(!is_valid_color("#abc"));
        assert!(!is_valid_color("#abcdeg"));
        assert!(!is_valid_color("#abcdef0"));
    }

    #[test]
    fn test_brief_from_label() {
        let label = Label {
            id: LabelId::new(4),
            name: "bug".into(),
            color: "#EF4444".into(),
            board_id: BoardId::new(1),
        };
        let brief = LabelBrief::from(&label);
        assert_eq!(brief.id, label.id);
        assert_eq!(brief.color, "#EF4444");
    }
}
