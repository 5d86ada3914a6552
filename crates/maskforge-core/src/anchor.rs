use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which named position of a primitive the caller's origin refers to.
///
/// Box anchors (`BottomLeft` .. `CenterRight`) apply to rectangles and
/// X-axis trapezoids; side anchors (`LeftTop` .. `RightBottom`) to Y-axis
/// trapezoids. Sectors, caps and triangles take `Center` (the point they are
/// built around) or `Vertex(i)`, the i-th point of the generated contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Anchor {
    BottomLeft,
    BottomCenter,
    BottomRight,
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    LeftTop,
    LeftCenter,
    LeftBottom,
    RightTop,
    RightCenter,
    RightBottom,
    Vertex(usize),
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Anchor::BottomLeft => "bottom_left",
            Anchor::BottomCenter => "bottom_center",
            Anchor::BottomRight => "bottom_right",
            Anchor::TopLeft => "top_left",
            Anchor::TopCenter => "top_center",
            Anchor::TopRight => "top_right",
            Anchor::CenterLeft => "center_left",
            Anchor::Center => "center",
            Anchor::CenterRight => "center_right",
            Anchor::LeftTop => "left_top",
            Anchor::LeftCenter => "left_center",
            Anchor::LeftBottom => "left_bottom",
            Anchor::RightTop => "right_top",
            Anchor::RightCenter => "right_center",
            Anchor::RightBottom => "right_bottom",
            Anchor::Vertex(i) => return write!(f, "point{}", i),
        };
        f.write_str(name)
    }
}

impl FromStr for Anchor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let anchor = match s {
            "bottom_left" => Anchor::BottomLeft,
            "bottom_center" => Anchor::BottomCenter,
            "bottom_right" => Anchor::BottomRight,
            "top_left" => Anchor::TopLeft,
            "top_center" => Anchor::TopCenter,
            "top_right" => Anchor::TopRight,
            "center_left" => Anchor::CenterLeft,
            "center" => Anchor::Center,
            "center_right" => Anchor::CenterRight,
            "left_top" => Anchor::LeftTop,
            "left_center" => Anchor::LeftCenter,
            "left_bottom" => Anchor::LeftBottom,
            "right_top" => Anchor::RightTop,
            "right_center" => Anchor::RightCenter,
            "right_bottom" => Anchor::RightBottom,
            other => {
                return other
                    .strip_prefix("point")
                    .and_then(|n| n.parse().ok())
                    .map(Anchor::Vertex)
                    .ok_or_else(|| ConfigError::UnknownAnchor(other.to_string()))
            }
        };
        Ok(anchor)
    }
}

impl TryFrom<String> for Anchor {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Anchor> for String {
    fn from(anchor: Anchor) -> Self {
        anchor.to_string()
    }
}

/// Direction along which a run of parallel lines or tapers extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Lines run horizontally and stack upward.
    #[default]
    X,
    /// Lines run vertically and stack rightward.
    Y,
}

impl FromStr for Axis {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            other => Err(ConfigError::UnknownAxis(other.to_string())),
        }
    }
}
