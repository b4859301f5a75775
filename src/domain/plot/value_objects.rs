use crate::domain::errors::ConfigurationError;
use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// Value Object - axis orientation (MIDAS origin codes 1..=4).
///
/// Names give the screen corner where both axes start increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(try_from = "i32", into = "i32")]
pub enum Origin {
    /// x grows right, y grows up
    BottomLeft = 1,
    /// x grows left, y grows up
    BottomRight = 2,
    /// x grows left, y grows down
    TopRight = 3,
    /// x grows right, y grows down (pixel order)
    TopLeft = 4,
}

/// Axis flips needed to go from one origin to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginFlip {
    None,
    X,
    Y,
    Both,
}

impl Origin {
    /// Orientation the coordinate stack stores its levels in: real minimum at
    /// the first pixel edge of both axes.
    pub const CANONICAL: Origin = Origin::TopLeft;

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Result<Self, ConfigurationError> {
        match code {
            1 => Ok(Origin::BottomLeft),
            2 => Ok(Origin::BottomRight),
            3 => Ok(Origin::TopRight),
            4 => Ok(Origin::TopLeft),
            other => Err(ConfigurationError::InvalidOrigin(other)),
        }
    }

    /// Flip parity between two origins: equal codes need nothing, opposite
    /// corners (difference 2) flip both axes, codes summing to 5 share an x
    /// direction and flip y, and the remaining neighbours flip x.
    pub fn flip_between(input: Origin, output: Origin) -> OriginFlip {
        let difference = (output.code() - input.code()).abs();
        let sum = output.code() + input.code();
        if difference == 0 {
            OriginFlip::None
        } else if difference == 2 {
            OriginFlip::Both
        } else if sum == 5 {
            OriginFlip::Y
        } else {
            OriginFlip::X
        }
    }
}

impl Default for Origin {
    fn default() -> Self {
        Origin::BottomLeft
    }
}

impl TryFrom<i32> for Origin {
    type Error = ConfigurationError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Origin::from_code(code)
    }
}

impl From<Origin> for i32 {
    fn from(origin: Origin) -> Self {
        origin.code()
    }
}

/// Plot axis selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[display(fmt = "x")]
    #[strum(serialize = "x")]
    X,
    #[display(fmt = "y")]
    #[strum(serialize = "y")]
    Y,
}

/// Value Object - point in real-world (data) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Constructor, Serialize, Deserialize)]
pub struct RealPoint {
    pub x: f64,
    pub y: f64,
}

impl RealPoint {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Point at parameter `t` along the segment `self -> other`
    pub fn lerp(&self, other: &RealPoint, t: f64) -> RealPoint {
        RealPoint::new(self.x + t * (other.x - self.x), self.y + t * (other.y - self.y))
    }
}

/// Value Object - point in canvas pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Constructor, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

/// Value Object - axis-aligned pixel rectangle, corners inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Constructor, Serialize, Deserialize)]
pub struct PixelRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl PixelRect {
    pub fn width(&self) -> i32 {
        (self.x2 - self.x1).abs()
    }

    pub fn height(&self) -> i32 {
        (self.y2 - self.y1).abs()
    }

    pub fn contains(&self, p: PixelPoint) -> bool {
        let (xl, xh) = (self.x1.min(self.x2), self.x1.max(self.x2));
        let (yl, yh) = (self.y1.min(self.y2), self.y1.max(self.y2));
        p.x >= xl && p.x <= xh && p.y >= yl && p.y <= yh
    }
}

/// Value Object - real-world rectangle; bounds are kept ordered
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealRect {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl RealRect {
    /// Build from two arbitrary corners
    pub fn from_corners(a: RealPoint, b: RealPoint) -> Self {
        Self {
            xmin: a.x.min(b.x),
            xmax: a.x.max(b.x),
            ymin: a.y.min(b.y),
            ymax: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn contains(&self, p: &RealPoint) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }
}

/// Value Object - union extent of every layer, used for scrollbar travel and
/// to seed the base zoom level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanRange {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for PanRange {
    fn default() -> Self {
        Self { x_min: -1.0, x_max: 1.0, y_min: -1.0, y_max: 1.0 }
    }
}

impl PanRange {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self { x_min, x_max, y_min, y_max }
    }

    /// Order both axes and open up zero-width spans by one unit each side
    pub fn normalized(self) -> Self {
        let (x_min, x_max) = normalize_span(self.x_min, self.x_max);
        let (y_min, y_max) = normalize_span(self.y_min, self.y_max);
        Self { x_min, x_max, y_min, y_max }
    }

    pub fn as_rect(&self) -> RealRect {
        RealRect { xmin: self.x_min, xmax: self.x_max, ymin: self.y_min, ymax: self.y_max }
    }

    pub fn x_span(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn y_span(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// Relative width under which a span is treated as degenerate
pub const DEGENERATE_SPAN: f64 = 1e-30;

/// Swap an inverted span and pad a degenerate one by +/-1
pub fn normalize_span(lo: f64, hi: f64) -> (f64, f64) {
    let (mut lo, mut hi) = if lo > hi { (hi, lo) } else { (lo, hi) };
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let scale = lo.abs().max(hi.abs()).max(1.0);
    if (hi - lo) <= DEGENERATE_SPAN * scale {
        lo -= 1.0;
        hi += 1.0;
    }
    (lo, hi)
}

/// Value Object - Color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn to_hex(&self) -> u32 {
        let r = (self.r * 255.0).round() as u32;
        let g = (self.g * 255.0).round() as u32;
        let b = (self.b * 255.0).round() as u32;
        (r << 16) | (g << 8) | b
    }

    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self { a: alpha, ..*self }
    }

    /// Accepts `#rrggbb`, `rrggbb` and a handful of CSS names
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let named = match text.to_ascii_lowercase().as_str() {
            "black" => Some(Color::BLACK),
            "white" => Some(Color::WHITE),
            "red" => Some(Color::RED),
            "green" | "lime" => Some(Color::GREEN),
            "blue" => Some(Color::BLUE),
            "yellow" => Some(Color::from_hex(0xFFFF00)),
            "cyan" => Some(Color::from_hex(0x00FFFF)),
            "magenta" => Some(Color::from_hex(0xFF00FF)),
            "orange" => Some(Color::from_hex(0xFFA500)),
            "gray" | "grey" => Some(Color::from_hex(0x808080)),
            _ => None,
        };
        if named.is_some() {
            return named;
        }
        let digits = text.strip_prefix('#').unwrap_or(text);
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Color::from_hex)
    }

    /// CSS color string understood by the canvas
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:06x}", self.to_hex())
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                (self.r * 255.0).round() as u32,
                (self.g * 255.0).round() as u32,
                (self.b * 255.0).round() as u32,
                self.a
            )
        }
    }

    /// Predefined colors
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const RED: Color = Color { r: 1.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const GREEN: Color = Color { r: 0.0, g: 1.0, b: 0.0, a: 1.0 };
    pub const BLUE: Color = Color { r: 0.0, g: 0.0, b: 1.0, a: 1.0 };
    pub const TRANSPARENT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    /// Trace colors handed out to layers in overlay order
    pub const PALETTE: [u32; 8] = [
        0xFFFFFF, 0xFF0000, 0x00FF00, 0x0000FF, 0xFFFF00, 0xFF00FF, 0x00FFFF, 0xFFA500,
    ];

    pub fn palette(index: usize) -> Color {
        Color::from_hex(Self::PALETTE[index % Self::PALETTE.len()])
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl TryFrom<String> for Color {
    type Error = ConfigurationError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Color::parse(&text)
            .ok_or_else(|| ConfigurationError::MalformedOverride(format!("bad color '{}'", text)))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_css()
    }
}

/// Value Object - an x sub-range drawn in its own color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub xstart: f64,
    pub xend: f64,
    pub color: Color,
}

impl Highlight {
    pub fn new(xstart: f64, xend: f64, color: Color) -> Self {
        Self { xstart: xstart.min(xend), xend: xstart.max(xend), color }
    }

    pub fn covers(&self, x: f64) -> bool {
        x >= self.xstart && x < self.xend
    }
}

/// Which bounds of an axis the auto-scale engine computes (MIDAS bitmask 0..=3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, AsRefStr, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoMode {
    #[strum(serialize = "off", serialize = "0")]
    Off,
    #[strum(serialize = "min", serialize = "1")]
    Min,
    #[strum(serialize = "max", serialize = "2")]
    Max,
    #[default]
    #[strum(serialize = "both", serialize = "3")]
    Both,
}

impl AutoMode {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => AutoMode::Off,
            1 => AutoMode::Min,
            2 => AutoMode::Max,
            _ => AutoMode::Both,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            AutoMode::Off => 0,
            AutoMode::Min => 1,
            AutoMode::Max => 2,
            AutoMode::Both => 3,
        }
    }

    pub fn has_min(self) -> bool {
        self.bits() & 1 != 0
    }

    pub fn has_max(self) -> bool {
        self.bits() & 2 != 0
    }

    pub fn is_off(self) -> bool {
        self == AutoMode::Off
    }
}

/// Crosshair display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, AsRefStr, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crosshairs {
    #[default]
    #[strum(serialize = "off")]
    Off,
    #[strum(serialize = "vertical")]
    Vertical,
    #[strum(serialize = "horizontal")]
    Horizontal,
    #[strum(serialize = "both")]
    Both,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_table() {
        use Origin::*;
        assert_eq!(Origin::flip_between(BottomLeft, BottomLeft), OriginFlip::None);
        assert_eq!(Origin::flip_between(BottomLeft, BottomRight), OriginFlip::X);
        assert_eq!(Origin::flip_between(BottomRight, TopRight), OriginFlip::Y);
        assert_eq!(Origin::flip_between(TopRight, TopLeft), OriginFlip::X);
        assert_eq!(Origin::flip_between(BottomLeft, TopLeft), OriginFlip::Y);
        assert_eq!(Origin::flip_between(BottomLeft, TopRight), OriginFlip::Both);
        assert_eq!(Origin::flip_between(BottomRight, TopLeft), OriginFlip::Both);
    }

    #[test]
    fn origin_codes_round_trip() {
        for code in 1..=4 {
            assert_eq!(Origin::from_code(code).unwrap().code(), code);
        }
        assert_eq!(Origin::from_code(7), Err(ConfigurationError::InvalidOrigin(7)));
    }

    #[test]
    fn normalize_swaps_and_pads() {
        assert_eq!(normalize_span(5.0, 1.0), (1.0, 5.0));
        assert_eq!(normalize_span(3.0, 3.0), (2.0, 4.0));
        let range = PanRange::new(10.0, -10.0, 0.0, 0.0).normalized();
        assert_eq!(range, PanRange::new(-10.0, 10.0, -1.0, 1.0));
    }

    #[test]
    fn color_parsing() {
        assert_eq!(Color::parse("#ff0000"), Some(Color::RED));
        assert_eq!(Color::parse("Blue"), Some(Color::BLUE));
        assert_eq!(Color::parse("#12"), None);
        assert_eq!(Color::RED.to_css(), "#ff0000");
    }
}
