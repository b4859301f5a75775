use crate::domain::errors::ConfigurationError;
use crate::domain::plot::value_objects::Color;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// Complex-to-real transform (MIDAS `cmode`)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, AsRefStr, EnumIter, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum ComplexMode {
    #[default]
    #[strum(serialize = "MA")]
    Magnitude,
    #[strum(serialize = "PH")]
    Phase,
    #[strum(serialize = "RE")]
    Real,
    #[strum(serialize = "IM")]
    Imaginary,
    /// Imaginary plotted against real; x holds the real part
    #[strum(serialize = "IR")]
    ImagVsReal,
    /// 10·log10
    #[strum(serialize = "LO")]
    Log10,
    /// 20·log10
    #[strum(serialize = "L2")]
    Log20,
    #[strum(serialize = "PW")]
    MagnitudeSquared,
}

impl ComplexMode {
    /// MIDAS numeric `cmode`
    pub fn code(self) -> u8 {
        match self {
            ComplexMode::Magnitude => 1,
            ComplexMode::Phase => 2,
            ComplexMode::Real => 3,
            ComplexMode::Imaginary => 4,
            ComplexMode::ImagVsReal => 5,
            ComplexMode::Log10 => 6,
            ComplexMode::Log20 => 7,
            ComplexMode::MagnitudeSquared => 8,
        }
    }

    pub fn is_log(self) -> bool {
        matches!(self, ComplexMode::Log10 | ComplexMode::Log20)
    }

    pub fn label(self) -> &'static str {
        match self {
            ComplexMode::Magnitude => "Magnitude",
            ComplexMode::Phase => "Phase",
            ComplexMode::Real => "Real",
            ComplexMode::Imaginary => "Imaginary",
            ComplexMode::ImagVsReal => "IR: Imag/Real",
            ComplexMode::Log10 => "10*Log10",
            ComplexMode::Log20 => "20*Log10",
            ComplexMode::MagnitudeSquared => "Power",
        }
    }
}

impl TryFrom<String> for ComplexMode {
    type Error = ConfigurationError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.to_ascii_uppercase()
            .parse()
            .map_err(|_| ConfigurationError::MalformedOverride(format!("unknown cmode '{}'", code)))
    }
}

impl From<ComplexMode> for String {
    fn from(mode: ComplexMode) -> Self {
        let code: &str = mode.as_ref();
        code.to_string()
    }
}

/// Units used by [`ComplexMode::Phase`]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, AsRefStr, EnumIter, Serialize, Deserialize,
)]
pub enum PhaseUnits {
    #[default]
    #[strum(serialize = "R")]
    #[serde(rename = "R")]
    Radians,
    #[strum(serialize = "D")]
    #[serde(rename = "D")]
    Degrees,
    #[strum(serialize = "C")]
    #[serde(rename = "C")]
    Cycles,
}

impl PhaseUnits {
    /// Factor applied to a phase in radians
    pub fn scale(self) -> f64 {
        match self {
            PhaseUnits::Radians => 1.0,
            PhaseUnits::Degrees => 180.0 / std::f64::consts::PI,
            PhaseUnits::Cycles => 1.0 / (2.0 * std::f64::consts::PI),
        }
    }
}

/// How consecutive samples are joined
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, AsRefStr, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LineMode {
    #[strum(serialize = "none")]
    None,
    /// Vertical line from each sample to y = 0
    #[strum(serialize = "stems")]
    #[serde(rename = "stems")]
    VerticalStems,
    /// Horizontal line from each sample to x = 0
    #[strum(serialize = "hstems")]
    #[serde(rename = "hstems")]
    HorizontalStems,
    #[default]
    #[strum(serialize = "connect")]
    #[serde(rename = "connect")]
    Connecting,
}

/// Marker drawn at each visible sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolMode {
    #[default]
    None,
    Pixel,
    Circle,
    Square,
    Plus,
    X,
    #[serde(rename = "triangle-up")]
    TriangleUp,
    #[serde(rename = "triangle-down")]
    TriangleDown,
    Character(char),
}

impl std::str::FromStr for SymbolMode {
    type Err = ConfigurationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(match name.to_ascii_lowercase().as_str() {
            "none" | "0" => SymbolMode::None,
            "pixel" | "1" => SymbolMode::Pixel,
            "circle" | "2" => SymbolMode::Circle,
            "square" | "3" => SymbolMode::Square,
            "plus" | "4" => SymbolMode::Plus,
            "x" | "5" => SymbolMode::X,
            "triangle-up" | "6" => SymbolMode::TriangleUp,
            "triangle-down" | "7" => SymbolMode::TriangleDown,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => SymbolMode::Character(c),
                    _ => {
                        return Err(ConfigurationError::MalformedOverride(format!(
                            "unknown symbol '{}'",
                            name
                        )));
                    }
                }
            }
        })
    }
}

/// Per-layer display styling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerStyle {
    pub color: Color,
    pub line: LineMode,
    pub thickness: u32,
    pub dashed: bool,
    pub symbol: SymbolMode,
    pub radius: u32,
}

impl LayerStyle {
    pub fn with_color(color: Color) -> Self {
        Self { color, ..Self::default() }
    }
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            line: LineMode::Connecting,
            thickness: 1,
            dashed: false,
            symbol: SymbolMode::None,
            radius: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn mnemonic_codes_parse() {
        assert_eq!(ComplexMode::from_str("L2").unwrap(), ComplexMode::Log20);
        assert_eq!(ComplexMode::try_from("ph".to_string()).unwrap(), ComplexMode::Phase);
        assert_eq!(PhaseUnits::from_str("D").unwrap(), PhaseUnits::Degrees);
        assert_eq!(LineMode::from_str("hstems").unwrap(), LineMode::HorizontalStems);
        assert!(ComplexMode::try_from("ZZ".to_string()).is_err());
    }

    #[test]
    fn symbols_accept_names_and_characters() {
        assert_eq!("circle".parse::<SymbolMode>().unwrap(), SymbolMode::Circle);
        assert_eq!("*".parse::<SymbolMode>().unwrap(), SymbolMode::Character('*'));
        assert!("blob".parse::<SymbolMode>().is_err());
    }

    #[test]
    fn phase_unit_scales() {
        assert_eq!(PhaseUnits::Radians.scale(), 1.0);
        assert!((PhaseUnits::Degrees.scale() * std::f64::consts::PI - 180.0).abs() < 1e-12);
    }
}
