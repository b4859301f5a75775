//! Plot configuration: construction options, live settings, partial
//! setting changes and per-layer overrides, all accepted as JSON.

use crate::domain::errors::ConfigurationError;
use crate::domain::layer::{ComplexMode, Layer, LineMode, PhaseUnits, SymbolMode};
use crate::domain::plot::services::ScaleSettings;
use crate::domain::plot::value_objects::{AutoMode, Color, Crosshairs, Highlight, Origin};
use crate::infrastructure::rendering::ChromeSettings;
use serde::{Deserialize, Deserializer, Serialize};

/// Live plot settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotSettings {
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,
    #[serde(deserialize_with = "auto_mode")]
    pub autox: AutoMode,
    #[serde(deserialize_with = "auto_mode")]
    pub autoy: AutoMode,
    pub all: bool,
    pub expand: bool,
    pub autol: i32,
    pub cmode: ComplexMode,
    pub phunits: PhaseUnits,
    pub origin: Origin,
    pub grid: bool,
    pub legend: bool,
    pub crosshairs: Crosshairs,
    pub bufmax: usize,
    pub ymargin_fraction: f64,
    pub xdiv: usize,
    pub ydiv: usize,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            xmin: None,
            xmax: None,
            ymin: None,
            ymax: None,
            autox: AutoMode::Both,
            autoy: AutoMode::Both,
            all: false,
            expand: false,
            autol: -1,
            cmode: ComplexMode::Magnitude,
            phunits: PhaseUnits::Radians,
            origin: Origin::BottomLeft,
            grid: true,
            legend: false,
            crosshairs: Crosshairs::Off,
            bufmax: 32768,
            ymargin_fraction: 0.02,
            xdiv: 6,
            ydiv: 6,
        }
    }
}

impl PlotSettings {
    pub fn scale_settings(&self) -> ScaleSettings {
        ScaleSettings {
            autox: self.autox,
            autoy: self.autoy,
            ymin: self.ymin,
            ymax: self.ymax,
            all: self.all,
            expand: self.expand,
            autol: self.autol,
            bufmax: self.bufmax.max(1),
            ymargin_fraction: self.ymargin_fraction,
        }
    }

    /// Explicit x bounds for the sides auto-x does not own
    pub fn requested_x(&self) -> (Option<f64>, Option<f64>) {
        (
            self.xmin.filter(|_| !self.autox.has_min()),
            self.xmax.filter(|_| !self.autox.has_max()),
        )
    }
}

/// Pixel insets of the plotting area inside the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Default for Margins {
    fn default() -> Self {
        Self { left: 60, right: 16, top: 16, bottom: 36 }
    }
}

/// Construction-time options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    #[serde(flatten)]
    pub settings: PlotSettings,
    pub margins: Margins,
    pub background: Option<Color>,
    pub foreground: Option<Color>,
}

impl PlotOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn chrome(&self) -> ChromeSettings {
        let mut chrome = ChromeSettings::default();
        if let Some(background) = self.background {
            chrome.background = background;
        }
        if let Some(foreground) = self.foreground {
            chrome.foreground = foreground;
        }
        chrome.grid = self.settings.grid;
        chrome.legend = self.settings.legend;
        chrome.crosshairs = self.settings.crosshairs;
        chrome.xdiv = self.settings.xdiv;
        chrome.ydiv = self.settings.ydiv;
        chrome
    }
}

/// What a settings change requires
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeImpact {
    pub rescale: bool,
    pub retransform: bool,
    pub render: bool,
}

/// Partial settings update; absent fields stay as they are
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsChange {
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,
    #[serde(deserialize_with = "optional_auto_mode")]
    pub autox: Option<AutoMode>,
    #[serde(deserialize_with = "optional_auto_mode")]
    pub autoy: Option<AutoMode>,
    pub all: Option<bool>,
    pub expand: Option<bool>,
    pub autol: Option<i32>,
    pub cmode: Option<ComplexMode>,
    pub phunits: Option<PhaseUnits>,
    pub origin: Option<Origin>,
    pub grid: Option<bool>,
    pub legend: Option<bool>,
    pub crosshairs: Option<Crosshairs>,
    pub xdiv: Option<usize>,
    pub ydiv: Option<usize>,
}

impl SettingsChange {
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the present fields into `settings` and `chrome`
    pub fn apply(&self, settings: &mut PlotSettings, chrome: &mut ChromeSettings) -> ChangeImpact {
        let mut impact = ChangeImpact::default();

        macro_rules! set {
            ($field:ident, $flag:ident) => {
                if let Some(value) = self.$field {
                    if settings.$field != value {
                        settings.$field = value;
                        impact.$flag = true;
                    }
                }
            };
        }
        macro_rules! set_bound {
            ($field:ident) => {
                if let Some(value) = self.$field {
                    settings.$field = Some(value);
                    impact.rescale = true;
                }
            };
        }

        set_bound!(xmin);
        set_bound!(xmax);
        set_bound!(ymin);
        set_bound!(ymax);
        set!(autox, rescale);
        set!(autoy, rescale);
        set!(all, rescale);
        set!(expand, rescale);
        set!(autol, render);
        set!(cmode, retransform);
        set!(phunits, retransform);
        set!(origin, render);
        set!(grid, render);
        set!(legend, render);
        set!(crosshairs, render);
        set!(xdiv, render);
        set!(ydiv, render);

        if impact.retransform {
            impact.rescale = true;
        }
        impact.render |= impact.rescale;

        chrome.grid = settings.grid;
        chrome.legend = settings.legend;
        chrome.crosshairs = settings.crosshairs;
        chrome.xdiv = settings.xdiv;
        chrome.ydiv = settings.ydiv;
        impact
    }
}

/// Per-overlay styling and axis overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerOverrides {
    pub name: Option<String>,
    pub color: Option<Color>,
    pub line: Option<LineMode>,
    pub thick: Option<u32>,
    pub dashed: Option<bool>,
    pub symbol: Option<String>,
    pub radius: Option<u32>,
    pub xstart: Option<f64>,
    pub xdelta: Option<f64>,
    /// Row of a two-dimensional buffer
    pub row: Option<usize>,
    pub display: Option<bool>,
    pub highlight: Vec<Highlight>,
}

impl LayerOverrides {
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Apply styling and axis overrides; `row` is consumed at layer creation
    pub fn apply(&self, layer: &mut Layer) -> Result<(), ConfigurationError> {
        if let Some(symbol) = &self.symbol {
            layer.style.symbol = symbol.parse::<SymbolMode>()?;
        }
        if let Some(name) = &self.name {
            layer.name = name.clone();
        }
        if let Some(color) = self.color {
            layer.style.color = color;
        }
        if let Some(line) = self.line {
            layer.style.line = line;
        }
        if let Some(thick) = self.thick {
            layer.style.thickness = thick;
        }
        if let Some(dashed) = self.dashed {
            layer.style.dashed = dashed;
        }
        if let Some(radius) = self.radius {
            layer.style.radius = radius;
        }
        if let Some(display) = self.display {
            layer.display = display;
        }
        if self.xstart.is_some() || self.xdelta.is_some() {
            let xstart = self.xstart.unwrap_or(layer.xstart());
            let xdelta = self.xdelta.unwrap_or(layer.xdelta());
            layer.set_x_axis(xstart, xdelta);
        }
        layer.highlights.extend(self.highlight.iter().copied());
        Ok(())
    }
}

/// Accepts MIDAS bitmask codes (`0..=3`) as well as names
fn auto_mode<'de, D>(deserializer: D) -> Result<AutoMode, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Bits(u8),
        Name(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Bits(bits) => Ok(AutoMode::from_bits(bits)),
        Repr::Name(name) => name.to_ascii_lowercase().parse().map_err(serde::de::Error::custom),
    }
}

fn optional_auto_mode<'de, D>(deserializer: D) -> Result<Option<AutoMode>, D::Error>
where
    D: Deserializer<'de>,
{
    auto_mode(deserializer).map(Some)
}
