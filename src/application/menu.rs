//! Declarative main menu. The tree is plain data built from the current
//! settings; selecting an entry hands its `MenuAction` back to
//! [`apply_menu_action`].

use super::controller::PlotController;
use super::settings::{PlotSettings, SettingsChange};
use crate::domain::errors::PlotResult;
use crate::domain::layer::{ComplexMode, Layer, PhaseUnits};
use crate::domain::plot::{AutoMode, Crosshairs, Origin};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

static COMPLEX_MODES: Lazy<Vec<ComplexMode>> = Lazy::new(|| ComplexMode::iter().collect());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum MenuAction {
    Refresh,
    Unzoom,
    UnzoomAll,
    SetComplexMode(ComplexMode),
    SetPhaseUnits(PhaseUnits),
    SetAutoX(AutoMode),
    SetAutoY(AutoMode),
    ToggleAll,
    ToggleExpand,
    ToggleGrid,
    ToggleLegend,
    SetCrosshairs(Crosshairs),
    SetOrigin(Origin),
    ToggleLayer(usize),
    RemoveLayer(usize),
    Exit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuEntry {
    Action(MenuAction),
    Submenu(Vec<MenuItem>),
    Checkbox { checked: bool, action: MenuAction },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub label: String,
    pub entry: MenuEntry,
}

impl MenuItem {
    pub fn action(label: &str, action: MenuAction) -> Self {
        Self { label: label.to_string(), entry: MenuEntry::Action(action) }
    }

    pub fn submenu(label: &str, items: Vec<MenuItem>) -> Self {
        Self { label: label.to_string(), entry: MenuEntry::Submenu(items) }
    }

    pub fn checkbox(label: &str, checked: bool, action: MenuAction) -> Self {
        Self { label: label.to_string(), entry: MenuEntry::Checkbox { checked, action } }
    }

    /// Depth-first search by label path, e.g. `["Scaling", "Expand"]`
    pub fn find<'a>(items: &'a [MenuItem], path: &[&str]) -> Option<&'a MenuItem> {
        let (first, rest) = path.split_first()?;
        let item = items.iter().find(|i| i.label == *first)?;
        match (&item.entry, rest.is_empty()) {
            (_, true) => Some(item),
            (MenuEntry::Submenu(children), false) => MenuItem::find(children, rest),
            _ => None,
        }
    }
}

fn toggled(mode: AutoMode) -> AutoMode {
    if mode.is_off() { AutoMode::Both } else { AutoMode::Off }
}

pub fn main_menu(settings: &PlotSettings, layers: &[Layer]) -> Vec<MenuItem> {
    let complex = COMPLEX_MODES
        .iter()
        .map(|&m| MenuItem::checkbox(m.label(), settings.cmode == m, MenuAction::SetComplexMode(m)))
        .collect();
    let phase = [("Radians", PhaseUnits::Radians), ("Degrees", PhaseUnits::Degrees), ("Cycles", PhaseUnits::Cycles)]
        .into_iter()
        .map(|(label, u)| MenuItem::checkbox(label, settings.phunits == u, MenuAction::SetPhaseUnits(u)))
        .collect();
    let scaling = vec![
        MenuItem::checkbox("Auto X", !settings.autox.is_off(), MenuAction::SetAutoX(toggled(settings.autox))),
        MenuItem::checkbox("Auto Y", !settings.autoy.is_off(), MenuAction::SetAutoY(toggled(settings.autoy))),
        MenuItem::checkbox("Show all", settings.all, MenuAction::ToggleAll),
        MenuItem::checkbox("Expand", settings.expand, MenuAction::ToggleExpand),
    ];
    let crosshairs = Crosshairs::iter()
        .map(|c| MenuItem::checkbox(c.as_ref(), settings.crosshairs == c, MenuAction::SetCrosshairs(c)))
        .collect();
    let origins = Origin::iter()
        .map(|o| MenuItem::checkbox(&o.code().to_string(), settings.origin == o, MenuAction::SetOrigin(o)))
        .collect();
    let layer_items = layers
        .iter()
        .map(|layer| {
            MenuItem::submenu(
                &layer.name,
                vec![
                    MenuItem::checkbox("Display", layer.display, MenuAction::ToggleLayer(layer.index)),
                    MenuItem::action("Remove", MenuAction::RemoveLayer(layer.index)),
                ],
            )
        })
        .collect();

    vec![
        MenuItem::action("Refresh", MenuAction::Refresh),
        MenuItem::action("Unzoom", MenuAction::Unzoom),
        MenuItem::action("Unzoom all", MenuAction::UnzoomAll),
        MenuItem::submenu("Complex mode", complex),
        MenuItem::submenu("Phase units", phase),
        MenuItem::submenu("Scaling", scaling),
        MenuItem::checkbox("Grid", settings.grid, MenuAction::ToggleGrid),
        MenuItem::checkbox("Legend", settings.legend, MenuAction::ToggleLegend),
        MenuItem::submenu("Crosshairs", crosshairs),
        MenuItem::submenu("Origin", origins),
        MenuItem::submenu("Layers", layer_items),
        MenuItem::action("Exit", MenuAction::Exit),
    ]
}

/// Execute a selected menu action on the controller
pub fn apply_menu_action(plot: &mut PlotController, action: MenuAction) -> PlotResult<()> {
    crate::log_debug!(crate::domain::logging::LogComponent::Application("Menu"), "selected {:?}", action);
    let settings = plot.settings().clone();
    let change = match action {
        MenuAction::Refresh => {
            plot.rescale();
            plot.request_render();
            return Ok(());
        }
        MenuAction::Unzoom => {
            plot.unzoom(1);
            return Ok(());
        }
        MenuAction::UnzoomAll => {
            plot.unzoom_all();
            return Ok(());
        }
        MenuAction::ToggleLayer(index) => {
            let display = plot.layers().get(index).map(|l| !l.display).unwrap_or(true);
            return plot.set_layer_display(index, display);
        }
        MenuAction::RemoveLayer(index) => return plot.remove_layer(index),
        MenuAction::Exit => {
            plot.exit();
            return Ok(());
        }
        MenuAction::SetComplexMode(mode) => SettingsChange { cmode: Some(mode), ..Default::default() },
        MenuAction::SetPhaseUnits(units) => SettingsChange { phunits: Some(units), ..Default::default() },
        MenuAction::SetAutoX(mode) => SettingsChange { autox: Some(mode), ..Default::default() },
        MenuAction::SetAutoY(mode) => SettingsChange { autoy: Some(mode), ..Default::default() },
        MenuAction::ToggleAll => SettingsChange { all: Some(!settings.all), ..Default::default() },
        MenuAction::ToggleExpand => SettingsChange { expand: Some(!settings.expand), ..Default::default() },
        MenuAction::ToggleGrid => SettingsChange { grid: Some(!settings.grid), ..Default::default() },
        MenuAction::ToggleLegend => SettingsChange { legend: Some(!settings.legend), ..Default::default() },
        MenuAction::SetCrosshairs(c) => SettingsChange { crosshairs: Some(c), ..Default::default() },
        MenuAction::SetOrigin(o) => SettingsChange { origin: Some(o), ..Default::default() },
    };
    plot.change_settings(&change);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::settings::PlotOptions;

    #[test]
    fn checkboxes_reflect_settings() {
        let settings = PlotSettings { grid: false, cmode: ComplexMode::Phase, ..PlotSettings::default() };
        let menu = main_menu(&settings, &[]);
        let grid = MenuItem::find(&menu, &["Grid"]).unwrap();
        assert_eq!(grid.entry, MenuEntry::Checkbox { checked: false, action: MenuAction::ToggleGrid });
        let phase = MenuItem::find(&menu, &["Complex mode", "Phase"]).unwrap();
        assert!(matches!(phase.entry, MenuEntry::Checkbox { checked: true, .. }));
        assert!(MenuItem::find(&menu, &["Grid", "nothing"]).is_none());
    }

    #[test]
    fn actions_change_settings() {
        let mut plot = PlotController::new(200, 100, PlotOptions::default()).unwrap();
        apply_menu_action(&mut plot, MenuAction::ToggleGrid).unwrap();
        assert!(!plot.settings().grid);
        apply_menu_action(&mut plot, MenuAction::SetAutoY(AutoMode::Off)).unwrap();
        assert!(plot.settings().autoy.is_off());
        assert!(apply_menu_action(&mut plot, MenuAction::RemoveLayer(0)).is_err());
    }

    #[test]
    fn action_json_shape() {
        let json = serde_json::to_string(&MenuAction::SetComplexMode(ComplexMode::Log20)).unwrap();
        assert_eq!(json, r#"{"action":"set_complex_mode","value":"L2"}"#);
        let back: MenuAction = serde_json::from_str(r#"{"action":"unzoom_all"}"#).unwrap();
        assert_eq!(back, MenuAction::UnzoomAll);
    }
}
