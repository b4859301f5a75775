use std::rc::Rc;

use insta::assert_json_snapshot;
use xplot_wasm::application::{
    LayerOverrides, MenuAction, MenuEntry, MenuItem, PlotController, PlotOptions, apply_menu_action, main_menu,
};
use xplot_wasm::domain::layer::SampleBuffer;
use xplot_wasm::domain::plot::AutoMode;

fn plot() -> PlotController {
    let mut plot = PlotController::new(400, 300, PlotOptions::default()).unwrap();
    let buffer = SampleBuffer::from_f64(&[1.0, 2.0, 3.0], 0.0, 1.0).with_name("ramp");
    plot.overlay(Rc::new(buffer), &LayerOverrides::default()).unwrap();
    plot
}

#[test]
fn top_level_labels() {
    let plot = plot();
    let menu = main_menu(plot.settings(), plot.layers());
    let labels: Vec<&str> = menu.iter().map(|i| i.label.as_str()).collect();
    assert_json_snapshot!(labels, @r###"
    [
      "Refresh",
      "Unzoom",
      "Unzoom all",
      "Complex mode",
      "Phase units",
      "Scaling",
      "Grid",
      "Legend",
      "Crosshairs",
      "Origin",
      "Layers",
      "Exit"
    ]
    "###);
}

#[test]
fn layer_submenu() {
    let plot = plot();
    let menu = main_menu(plot.settings(), plot.layers());
    let layer = MenuItem::find(&menu, &["Layers", "ramp"]).unwrap();
    assert_json_snapshot!(layer, @r###"
    {
      "label": "ramp",
      "entry": {
        "submenu": [
          {
            "label": "Display",
            "entry": {
              "checkbox": {
                "checked": true,
                "action": {
                  "action": "toggle_layer",
                  "value": 0
                }
              }
            }
          },
          {
            "label": "Remove",
            "entry": {
              "action": {
                "action": "remove_layer",
                "value": 0
              }
            }
          }
        ]
      }
    }
    "###);
}

#[test]
fn scaling_checkboxes_follow_settings() {
    let mut plot = plot();
    apply_menu_action(&mut plot, MenuAction::ToggleAll).unwrap();
    apply_menu_action(&mut plot, MenuAction::SetAutoX(AutoMode::Off)).unwrap();
    let menu = main_menu(plot.settings(), plot.layers());
    let scaling = MenuItem::find(&menu, &["Scaling"]).unwrap();
    let checked: Vec<(&str, bool)> = match &scaling.entry {
        MenuEntry::Submenu(items) => items
            .iter()
            .map(|i| match i.entry {
                MenuEntry::Checkbox { checked, .. } => (i.label.as_str(), checked),
                _ => (i.label.as_str(), false),
            })
            .collect(),
        _ => Vec::new(),
    };
    assert_json_snapshot!(checked, @r###"
    [
      [
        "Auto X",
        false
      ],
      [
        "Auto Y",
        true
      ],
      [
        "Show all",
        true
      ],
      [
        "Expand",
        false
      ]
    ]
    "###);
}
