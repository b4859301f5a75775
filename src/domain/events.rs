use serde::Serialize;
use std::fmt::Debug;
use strum::AsRefStr;

/// Base trait for all domain events
pub trait DomainEvent: Debug + Clone {
    fn event_type(&self) -> &str;
    fn timestamp(&self) -> u64 {
        use crate::domain::logging::get_time_provider;
        get_time_provider().current_timestamp()
    }
}

/// Pointer buttons as reported by the input shell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// DOM `MouseEvent.button` numbering
    pub fn from_dom(button: i16) -> Option<Self> {
        match button {
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Middle),
            2 => Some(MouseButton::Right),
            _ => None,
        }
    }
}

/// Events emitted by a plot to its embedding application.
///
/// Names follow the DOM event names the page listens for; coordinates are
/// real-world unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, AsRefStr)]
#[serde(tag = "type")]
pub enum PlotEvent {
    #[strum(serialize = "mmove")]
    #[serde(rename = "mmove")]
    MouseMove { x: f64, y: f64 },
    #[strum(serialize = "mdown")]
    #[serde(rename = "mdown")]
    MouseDown { x: f64, y: f64, button: MouseButton },
    #[strum(serialize = "mup")]
    #[serde(rename = "mup")]
    MouseUp { x: f64, y: f64, button: MouseButton },
    #[strum(serialize = "mtag")]
    #[serde(rename = "mtag")]
    Tag { x: f64, y: f64, w: f64, h: f64 },
    #[strum(serialize = "file_overlayed")]
    #[serde(rename = "file_overlayed")]
    FileOverlayed { name: String, index: usize },
    #[strum(serialize = "file_deoverlayed")]
    #[serde(rename = "file_deoverlayed")]
    FileDeoverlayed { name: String, index: usize },
    #[strum(serialize = "reread")]
    #[serde(rename = "reread")]
    Reread { index: usize },
    #[strum(serialize = "xplotexit")]
    #[serde(rename = "xplotexit")]
    Exit,
    /// Pixel position where the menu should open
    #[strum(serialize = "showmenu")]
    #[serde(rename = "showmenu")]
    ShowMenu { px: i32, py: i32 },
}

impl DomainEvent for PlotEvent {
    fn event_type(&self) -> &str {
        self.as_ref()
    }
}

/// Event dispatcher for publishing events
pub trait EventDispatcher {
    fn publish_plot_event(&self, event: PlotEvent);
}

/// Simple in-memory event dispatcher
#[derive(Default)]
pub struct InMemoryEventDispatcher {
    plot_handlers: Vec<Box<dyn Fn(&PlotEvent)>>,
}

impl InMemoryEventDispatcher {
    pub fn new() -> Self {
        Self { plot_handlers: Vec::new() }
    }

    pub fn subscribe_to_plot_events<F>(&mut self, handler: F)
    where
        F: Fn(&PlotEvent) + 'static,
    {
        self.plot_handlers.push(Box::new(handler));
    }

    pub fn handler_count(&self) -> usize {
        self.plot_handlers.len()
    }
}

impl EventDispatcher for InMemoryEventDispatcher {
    fn publish_plot_event(&self, event: PlotEvent) {
        for handler in &self.plot_handlers {
            handler(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn event_names_match_dom_names() {
        assert_eq!(PlotEvent::Exit.event_type(), "xplotexit");
        let overlay = PlotEvent::FileOverlayed { name: "a".into(), index: 0 };
        assert_eq!(overlay.event_type(), "file_overlayed");
    }

    #[test]
    fn dispatcher_fans_out() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = InMemoryEventDispatcher::new();
        let s1 = seen.clone();
        dispatcher.subscribe_to_plot_events(move |e| s1.borrow_mut().push(e.event_type().to_string()));
        let s2 = seen.clone();
        dispatcher.subscribe_to_plot_events(move |e| s2.borrow_mut().push(e.event_type().to_string()));
        dispatcher.publish_plot_event(PlotEvent::Reread { index: 1 });
        assert_eq!(*seen.borrow(), vec!["reread", "reread"]);
    }

    #[test]
    fn serialized_event_is_tagged() {
        let json = serde_json::to_value(PlotEvent::Tag { x: 1.0, y: 2.0, w: 0.0, h: 0.0 }).unwrap();
        assert_eq!(json["type"], "mtag");
        assert_eq!(json["x"], 1.0);
    }
}
