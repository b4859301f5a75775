//! JavaScript-facing plot handle.
//!
//! The shell translates DOM input into controller calls, re-emits controller
//! events as DOM `CustomEvent`s on the canvas and draws on animation frames.
//! Controller borrows never outlive one call, so page listeners may call back
//! into the plot from inside an event.

use crate::application::{
    LayerOverrides, MenuAction, PlotController, PlotOptions, RenderToken, ScrollAction, SettingsChange,
    apply_menu_action, main_menu,
};
use crate::domain::errors::{ConfigurationError, PlotError};
use crate::domain::events::{DomainEvent, MouseButton, PlotEvent};
use crate::domain::layer::{BufferAccessor, BufferHeader, SampleBuffer};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::plot::{Axis, RealPoint};
use crate::infrastructure::rendering::{CanvasSurface, FrameScheduler};
use crate::infrastructure::websocket::{CONTROL_PROTOCOL, PlotDataClient, StreamMessage, TuneCommand};
use futures::future::{AbortHandle, Abortable};
use gloo::events::{EventListener, EventListenerOptions};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt::Display;
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CustomEvent, CustomEventInit, MouseEvent, WheelEvent};

fn to_js(error: impl Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

struct PlotShell {
    controller: RefCell<PlotController>,
    surface: RefCell<CanvasSurface>,
    scheduler: FrameScheduler,
    scheduled: Cell<Option<RenderToken>>,
    outbox: Rc<RefCell<VecDeque<PlotEvent>>>,
    listeners: RefCell<Vec<EventListener>>,
    stream: RefCell<Option<AbortHandle>>,
    stream_layer: Cell<Option<usize>>,
}

impl PlotShell {
    /// Publish queued events, then make sure a pending render has a frame
    fn after_input(self: &Rc<Self>) {
        self.flush_events();
        let pending = self.controller.borrow().pending_render();
        let Some(token) = pending else { return };
        if self.scheduled.get() == Some(token) {
            return;
        }
        self.scheduled.set(Some(token));
        let weak = Rc::downgrade(self);
        self.scheduler.schedule(move |_| {
            if let Some(shell) = weak.upgrade() {
                shell.draw(token);
            }
        });
    }

    fn flush_events(&self) {
        loop {
            let next = self.outbox.borrow_mut().pop_front();
            let Some(event) = next else { break };
            if let Err(e) = self.dispatch_dom_event(&event) {
                get_logger().warn(
                    LogComponent::Presentation("XPlot"),
                    &format!("failed to dispatch {}: {:?}", event.event_type(), e),
                );
            }
        }
    }

    fn dispatch_dom_event(&self, event: &PlotEvent) -> Result<(), JsValue> {
        let json = serde_json::to_string(event).map_err(to_js)?;
        let init = CustomEventInit::new();
        init.set_detail(&js_sys::JSON::parse(&json)?);
        init.set_bubbles(true);
        let dom_event = CustomEvent::new_with_event_init_dict(event.event_type(), &init)?;
        // listeners may call back into the plot; hold no borrow while dispatching
        let canvas = self.surface.borrow().canvas().clone();
        canvas.dispatch_event(&dom_event)?;
        Ok(())
    }

    fn draw(&self, token: RenderToken) {
        self.scheduled.set(None);
        let Ok(mut controller) = self.controller.try_borrow_mut() else {
            return;
        };
        if !controller.take_render(token) {
            return;
        }
        let mut surface = self.surface.borrow_mut();
        let stats = controller.render(&mut *surface);
        if !stats.skipped_layers.is_empty() {
            get_logger().debug(
                LogComponent::Presentation("XPlot"),
                &format!("frame skipped layers {:?}", stats.skipped_layers),
            );
        }
    }

    fn on_stream_message(self: &Rc<Self>, message: StreamMessage) {
        let result = {
            let mut controller = self.controller.borrow_mut();
            match message {
                StreamMessage::Samples(buffer) => {
                    let buffer: Rc<dyn BufferAccessor> = Rc::new(buffer);
                    match self.stream_layer.get() {
                        Some(index) if index < controller.layers().len() => controller.reload(index, buffer),
                        _ => {
                            let overrides = LayerOverrides { name: Some("stream".into()), ..Default::default() };
                            controller.overlay(buffer, &overrides).map(|index| self.stream_layer.set(Some(index)))
                        }
                    }
                }
                StreamMessage::Header(update) => match self.stream_layer.get() {
                    Some(index) => controller.apply_header_override(index, &update),
                    None => Ok(()),
                },
            }
        };
        if let Err(e) = result {
            get_logger().warn(LogComponent::Presentation("XPlot"), &format!("stream update dropped: {}", e));
        }
        self.after_input();
    }

    fn attach_listeners(self: &Rc<Self>) {
        let canvas = self.surface.borrow().canvas().clone();
        let mut listeners = Vec::new();

        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&canvas, "mousemove", move |event| {
            with_mouse(&weak, event, |plot, x, y, _| plot.mouse_move(x, y));
        }));
        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&canvas, "mousedown", move |event| {
            with_mouse(&weak, event, |plot, x, y, button| {
                if let Some(button) = button {
                    plot.mouse_down(x, y, button);
                }
            });
        }));
        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&canvas, "mouseup", move |event| {
            with_mouse(&weak, event, |plot, x, y, button| {
                if let Some(button) = button {
                    plot.mouse_up(x, y, button);
                }
            });
        }));
        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new(&canvas, "mouseleave", move |_| {
            if let Some(shell) = weak.upgrade() {
                shell.controller.borrow_mut().mouse_leave();
                shell.after_input();
            }
        }));
        listeners.push(EventListener::new_with_options(
            &canvas,
            "contextmenu",
            EventListenerOptions::enable_prevent_default(),
            |event| event.prevent_default(),
        ));
        let weak = Rc::downgrade(self);
        listeners.push(EventListener::new_with_options(
            &canvas,
            "wheel",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(wheel) = event.dyn_ref::<WheelEvent>() else { return };
                event.prevent_default();
                if let Some(shell) = weak.upgrade() {
                    shell.controller.borrow_mut().wheel(wheel.delta_y());
                    shell.after_input();
                }
            },
        ));

        *self.listeners.borrow_mut() = listeners;
    }
}

fn with_mouse<F>(weak: &Weak<PlotShell>, event: &web_sys::Event, action: F)
where
    F: FnOnce(&mut PlotController, i32, i32, Option<MouseButton>),
{
    let Some(mouse) = event.dyn_ref::<MouseEvent>() else { return };
    let Some(shell) = weak.upgrade() else { return };
    action(
        &mut shell.controller.borrow_mut(),
        mouse.offset_x(),
        mouse.offset_y(),
        MouseButton::from_dom(mouse.button()),
    );
    shell.after_input();
}

/// Plot handle exported to JavaScript
#[wasm_bindgen]
pub struct XPlot {
    inner: Rc<PlotShell>,
}

impl XPlot {
    fn with_controller<T>(&self, action: impl FnOnce(&mut PlotController) -> T) -> T {
        let result = action(&mut self.inner.controller.borrow_mut());
        self.inner.after_input();
        result
    }
}

#[wasm_bindgen]
impl XPlot {
    /// Attach a plot to the canvas with id `canvas_id`. `options` is JSON.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, options: Option<String>) -> Result<XPlot, JsValue> {
        let surface = CanvasSurface::from_id(canvas_id).map_err(|e| to_js(PlotError::from(e)))?;
        let options = PlotOptions::from_json(options.as_deref().unwrap_or("")).map_err(to_js)?;
        let (width, height) = (surface.canvas().width(), surface.canvas().height());
        let mut controller = PlotController::new(width, height, options).map_err(to_js)?;

        let outbox = Rc::new(RefCell::new(VecDeque::new()));
        let queue = outbox.clone();
        controller.subscribe(move |event| queue.borrow_mut().push_back(event.clone()));
        controller.request_render();

        let inner = Rc::new(PlotShell {
            controller: RefCell::new(controller),
            surface: RefCell::new(surface),
            scheduler: FrameScheduler::new(),
            scheduled: Cell::new(None),
            outbox,
            listeners: RefCell::new(Vec::new()),
            stream: RefCell::new(None),
            stream_layer: Cell::new(None),
        });
        inner.attach_listeners();
        inner.after_input();

        get_logger().info(LogComponent::Presentation("XPlot"), &format!("attached to #{}", canvas_id));
        Ok(XPlot { inner })
    }

    /// Overlay `f64` samples. `overrides` is optional layer JSON.
    #[wasm_bindgen(js_name = overlayArray)]
    pub fn overlay_array(
        &self,
        samples: Vec<f64>,
        xstart: f64,
        xdelta: f64,
        overrides: Option<String>,
    ) -> Result<usize, JsValue> {
        let overrides = LayerOverrides::from_json(overrides.as_deref().unwrap_or("")).map_err(to_js)?;
        let buffer: Rc<dyn BufferAccessor> = Rc::new(SampleBuffer::from_f64(&samples, xstart, xdelta));
        self.with_controller(|plot| plot.overlay(buffer, &overrides)).map_err(to_js)
    }

    /// Overlay raw bytes described by a JSON `BufferHeader`
    #[wasm_bindgen(js_name = overlayBytes)]
    pub fn overlay_bytes(&self, bytes: Vec<u8>, header: &str, overrides: Option<String>) -> Result<usize, JsValue> {
        let buffer = decode_bytes(bytes, header).map_err(to_js)?;
        let overrides = LayerOverrides::from_json(overrides.as_deref().unwrap_or("")).map_err(to_js)?;
        self.with_controller(|plot| plot.overlay(buffer, &overrides)).map_err(to_js)
    }

    #[wasm_bindgen(js_name = removeLayer)]
    pub fn remove_layer(&self, index: usize) -> Result<(), JsValue> {
        self.with_controller(|plot| plot.remove_layer(index)).map_err(to_js)
    }

    /// Replace a layer's samples and emit `reread`
    pub fn reload(&self, index: usize, samples: Vec<f64>, xstart: f64, xdelta: f64) -> Result<(), JsValue> {
        let buffer: Rc<dyn BufferAccessor> = Rc::new(SampleBuffer::from_f64(&samples, xstart, xdelta));
        self.with_controller(|plot| plot.reload(index, buffer)).map_err(to_js)
    }

    #[wasm_bindgen(js_name = reloadBytes)]
    pub fn reload_bytes(&self, index: usize, bytes: Vec<u8>, header: &str) -> Result<(), JsValue> {
        let buffer = decode_bytes(bytes, header).map_err(to_js)?;
        self.with_controller(|plot| plot.reload(index, buffer)).map_err(to_js)
    }

    /// Zoom to two real-world corners. Returns `false` at maximum depth.
    pub fn zoom(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<bool, JsValue> {
        self.with_controller(|plot| plot.zoom(RealPoint::new(x1, y1), RealPoint::new(x2, y2)))
            .map_err(to_js)
    }

    pub fn unzoom(&self, levels: Option<usize>) -> usize {
        self.with_controller(|plot| plot.unzoom(levels.unwrap_or(1)))
    }

    #[wasm_bindgen(js_name = unzoomAll)]
    pub fn unzoom_all(&self) -> usize {
        self.with_controller(|plot| plot.unzoom_all())
    }

    /// Pan along `"x"` or `"y"` by a real-world delta
    pub fn pan(&self, axis: &str, delta: f64) -> Result<bool, JsValue> {
        let axis: Axis = axis
            .parse()
            .map_err(|_| to_js(ConfigurationError::MalformedOverride(format!("unknown axis '{}'", axis))))?;
        Ok(self.with_controller(|plot| plot.pan(axis, delta)))
    }

    /// Apply a scrollbar action given as JSON, e.g. `{ "action": "page_inc" }`
    pub fn scroll(&self, axis: &str, action: &str) -> Result<bool, JsValue> {
        let axis: Axis = axis
            .parse()
            .map_err(|_| to_js(ConfigurationError::MalformedOverride(format!("unknown axis '{}'", axis))))?;
        let action: ScrollAction = serde_json::from_str(action).map_err(to_js)?;
        Ok(self.with_controller(|plot| plot.scroll(axis, action)))
    }

    #[wasm_bindgen(js_name = changeSettings)]
    pub fn change_settings(&self, change: &str) -> Result<(), JsValue> {
        let change = SettingsChange::from_json(change).map_err(to_js)?;
        self.with_controller(|plot| plot.change_settings(&change));
        Ok(())
    }

    pub fn rescale(&self) {
        self.with_controller(|plot| {
            plot.rescale();
            plot.request_render();
        });
    }

    pub fn resize(&self, width: u32, height: u32) -> Result<(), JsValue> {
        self.inner.surface.borrow_mut().resize(width, height);
        self.with_controller(|plot| plot.resize(width, height)).map_err(to_js)
    }

    /// Current menu tree as JSON
    pub fn menu(&self) -> Result<String, JsValue> {
        let controller = self.inner.controller.borrow();
        serde_json::to_string(&main_menu(controller.settings(), controller.layers())).map_err(to_js)
    }

    #[wasm_bindgen(js_name = selectMenu)]
    pub fn select_menu(&self, action: &str) -> Result<(), JsValue> {
        let action: MenuAction = serde_json::from_str(action).map_err(to_js)?;
        self.with_controller(|plot| apply_menu_action(plot, action)).map_err(to_js)
    }

    pub fn depth(&self) -> usize {
        self.inner.controller.borrow().stack().depth()
    }

    #[wasm_bindgen(js_name = panRange)]
    pub fn pan_range(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.controller.borrow().pan_range()).map_err(to_js)
    }

    /// Stream a websocket plot-data feed into a layer named `stream`
    #[wasm_bindgen(js_name = connectStream)]
    pub fn connect_stream(&self, url: &str) {
        self.disconnect_stream();
        let (handle, registration) = AbortHandle::new_pair();
        *self.inner.stream.borrow_mut() = Some(handle);

        let weak = Rc::downgrade(&self.inner);
        let url = url.to_string();
        let receive = async move {
            let mut client = PlotDataClient::new(&url);
            client
                .run(
                    move |message| {
                        if let Some(shell) = weak.upgrade() {
                            shell.on_stream_message(message);
                        }
                    },
                    |_| {},
                )
                .await;
        };
        spawn_local(async move {
            if Abortable::new(receive, registration).await.is_err() {
                get_logger().info(LogComponent::Presentation("XPlot"), "stream stopped");
            }
        });
    }

    #[wasm_bindgen(js_name = disconnectStream)]
    pub fn disconnect_stream(&self) {
        if let Some(handle) = self.inner.stream.borrow_mut().take() {
            handle.abort();
        }
    }

    /// Send a tuning request on the control channel at `url`
    pub fn tune(&self, url: &str, frequency_hz: u32) -> Result<(), JsValue> {
        use futures::SinkExt;
        use gloo_net::websocket::{Message, futures::WebSocket};

        let command = serde_json::to_string(&TuneCommand { frequency_hz }).map_err(to_js)?;
        let mut socket = WebSocket::open_with_protocol(url, CONTROL_PROTOCOL).map_err(|e| to_js(format!("{e:?}")))?;
        spawn_local(async move {
            if let Err(e) = socket.send(Message::Text(command)).await {
                get_logger().error(LogComponent::Presentation("XPlot"), &format!("tune failed: {e:?}"));
            }
        });
        Ok(())
    }

    /// Emit `xplotexit`, stop streaming and detach every listener
    pub fn destroy(&self) {
        self.with_controller(|plot| plot.exit());
        self.disconnect_stream();
        self.inner.scheduler.cancel();
        self.inner.listeners.borrow_mut().clear();
    }
}

fn decode_bytes(bytes: Vec<u8>, header: &str) -> Result<Rc<dyn BufferAccessor>, PlotError> {
    let header: BufferHeader = serde_json::from_str(header).map_err(ConfigurationError::from)?;
    Ok(Rc::new(SampleBuffer::new(header, bytes)?))
}
