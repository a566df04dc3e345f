//! WebAssembly bindings for the table controller.
//!
//! A browser frontend owns the timers and the HTTP calls; it forwards every
//! input here and executes the JSON commands it gets back.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use crate::card::Color;
#[cfg(feature = "wasm")]
use crate::rules::StackChoice;
#[cfg(feature = "wasm")]
use crate::session::{Command, Controller, Request, ServiceError};
#[cfg(feature = "wasm")]
use crate::snapshot::GameSnapshot;
#[cfg(feature = "wasm")]
use crate::timers::Ticket;

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[cfg(feature = "wasm")]
fn commands_json(commands: Vec<Command>) -> String {
    serde_json::to_string(&commands).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(feature = "wasm")]
fn parse<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

/// WASM-exposed controller wrapper
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct WasmController {
    controller: Controller,
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl WasmController {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmController {
        WasmController {
            controller: Controller::default(),
        }
    }

    /// Current view as JSON
    #[wasm_bindgen(js_name = getView)]
    pub fn get_view(&self) -> String {
        serde_json::to_string(&self.controller.view()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn start(&mut self) -> String {
        commands_json(self.controller.start())
    }

    pub fn refresh(&mut self) -> String {
        commands_json(self.controller.refresh())
    }

    pub fn click(&mut self, index: usize) -> String {
        commands_json(self.controller.click(index))
    }

    /// `all` submits the whole stacked group, otherwise just the clicked card
    #[wasm_bindgen(js_name = chooseStack)]
    pub fn choose_stack(&mut self, all: bool) -> String {
        let choice = if all {
            StackChoice::All
        } else {
            StackChoice::ClickedOnly
        };
        commands_json(self.controller.choose_stack(choice))
    }

    #[wasm_bindgen(js_name = chooseColor)]
    pub fn choose_color(&mut self, color: &str) -> Result<String, JsValue> {
        let color = Color::parse(color)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown color: {}", color)))?;
        Ok(commands_json(self.controller.choose_color(color)))
    }

    #[wasm_bindgen(js_name = cancelSelection)]
    pub fn cancel_selection(&mut self) {
        self.controller.cancel_selection();
    }

    pub fn draw(&mut self) -> String {
        commands_json(self.controller.draw())
    }

    pub fn declare(&mut self) -> String {
        commands_json(self.controller.declare())
    }

    /// Feed a successful service reply
    #[wasm_bindgen(js_name = onSnapshot)]
    pub fn on_snapshot(&mut self, request_json: &str, snapshot_json: &str) -> Result<String, JsValue> {
        let request: Request = parse(request_json, "request")?;
        let result = serde_json::from_str::<GameSnapshot>(snapshot_json)
            .map_err(|e| ServiceError::Decode(e.to_string()));
        Ok(commands_json(self.controller.on_reply(request, result)))
    }

    /// Feed a failed service reply; `reason` is the service's message, if any
    #[wasm_bindgen(js_name = onFailure)]
    pub fn on_failure(&mut self, request_json: &str, reason: Option<String>) -> Result<String, JsValue> {
        let request: Request = parse(request_json, "request")?;
        let err = ServiceError::Rejected { reason };
        Ok(commands_json(self.controller.on_reply(request, Err(err))))
    }

    /// A timer scheduled by an earlier command fired
    #[wasm_bindgen(js_name = onTimer)]
    pub fn on_timer(&mut self, ticket_json: &str) -> Result<String, JsValue> {
        let ticket: Ticket = parse(ticket_json, "ticket")?;
        Ok(commands_json(self.controller.on_timer(ticket)))
    }
}

#[cfg(feature = "wasm")]
impl Default for WasmController {
    fn default() -> Self {
        Self::new()
    }
}
