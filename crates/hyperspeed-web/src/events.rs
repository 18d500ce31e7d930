use hyperspeed_core::EngineEvent;
use js_sys::{Object, Reflect};
use wasm_bindgen::JsValue;

/// `{ type, intent?, message? }` for the page's event callback.
pub fn to_js(event: &EngineEvent) -> JsValue {
    let obj = Object::new();
    let _ = Reflect::set(&obj, &"type".into(), &event.kind().into());
    match event {
        EngineEvent::IntentChanged(intent) => {
            let _ = Reflect::set(&obj, &"intent".into(), &intent.name().into());
        }
        EngineEvent::Unavailable(message) => {
            let _ = Reflect::set(&obj, &"message".into(), &message.as_str().into());
        }
        _ => {}
    }
    obj.into()
}
