//! Browser binding: drives a Leaflet map from the host app's state events.
//!
//! The host app object is expected to expose `config`, `on(event, fn)`,
//! `getParameter(name) -> Promise`, `setNonInteractive(bool)`, `interactive`
//! and `updateLink()`. The global `L` must be Leaflet.

use std::rc::Rc;

use console_error_panic_hook::set_once;
use foundation::{LatLng, LatLngBounds};
use js_sys::{Array, Function, Object, Promise, Reflect};
use mapstate::{
    AppState, Host, HostConfig, MapModule, MapWidget, ParameterError, Synchronizer, ViewOptions,
};
use runtime::InteractivityFlag;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

fn get(target: &JsValue, key: &str) -> Result<JsValue, JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
}

fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(key), value).map(|_| ())
}

fn call(target: &JsValue, method: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
    let f: Function = get(target, method)?.dyn_into()?;
    let argv = Array::new();
    for a in args {
        argv.push(a);
    }
    Reflect::apply(&f, target, &argv)
}

fn js_to_json(value: &JsValue) -> Result<Value, String> {
    let text: String = js_sys::JSON::stringify(value)
        .map_err(|e| describe(&e))?
        .into();
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

fn json_to_js(value: &Value) -> Result<JsValue, JsValue> {
    let text = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&text)
}

fn lat_lng_to_js(p: LatLng) -> Result<JsValue, JsValue> {
    let obj = Object::new();
    set(&obj, "lat", &JsValue::from_f64(p.lat))?;
    set(&obj, "lng", &JsValue::from_f64(p.lng))?;
    Ok(obj.into())
}

fn options_to_js(options: &ViewOptions) -> Result<JsValue, JsValue> {
    let value = serde_json::to_value(options).map_err(|e| JsValue::from_str(&e.to_string()))?;
    json_to_js(&value)
}

/// [`MapWidget`] over a Leaflet `L.Map`.
pub struct LeafletMap {
    map: JsValue,
}

impl LeafletMap {
    /// Creates `L.map(container_id, { maxZoom })`.
    pub fn create(container_id: &str, max_zoom: Option<f64>) -> Result<Self, JsValue> {
        let global: JsValue = js_sys::global().into();
        let leaflet = get(&global, "L")?;
        let opts = Object::new();
        if let Some(z) = max_zoom {
            set(&opts, "maxZoom", &JsValue::from_f64(z))?;
        }
        let map = call(&leaflet, "map", &[JsValue::from_str(container_id), opts.into()])?;
        Ok(Self { map })
    }

    pub fn handle(&self) -> &JsValue {
        &self.map
    }

    fn move_to(&self, method: &str, center: LatLng, zoom: f64, options: &ViewOptions) {
        let result = lat_lng_to_js(center).and_then(|c| {
            call(
                &self.map,
                method,
                &[c, JsValue::from_f64(zoom), options_to_js(options)?],
            )
        });
        if let Err(err) = result {
            log(&format!("map.{method} failed: {}", describe(&err)));
        }
    }
}

impl MapWidget for LeafletMap {
    fn set_view(&self, center: LatLng, zoom: f64, options: &ViewOptions) {
        self.move_to("setView", center, zoom, options);
    }

    fn fly_to(&self, center: LatLng, zoom: f64, options: &ViewOptions) {
        self.move_to("flyTo", center, zoom, options);
    }

    fn fit_bounds(&self, bounds: LatLngBounds, options: &ViewOptions) {
        let (Some(sw), Some(ne)) = (bounds.south_west(), bounds.north_east()) else {
            return;
        };
        let corners = Array::of2(
            &Array::of2(&JsValue::from_f64(sw.lat), &JsValue::from_f64(sw.lng)),
            &Array::of2(&JsValue::from_f64(ne.lat), &JsValue::from_f64(ne.lng)),
        );
        let result = options_to_js(options)
            .and_then(|opts| call(&self.map, "fitBounds", &[corners.into(), opts]));
        if let Err(err) = result {
            log(&format!("map.fitBounds failed: {}", describe(&err)));
        }
    }

    fn zoom(&self) -> Option<f64> {
        call(&self.map, "getZoom", &[]).ok()?.as_f64()
    }

    fn center(&self) -> LatLng {
        let read = || -> Result<LatLng, JsValue> {
            let c = call(&self.map, "getCenter", &[])?;
            let lat = get(&c, "lat")?.as_f64().unwrap_or(0.0);
            let lng = get(&c, "lng")?.as_f64().unwrap_or(0.0);
            Ok(LatLng::new(lat, lng))
        };
        read().unwrap_or(LatLng::ORIGIN)
    }

    fn set_attribution_prefix(&self, html: &str) {
        let result = get(&self.map, "attributionControl")
            .and_then(|ctl| call(&ctl, "setPrefix", &[JsValue::from_str(html)]));
        if let Err(err) = result {
            log(&format!("attribution prefix not set: {}", describe(&err)));
        }
    }
}

/// [`Host`] over the JS app object.
pub struct JsHost {
    app: JsValue,
}

impl JsHost {
    pub fn new(app: JsValue) -> Self {
        Self { app }
    }
}

impl InteractivityFlag for JsHost {
    fn set_non_interactive(&self, value: bool) {
        if let Err(err) = call(&self.app, "setNonInteractive", &[JsValue::from_bool(value)]) {
            log(&format!("setNonInteractive failed: {}", describe(&err)));
        }
    }

    fn is_interactive(&self) -> bool {
        get(&self.app, "interactive")
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }
}

impl Host for JsHost {
    async fn get_parameter(&self, name: &str) -> Result<Value, ParameterError> {
        let pending = call(&self.app, "getParameter", &[JsValue::from_str(name)])
            .map_err(|e| ParameterError::Rejected(describe(&e)))?;
        let promise: Promise = pending
            .dyn_into()
            .map_err(|_| ParameterError::Malformed("getParameter did not return a promise".into()))?;
        let value = JsFuture::from(promise)
            .await
            .map_err(|e| ParameterError::Rejected(describe(&e)))?;
        if value.is_undefined() || value.is_null() {
            return Err(ParameterError::Missing(name.to_string()));
        }
        js_to_json(&value).map_err(ParameterError::Malformed)
    }

    fn update_link(&self) {
        if let Err(err) = call(&self.app, "updateLink", &[]) {
            log(&format!("updateLink failed: {}", describe(&err)));
        }
    }
}

type WebSync = Synchronizer<LeafletMap, JsHost>;

fn read_config(app: &JsValue) -> Result<HostConfig, JsValue> {
    let raw = get(app, "config")?;
    if raw.is_undefined() || raw.is_null() {
        return Ok(HostConfig::default());
    }
    let value = js_to_json(&raw).map_err(|e| JsValue::from_str(&e))?;
    serde_json::from_value(value).map_err(|e| JsValue::from_str(&format!("config: {e}")))
}

fn read_state(state: &JsValue) -> AppState {
    js_to_json(state)
        .and_then(|v| serde_json::from_value(v).map_err(|e| e.to_string()))
        .unwrap_or_else(|err| {
            log(&format!("unreadable state, treating as empty: {err}"));
            AppState::default()
        })
}

fn write_viewport(target: &JsValue, state: &AppState) -> Result<(), JsValue> {
    let fields = [("lat", state.lat), ("lon", state.lon), ("zoom", state.zoom)];
    for (key, value) in fields {
        if let Some(v) = value {
            set(target, key, &JsValue::from_f64(v))?;
        }
    }
    Ok(())
}

fn on(target: &JsValue, event: &str, handler: &Closure<dyn FnMut(JsValue)>) -> Result<(), JsValue> {
    call(
        target,
        "on",
        &[JsValue::from_str(event), handler.as_ref().clone()],
    )
    .map(|_| ())
}

/// Module entry point: creates the map in `container_id` and wires the app's
/// `state-apply` / `state-get` events and the map's `moveend`.
#[wasm_bindgen]
pub fn app_init(app: JsValue, container_id: &str) -> Result<(), JsValue> {
    set_once();

    let config = read_config(&app)?;
    let app_info = serde_json::to_value(&config.app).map_err(|e| JsValue::from_str(&e.to_string()))?;
    if let Ok(cfg) = get(&app, "config") {
        if cfg.is_object() {
            set(&cfg, "app", &json_to_js(&app_info)?)?;
        }
    }

    let map = LeafletMap::create(container_id, config.max_zoom)?;
    set(&app, "map", map.handle())?;
    let map_handle = map.handle().clone();

    let sync: Rc<WebSync> = Rc::new(MapModule::init(map, JsHost::new(app.clone()), config));

    let s = sync.clone();
    let move_end = Closure::<dyn FnMut(JsValue)>::new(move |_e: JsValue| s.on_move_end());
    on(&map_handle, "moveend", &move_end)?;
    move_end.forget();

    let s = sync.clone();
    let state_apply = Closure::<dyn FnMut(JsValue)>::new(move |state: JsValue| {
        let state = read_state(&state);
        // A viewport carried by the state lands before the handler returns.
        if let Some(pending) = s.apply_state_viewport(&state) {
            let s = s.clone();
            spawn_local(async move { s.finish_apply(pending).await });
        }
    });
    on(&app, "state-apply", &state_apply)?;
    state_apply.forget();

    let s = sync;
    let state_get = Closure::<dyn FnMut(JsValue)>::new(move |target: JsValue| {
        let mut state = AppState::default();
        s.capture_state(&mut state);
        if let Err(err) = write_viewport(&target, &state) {
            log(&format!("state-get failed: {}", describe(&err)));
        }
    });
    on(&app, "state-get", &state_get)?;
    state_get.forget();

    Ok(())
}
