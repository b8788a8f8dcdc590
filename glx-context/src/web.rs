//! Browser surface backed by an `HtmlCanvasElement`.
//!
//! Operations are looked up and called by name through `js_sys::Reflect`, so
//! the same code serves `WebGLRenderingContext`, `WebGL2RenderingContext` and
//! every extension object.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::{
    Array, ArrayBuffer, Float32Array, Function, Int32Array, Map, Object, Reflect, Uint16Array,
    Uint32Array, Uint8Array,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlCanvasElement;

use glx_core::{
    CapabilityName, ContextAttributes, ContextId, GlxError, GlxResult, TypedArray, Value,
};

use crate::provider::{Extension, RenderingContext, Surface};

/// GL objects handed to Rust as [`Value::Object`] ids.
///
/// Lookup by object goes through a JS `Map`, which compares by identity.
/// Entries are released when the object is passed to a `delete*` operation.
#[derive(Debug)]
struct ObjectTable {
    ids: Map,
    objects: HashMap<u64, JsValue>,
    next_id: u64,
}

impl Default for ObjectTable {
    fn default() -> Self {
        Self {
            ids: Map::new(),
            objects: HashMap::new(),
            next_id: 0,
        }
    }
}

impl ObjectTable {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn intern(&mut self, object: JsValue) -> u64 {
        if let Some(id) = self.ids.get(&object).as_f64() {
            return id as u64;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids.set(&object, &JsValue::from_f64(id as f64));
        self.objects.insert(id, object);
        id
    }

    fn get(&self, id: u64) -> JsValue {
        self.objects.get(&id).cloned().unwrap_or(JsValue::NULL)
    }

    fn release(&mut self, id: u64) {
        if let Some(object) = self.objects.remove(&id) {
            self.ids.delete(&object);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.objects.len()
    }
}

type SharedObjects = Rc<RefCell<ObjectTable>>;

/// A canvas element to create contexts on.
#[derive(Debug)]
pub struct WebGlSurface {
    canvas: HtmlCanvasElement,
}

impl WebGlSurface {
    /// Wrap a canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas }
    }

    /// Find a canvas by element id.
    #[must_use]
    pub fn from_element_id(id: &str) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let canvas = document
            .get_element_by_id(id)?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;
        Some(Self::new(canvas))
    }
}

impl Surface for WebGlSurface {
    fn request_context(
        &mut self,
        id: ContextId,
        attributes: &ContextAttributes,
    ) -> Option<Box<dyn RenderingContext>> {
        let options = attributes_object(attributes).ok()?;
        let raw = self
            .canvas
            .get_context_with_context_options(id.as_str(), &options)
            .ok()
            .flatten()?;
        tracing::debug!("Browser granted {id} context");
        Some(Box::new(WebGlContext {
            raw,
            canvas: self.canvas.clone(),
            objects: SharedObjects::default(),
        }))
    }
}

fn attributes_object(attributes: &ContextAttributes) -> Result<JsValue, JsValue> {
    let options = Object::new();
    let flags = [
        ("alpha", attributes.alpha),
        ("depth", attributes.depth),
        ("stencil", attributes.stencil),
        ("antialias", attributes.antialias),
        ("premultipliedAlpha", attributes.premultiplied_alpha),
        ("preserveDrawingBuffer", attributes.preserve_drawing_buffer),
        (
            "failIfMajorPerformanceCaveat",
            attributes.fail_if_major_performance_caveat,
        ),
        ("desynchronized", attributes.desynchronized),
    ];
    for (key, value) in flags {
        Reflect::set(&options, &key.into(), &value.into())?;
    }
    Reflect::set(
        &options,
        &"powerPreference".into(),
        &attributes.power_preference.as_str().into(),
    )?;
    Ok(options.into())
}

struct WebGlContext {
    raw: Object,
    canvas: HtmlCanvasElement,
    objects: SharedObjects,
}

impl RenderingContext for WebGlContext {
    fn has_operation(&self, name: &str) -> bool {
        method(&self.raw, name).is_some()
    }

    fn invoke(&mut self, name: &str, args: &[Value]) -> GlxResult<Value> {
        call(&self.raw, name, args, &self.objects)
    }

    fn supported_extensions(&self) -> Vec<CapabilityName> {
        let Ok(list) = call_raw(&self.raw, "getSupportedExtensions", &Array::new()) else {
            return Vec::new();
        };
        if !Array::is_array(&list) {
            return Vec::new();
        }
        Array::from(&list)
            .iter()
            .filter_map(|name| name.as_string())
            .map(CapabilityName::from)
            .collect()
    }

    fn activate_extension(&mut self, name: &str) -> Option<Box<dyn Extension>> {
        let args = Array::of1(&name.into());
        let raw = call_raw(&self.raw, "getExtension", &args).ok()?;
        if raw.is_null() || raw.is_undefined() {
            return None;
        }
        Some(Box::new(WebGlExtension {
            name: name.to_string(),
            raw: raw.dyn_into().ok()?,
            objects: Rc::clone(&self.objects),
        }))
    }

    fn canvas(&self) -> Option<&dyn Any> {
        Some(&self.canvas)
    }

    fn drawing_buffer_width(&self) -> u32 {
        dimension(&self.raw, "drawingBufferWidth")
    }

    fn drawing_buffer_height(&self) -> u32 {
        dimension(&self.raw, "drawingBufferHeight")
    }
}

struct WebGlExtension {
    name: String,
    raw: Object,
    objects: SharedObjects,
}

impl Extension for WebGlExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_method(&self, name: &str) -> bool {
        method(&self.raw, name).is_some()
    }

    fn invoke(&mut self, name: &str, args: &[Value]) -> GlxResult<Value> {
        call(&self.raw, name, args, &self.objects)
    }
}

fn method(target: &Object, name: &str) -> Option<Function> {
    Reflect::get(target, &name.into())
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

fn call_raw(target: &Object, name: &str, args: &Array) -> Result<JsValue, JsValue> {
    let function =
        method(target, name).ok_or_else(|| JsValue::from_str(&format!("{name} is not a function")))?;
    function.apply(target, args)
}

fn call(target: &Object, name: &str, args: &[Value], objects: &SharedObjects) -> GlxResult<Value> {
    let js_args = {
        let table = objects.borrow();
        args.iter()
            .map(|value| to_js(value, &table))
            .collect::<Array>()
    };
    let result = call_raw(target, name, &js_args).map_err(|e| GlxError::Provider {
        operation: name.to_string(),
        message: e.as_string().unwrap_or_else(|| format!("{e:?}")),
    })?;
    let mut table = objects.borrow_mut();
    if name.starts_with("delete") {
        for id in args.iter().filter_map(Value::as_object) {
            table.release(id);
        }
    }
    Ok(from_js(result, &mut table))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn dimension(target: &Object, property: &str) -> u32 {
    Reflect::get(target, &property.into())
        .ok()
        .and_then(|value| value.as_f64())
        .map_or(0, |v| v.max(0.0) as u32)
}

#[allow(clippy::cast_precision_loss)]
fn to_js(value: &Value, objects: &ObjectTable) -> JsValue {
    match value {
        Value::Null => JsValue::NULL,
        Value::Bool(v) => JsValue::from_bool(*v),
        Value::Int(v) => JsValue::from_f64(*v as f64),
        Value::Float(v) => JsValue::from_f64(*v),
        Value::Text(v) => JsValue::from_str(v),
        Value::List(items) => items
            .iter()
            .map(|v| to_js(v, objects))
            .collect::<Array>()
            .into(),
        Value::Object { object } => objects.get(*object),
        Value::Typed(typed) => match typed {
            TypedArray::Float32(v) => Float32Array::from(v.as_slice()).into(),
            TypedArray::Int32(v) => Int32Array::from(v.as_slice()).into(),
            TypedArray::Uint32(v) => Uint32Array::from(v.as_slice()).into(),
            TypedArray::Uint16(v) => Uint16Array::from(v.as_slice()).into(),
            TypedArray::Uint8(v) => Uint8Array::from(v.as_slice()).into(),
        },
    }
}

/// Numbers come back as `Int` when integral, since GL enums and sizes are
/// returned as plain JS numbers. Typed arrays keep their element type.
#[allow(clippy::cast_possible_truncation)]
fn from_js(value: JsValue, objects: &mut ObjectTable) -> Value {
    if value.is_null() || value.is_undefined() {
        return Value::Null;
    }
    if let Some(v) = value.as_bool() {
        return Value::Bool(v);
    }
    if let Some(v) = value.as_f64() {
        return if v.fract() == 0.0 && v.abs() < 9_007_199_254_740_992.0 {
            Value::Int(v as i64)
        } else {
            Value::Float(v)
        };
    }
    if let Some(v) = value.as_string() {
        return Value::Text(v);
    }
    if let Some(typed) = typed_array(&value) {
        return Value::Typed(typed);
    }
    if Array::is_array(&value) || ArrayBuffer::is_view(&value) {
        return Value::List(
            Array::from(&value)
                .iter()
                .map(|item| from_js(item, objects))
                .collect(),
        );
    }
    Value::Object {
        object: objects.intern(value),
    }
}

fn typed_array(value: &JsValue) -> Option<TypedArray> {
    if let Some(v) = value.dyn_ref::<Float32Array>() {
        return Some(TypedArray::Float32(v.to_vec()));
    }
    if let Some(v) = value.dyn_ref::<Int32Array>() {
        return Some(TypedArray::Int32(v.to_vec()));
    }
    if let Some(v) = value.dyn_ref::<Uint32Array>() {
        return Some(TypedArray::Uint32(v.to_vec()));
    }
    if let Some(v) = value.dyn_ref::<Uint16Array>() {
        return Some(TypedArray::Uint16(v.to_vec()));
    }
    value
        .dyn_ref::<Uint8Array>()
        .map(|v| TypedArray::Uint8(v.to_vec()))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use wasm_bindgen_test::wasm_bindgen_test;

    use super::*;

    #[wasm_bindgen_test]
    fn plain_lists_keep_every_element() {
        let table = ObjectTable::default();
        let list = Value::List(vec![Value::Int(0), Value::Int(1 << 40), Value::Int(0)]);
        let js = to_js(&list, &table);
        assert!(Array::is_array(&js));
        let array = Array::from(&js);
        assert_eq!(array.length(), 3);
        assert_eq!(array.get(1).as_f64(), Some(1_099_511_627_776.0));
    }

    #[wasm_bindgen_test]
    fn whole_float_data_stays_float32() {
        let mut table = ObjectTable::default();
        let data = Value::from(TypedArray::Float32(vec![0.0, 1.0, 0.0]));
        let js = to_js(&data, &table);
        assert!(js.is_instance_of::<Float32Array>());
        assert_eq!(from_js(js, &mut table), data);
    }

    #[wasm_bindgen_test]
    fn objects_are_interned_once_and_released() {
        let mut table = ObjectTable::default();
        let buffer: JsValue = Object::new().into();
        let other: JsValue = Object::new().into();

        let id = table.intern(buffer.clone());
        assert_eq!(table.intern(buffer.clone()), id);
        let other_id = table.intern(other);
        assert_ne!(other_id, id);
        assert_eq!(table.len(), 2);

        table.release(id);
        assert_eq!(table.len(), 1);
        assert!(table.get(id).is_null());
        assert_ne!(table.intern(buffer), id);
    }
}
