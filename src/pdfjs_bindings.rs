//! JavaScript bindings for PDF.js
//!
//! This module provides Rust bindings to the parts of the `pdfjs-dist` API
//! used for rendering: module loading, worker configuration, documents,
//! pages, viewports and render tasks.

use js_sys::{Object, Promise, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/pdfjs_bridge.js")]
extern "C" {
    /// Dynamically imports `pdfjs-dist` and resolves to its module namespace.
    #[wasm_bindgen(catch, js_name = importPdfJs)]
    pub async fn import_pdfjs() -> Result<JsValue, JsValue>;

    /// URL of the pdf.js worker script, relative to the bridge module.
    #[wasm_bindgen(catch, js_name = pdfWorkerSrc)]
    pub fn pdf_worker_src() -> Result<String, JsValue>;
}

#[wasm_bindgen]
extern "C" {
    /// The `pdfjs-dist` module namespace.
    #[derive(Clone, Debug)]
    pub type PdfJs;

    #[wasm_bindgen(method, getter, js_name = GlobalWorkerOptions)]
    pub fn global_worker_options(this: &PdfJs) -> GlobalWorkerOptions;

    #[wasm_bindgen(method, catch, js_name = getDocument)]
    pub fn get_document(this: &PdfJs, params: &Object) -> Result<PdfLoadingTask, JsValue>;

    pub type GlobalWorkerOptions;

    #[wasm_bindgen(method, setter, js_name = workerSrc)]
    pub fn set_worker_src(this: &GlobalWorkerOptions, src: &str);

    pub type PdfLoadingTask;

    /// Resolves to a `PDFDocumentProxy`.
    #[wasm_bindgen(method, getter)]
    pub fn promise(this: &PdfLoadingTask) -> Promise;

    pub type PdfDocumentProxy;

    #[wasm_bindgen(method, getter, js_name = numPages)]
    pub fn num_pages(this: &PdfDocumentProxy) -> u32;

    /// Resolves to a `PDFPageProxy`. Page numbers start at 1.
    #[wasm_bindgen(method, js_name = getPage)]
    pub fn get_page(this: &PdfDocumentProxy, page_number: u32) -> Promise;

    pub type PdfPageProxy;

    #[wasm_bindgen(method, js_name = getViewport)]
    pub fn get_viewport(this: &PdfPageProxy, params: &Object) -> PageViewport;

    #[wasm_bindgen(method, catch)]
    pub fn render(this: &PdfPageProxy, params: &Object) -> Result<RenderTask, JsValue>;

    #[derive(Clone, Debug)]
    pub type PageViewport;

    #[wasm_bindgen(method, getter)]
    pub fn width(this: &PageViewport) -> f64;

    #[wasm_bindgen(method, getter)]
    pub fn height(this: &PageViewport) -> f64;

    pub type RenderTask;

    /// Settles once the page has been drawn.
    #[wasm_bindgen(method, getter)]
    pub fn promise(this: &RenderTask) -> Promise;
}

/// Builds the `{ data }` argument of `getDocument`.
pub fn document_params(data: &[u8]) -> Result<Object, JsValue> {
    let params = Object::new();
    Reflect::set(&params, &"data".into(), &Uint8Array::from(data))?;
    Ok(params)
}

/// Builds the `{ scale }` argument of `getViewport`.
pub fn viewport_params(scale: f64) -> Result<Object, JsValue> {
    let params = Object::new();
    Reflect::set(&params, &"scale".into(), &scale.into())?;
    Ok(params)
}

/// Builds the `{ canvasContext, viewport }` argument of `render`.
pub fn render_params(canvas_context: &JsValue, viewport: &PageViewport) -> Result<Object, JsValue> {
    let params = Object::new();
    Reflect::set(&params, &"canvasContext".into(), canvas_context)?;
    Reflect::set(&params, &"viewport".into(), viewport)?;
    Ok(params)
}

/// Formats a thrown JavaScript value the way string interpolation would.
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.to_string());
    }
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}
