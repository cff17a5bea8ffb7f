//! Browser backend: pdf.js for parsing and rendering, a 2D canvas as the
//! drawing surface, and Blob/File/URL for the output.

use std::cell::RefCell;

use async_trait::async_trait;
use js_sys::{Array, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, CanvasRenderingContext2d, File, FilePropertyBag, HtmlCanvasElement, Url};

use crate::loader::{LazyLibrary, LibraryLoader};
use crate::pdfjs_bindings::{
    PageViewport, PdfDocumentProxy, PdfJs, PdfPageProxy, document_params, import_pdfjs,
    js_error_message, pdf_worker_src, render_params, viewport_params,
};
use crate::rasterizer::{EncodedImage, PdfLibrary, PdfSource, PublishedImage, RenderSurface};
use crate::schema::{ConvertError, PNG_MIME, Viewport};

thread_local! {
    static PDFJS: LazyLibrary<PdfJsLoader> = LazyLibrary::new(PdfJsLoader);
}

/// The wasm instance's shared pdf.js handle.
pub fn pdfjs() -> LazyLibrary<PdfJsLoader> {
    PDFJS.with(LazyLibrary::clone)
}

/// Imports `pdfjs-dist` and points it at its worker script.
pub struct PdfJsLoader;

#[async_trait(?Send)]
impl LibraryLoader for PdfJsLoader {
    type Library = PdfJsLibrary;

    async fn load(&self) -> Result<PdfJsLibrary, ConvertError> {
        let module = import_pdfjs()
            .await
            .map_err(|e| ConvertError::LibraryLoad(js_error_message(&e)))?;
        let pdfjs: PdfJs = module.unchecked_into();

        let worker_src =
            pdf_worker_src().map_err(|e| ConvertError::LibraryLoad(js_error_message(&e)))?;
        pdfjs.global_worker_options().set_worker_src(&worker_src);

        Ok(PdfJsLibrary { pdfjs })
    }
}

#[derive(Clone)]
pub struct PdfJsLibrary {
    pdfjs: PdfJs,
}

#[async_trait(?Send)]
impl PdfLibrary for PdfJsLibrary {
    type Page = PdfPage;
    type Surface = CanvasSurface;

    async fn open_page(
        &self,
        data: Vec<u8>,
        page_number: u32,
    ) -> Result<PdfPage, ConvertError> {
        let document_error = |e: JsValue| ConvertError::Document(js_error_message(&e));

        let params = document_params(&data).map_err(document_error)?;
        let task = self.pdfjs.get_document(&params).map_err(document_error)?;
        let document: PdfDocumentProxy = JsFuture::from(task.promise())
            .await
            .map_err(document_error)?
            .unchecked_into();

        let page_count = document.num_pages();
        if page_number > page_count {
            return Err(ConvertError::Page {
                page: page_number,
                message: format!("document has {page_count} page(s)"),
            });
        }

        let page = JsFuture::from(document.get_page(page_number))
            .await
            .map_err(|e| ConvertError::Page {
                page: page_number,
                message: js_error_message(&e),
            })?;
        Ok(PdfPage {
            proxy: page.unchecked_into(),
            viewport: RefCell::new(None),
        })
    }

    fn viewport(&self, page: &PdfPage, scale: f64) -> Result<Viewport, ConvertError> {
        let params =
            viewport_params(scale).map_err(|e| ConvertError::Render(js_error_message(&e)))?;
        let page_viewport = page.proxy.get_viewport(&params);
        let viewport = Viewport {
            width: page_viewport.width(),
            height: page_viewport.height(),
            scale,
        };
        *page.viewport.borrow_mut() = Some((scale, page_viewport));
        Ok(viewport)
    }

    fn create_surface(&self, viewport: &Viewport) -> Result<CanvasSurface, ConvertError> {
        CanvasSurface::new(viewport.pixel_width(), viewport.pixel_height())
    }

    async fn render(
        &self,
        page: &PdfPage,
        surface: &CanvasSurface,
        viewport: &Viewport,
    ) -> Result<(), ConvertError> {
        let render_error = |e: JsValue| ConvertError::Render(js_error_message(&e));

        let page_viewport = page.viewport_at(viewport.scale).map_err(render_error)?;
        let params = render_params(&surface.context, &page_viewport).map_err(render_error)?;
        let task = page.proxy.render(&params).map_err(render_error)?;
        JsFuture::from(task.promise()).await.map_err(render_error)?;
        Ok(())
    }
}

/// A pdf.js page plus the viewport the surface was sized from.
pub struct PdfPage {
    proxy: PdfPageProxy,
    viewport: RefCell<Option<(f64, PageViewport)>>,
}

impl PdfPage {
    /// The viewport last computed at `scale`, or a fresh one if the scale
    /// differs.
    fn viewport_at(&self, scale: f64) -> Result<PageViewport, JsValue> {
        if let Some((cached_scale, viewport)) = &*self.viewport.borrow() {
            if *cached_scale == scale {
                return Ok(viewport.clone());
            }
        }
        Ok(self.proxy.get_viewport(&viewport_params(scale)?))
    }
}

/// An offscreen `<canvas>` with a 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, ConvertError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| ConvertError::Surface("no document available".into()))?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|e| ConvertError::Surface(js_error_message(&e)))?
            .dyn_into()
            .map_err(|_| ConvertError::Surface("element is not a canvas".into()))?;

        canvas.set_width(width);
        canvas.set_height(height);

        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|e| ConvertError::Surface(js_error_message(&e)))?
            .ok_or_else(|| ConvertError::Surface("2d context unavailable".into()))?
            .dyn_into()
            .map_err(|_| ConvertError::Surface("unexpected context type".into()))?;
        context.set_image_smoothing_enabled(true);
        Reflect::set(&context, &"imageSmoothingQuality".into(), &"high".into())
            .map_err(|e| ConvertError::Surface(js_error_message(&e)))?;

        Ok(Self { canvas, context })
    }
}

#[async_trait(?Send)]
impl RenderSurface for CanvasSurface {
    type Image = PngBlob;

    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    async fn encode_png(&self, quality: f64) -> Result<Option<PngBlob>, ConvertError> {
        // toBlob reports through a callback; resolving a promise with it
        // turns the callback into something awaitable
        let mut request = Ok(());
        let promise = Promise::new(&mut |resolve, _reject| {
            request = self.canvas.to_blob_with_type_and_encoder_options(
                &resolve,
                PNG_MIME,
                &JsValue::from_f64(quality),
            );
        });
        request.map_err(|e| ConvertError::Encode(js_error_message(&e)))?;

        let value = JsFuture::from(promise)
            .await
            .map_err(|e| ConvertError::Encode(js_error_message(&e)))?;
        Ok(value.dyn_into::<Blob>().ok().map(PngBlob))
    }
}

/// PNG bytes produced by the canvas.
pub struct PngBlob(Blob);

impl EncodedImage for PngBlob {
    type File = File;

    fn publish(self, file_name: &str) -> Result<PublishedImage<File>, ConvertError> {
        let output_error = |e: JsValue| ConvertError::Output(js_error_message(&e));

        let options = FilePropertyBag::new();
        options.set_type(PNG_MIME);
        let parts = Array::of1(&self.0);
        let file = File::new_with_blob_sequence_and_options(&parts, file_name, &options)
            .map_err(output_error)?;
        let url = Url::create_object_url_with_blob(&self.0).map_err(output_error)?;

        Ok(PublishedImage { url, file })
    }
}

#[async_trait(?Send)]
impl PdfSource for File {
    fn name(&self) -> String {
        File::name(self)
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, ConvertError> {
        let buffer = JsFuture::from(self.array_buffer())
            .await
            .map_err(|e| ConvertError::Read(js_error_message(&e)))?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }
}
