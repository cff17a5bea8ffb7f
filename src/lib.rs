//! First-page PDF to PNG conversion for the browser.
//!
//! pdf.js is imported lazily, once per wasm instance, the first time a
//! conversion is requested. Each conversion renders one page into an
//! offscreen canvas and returns the PNG as both an object URL and a `File`.

mod assembly;
mod browser;
mod file_utils;
mod loader;
mod logging;
mod pdfjs_bindings;
mod rasterizer;
mod schema;
#[cfg(test)]
mod test_support;

use wasm_bindgen::prelude::*;

pub use assembly::{
    PdfConversionResult, convert_pdf_base64, convert_pdf_bytes, convert_pdf_to_image,
};
pub use file_utils::png_file_name;
pub use loader::{LazyLibrary, LibraryLoader};
pub use rasterizer::{
    EncodedImage, NamedPdf, OutputFile, PdfLibrary, PdfSource, PublishedImage, RenderSurface,
    rasterize,
};
pub use schema::{
    BLOB_FAILED_MESSAGE, ConversionResult, ConvertError, ConvertOptions, DEFAULT_PAGE_NUMBER,
    DEFAULT_SCALE, PNG_MIME, PNG_QUALITY, Viewport,
};

/// Installs the panic hook so Rust panics show up in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
