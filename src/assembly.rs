//! # Assembly Module
//!
//! This module provides the WASM-exported functions for converting the first
//! page of a PDF into a PNG image. It serves as the bridge between JavaScript
//! and the Rust rasterization pipeline.
//!
//! ## Overview
//!
//! The module exposes three entry points:
//! - `convertPdfToImage`: Accepts a browser `File`
//! - `convertPdfBytes`: Accepts raw bytes plus a file name
//! - `convertPdfBase64`: Accepts base64-encoded bytes plus a file name
//!
//! All three resolve to a `PdfConversionResult` and never reject. Failures
//! are reported through its `error` field.

use base64::Engine;
use wasm_bindgen::prelude::*;
use web_sys::File;

use crate::browser::pdfjs;
use crate::logging;
use crate::rasterizer::{NamedPdf, PdfSource, rasterize};
use crate::schema::{ConversionResult, ConvertError, ConvertOptions};

/// The outcome of a conversion, as seen from JavaScript.
///
/// On success `imageUrl` is an object URL for the PNG and `file` is a
/// `File` named after the input. On failure `imageUrl` is empty, `file` is
/// `null` and `error` describes what went wrong. The caller owns the object
/// URL and should revoke it when done.
#[wasm_bindgen]
pub struct PdfConversionResult {
    image_url: String,
    file: Option<File>,
    error: Option<String>,
}

#[wasm_bindgen]
impl PdfConversionResult {
    #[wasm_bindgen(getter, js_name = "imageUrl")]
    pub fn image_url(&self) -> String {
        self.image_url.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn file(&self) -> Option<File> {
        self.file.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.error.clone()
    }
}

impl From<ConversionResult<File>> for PdfConversionResult {
    fn from(result: ConversionResult<File>) -> Self {
        let (image_url, file, error) = result.into_parts();
        Self {
            image_url,
            file,
            error,
        }
    }
}

/// Converts the first page of a PDF `File` into a PNG.
///
/// # Parameters
///
/// * `file` - The PDF, typically from an `<input type="file">`.
///
/// * `options_json` - Optional JSON string matching `ConvertOptions`,
///                    e.g. `{"scale": 2}`. If `None` or invalid JSON,
///                    the page is rendered at 4x its native size.
///
/// # Example
///
/// ```javascript
/// const result = await convertPdfToImage(input.files[0]);
/// if (result.error) {
///     console.error(result.error);
/// } else {
///     img.src = result.imageUrl;
///     upload(result.file);
/// }
/// ```
#[wasm_bindgen(js_name = "convertPdfToImage")]
pub async fn convert_pdf_to_image(
    file: File,
    options_json: Option<String>,
) -> PdfConversionResult {
    convert(&file, options_json.as_deref()).await
}

/// Converts the first page of a PDF held in memory.
///
/// `filename` only names the output; the bytes are never sniffed for a type.
#[wasm_bindgen(js_name = "convertPdfBytes")]
pub async fn convert_pdf_bytes(
    bytes: Vec<u8>,
    filename: String,
    options_json: Option<String>,
) -> PdfConversionResult {
    let source = NamedPdf {
        name: filename,
        bytes,
    };
    convert(&source, options_json.as_deref()).await
}

/// Converts the first page of a base64-encoded PDF.
///
/// Convenience wrapper for callers that only have the document as text.
/// A decode failure is reported like any other conversion failure.
#[wasm_bindgen(js_name = "convertPdfBase64")]
pub async fn convert_pdf_base64(
    base64_bytes: String,
    filename: String,
    options_json: Option<String>,
) -> PdfConversionResult {
    match base64::engine::general_purpose::STANDARD.decode(base64_bytes.trim()) {
        Ok(bytes) => convert_pdf_bytes(bytes, filename, options_json).await,
        Err(e) => {
            let err = ConvertError::Decode(e.to_string());
            logging::error(&format!("PDF conversion error ({filename}): {err:?}"));
            PdfConversionResult::from(ConversionResult::<File>::conversion_failed(&err))
        }
    }
}

async fn convert<S>(source: &S, options_json: Option<&str>) -> PdfConversionResult
where
    S: PdfSource + ?Sized,
{
    let (options, parse_error) = ConvertOptions::from_json(options_json);
    if let Some(err) = parse_error {
        logging::warn(&format!("ignoring invalid options ({err}); using defaults"));
    }
    rasterize(&pdfjs(), source, &options).await.into()
}
