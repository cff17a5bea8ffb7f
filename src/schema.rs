//! Data structures and types for PDF page rasterization.
//!
//! This module defines the core types shared by the loader, the rasterizer
//! and the JavaScript bindings: the error type, the conversion options and
//! the conversion result.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page rendered when no page number is configured.
pub const DEFAULT_PAGE_NUMBER: u32 = 1;

/// Upscaling factor applied to the page's native size. Large enough for
/// downstream OCR and vision models rather than on-screen display.
pub const DEFAULT_SCALE: f64 = 4.0;

/// MIME type of every produced image.
pub const PNG_MIME: &str = "image/png";

/// Quality argument handed to the encoder. PNG is lossless so browsers
/// usually ignore it.
pub const PNG_QUALITY: f64 = 1.0;

/// Message returned when the encoder yields no data.
pub const BLOB_FAILED_MESSAGE: &str = "Failed to create image blob";

/// Errors that can occur while converting a PDF page to an image.
///
/// Every variant carries a plain message so the error stays `Clone`; the
/// lazy loader hands the same failure to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// The rendering library or its worker could not be loaded.
    #[error("could not load PDF library: {0}")]
    LibraryLoad(String),
    /// The input file could not be read into memory.
    #[error("could not read input file: {0}")]
    Read(String),
    /// The bytes are not a PDF the library can open.
    #[error("{0}")]
    Document(String),
    /// The requested page does not exist or could not be loaded.
    #[error("page {page}: {message}")]
    Page { page: u32, message: String },
    /// No drawing surface could be allocated.
    #[error("could not create drawing surface: {0}")]
    Surface(String),
    /// Rendering the page into the surface failed.
    #[error("render failed: {0}")]
    Render(String),
    /// The encoder threw instead of producing an image.
    #[error("encoding failed: {0}")]
    Encode(String),
    /// Wrapping the encoded image as a file or URL failed.
    #[error("could not create output image: {0}")]
    Output(String),
    /// The conversion options are out of range.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    /// Input bytes handed over as text could not be decoded.
    #[error("base64 decode failed: {0}")]
    Decode(String),
}

/// Configuration options for a conversion.
///
/// All fields are optional in JSON. When not provided, the first page is
/// rendered at four times its native size.
///
/// # Examples
///
/// ```json
/// {}
/// ```
///
/// ```json
/// { "scale": 2.0, "page_number": 3 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Factor applied to the page's native dimensions.
    pub scale: f64,
    /// 1-based number of the page to render.
    pub page_number: u32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            page_number: DEFAULT_PAGE_NUMBER,
        }
    }
}

impl ConvertOptions {
    /// Parses options from an optional JSON string.
    ///
    /// Returns the defaults when no JSON is given. Unparsable JSON also
    /// yields the defaults, together with the parse error so the caller
    /// can report it.
    pub fn from_json(options_json: Option<&str>) -> (Self, Option<serde_json::Error>) {
        match options_json {
            Some(s) => match serde_json::from_str(s) {
                Ok(options) => (options, None),
                Err(err) => (Self::default(), Some(err)),
            },
            None => (Self::default(), None),
        }
    }

    /// Checks that the scale is a positive finite number and the page
    /// number is 1-based.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConvertError::InvalidOptions(format!(
                "scale must be a positive number, got {}",
                self.scale
            )));
        }
        if self.page_number == 0 {
            return Err(ConvertError::InvalidOptions(
                "page_number starts at 1".into(),
            ));
        }
        Ok(())
    }
}

/// Dimensions of a page at a given scale, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

impl Viewport {
    /// Width of a drawing surface sized to this viewport.
    ///
    /// Canvas dimensions are integers; assigning a fractional width
    /// truncates it.
    pub fn pixel_width(&self) -> u32 {
        self.width.trunc() as u32
    }

    /// Height of a drawing surface sized to this viewport.
    pub fn pixel_height(&self) -> u32 {
        self.height.trunc() as u32
    }
}

/// The outcome of one conversion.
///
/// Either the conversion succeeded and both `image_url` and `file` are
/// set, or it failed and only `error` is set. The fields are private so no
/// other shape can be built.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult<F> {
    image_url: String,
    file: Option<F>,
    error: Option<String>,
}

impl<F> ConversionResult<F> {
    pub fn success(image_url: String, file: F) -> Self {
        Self {
            image_url,
            file: Some(file),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            image_url: String::new(),
            file: None,
            error: Some(error.into()),
        }
    }

    /// Generic failure wrapping any error raised along the pipeline.
    pub fn conversion_failed(err: &ConvertError) -> Self {
        Self::failure(format!("Failed to convert PDF: {err}"))
    }

    /// Failure returned when the encoder produced no data.
    pub fn blob_failed() -> Self {
        Self::failure(BLOB_FAILED_MESSAGE)
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn file(&self) -> Option<&F> {
        self.file.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Splits the result into its URL, file and error.
    pub fn into_parts(self) -> (String, Option<F>, Option<String>) {
        (self.image_url, self.file, self.error)
    }
}
