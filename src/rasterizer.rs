//! # Page Rasterizer
//!
//! Renders one page of a PDF into a PNG image. The pipeline is linear:
//!
//! 1. resolve the rendering library through the lazy loader
//! 2. read the input into memory
//! 3. open the document and fetch the requested page
//! 4. compute the viewport at the configured scale
//! 5. allocate a drawing surface of exactly that size
//! 6. render the page and wait for it to finish
//! 7. encode the surface as PNG
//! 8. wrap the encoded image as a named file plus a reference URL
//!
//! The backends behind each step are traits so the pipeline can run
//! against pdf.js in the browser and against fakes in tests.
//!
//! [`rasterize`] never fails. Every error is logged and folded into a
//! [`ConversionResult`].

use async_trait::async_trait;

use crate::file_utils::{has_pdf_magic, png_file_name};
use crate::loader::{LazyLibrary, LibraryLoader};
use crate::logging;
use crate::schema::{ConversionResult, ConvertError, ConvertOptions, PNG_QUALITY, Viewport};

/// A PDF handed to the rasterizer.
#[async_trait(?Send)]
pub trait PdfSource {
    /// File name, used to name the produced image.
    fn name(&self) -> String;

    /// Reads the whole input into memory.
    async fn read_bytes(&self) -> Result<Vec<u8>, ConvertError>;
}

/// A loaded rendering library.
#[async_trait(?Send)]
pub trait PdfLibrary {
    type Page;
    type Surface: RenderSurface;

    /// Parses `data` as a document and fetches page `page_number` (1-based).
    async fn open_page(
        &self,
        data: Vec<u8>,
        page_number: u32,
    ) -> Result<Self::Page, ConvertError>;

    fn viewport(&self, page: &Self::Page, scale: f64) -> Result<Viewport, ConvertError>;

    /// Allocates a smoothing-enabled surface sized to `viewport`.
    fn create_surface(&self, viewport: &Viewport) -> Result<Self::Surface, ConvertError>;

    async fn render(
        &self,
        page: &Self::Page,
        surface: &Self::Surface,
        viewport: &Viewport,
    ) -> Result<(), ConvertError>;
}

/// An offscreen pixel buffer that can encode itself.
#[async_trait(?Send)]
pub trait RenderSurface {
    type Image: EncodedImage;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Encodes the surface as PNG.
    ///
    /// `Ok(None)` means the encoder ran but produced no data; `Err` means
    /// it threw.
    async fn encode_png(&self, quality: f64) -> Result<Option<Self::Image>, ConvertError>;
}

/// Encoded PNG bytes, ready to be handed to the caller.
pub trait EncodedImage {
    type File;

    /// Wraps the image as a file named `file_name` and creates a
    /// reference URL for the same bytes.
    fn publish(self, file_name: &str) -> Result<PublishedImage<Self::File>, ConvertError>;
}

/// A published image: a reference URL and the file it points at.
#[derive(Debug)]
pub struct PublishedImage<F> {
    pub url: String,
    pub file: F,
}

/// PDF bytes already in memory, with the name of the file they came from.
#[derive(Debug, Clone)]
pub struct NamedPdf {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[async_trait(?Send)]
impl PdfSource for NamedPdf {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn read_bytes(&self) -> Result<Vec<u8>, ConvertError> {
        Ok(self.bytes.clone())
    }
}

/// File type produced by a library's surfaces.
pub type OutputFile<P> =
    <<<P as PdfLibrary>::Surface as RenderSurface>::Image as EncodedImage>::File;

/// Converts one page of `source` into a PNG.
///
/// Never fails: errors come back as the failure shape of
/// [`ConversionResult`].
pub async fn rasterize<L, S>(
    library: &LazyLibrary<L>,
    source: &S,
    options: &ConvertOptions,
) -> ConversionResult<OutputFile<L::Library>>
where
    L: LibraryLoader,
    L::Library: PdfLibrary,
    S: PdfSource + ?Sized,
{
    let name = source.name();
    match render_png(library, source, options).await {
        Ok(Some(image)) => match image.publish(&png_file_name(&name)) {
            Ok(published) => ConversionResult::success(published.url, published.file),
            Err(err) => fail(&name, &err),
        },
        Ok(None) => {
            logging::error(&format!("{name}: encoder produced no image data"));
            ConversionResult::blob_failed()
        }
        Err(err) => fail(&name, &err),
    }
}

fn fail<F>(name: &str, err: &ConvertError) -> ConversionResult<F> {
    logging::error(&format!("PDF conversion error ({name}): {err:?}"));
    ConversionResult::conversion_failed(err)
}

async fn render_png<L, S>(
    library: &LazyLibrary<L>,
    source: &S,
    options: &ConvertOptions,
) -> Result<Option<<<L::Library as PdfLibrary>::Surface as RenderSurface>::Image>, ConvertError>
where
    L: LibraryLoader,
    L::Library: PdfLibrary,
    S: PdfSource + ?Sized,
{
    options.validate()?;
    let lib = library.get().await?;

    let data = source.read_bytes().await?;
    if !has_pdf_magic(&data) {
        logging::warn(&format!("{}: input does not start with %PDF", source.name()));
    }

    let page = lib.open_page(data, options.page_number).await?;
    let viewport = lib.viewport(&page, options.scale)?;
    let surface = lib.create_surface(&viewport)?;
    lib.render(&page, &surface, &viewport).await?;

    surface.encode_png(PNG_QUALITY).await
}
