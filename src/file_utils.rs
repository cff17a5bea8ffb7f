/// Derives the name of the image produced from a PDF file.
///
/// # Arguments
///
/// * `pdf_name` - The name of the input file
///
/// # Returns
///
/// The input name with one trailing `.pdf` extension removed (compared
/// case-insensitively) and `.png` appended. Names without a `.pdf`
/// extension keep their full text.
///
/// # Example
///
/// ```ignore
/// assert_eq!(png_file_name("report.PDF"), "report.png");
/// assert_eq!(png_file_name("scan.tiff"), "scan.tiff.png");
/// ```
pub fn png_file_name(pdf_name: &str) -> String {
    format!("{}.png", strip_pdf_extension(pdf_name))
}

fn strip_pdf_extension(name: &str) -> &str {
    const EXT: &str = ".pdf";
    // slicing by byte offset is only safe when it lands on a char boundary
    let Some(split) = name.len().checked_sub(EXT.len()) else {
        return name;
    };
    match name.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(EXT) => &name[..split],
        _ => name,
    }
}

/// Returns `true` if the bytes start with the `%PDF` magic.
///
/// Only used for diagnostics; the rendering library decides whether a
/// document is valid.
pub fn has_pdf_magic(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && &bytes[0..4] == b"%PDF"
}
