//! Checks run on downloaded bytes before they are allowed into the image
//! cache. Servers happily answer image URLs with HTML error pages.

/// Returns true if the bytes represent a decodable image.
///
/// 1. Non-empty bytes
/// 2. Magic bytes match known image format (PNG, JPEG, GIF, WebP, BMP, ICO)
/// 3. Not HTML content
/// 4. Header decodes to non-zero dimensions
pub fn validate_image(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }

    if !has_valid_magic_bytes(bytes) {
        return false;
    }

    if is_html_content(bytes) {
        return false;
    }

    match image_dimensions(bytes) {
        Some((width, height)) => width > 0 && height > 0,
        None => false,
    }
}

/// Reads width and height from the image header.
pub fn image_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

fn has_valid_magic_bytes(bytes: &[u8]) -> bool {
    if bytes.len() < 4 {
        return false;
    }

    // PNG: \x89PNG
    if bytes[0..4] == [0x89, 0x50, 0x4E, 0x47] {
        return true;
    }

    // JPEG: \xFF\xD8\xFF
    if bytes[0..3] == [0xFF, 0xD8, 0xFF] {
        return true;
    }

    if bytes[0..4] == *b"GIF8" {
        return true;
    }

    // WebP: RIFF at start and WEBP at bytes 8..12
    if bytes.len() >= 12 && bytes[0..4] == *b"RIFF" && bytes[8..12] == *b"WEBP" {
        return true;
    }

    if bytes[0..2] == *b"BM" {
        return true;
    }

    // ICO: \x00\x00\x01\x00
    if bytes[0..4] == [0x00, 0x00, 0x01, 0x00] {
        return true;
    }

    false
}

/// Case-insensitive check of the first 50 bytes.
fn is_html_content(bytes: &[u8]) -> bool {
    let check_len = bytes.len().min(50);
    let prefix_lower = bytes[0..check_len].to_ascii_lowercase();

    prefix_lower.starts_with(b"<!doctype") || prefix_lower.starts_with(b"<html")
}
