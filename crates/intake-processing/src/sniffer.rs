//! Magic-byte content type detection.
//!
//! Only the leading bytes are inspected; the filename and declared type play no
//! part. Unknown or short input yields [`OCTET_STREAM`].

use intake_core::constants::{DOCX_MIME, OCTET_STREAM};

const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const OLE_SIGNATURE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Prefix signatures, checked in order.
const PREFIX_SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF", "application/pdf"),
    (&[0xFF, 0xD8, 0xFF], "image/jpeg"),
    (PNG_SIGNATURE, "image/png"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (OLE_SIGNATURE, "application/msword"),
    // Any ZIP container; only OOXML documents are expected here
    (b"PK", DOCX_MIME),
];

/// Detect the MIME type of `bytes` from its magic number.
pub fn detect_type(bytes: &[u8]) -> &'static str {
    if let Some((_, mime)) = PREFIX_SIGNATURES
        .iter()
        .find(|(signature, _)| bytes.starts_with(signature))
    {
        return *mime;
    }

    // ISO base media: box size, then `ftyp`, then the major brand
    if bytes.get(4..8) == Some(b"ftyp".as_slice()) {
        return match bytes.get(8..12) {
            Some(b"qt  ") => "video/quicktime",
            _ => "video/mp4",
        };
    }

    if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"AVI ".as_slice()) {
        return "video/x-msvideo";
    }

    OCTET_STREAM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_regardless_of_rest() {
        assert_eq!(detect_type(b"%PDF"), "application/pdf");
        assert_eq!(detect_type(b"%PDF-1.7\n%\xE2\xE3"), "application/pdf");
    }

    #[test]
    fn test_images() {
        assert_eq!(detect_type(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]), "image/jpeg");
        assert_eq!(detect_type(PNG_SIGNATURE), "image/png");
        assert_eq!(detect_type(b"GIF87a...."), "image/gif");
        assert_eq!(detect_type(b"GIF89a...."), "image/gif");
    }

    #[test]
    fn test_iso_media_brands() {
        let mut mp4 = vec![0x00, 0x00, 0x00, 0x20];
        mp4.extend_from_slice(b"ftypisom");
        assert_eq!(detect_type(&mp4), "video/mp4");

        let mut mov = vec![0x00, 0x00, 0x00, 0x14];
        mov.extend_from_slice(b"ftypqt  ");
        assert_eq!(detect_type(&mov), "video/quicktime");

        // brand missing entirely still counts as mp4
        assert_eq!(detect_type(b"\0\0\0\x08ftyp"), "video/mp4");
    }

    #[test]
    fn test_office_and_avi() {
        assert_eq!(detect_type(b"PK\x03\x04rest"), DOCX_MIME);
        assert_eq!(detect_type(OLE_SIGNATURE), "application/msword");
        assert_eq!(detect_type(b"RIFF\x00\x00\x00\x00AVI LIST"), "video/x-msvideo");
        assert_eq!(detect_type(b"RIFF\x00\x00\x00\x00WAVE"), OCTET_STREAM);
    }

    #[test]
    fn test_short_and_unknown_input() {
        assert_eq!(detect_type(b""), OCTET_STREAM);
        assert_eq!(detect_type(b"%"), OCTET_STREAM);
        assert_eq!(detect_type(&[0xFF, 0xD8]), OCTET_STREAM);
        assert_eq!(detect_type(b"\0\0\0\x08ft"), OCTET_STREAM);
        assert_eq!(detect_type(b"plain text notes"), OCTET_STREAM);
    }
}
