//! Preview and thumbnail URLs for stored uploads.
//!
//! Derivation never fails an upload: a store that cannot transform an object
//! yields `None` and a warning.

use intake_core::{Config, TransformOptions};
use intake_storage::BlobStore;

/// Target sizes for derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewSizes {
    pub preview_width: u32,
    pub preview_height: u32,
    pub thumbnail_size: u32,
}

impl Default for PreviewSizes {
    fn default() -> Self {
        Self {
            preview_width: 800,
            preview_height: 600,
            thumbnail_size: 200,
        }
    }
}

impl From<&Config> for PreviewSizes {
    fn from(config: &Config) -> Self {
        Self {
            preview_width: config.preview_width(),
            preview_height: config.preview_height(),
            thumbnail_size: config.thumbnail_size(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Derivatives {
    pub preview_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Transforms for a preview and a thumbnail of a file with `extension`.
///
/// `None` for formats with no visual derivative (office documents, unknown).
pub fn transforms_for(
    extension: &str,
    sizes: &PreviewSizes,
) -> Option<(TransformOptions, TransformOptions)> {
    let PreviewSizes {
        preview_width,
        preview_height,
        thumbnail_size,
    } = *sizes;

    match extension {
        "pdf" => Some((
            TransformOptions::document_page(preview_width, preview_height),
            TransformOptions::thumbnail(thumbnail_size)
                .page(1)
                .format("jpg"),
        )),
        "jpg" | "jpeg" | "png" | "gif" => Some((
            TransformOptions::image_preview(preview_width, preview_height),
            TransformOptions::thumbnail(thumbnail_size),
        )),
        "mp4" | "mov" | "avi" => Some((
            TransformOptions::video_frame(preview_width, preview_height),
            TransformOptions::video_frame(thumbnail_size, thumbnail_size).fill(),
        )),
        _ => None,
    }
}

pub fn derive_previews(
    store: &dyn BlobStore,
    object_id: &str,
    extension: &str,
    sizes: &PreviewSizes,
) -> Derivatives {
    let Some((preview, thumbnail)) = transforms_for(extension, sizes) else {
        return Derivatives::default();
    };

    Derivatives {
        preview_url: transform_or_none(store, object_id, &preview, "preview"),
        thumbnail_url: transform_or_none(store, object_id, &thumbnail, "thumbnail"),
    }
}

fn transform_or_none(
    store: &dyn BlobStore,
    object_id: &str,
    options: &TransformOptions,
    kind: &str,
) -> Option<String> {
    match store.transform_url(object_id, options) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(
                error = %e,
                object_id = %object_id,
                derivative = kind,
                "Could not derive URL, continuing without it"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_renders_first_page() {
        let (preview, thumbnail) = transforms_for("pdf", &PreviewSizes::default()).unwrap();
        assert_eq!(
            preview.build_operations(),
            "-/page/1/-/resize/800x600/-/crop/fit/-/format/jpg/"
        );
        assert_eq!(
            thumbnail.build_operations(),
            "-/page/1/-/resize/200x200/-/crop/fill/-/format/jpg/"
        );
    }

    #[test]
    fn test_image_and_video() {
        let sizes = PreviewSizes {
            preview_width: 640,
            preview_height: 480,
            thumbnail_size: 96,
        };
        let (preview, thumbnail) = transforms_for("png", &sizes).unwrap();
        assert_eq!(preview.build_operations(), "-/resize/640x480/-/crop/fit/");
        assert_eq!(thumbnail.build_operations(), "-/resize/96x96/-/crop/fill/");

        let (preview, thumbnail) = transforms_for("mov", &sizes).unwrap();
        assert_eq!(
            preview.build_operations(),
            "-/frame/0/-/resize/640x480/-/crop/fit/-/format/jpg/"
        );
        assert_eq!(thumbnail.crop_mode(), Some(intake_core::CropMode::Fill));
    }

    #[test]
    fn test_documents_have_no_derivatives() {
        assert!(transforms_for("docx", &PreviewSizes::default()).is_none());
        assert!(transforms_for("doc", &PreviewSizes::default()).is_none());
        assert!(transforms_for("", &PreviewSizes::default()).is_none());
    }
}
