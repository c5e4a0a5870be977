//! Derivative transformation URL builder
//!
//! Describes a preview/thumbnail derivative of a stored object and renders it
//! as a path of operations separated by `/-/`, e.g.
//! `-/page/1/-/resize/800x600/-/crop/fit/-/format/jpg/`.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// How the source is fitted into the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropMode {
    /// Scale down to fit inside the box, keeping the aspect ratio.
    #[default]
    Fit,
    /// Fill the box completely, cropping the overflow.
    Fill,
}

impl CropMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CropMode::Fit => "fit",
            CropMode::Fill => "fill",
        }
    }
}

impl Display for CropMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Transform applied by the blob store when serving a derivative.
///
/// # Example
///
/// ```rust
/// use intake_core::transform_url::TransformOptions;
///
/// let url = TransformOptions::new()
///     .dimensions(200, 200)
///     .fill()
///     .build("https://cdn.example.com", "lms/general/cover.jpg");
/// assert_eq!(
///     url,
///     "https://cdn.example.com/lms/general/cover.jpg/-/resize/200x200/-/crop/fill/"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformOptions {
    width: Option<u32>,
    height: Option<u32>,
    crop: Option<CropMode>,
    page: Option<u32>,
    format: Option<String>,
    start_offset: Option<f32>,
}

impl TransformOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// First page of a document rendered as a JPEG, fitted to the box.
    pub fn document_page(width: u32, height: u32) -> Self {
        Self::new()
            .page(1)
            .dimensions(width, height)
            .fit()
            .format("jpg")
    }

    /// Fitted preview of an image.
    pub fn image_preview(width: u32, height: u32) -> Self {
        Self::new().dimensions(width, height).fit()
    }

    /// Square thumbnail that fills the box.
    pub fn thumbnail(size: u32) -> Self {
        Self::new().dimensions(size, size).fill()
    }

    /// First frame of a video as a JPEG.
    pub fn video_frame(width: u32, height: u32) -> Self {
        Self::new()
            .start_offset(0.0)
            .dimensions(width, height)
            .fit()
            .format("jpg")
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn fit(mut self) -> Self {
        self.crop = Some(CropMode::Fit);
        self
    }

    pub fn fill(mut self) -> Self {
        self.crop = Some(CropMode::Fill);
        self
    }

    /// Page to render, 1-based. Zero is ignored.
    pub fn page(mut self, page: u32) -> Self {
        if page > 0 {
            self.page = Some(page);
        }
        self
    }

    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.trim_start_matches('.').to_lowercase());
        self
    }

    /// Video position in seconds. Negative values are clamped to zero.
    pub fn start_offset(mut self, seconds: f32) -> Self {
        self.start_offset = Some(seconds.max(0.0));
        self
    }

    pub fn crop_mode(&self) -> Option<CropMode> {
        self.crop
    }

    pub fn output_format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.build_operations().is_empty()
    }

    /// Operations segment only, without base URL or object id.
    pub fn build_operations(&self) -> String {
        let mut operations = Vec::new();

        // Source selection comes before geometry
        if let Some(page) = self.page {
            operations.push(format!("page/{}", page));
        }
        if let Some(offset) = self.start_offset {
            operations.push(format!("frame/{}", offset));
        }

        match (self.width, self.height) {
            (Some(width), Some(height)) => operations.push(format!("resize/{}x{}", width, height)),
            (Some(width), None) => operations.push(format!("resize/{}x", width)),
            (None, Some(height)) => operations.push(format!("resize/x{}", height)),
            (None, None) => {}
        }

        // Crop mode only means something with a target size
        if let Some(crop) = self.crop {
            if self.width.is_some() || self.height.is_some() {
                operations.push(format!("crop/{}", crop));
            }
        }

        if let Some(ref format) = self.format {
            operations.push(format!("format/{}", format));
        }

        if operations.is_empty() {
            return String::new();
        }

        format!("-/{}/", operations.join("/-/"))
    }

    /// Full derivative URL: `{base}/{object_id}/{operations}`.
    pub fn build(&self, base_url: &str, object_id: &str) -> String {
        let base = base_url.trim_end_matches('/');
        let object_id = object_id.trim_start_matches('/');
        let operations = self.build_operations();

        if operations.is_empty() {
            format!("{}/{}", base, object_id)
        } else {
            format!("{}/{}/{}", base, object_id, operations)
        }
    }
}
