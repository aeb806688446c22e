//! Image buffer wrapper for captured screens
//!
//! [`ImageBuffer`] wraps `image::DynamicImage` with the few transformations
//! screenshots need: cropping to a region and halving the resolution.
//!
//! # Examples
//!
//! ```
//! use desktop_mcp::util::image_buffer::ImageBuffer;
//!
//! let img = ImageBuffer::from_test_pattern(1920, 1080);
//! let half = img.downscale_half();
//! assert_eq!(half.dimensions(), (960, 540));
//! ```

use image::{GenericImageView, imageops::FilterType};

use crate::error::{AutomationError, AutomationResult};

/// Pixel rectangle inside an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge
    pub x:      u32,
    /// Top edge
    pub y:      u32,
    /// Width
    pub width:  u32,
    /// Height
    pub height: u32,
}

/// Wrapper around `image::DynamicImage`
///
/// All transformation methods return new buffers and leave the original
/// unchanged.
#[derive(Clone, Debug)]
pub struct ImageBuffer {
    inner: image::DynamicImage,
}

impl ImageBuffer {
    /// Creates a new ImageBuffer from a DynamicImage
    pub fn new(image: image::DynamicImage) -> Self {
        Self { inner: image }
    }

    /// Creates a new ImageBuffer from an RGBA8 image
    pub fn from_rgba(image: image::RgbaImage) -> Self {
        Self::new(image::DynamicImage::ImageRgba8(image))
    }

    /// Halves both dimensions (integer floor, at least 1 pixel)
    ///
    /// # Examples
    ///
    /// ```
    /// use desktop_mcp::util::image_buffer::ImageBuffer;
    ///
    /// let img = ImageBuffer::from_test_pattern(1001, 3);
    /// assert_eq!(img.downscale_half().dimensions(), (500, 1));
    /// ```
    pub fn downscale_half(&self) -> Self {
        let (width, height) = self.dimensions();
        let new_width = (width / 2).max(1);
        let new_height = (height / 2).max(1);

        if new_width == width && new_height == height {
            return self.clone();
        }

        // resize_exact: `resize` would preserve the aspect ratio and could
        // round one side differently from the floor we promise.
        Self::new(self.inner.resize_exact(new_width, new_height, FilterType::Triangle))
    }

    /// Crops the image to the given pixel rectangle
    ///
    /// The rectangle must lie inside the image and have non-zero size.
    pub fn crop(&self, rect: PixelRect) -> AutomationResult<Self> {
        let (img_width, img_height) = self.dimensions();

        if rect.width == 0 || rect.height == 0 {
            return Err(AutomationError::invalid_argument(
                "screenshot",
                "region",
                "width and height must be greater than 0",
            ));
        }

        let fits_x = rect.x.checked_add(rect.width).is_some_and(|end| end <= img_width);
        let fits_y = rect.y.checked_add(rect.height).is_some_and(|end| end <= img_height);
        if !fits_x || !fits_y {
            return Err(AutomationError::invalid_argument(
                "screenshot",
                "region",
                format!(
                    "region ({}x{} at {},{}) extends beyond the captured image ({}x{})",
                    rect.width, rect.height, rect.x, rect.y, img_width, img_height
                ),
            ));
        }

        Ok(Self::new(self.inner.crop_imm(rect.x, rect.y, rect.width, rect.height)))
    }

    /// Returns the dimensions of the image as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    /// Returns the image width in pixels
    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    /// Returns the image height in pixels
    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    /// Converts the image to RGBA8 format
    pub fn to_rgba8(&self) -> image::RgbaImage {
        self.inner.to_rgba8()
    }

    /// Creates a vertical blue-to-cyan gradient for tests and the mock
    /// backend
    pub fn from_test_pattern(width: u32, height: u32) -> Self {
        use image::{ImageBuffer as ImgBuf, Rgba};

        let img = ImgBuf::from_fn(width, height, |_x, y| {
            let ratio = y as f32 / height.max(1) as f32;
            Rgba([0, (255.0 * ratio) as u8, 255, 255])
        });

        Self::new(image::DynamicImage::ImageRgba8(img))
    }

    /// Returns a reference to the inner DynamicImage
    pub fn inner(&self) -> &image::DynamicImage {
        &self.inner
    }
}
