//! Image normalization for vision-capable completion calls.
//!
//! Accepts whatever pixel representation the host hands over — a decoded
//! image, a dense numeric array, or a device tensor — and produces a
//! bounded-size JPEG plus its base64 data URL for embedding in a request
//! body. Pure function of the input; nothing is cached between calls.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use ndarray::{ArrayD, Axis};
use std::io::Cursor;
use std::path::Path;

use crate::error::{CallError, CallResult};

/// Longest edge of the encoded image, in pixels.
const MAX_EDGE: u32 = 512;

/// JPEG quality factor.
const JPEG_QUALITY: u8 = 75;

/// A device tensor that can be copied into host memory as a dense array.
///
/// Implemented by the host for whatever tensor type its runtime produces;
/// the core only needs the copy-out operation.
pub trait HostTensor: Send + Sync {
    fn to_host_array(&self) -> ArrayD<f32>;
}

/// An image in one of the admissible input shapes.
pub enum ImageSource {
    /// Already-decoded image, used as-is
    Decoded(DynamicImage),
    /// Dense float array, assumed normalized to [0, 1]
    Floats(ArrayD<f32>),
    /// Dense 8-bit array
    Bytes(ArrayD<u8>),
    /// Device tensor copied to host memory before conversion
    Tensor(Box<dyn HostTensor>),
}

impl std::fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSource::Decoded(img) => f
                .debug_struct("Decoded")
                .field("width", &img.width())
                .field("height", &img.height())
                .finish(),
            ImageSource::Floats(a) => f.debug_struct("Floats").field("shape", &a.shape()).finish(),
            ImageSource::Bytes(a) => f.debug_struct("Bytes").field("shape", &a.shape()).finish(),
            ImageSource::Tensor(_) => f.write_str("Tensor"),
        }
    }
}

impl ImageSource {
    /// Load an image file from disk.
    pub fn from_path(path: &Path) -> CallResult<Self> {
        let img = image::open(path).map_err(|e| CallError::ImageConversion {
            message: format!("failed to open {}: {e}", path.display()),
        })?;
        Ok(ImageSource::Decoded(img))
    }
}

/// JPEG-encoded image ready for transport.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// JPEG bytes, long edge clamped to 512 px, quality 75
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    /// Return the image as a `data:image/jpeg;base64,...` URL.
    pub fn data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", BASE64.encode(&self.bytes))
    }
}

/// Convert an arbitrary image source into a transport-ready JPEG.
pub fn normalize(source: &ImageSource) -> CallResult<EncodedImage> {
    let img = match source {
        ImageSource::Decoded(img) => img.clone(),
        ImageSource::Floats(arr) => array_to_image(floats_to_bytes(arr))?,
        ImageSource::Bytes(arr) => array_to_image(arr.clone())?,
        ImageSource::Tensor(tensor) => {
            array_to_image(floats_to_bytes(&tensor.to_host_array()))?
        }
    };

    encode_jpeg(&fit_within_bounds(img))
}

/// Rescale [0, 1] floats to 8-bit, clamping out-of-range values.
///
/// Treats all float input as normalized imagery; other ranges are clipped.
fn floats_to_bytes(arr: &ArrayD<f32>) -> ArrayD<u8> {
    arr.mapv(|v| (v * 255.0).clamp(0.0, 255.0) as u8)
}

/// Drop all size-1 axes, keeping at least one.
fn squeeze(mut arr: ArrayD<u8>) -> ArrayD<u8> {
    let mut axis = arr.ndim();
    while axis > 0 {
        axis -= 1;
        if arr.ndim() > 1 && arr.shape()[axis] == 1 {
            arr = arr.index_axis_move(Axis(axis), 0);
        }
    }
    arr
}

/// Interpret a dense 8-bit array as pixels.
///
/// 2-D arrays are grayscale. 3-D arrays with a leading axis of 1, 3, or 4
/// are taken as channel-first and transposed to channel-last; the trailing
/// channel count then selects grayscale, RGB, or RGBA. Anything else is
/// rejected.
fn array_to_image(arr: ArrayD<u8>) -> CallResult<DynamicImage> {
    let mut arr = squeeze(arr);

    if arr.ndim() == 3 && matches!(arr.shape()[0], 1 | 3 | 4) {
        arr = arr.permuted_axes(vec![1, 2, 0]);
    }

    match arr.ndim() {
        2 => {
            let (h, w) = (arr.shape()[0], arr.shape()[1]);
            let data: Vec<u8> = arr.iter().copied().collect();
            GrayImage::from_raw(w as u32, h as u32, data)
                .map(DynamicImage::ImageLuma8)
                .ok_or_else(|| conversion_error(format!("grayscale buffer mismatch: {h}x{w}")))
        }
        3 => {
            let (h, w, ch) = (arr.shape()[0], arr.shape()[1], arr.shape()[2]);
            let data: Vec<u8> = arr.iter().copied().collect();
            match ch {
                1 => GrayImage::from_raw(w as u32, h as u32, data)
                    .map(DynamicImage::ImageLuma8),
                3 => RgbImage::from_raw(w as u32, h as u32, data).map(DynamicImage::ImageRgb8),
                4 => RgbaImage::from_raw(w as u32, h as u32, data)
                    .map(DynamicImage::ImageRgba8),
                other => {
                    return Err(conversion_error(format!("Unsupported channels: {other}")))
                }
            }
            .ok_or_else(|| conversion_error(format!("pixel buffer mismatch: {h}x{w}x{ch}")))
        }
        _ => Err(conversion_error(format!(
            "Cannot handle shape: {:?}",
            arr.shape()
        ))),
    }
}

/// Shrink so neither edge exceeds [`MAX_EDGE`], preserving aspect ratio.
/// Images already within bounds pass through untouched.
fn fit_within_bounds(img: DynamicImage) -> DynamicImage {
    if img.width() > MAX_EDGE || img.height() > MAX_EDGE {
        img.thumbnail(MAX_EDGE, MAX_EDGE)
    } else {
        img
    }
}

/// Encode as JPEG at the fixed quality factor.
///
/// JPEG carries no alpha channel, so RGBA input is flattened to RGB first.
fn encode_jpeg(img: &DynamicImage) -> CallResult<EncodedImage> {
    let flattened;
    let img = if img.color().has_alpha() {
        flattened = DynamicImage::ImageRgb8(img.to_rgb8());
        &flattened
    } else {
        img
    };

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    img.write_with_encoder(encoder)
        .map_err(|e| conversion_error(format!("JPEG encoding failed: {e}")))?;

    Ok(EncodedImage {
        bytes: buffer.into_inner(),
    })
}

fn conversion_error(message: String) -> CallError {
    CallError::ImageConversion { message }
}
