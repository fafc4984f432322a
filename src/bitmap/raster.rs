use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{PictorError, PictorResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Row-major pixel buffer geometry.
pub struct PixelLayout {
    /// Bytes per pixel. Always 4 in the canonical RGBA8888 layout.
    pub stride: usize,
    /// Bytes per row.
    pub pitch: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Encoder options for [`Bitmap::save`].
pub struct SaveOptions {
    /// Codec hint ("png", "jpeg", ...) used when the target extension is
    /// ambiguous.
    pub format: Option<String>,
    /// Codec-defined compression/quality level. JPEG reads it as quality
    /// 0-100, PNG as a compression tier; negative means codec default.
    pub compression: i32,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            format: None,
            compression: -1,
        }
    }
}

/// Mutable accessor for the pixel currently exposed to a traversal
/// callback. Scoped to that single invocation; overwrites land in the
/// bitmap before the traversal advances.
pub struct PixelSlot<'a> {
    pixel: &'a mut image::Rgba<u8>,
}

impl PixelSlot<'_> {
    /// Overwrite the exposed pixel in place.
    pub fn set(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.pixel.0 = [r, g, b, a];
    }

    /// Re-read the exposed pixel.
    pub fn get(&self) -> [u8; 4] {
        self.pixel.0
    }
}

/// One decoded image: fixed geometry plus its pixel buffer.
///
/// Pixels stay in whatever layout the decoder produced until the first
/// pixel-level access converts them to canonical row-major RGBA8888. From
/// that point the buffer and its layout are stable for the bitmap's
/// lifetime.
pub struct Bitmap {
    width: u32,
    height: u32,
    data: BitmapData,
}

enum BitmapData {
    /// As decoded; not yet in the canonical layout.
    Source(image::DynamicImage),
    /// Canonical row-major RGBA8888.
    Canonical(image::RgbaImage),
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("canonical", &matches!(self.data, BitmapData::Canonical(_)))
            .finish()
    }
}

impl Bitmap {
    /// Decode the image at `path`.
    ///
    /// Fails with [`PictorError::FileNotFound`] when the path does not
    /// resolve to a file and [`PictorError::Decode`] when the codec rejects
    /// the bytes or produces an empty result.
    pub fn load(path: impl AsRef<Path>) -> PictorResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PictorError::FileNotFound);
        }
        let bytes = std::fs::read(path)
            .with_context(|| format!("read image bytes from '{}'", path.display()))?;
        let decoded =
            image::load_from_memory(&bytes).map_err(|err| PictorError::decode(err.to_string()))?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(PictorError::decode("decoder produced an empty image"));
        }
        Ok(Self::from_decoded(decoded))
    }

    /// Allocate a blank bitmap with a zeroed canonical RGBA8888 buffer.
    pub fn allocate(width: u32, height: u32) -> PictorResult<Self> {
        if width < 1 || height < 1 {
            return Err(PictorError::InvalidDimensions);
        }
        Ok(Self {
            width,
            height,
            data: BitmapData::Canonical(image::RgbaImage::new(width, height)),
        })
    }

    /// Wrap an already-decoded image without re-decoding it.
    pub fn from_decoded(decoded: image::DynamicImage) -> Self {
        Self {
            width: decoded.width(),
            height: decoded.height(),
            data: BitmapData::Source(decoded),
        }
    }

    /// Width and height in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn canonical(&mut self) -> &mut image::RgbaImage {
        if let BitmapData::Source(src) = &mut self.data {
            let src = std::mem::replace(src, image::DynamicImage::new_rgba8(0, 0));
            self.data = BitmapData::Canonical(src.into_rgba8());
        }
        match &mut self.data {
            BitmapData::Canonical(img) => img,
            BitmapData::Source(_) => unreachable!("source variant replaced above"),
        }
    }

    /// Channel values of the pixel at `(x, y)`.
    ///
    /// Fails with [`PictorError::OutOfBounds`] for any coordinate outside
    /// the bitmap; the buffer is never read in that case.
    pub fn get_pixel(&mut self, x: u32, y: u32) -> PictorResult<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return Err(PictorError::OutOfBounds);
        }
        Ok(self.canonical().get_pixel(x, y).0)
    }

    /// Row-major pixel traversal.
    ///
    /// Visits every pixel exactly once, ascending `y` then ascending `x`.
    /// The callback receives a [`PixelSlot`] for the exposed pixel followed
    /// by its channel values and coordinates. Converts to the canonical
    /// layout first if not already done.
    pub fn traverse<F>(&mut self, mut cb: F)
    where
        F: FnMut(&mut PixelSlot<'_>, u8, u8, u8, u8, u32, u32),
    {
        let (width, height) = (self.width, self.height);
        let img = self.canonical();
        for y in 0..height {
            for x in 0..width {
                let pixel = img.get_pixel_mut(x, y);
                let [r, g, b, a] = pixel.0;
                let mut slot = PixelSlot { pixel };
                cb(&mut slot, r, g, b, a, x, y);
            }
        }
    }

    /// Raw canonical pixel bytes plus their layout, for collaborators that
    /// blit directly. Converts to the canonical layout first if needed.
    pub fn pixel_bytes(&mut self) -> (&mut [u8], PixelLayout) {
        let layout = PixelLayout {
            stride: 4,
            pitch: self.width as usize * 4,
        };
        (&mut **self.canonical(), layout)
    }

    /// Encode to `path`.
    ///
    /// The target format comes from `options.format` when set, otherwise
    /// from the path extension. Any encode failure is reported as
    /// [`PictorError::Encode`].
    pub fn save(&mut self, path: impl AsRef<Path>, options: &SaveOptions) -> PictorResult<()> {
        let path = path.as_ref();
        let format = match &options.format {
            Some(hint) => image::ImageFormat::from_extension(hint),
            None => image::ImageFormat::from_path(path).ok(),
        }
        .ok_or(PictorError::Encode)?;
        let compression = options.compression;
        let img = self.canonical();
        encode_to_path(img, path, format, compression).map_err(|err| {
            tracing::debug!(error = %err, path = %path.display(), "image encode failed");
            PictorError::Encode
        })
    }
}

fn encode_to_path(
    img: &image::RgbaImage,
    path: &Path,
    format: image::ImageFormat,
    compression: i32,
) -> anyhow::Result<()> {
    use image::ImageEncoder as _;
    use std::io::Write as _;

    let file =
        std::fs::File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);

    match format {
        image::ImageFormat::Jpeg => {
            // JPEG carries no alpha channel; encode from flattened RGB.
            let mut rgb = Vec::with_capacity(img.width() as usize * img.height() as usize * 3);
            for pixel in img.pixels() {
                rgb.extend_from_slice(&pixel.0[..3]);
            }
            let quality = if compression < 0 {
                75
            } else {
                compression.clamp(0, 100) as u8
            };
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, quality);
            encoder.write_image(
                &rgb,
                img.width(),
                img.height(),
                image::ExtendedColorType::Rgb8,
            )?;
        }
        image::ImageFormat::Png => {
            use image::codecs::png::CompressionType;

            let level = if compression < 0 {
                CompressionType::Default
            } else if compression >= 67 {
                CompressionType::Best
            } else if compression >= 34 {
                CompressionType::Default
            } else {
                CompressionType::Fast
            };
            let encoder = image::codecs::png::PngEncoder::new_with_quality(
                &mut writer,
                level,
                image::codecs::png::FilterType::Adaptive,
            );
            encoder.write_image(
                img.as_raw(),
                img.width(),
                img.height(),
                image::ExtendedColorType::Rgba8,
            )?;
        }
        other => {
            img.write_to(&mut writer, other)
                .with_context(|| format!("encode as {other:?}"))?;
        }
    }

    writer.flush().context("flush encoded image")?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/raster.rs"]
mod tests;
