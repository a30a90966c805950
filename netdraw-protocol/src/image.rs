//! Image payloads carried by `draw image`.
//!
//! Payloads are PNG files. They are decoded to RGBA8 only when dispatched, so
//! the parser never has to know about image formats.

use crate::sink::SinkError;

/// Decoded RGBA8 raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// Row-major, 4 bytes per pixel
    pub pixels: Vec<u8>,
}

impl Image {
    /// Decode a PNG payload, normalizing every color type to RGBA8.
    pub fn decode(data: &[u8]) -> Result<Image, SinkError> {
        let mut decoder = png::Decoder::new(data);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder
            .read_info()
            .map_err(|e| SinkError::Image(e.to_string()))?;

        let mut buf = vec![0u8; reader.output_buffer_size()];
        let info = reader
            .next_frame(&mut buf)
            .map_err(|e| SinkError::Image(e.to_string()))?;
        buf.truncate(info.buffer_size());

        if info.bit_depth != png::BitDepth::Eight {
            return Err(SinkError::Image(format!(
                "unsupported bit depth {:?}",
                info.bit_depth
            )));
        }

        let pixels: Vec<u8> = match info.color_type {
            png::ColorType::Rgba => buf,
            png::ColorType::Rgb => buf
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            png::ColorType::GrayscaleAlpha => buf
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
            png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, 255]).collect(),
            png::ColorType::Indexed => {
                return Err(SinkError::Image("palette was not expanded".to_string()));
            }
        };

        Ok(Image {
            width: info.width,
            height: info.height,
            pixels,
        })
    }

    /// RGBA value at (x, y). Caller guarantees bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Encode an RGB8 buffer as PNG.
    pub fn encode_png(width: u32, height: u32, rgb: &[u8]) -> Result<Vec<u8>, SinkError> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| SinkError::Image(e.to_string()))?;
            writer
                .write_image_data(rgb)
                .map_err(|e| SinkError::Image(e.to_string()))?;
            writer
                .finish()
                .map_err(|e| SinkError::Image(e.to_string()))?;
        }
        Ok(out)
    }
}
