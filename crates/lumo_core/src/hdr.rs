//! Floating-point images and the PFM interchange format.
//!
//! A PFM file is a textual header (`PF`, `width height`, an endianness
//! marker) followed by raw 32-bit float triples, stored bottom row first.
//! `1.0` marks big-endian payloads, `-1.0` little-endian ones.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

use crate::color::{luminosity, Color};

/// Byte order of a PFM float payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    LittleEndian,
    BigEndian,
}

/// Errors raised while decoding or encoding image files.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("invalid magic in PFM file")]
    InvalidMagic,

    #[error("invalid image size specification '{0}'")]
    InvalidImageSize(String),

    #[error("invalid endianness specification '{0}'")]
    InvalidEndianness(String),

    #[error("PFM payload size mismatch: expected {expected} bytes, got {actual}")]
    PayloadSizeMismatch { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// A High-Dynamic-Range 2D image.
///
/// Pixels are row-major with the origin at the top-left corner. The buffer
/// is created at a fixed resolution and never resized.
#[derive(Debug, Clone, PartialEq)]
pub struct HdrImage {
    pub width: u32,
    pub height: u32,
    pixels: Vec<Color>,
}

impl HdrImage {
    /// Create a black image with the specified resolution.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Return true if `(x, y)` lies within the pixel matrix.
    pub fn valid_coordinates(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Position of pixel `(x, y)` in the flat buffer.
    #[inline]
    fn pixel_offset(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Get the color of the pixel at `(x, y)`; the top-left pixel is (0, 0).
    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        assert!(self.valid_coordinates(x, y));
        self.pixels[self.pixel_offset(x, y)]
    }

    /// Set the color of the pixel at `(x, y)`; the top-left pixel is (0, 0).
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        assert!(self.valid_coordinates(x, y));
        let offset = self.pixel_offset(x, y);
        self.pixels[offset] = color;
    }

    /// Write the image as a PFM stream with the requested byte order.
    pub fn write_pfm<W: Write>(
        &self,
        stream: &mut W,
        endianness: Endianness,
    ) -> Result<(), FormatError> {
        let endianness_str = match endianness {
            Endianness::LittleEndian => "-1.0",
            Endianness::BigEndian => "1.0",
        };
        write!(stream, "PF\n{} {}\n{}\n", self.width, self.height, endianness_str)?;

        // Bottom row first, left to right
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let color = self.get_pixel(x, y);
                for value in [color.x, color.y, color.z] {
                    match endianness {
                        Endianness::LittleEndian => stream.write_f32::<LittleEndian>(value)?,
                        Endianness::BigEndian => stream.write_f32::<BigEndian>(value)?,
                    }
                }
            }
        }

        Ok(())
    }

    /// Average luminosity of the image, computed in log space.
    ///
    /// `delta` keeps the logarithm finite for pitch-black pixels.
    pub fn average_luminosity(&self, delta: f32) -> f32 {
        let cumsum: f32 = self
            .pixels
            .iter()
            .map(|&pix| (delta + luminosity(pix)).log10())
            .sum();
        10.0_f32.powf(cumsum / self.pixels.len() as f32)
    }

    /// Rescale every pixel by `factor / luminosity`.
    ///
    /// When `luminosity` is `None`, the image's own average luminosity is
    /// used as the reference.
    pub fn normalize_image(&mut self, factor: f32, luminosity: Option<f32>) {
        let luminosity = luminosity.unwrap_or_else(|| self.average_luminosity(1e-10));
        log::debug!("normalizing image against luminosity {luminosity}");
        for pixel in &mut self.pixels {
            *pixel *= factor / luminosity;
        }
    }

    /// Compress unbounded radiance into [0, 1) with `x / (1 + x)`.
    pub fn clamp_image(&mut self) {
        for pixel in &mut self.pixels {
            *pixel = Color::new(
                pixel.x / (1.0 + pixel.x),
                pixel.y / (1.0 + pixel.y),
                pixel.z / (1.0 + pixel.z),
            );
        }
    }

    /// Quantize the image to 8 bits per channel and save it.
    ///
    /// The output format is chosen from the file extension. Run
    /// `normalize_image` and `clamp_image` first so every channel lies in
    /// [0, 1]; `gamma` is applied as the exponent `1 / gamma` right before
    /// quantization.
    pub fn write_ldr_image(&self, path: &Path, gamma: f32) -> Result<(), FormatError> {
        let ldr = image::RgbImage::from_fn(self.width, self.height, |x, y| {
            let color = self.get_pixel(x, y);
            image::Rgb([
                (255.0 * color.x.powf(1.0 / gamma)) as u8,
                (255.0 * color.y.powf(1.0 / gamma)) as u8,
                (255.0 * color.z.powf(1.0 / gamma)) as u8,
            ])
        });
        ldr.save(path)?;
        log::info!("LDR image written to {}", path.display());
        Ok(())
    }
}

/// Read one header line, without the trailing newline.
fn read_line<R: Read>(stream: &mut R) -> Result<String, FormatError> {
    let mut bytes = Vec::new();
    loop {
        let mut buf = [0u8; 1];
        match stream.read(&mut buf)? {
            0 => break,
            _ if buf[0] == b'\n' => break,
            _ => bytes.push(buf[0]),
        }
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn parse_img_size(line: &str) -> Result<(u32, u32), FormatError> {
    let invalid = || FormatError::InvalidImageSize(line.to_string());
    let mut elements = line.split(' ');

    let width: u32 = elements
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(invalid)?;
    let height: u32 = elements
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(invalid)?;
    if elements.next().is_some() {
        return Err(invalid());
    }

    Ok((width, height))
}

fn parse_endianness(line: &str) -> Result<Endianness, FormatError> {
    match line.parse::<f32>() {
        Ok(value) if value == 1.0 => Ok(Endianness::BigEndian),
        Ok(value) if value == -1.0 => Ok(Endianness::LittleEndian),
        _ => Err(FormatError::InvalidEndianness(line.to_string())),
    }
}

/// Read a PFM image from a stream.
///
/// The whole payload is validated against `width * height * 3 * 4` bytes
/// before any pixel is decoded, so a malformed file never yields a partial
/// image.
pub fn read_pfm_image<R: Read>(stream: &mut R) -> Result<HdrImage, FormatError> {
    let magic = read_line(stream)?;
    if magic != "PF" {
        return Err(FormatError::InvalidMagic);
    }

    let (width, height) = parse_img_size(&read_line(stream)?)?;
    let endianness = parse_endianness(&read_line(stream)?)?;

    let mut payload = Vec::new();
    stream.read_to_end(&mut payload)?;
    // Widened arithmetic: huge header dimensions must fail the size
    // check, not overflow the multiply.
    let expected = width as usize * height as usize * 3 * 4;
    if payload.len() != expected {
        return Err(FormatError::PayloadSizeMismatch {
            expected,
            actual: payload.len(),
        });
    }

    let mut cursor = Cursor::new(payload);
    let mut result = HdrImage::new(width, height);
    for y in (0..height).rev() {
        for x in 0..width {
            let mut channels = [0.0f32; 3];
            for channel in &mut channels {
                *channel = match endianness {
                    Endianness::LittleEndian => cursor.read_f32::<LittleEndian>()?,
                    Endianness::BigEndian => cursor.read_f32::<BigEndian>()?,
                };
            }
            result.set_pixel(x, y, Color::from_array(channels));
        }
    }

    Ok(result)
}
