//! TGR file assembly from RGBA frames.
//!
//! The builder collects full-canvas RGBA frames, crops each to its tight
//! non-transparent bounding box, encodes the cropped rows line by line and
//! assembles the `FORM`/`HEDR`/`FRAM` chunk structure with absolute frame
//! offsets. Only 16bpp output is supported; palette-indexed files are
//! decode-only.

use crate::file::colors_ini::ShadeTable;
use crate::file::error::TgrError;
use crate::file::iff::{self, write_chunk};
use crate::file::sprite_ini::SpriteIni;

use super::encode::LineEncoder;
use super::frame::FrameEntry;
use super::pixel::Pixel;
use super::{Animation, Header, constants};

/// A queued frame: padding marker or full-canvas pixels.
#[derive(Debug, Clone)]
enum FrameSource {
	Padding,
	Image(Vec<Pixel>),
}

/// Tight non-transparent bounds of a frame, inclusive corners.
#[derive(Debug, Clone, Copy)]
struct CropBounds {
	x0: u16,
	y0: u16,
	x1: u16,
	y1: u16,
}

impl CropBounds {
	fn width(self) -> usize {
		usize::from(self.x1 - self.x0) + 1
	}

	fn height(self) -> usize {
		usize::from(self.y1 - self.y0) + 1
	}
}

/// Builds a complete TGR file from RGBA frames.
///
/// # Examples
///
/// ```
/// use tgr_types::file::tgr::{FileBuilder, Pixel};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut builder = FileBuilder::new(2, 1);
/// builder.add_frame(vec![Pixel::opaque(255, 0, 0), Pixel::TRANSPARENT])?;
/// let bytes = builder.build()?;
/// assert_eq!(&bytes[8..12], b"TGAR");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FileBuilder<'a> {
	size: (u16, u16),
	bits_per_pixel: u8,
	hotspot: (u16, u16),
	bounding_box: [u16; 4],
	animations: Vec<Animation>,
	shades: Option<&'a ShadeTable>,
	frames: Vec<FrameSource>,
}

impl<'a> FileBuilder<'a> {
	/// Creates a builder for a sprite canvas of the given size.
	pub fn new(width: u16, height: u16) -> Self {
		Self {
			size: (width, height),
			bits_per_pixel: 16,
			hotspot: (0, 0),
			bounding_box: [0; 4],
			animations: Vec::new(),
			shades: None,
			frames: Vec::new(),
		}
	}

	/// Sets the output bit depth. Only 16 is accepted.
	pub fn set_bits_per_pixel(&mut self, bits: u8) -> Result<(), TgrError> {
		if bits != 16 {
			return Err(TgrError::UnsupportedBitDepth(bits));
		}
		self.bits_per_pixel = bits;
		Ok(())
	}

	/// Sets the draw anchor. When left at (0, 0) a default is derived from
	/// the first frame's crop at build time.
	pub fn set_hotspot(&mut self, x: u16, y: u16) {
		self.hotspot = (x, y);
	}

	/// Sets the clickable region.
	pub fn set_bounding_box(&mut self, bounding_box: [u16; 4]) {
		self.bounding_box = bounding_box;
	}

	/// Sets the animation table.
	pub fn set_animations(&mut self, animations: Vec<Animation>) {
		self.animations = animations;
	}

	/// Supplies the active player's shade table so faction-colorable
	/// pixels are encoded as player-color opcodes.
	pub fn set_player_colors(&mut self, shades: &'a ShadeTable) {
		self.shades = Some(shades);
	}

	/// Applies sprite.ini repack metadata: bit depth, hotspot, bounding
	/// box and animations. Padding frames stay positional and are added
	/// through [`FileBuilder::add_padding_frame`].
	pub fn apply_sprite_ini(&mut self, ini: &SpriteIni) -> Result<(), TgrError> {
		self.set_bits_per_pixel(ini.bit_depth)?;
		self.hotspot = ini.hotspot;
		self.bounding_box = ini.bounding_box;
		self.animations.clone_from(&ini.animations);
		Ok(())
	}

	/// Queues a full-canvas RGBA frame.
	pub fn add_frame(&mut self, pixels: Vec<Pixel>) -> Result<(), TgrError> {
		let expected = usize::from(self.size.0) * usize::from(self.size.1);
		if pixels.len() != expected {
			return Err(TgrError::InsufficientData {
				expected,
				actual: pixels.len(),
			});
		}
		self.frames.push(FrameSource::Image(pixels));
		Ok(())
	}

	/// Queues a padding frame (a descriptor with no pixel data).
	pub fn add_padding_frame(&mut self) {
		self.frames.push(FrameSource::Padding);
	}

	/// Returns the number of queued frames.
	pub fn frame_count(&self) -> usize {
		self.frames.len()
	}

	/// Finds the tight bounds of pixels with alpha above zero. A fully
	/// transparent frame collapses to a 1×1 crop at the origin.
	fn crop_bounds(&self, pixels: &[Pixel]) -> CropBounds {
		let width = usize::from(self.size.0);
		let mut bounds: Option<CropBounds> = None;
		for (i, pixel) in pixels.iter().enumerate() {
			if pixel.a == 0 {
				continue;
			}
			let x = (i % width) as u16;
			let y = (i / width) as u16;
			bounds = Some(match bounds {
				None => CropBounds {
					x0: x,
					y0: y,
					x1: x,
					y1: y,
				},
				Some(b) => CropBounds {
					x0: b.x0.min(x),
					y0: b.y0.min(y),
					x1: b.x1.max(x),
					y1: b.y1.max(y),
				},
			});
		}
		bounds.unwrap_or(CropBounds {
			x0: 0,
			y0: 0,
			x1: 0,
			y1: 0,
		})
	}

	/// Encodes one cropped frame into a FRAM chunk body, padded to a
	/// 4-byte boundary.
	fn encode_frame(
		&self,
		frame_index: usize,
		pixels: &[Pixel],
		crop: CropBounds,
	) -> Result<Vec<u8>, TgrError> {
		let canvas_width = usize::from(self.size.0);
		let encoder = LineEncoder::new(self.shades);
		let mut body = Vec::new();

		for (line_index, y) in (crop.y0..=crop.y1).enumerate() {
			let start = usize::from(y) * canvas_width + usize::from(crop.x0);
			let row = &pixels[start..start + crop.width()];
			let line =
				encoder.encode_line(row).map_err(|e| e.in_line(frame_index, line_index))?;
			body.extend_from_slice(&line);
		}

		while body.len() % 4 != 0 {
			body.push(0);
		}
		Ok(body)
	}

	/// Hotspot fallback: center-bottom of the first frame's crop.
	fn effective_hotspot(&self, first_crop: Option<CropBounds>) -> (u16, u16) {
		if self.hotspot != (0, 0) {
			return self.hotspot;
		}
		match first_crop {
			Some(crop) if self.frames.len() > 1 => {
				((crop.width() / 2) as u16 + crop.x0, crop.height() as u16)
			}
			_ => (0, 0),
		}
	}

	/// Encodes every queued frame and assembles the file.
	pub fn build(&self) -> Result<Vec<u8>, TgrError> {
		if self.bits_per_pixel != 16 {
			return Err(TgrError::UnsupportedBitDepth(self.bits_per_pixel));
		}

		let mut bodies: Vec<Option<(CropBounds, Vec<u8>)>> = Vec::with_capacity(self.frames.len());
		for (frame_index, source) in self.frames.iter().enumerate() {
			match source {
				FrameSource::Padding => bodies.push(None),
				FrameSource::Image(pixels) => {
					let crop = self.crop_bounds(pixels);
					let body = self.encode_frame(frame_index, pixels, crop)?;
					bodies.push(Some((crop, body)));
				}
			}
		}

		// Absolute offsets: FORM header, HEDR chunk, then one FRAM chunk
		// per non-padding frame
		let placeholder = vec![FrameEntry::padding(); self.frames.len()];
		let header_size = self.header_with_entries(placeholder, (0, 0)).byte_size();
		let mut running = 12 + 8 + header_size as u32 + 8;

		let mut entries = Vec::with_capacity(self.frames.len());
		for body in &bodies {
			match body {
				None => entries.push(FrameEntry::padding()),
				Some((crop, body)) => {
					entries.push(FrameEntry::new(crop.x0, crop.y0, crop.x1, crop.y1, running));
					running += body.len() as u32 + 8;
				}
			}
		}

		let first_crop = bodies.iter().flatten().map(|(crop, _)| *crop).next();
		let hotspot = self.effective_hotspot(first_crop);
		let header = self.header_with_entries(entries, hotspot);

		let mut children = Vec::new();
		write_chunk(&mut children, constants::HEDR_ID, &header.to_bytes());
		for (_, body) in bodies.iter().flatten() {
			write_chunk(&mut children, constants::FRAM_ID, body);
		}

		let mut out = Vec::with_capacity(12 + children.len());
		out.extend_from_slice(&iff::FORM_ID);
		out.extend_from_slice(&((children.len() + 4) as u32).to_be_bytes());
		out.extend_from_slice(&constants::FORM_TYPE);
		out.extend_from_slice(&children);
		Ok(out)
	}

	fn header_with_entries(&self, entries: Vec<FrameEntry>, hotspot: (u16, u16)) -> Header {
		Header {
			version: constants::VERSION,
			bits_per_pixel: self.bits_per_pixel,
			index_mode: 0,
			offset_flag: 0,
			size: self.size,
			hotspot,
			bounding_box: self.bounding_box,
			entries,
			animations: self.animations.clone(),
		}
	}
}
