//! Frame structures: descriptor table entries and per-line spans.

use std::fmt;
use std::io::{Read, Seek, SeekFrom};

use crate::file::error::TgrError;

use super::line::Line;
use super::pixel::Pixel;

/// One entry of the HEDR frame table (12 bytes on disk).
///
/// Corner coordinates are relative to the sprite canvas; `offset` is the
/// absolute file offset of the frame's first line header. An offset of
/// zero marks a padding frame carrying no pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEntry {
	/// Upper-left X of the cropped frame on the canvas
	pub ulx: u16,
	/// Upper-left Y
	pub uly: u16,
	/// Lower-right X (inclusive)
	pub lrx: u16,
	/// Lower-right Y (inclusive)
	pub lry: u16,
	/// Absolute offset of the frame data; 0 for padding frames
	pub offset: u32,
}

impl FrameEntry {
	/// Creates a new frame entry.
	pub fn new(ulx: u16, uly: u16, lrx: u16, lry: u16, offset: u32) -> Self {
		Self {
			ulx,
			uly,
			lrx,
			lry,
			offset,
		}
	}

	/// Creates a padding-frame entry.
	pub fn padding() -> Self {
		Self::new(0xFFFF, 0xFFFF, 0xFFFF, 0xFFFF, 0)
	}

	/// Returns true for padding frames (no pixel data).
	#[inline]
	pub fn is_padding(&self) -> bool {
		self.offset == 0
	}

	/// Frame width in pixels (corners are inclusive).
	#[inline]
	pub fn width(&self) -> u32 {
		1 + u32::from(self.lrx.saturating_sub(self.ulx))
	}

	/// Frame height in pixels, which is also its line count.
	#[inline]
	pub fn height(&self) -> u32 {
		1 + u32::from(self.lry.saturating_sub(self.uly))
	}

	/// Returns the total number of pixels in this frame.
	#[inline]
	pub fn pixel_count(&self) -> usize {
		self.width() as usize * self.height() as usize
	}
}

impl fmt::Display for FrameEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_padding() {
			write!(f, "padding frame")
		} else {
			write!(
				f,
				"{}×{} at ({}, {}), offset 0x{:08X}",
				self.width(),
				self.height(),
				self.ulx,
				self.uly,
				self.offset
			)
		}
	}
}

/// A frame's parsed line table.
///
/// Parsing a frame only walks the line headers; the opcode streams stay in
/// the file and are decoded on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
	entry: FrameEntry,
	lines: Vec<Line>,
}

impl Frame {
	/// Walks a frame's lines from a reader positioned at the first line
	/// header. One line is read per raster row; after each header the
	/// reader seeks past the opcode stream to the next header.
	pub fn from_reader<R: Read + Seek>(reader: &mut R, entry: FrameEntry) -> Result<Self, TgrError> {
		let height = entry.height() as usize;
		let mut lines = Vec::with_capacity(height);
		while lines.len() < height {
			let line = Line::from_reader(reader)?;
			reader.seek(SeekFrom::Start(line.end_offset()))?;
			lines.push(line);
		}

		Ok(Self {
			entry,
			lines,
		})
	}

	/// Creates a padding frame with no lines.
	pub fn padding(entry: FrameEntry) -> Self {
		Self {
			entry,
			lines: Vec::new(),
		}
	}

	/// Returns a reference to the frame entry.
	#[inline]
	pub fn entry(&self) -> &FrameEntry {
		&self.entry
	}

	/// Returns the parsed line descriptors.
	#[inline]
	pub fn lines(&self) -> &[Line] {
		&self.lines
	}

	/// Returns true for padding frames.
	#[inline]
	pub fn is_padding(&self) -> bool {
		self.lines.is_empty()
	}
}

impl fmt::Display for Frame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({} lines)", self.entry, self.lines.len())
	}
}

/// A fully decoded frame: a rectangle of expanded RGBA pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameImage {
	width: usize,
	height: usize,
	pixels: Vec<Pixel>,
}

impl FrameImage {
	/// Creates a frame image from decoded rows.
	///
	/// # Panics
	///
	/// Panics if `pixels.len() != width * height`.
	pub fn new(width: usize, height: usize, pixels: Vec<Pixel>) -> Self {
		assert_eq!(pixels.len(), width * height, "pixel data size mismatch");
		Self {
			width,
			height,
			pixels,
		}
	}

	/// Creates an empty image (used for padding frames).
	pub fn empty() -> Self {
		Self {
			width: 0,
			height: 0,
			pixels: Vec::new(),
		}
	}

	/// Image width in pixels.
	#[inline]
	pub fn width(&self) -> usize {
		self.width
	}

	/// Image height in pixels.
	#[inline]
	pub fn height(&self) -> usize {
		self.height
	}

	/// Row-major pixel data.
	#[inline]
	pub fn pixels(&self) -> &[Pixel] {
		&self.pixels
	}

	/// Returns the pixel at the given coordinates, or None when out of
	/// bounds.
	pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
		if x >= self.width || y >= self.height {
			return None;
		}
		self.pixels.get(y * self.width + x).copied()
	}

	/// Returns an iterator over the image rows.
	pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
		self.pixels.chunks_exact(self.width.max(1))
	}
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use crate::file::tgr::LineEncoder;
	use crate::file::tgr::line::pack_line;

	use super::*;

	#[test]
	fn test_entry_dimensions() {
		let entry = FrameEntry::new(4, 10, 7, 11, 0x100);
		assert_eq!(entry.width(), 4);
		assert_eq!(entry.height(), 2);
		assert_eq!(entry.pixel_count(), 8);
		assert!(!entry.is_padding());
		assert!(FrameEntry::padding().is_padding());
	}

	#[test]
	fn test_walk_lines() {
		// Two encoded lines back to back
		let encoder = LineEncoder::new(None);
		let row_a = vec![Pixel::opaque(255, 0, 0); 3];
		let row_b = vec![Pixel::TRANSPARENT, Pixel::opaque(0, 255, 0), Pixel::TRANSPARENT];
		let mut data = encoder.encode_line(&row_a).unwrap();
		let first_len = data.len() as u64;
		data.extend(encoder.encode_line(&row_b).unwrap());

		let entry = FrameEntry::new(0, 0, 2, 1, 1);
		let mut cursor = Cursor::new(data.as_slice());
		let frame = Frame::from_reader(&mut cursor, entry).unwrap();

		assert_eq!(frame.lines().len(), 2);
		assert_eq!(frame.lines()[0].pixel_length, 3);
		assert_eq!(frame.lines()[1].transparent_pixels, 1);
		assert_eq!(frame.lines()[1].data_offset, first_len + 3);
	}

	#[test]
	fn test_walk_lines_truncated() {
		let packed = pack_line(&[0b101_00001], 1, 0).unwrap();
		let entry = FrameEntry::new(0, 0, 0, 1, 1); // two lines, data holds one
		let mut cursor = Cursor::new(packed.as_slice());
		assert!(matches!(
			Frame::from_reader(&mut cursor, entry).unwrap_err(),
			TgrError::TruncatedStream { .. }
		));
	}

	#[test]
	fn test_frame_image_access() {
		let image = FrameImage::new(
			2,
			2,
			vec![
				Pixel::opaque(1, 0, 0),
				Pixel::opaque(2, 0, 0),
				Pixel::opaque(3, 0, 0),
				Pixel::opaque(4, 0, 0),
			],
		);
		assert_eq!(image.get(1, 1), Some(Pixel::opaque(4, 0, 0)));
		assert_eq!(image.get(2, 0), None);
		assert_eq!(image.rows().count(), 2);
	}
}
