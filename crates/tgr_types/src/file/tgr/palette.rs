//! PALT chunk palette for indexed-color TGR files.
//!
//! The chunk body is a little-endian u16 entry count followed by that many
//! little-endian RGB565 entries. 8bpp frames index into this table.

use std::io::Read;

use crate::file::error::{TgrError, read_exact};

use super::pixel::Pixel;

/// Color table loaded from a `PALT` chunk.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
	colors: Vec<Pixel>,
}

impl Palette {
	/// Creates an empty palette.
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads a palette from a `PALT` chunk body.
	pub fn from_bytes(data: &[u8]) -> Result<Self, TgrError> {
		let mut cursor = std::io::Cursor::new(data);
		Self::from_reader(&mut cursor)
	}

	/// Loads a palette from any reader positioned at the entry count.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, TgrError> {
		let mut raw_count = [0u8; 2];
		read_exact(reader, &mut raw_count, "palette entry count")?;
		let count = u16::from_le_bytes(raw_count);

		let mut colors = Vec::with_capacity(count as usize);
		for _ in 0..count {
			let mut raw = [0u8; 2];
			read_exact(reader, &mut raw, "palette entry")?;
			colors.push(Pixel::from_rgb565(u16::from_le_bytes(raw)));
		}

		Ok(Self {
			colors,
		})
	}

	/// Serializes the palette back to a `PALT` chunk body.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut data = Vec::with_capacity(2 + self.colors.len() * 2);
		data.extend_from_slice(&(self.colors.len() as u16).to_le_bytes());
		for color in &self.colors {
			data.extend_from_slice(&color.to_rgb565().to_le_bytes());
		}
		data
	}

	/// Gets a color by index.
	#[inline]
	pub fn get(&self, index: u8) -> Option<Pixel> {
		self.colors.get(index as usize).copied()
	}

	/// Appends a color to the palette.
	pub fn push(&mut self, color: Pixel) {
		self.colors.push(color);
	}

	/// Returns the number of entries.
	#[inline]
	pub fn len(&self) -> usize {
		self.colors.len()
	}

	/// Returns true if the palette has no entries.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}

	/// Returns an iterator over the palette colors.
	pub fn iter(&self) -> impl Iterator<Item = &Pixel> {
		self.colors.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_roundtrip() {
		let mut palette = Palette::new();
		palette.push(Pixel::opaque(255, 0, 0));
		palette.push(Pixel::opaque(0, 255, 0));
		palette.push(Pixel::opaque(0, 0, 255));

		let bytes = palette.to_bytes();
		assert_eq!(&bytes[0..2], &[3, 0]);
		assert_eq!(&bytes[2..4], &0xF800u16.to_le_bytes());

		let loaded = Palette::from_bytes(&bytes).unwrap();
		assert_eq!(loaded, palette);
	}

	#[test]
	fn test_truncated() {
		// Count says two entries, body carries one
		let data = [2u8, 0, 0x00, 0xF8];
		let err = Palette::from_bytes(&data).unwrap_err();
		assert!(matches!(err, TgrError::TruncatedStream { .. }));
	}

	#[test]
	fn test_get_out_of_range() {
		let mut palette = Palette::new();
		palette.push(Pixel::opaque(1, 2, 3));
		assert!(palette.get(0).is_some());
		assert!(palette.get(1).is_none());
	}
}
