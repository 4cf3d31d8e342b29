//! Line opcode stream decoder.
//!
//! A line is a byte stream of operations, each introduced by a single
//! header byte whose top 3 bits select the operation and whose low 5 bits
//! carry a count (or, for some operations, an inline value):
//!
//! | Flag  | Operation          | Payload                | Output |
//! |-------|--------------------|------------------------|--------|
//! | `000` | transparent run    | none                   | `n` transparent pixels |
//! | `001` | solid run          | one pixel              | `n` copies |
//! | `010` | literal run        | `n` pixels             | the pixels, opaque |
//! | `011` | translucent run    | alpha byte + one pixel | `n` copies with alpha |
//! | `100` | single translucent | one pixel              | one pixel, alpha in `n` |
//! | `101` | shadow run         | none                   | `n` shadow pixels |
//! | `110` | player pixel       | none                   | shade `n` of the player ramp |
//! | `111` | player variants    | see below              | player pixels |
//!
//! Flag `111` splits on `n`: above 27 it is a single translucent player
//! pixel whose payload byte packs the high shade bits and a 5-bit alpha;
//! otherwise `(n + 1) / 2` payload bytes each carry two odd-shade player
//! pixels, with the trailing half dropped for odd `n`.
//!
//! A "pixel" in the payload is two little-endian RGB565 bytes at 16bpp or
//! a single palette index byte at 8bpp.

use std::io::Read;

use log::debug;

use crate::file::colors_ini::ShadeTable;
use crate::file::error::{TgrError, read_exact};

use super::line::Line;
use super::palette::Palette;
use super::pixel::Pixel;
use super::{ColorMode, opcodes};

/// Splits an operation header byte into its flag and count fields.
#[inline]
pub(crate) fn split_op(byte: u8) -> (u8, u8) {
	(byte >> 5, byte & 0x1F)
}

/// Decodes line opcode streams against a fixed color configuration.
///
/// The decoder itself is stateless across lines; one instance can decode
/// every line of a frame, or of a whole file.
#[derive(Debug, Clone, Copy)]
pub struct LineDecoder<'a> {
	mode: ColorMode,
	palette: Option<&'a Palette>,
	shades: Option<&'a ShadeTable>,
	player: u8,
}

impl<'a> LineDecoder<'a> {
	/// Creates a decoder.
	///
	/// # Errors
	///
	/// Returns [`TgrError::PaletteMissing`] when `mode` is indexed and no
	/// palette is supplied.
	pub fn new(
		mode: ColorMode,
		palette: Option<&'a Palette>,
		shades: Option<&'a ShadeTable>,
		player: u8,
	) -> Result<Self, TgrError> {
		if mode == ColorMode::Indexed && palette.is_none() {
			return Err(TgrError::PaletteMissing);
		}
		Ok(Self {
			mode,
			palette,
			shades,
			player,
		})
	}

	/// Reads one payload pixel: two RGB565 bytes at 16bpp, one palette
	/// index at 8bpp. Always opaque.
	fn read_pixel<R: Read>(&self, reader: &mut R) -> Result<Pixel, TgrError> {
		match self.mode {
			ColorMode::Rgb565 => {
				let mut raw = [0u8; 2];
				read_exact(reader, &mut raw, "pixel")?;
				Ok(Pixel::from_rgb565(u16::from_le_bytes(raw)))
			}
			ColorMode::Indexed => {
				let mut raw = [0u8; 1];
				read_exact(reader, &mut raw, "palette index")?;
				// new() guarantees the palette is present in indexed mode
				let palette = self.palette.ok_or(TgrError::PaletteMissing)?;
				palette.get(raw[0]).ok_or(TgrError::InvalidPaletteIndex {
					index: raw[0],
					count: palette.len(),
				})
			}
		}
	}

	fn player_color(&self, shade: u8) -> Result<Pixel, TgrError> {
		self.shades.and_then(|table| table.get(shade)).ok_or(TgrError::UnknownPlayerColor {
			player: self.player,
			shade,
		})
	}

	/// Decodes one line from a reader positioned at its opcode stream.
	///
	/// Emits the header's transparent prefix, runs the opcode loop for
	/// exactly [`Line::data_length`] bytes, then pads with transparent
	/// pixels up to [`Line::pixel_length`]. A run that over-produces is
	/// emitted whole; callers clip at the frame width.
	pub fn decode_line<R: Read>(&self, reader: &mut R, line: &Line) -> Result<Vec<Pixel>, TgrError> {
		let bytes_per_pixel = self.mode.bytes_per_pixel();
		let data_length = usize::from(line.data_length);

		let mut out = Vec::with_capacity(usize::from(line.pixel_length));
		out.resize(usize::from(line.transparent_pixels), Pixel::TRANSPARENT);

		let mut consumed = 0;
		while consumed < data_length {
			let mut op = [0u8; 1];
			read_exact(reader, &mut op, "opcode")?;
			consumed += 1;
			let (flag, n) = split_op(op[0]);
			let count = usize::from(n);

			match flag {
				opcodes::TRANSPARENT_RUN => {
					out.resize(out.len() + count, Pixel::TRANSPARENT);
				}
				opcodes::SOLID_RUN => {
					let pixel = self.read_pixel(reader)?;
					consumed += bytes_per_pixel;
					out.resize(out.len() + count, pixel);
				}
				opcodes::LITERAL_RUN => {
					for _ in 0..count {
						out.push(self.read_pixel(reader)?);
						consumed += bytes_per_pixel;
					}
				}
				opcodes::TRANSLUCENT_RUN => {
					let mut alpha = [0u8; 1];
					read_exact(reader, &mut alpha, "alpha")?;
					consumed += 1;
					let pixel = self.read_pixel(reader)?.with_alpha5(alpha[0] & 0x1F);
					consumed += bytes_per_pixel;
					out.resize(out.len() + count, pixel);
				}
				opcodes::SINGLE_TRANSLUCENT => {
					let pixel = self.read_pixel(reader)?;
					consumed += bytes_per_pixel;
					out.push(pixel.with_alpha5(n));
				}
				opcodes::SHADOW_RUN => {
					out.resize(out.len() + count, Pixel::SHADOW);
				}
				opcodes::PLAYER_PIXEL => {
					out.push(self.player_color(n)?);
				}
				opcodes::PLAYER_VARIANTS => {
					if n > 27 {
						let mut payload = [0u8; 1];
						read_exact(reader, &mut payload, "player pixel payload")?;
						consumed += 1;
						let shade = ((payload[0] >> 3) & 0b1_1100) | (n & 0b11);
						let pixel = self.player_color(shade)?.with_alpha5(payload[0] & 0x1F);
						out.push(pixel);
					} else {
						let mut payload = vec![0u8; count.div_ceil(2)];
						read_exact(reader, &mut payload, "player pixel pairs")?;
						consumed += payload.len();
						for (i, &byte) in payload.iter().enumerate() {
							out.push(self.player_color(((byte >> 3) & 0x1F) | 1)?);
							// Odd counts drop the trailing half of the last byte
							if count % 2 == 0 || i + 1 < payload.len() {
								out.push(self.player_color(((byte << 1) & 0x1F) | 1)?);
							}
						}
					}
				}
				_ => return Err(TgrError::InvalidOpcode(op[0])),
			}
		}

		if out.len() < usize::from(line.pixel_length) {
			debug!("padding {} transparent pixels onto a short line", usize::from(line.pixel_length) - out.len());
			out.resize(usize::from(line.pixel_length), Pixel::TRANSPARENT);
		}

		Ok(out)
	}
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use crate::file::colors_ini::PlayerColors;

	use super::*;

	fn line(transparent_pixels: u16, pixel_length: u16, data_length: u16) -> Line {
		Line {
			transparent_pixels,
			pixel_length,
			data_length,
			data_offset: 0,
		}
	}

	fn sample_colors() -> PlayerColors {
		let mut colors = PlayerColors::new();
		for shade in 0..32 {
			colors.insert(2, shade, Pixel::opaque(shade * 8, 0, 0));
		}
		colors
	}

	fn decoder(colors: &PlayerColors) -> LineDecoder<'_> {
		LineDecoder::new(ColorMode::Rgb565, None, colors.player(2), 2).unwrap()
	}

	#[test]
	fn test_transparent_and_shadow_runs() {
		let colors = sample_colors();
		let data = [0b000_00011u8, 0b101_00010];
		let out = decoder(&colors)
			.decode_line(&mut Cursor::new(&data[..]), &line(0, 5, 2))
			.unwrap();
		assert_eq!(
			out,
			vec![
				Pixel::TRANSPARENT,
				Pixel::TRANSPARENT,
				Pixel::TRANSPARENT,
				Pixel::SHADOW,
				Pixel::SHADOW
			]
		);
	}

	#[test]
	fn test_solid_run() {
		let colors = sample_colors();
		let mut data = vec![0b001_00100u8];
		data.extend_from_slice(&0xF800u16.to_le_bytes());
		let out = decoder(&colors)
			.decode_line(&mut Cursor::new(data.as_slice()), &line(0, 4, 3))
			.unwrap();
		assert_eq!(out, vec![Pixel::opaque(255, 0, 0); 4]);
	}

	#[test]
	fn test_literal_run() {
		let colors = sample_colors();
		let mut data = vec![0b010_00010u8];
		data.extend_from_slice(&0xF800u16.to_le_bytes());
		data.extend_from_slice(&0x07E0u16.to_le_bytes());
		let out = decoder(&colors)
			.decode_line(&mut Cursor::new(data.as_slice()), &line(0, 2, 5))
			.unwrap();
		assert_eq!(out, vec![Pixel::opaque(255, 0, 0), Pixel::opaque(0, 255, 0)]);
	}

	#[test]
	fn test_translucent_run_expands_alpha() {
		let colors = sample_colors();
		let mut data = vec![0b011_00101u8, 0x0C];
		data.extend_from_slice(&0x07E0u16.to_le_bytes());
		let out = decoder(&colors)
			.decode_line(&mut Cursor::new(data.as_slice()), &line(0, 5, 4))
			.unwrap();
		assert_eq!(out, vec![Pixel::new(0, 255, 0, 99); 5]);
	}

	#[test]
	fn test_single_translucent_alpha_in_count() {
		let colors = sample_colors();
		let mut data = vec![0b100_10100u8]; // alpha5 = 20
		data.extend_from_slice(&0xF800u16.to_le_bytes());
		let out = decoder(&colors)
			.decode_line(&mut Cursor::new(data.as_slice()), &line(0, 1, 3))
			.unwrap();
		assert_eq!(out, vec![Pixel::new(255, 0, 0, 165)]);
	}

	#[test]
	fn test_player_pixel() {
		let colors = sample_colors();
		let data = [0b110_00111u8];
		let out = decoder(&colors)
			.decode_line(&mut Cursor::new(&data[..]), &line(0, 1, 1))
			.unwrap();
		assert_eq!(out, vec![Pixel::opaque(56, 0, 0)]);
	}

	#[test]
	fn test_player_variant_single_translucent() {
		let colors = sample_colors();
		// n = 29 selects the single form; payload 0x54 packs shade 9, alpha5 20
		let data = [0b111_11101u8, 0x54];
		let out = decoder(&colors)
			.decode_line(&mut Cursor::new(&data[..]), &line(0, 1, 2))
			.unwrap();
		assert_eq!(out, vec![Pixel::new(72, 0, 0, 165)]);
	}

	#[test]
	fn test_player_variant_pairs() {
		let colors = sample_colors();
		// n = 3: two payload bytes, three pixels, trailing half dropped
		let data = [0b111_00011u8, 0b01010_101, 0b00110_000];
		let out = decoder(&colors)
			.decode_line(&mut Cursor::new(&data[..]), &line(0, 3, 3))
			.unwrap();
		let shades: Vec<u8> = out.iter().map(|p| p.r / 8).collect();
		// Shade bit 0 is forced on both halves of each byte
		assert_eq!(shades, vec![0b01010 | 1, 0b01011, 0b00110 | 1]);
	}

	#[test]
	fn test_transparent_prefix_and_tail_padding() {
		let colors = sample_colors();
		let data = [0b101_00001u8];
		let out = decoder(&colors)
			.decode_line(&mut Cursor::new(&data[..]), &line(2, 6, 1))
			.unwrap();
		assert_eq!(
			out,
			vec![
				Pixel::TRANSPARENT,
				Pixel::TRANSPARENT,
				Pixel::SHADOW,
				Pixel::TRANSPARENT,
				Pixel::TRANSPARENT,
				Pixel::TRANSPARENT
			]
		);
	}

	#[test]
	fn test_truncated_payload() {
		let colors = sample_colors();
		let data = [0b001_00100u8, 0x00]; // solid run missing a pixel byte
		let err = decoder(&colors)
			.decode_line(&mut Cursor::new(&data[..]), &line(0, 4, 3))
			.unwrap_err();
		assert!(matches!(err, TgrError::TruncatedStream { .. }));
	}

	#[test]
	fn test_unknown_player_shade() {
		let mut colors = PlayerColors::new();
		colors.insert(2, 0, Pixel::opaque(1, 2, 3));
		let data = [0b110_00111u8];
		let err = decoder(&colors)
			.decode_line(&mut Cursor::new(&data[..]), &line(0, 1, 1))
			.unwrap_err();
		assert!(matches!(err, TgrError::UnknownPlayerColor { player: 2, shade: 7 }));
	}

	#[test]
	fn test_indexed_mode_requires_palette() {
		assert!(matches!(
			LineDecoder::new(ColorMode::Indexed, None, None, 0).unwrap_err(),
			TgrError::PaletteMissing
		));
	}

	#[test]
	fn test_indexed_decode() {
		let mut palette = Palette::new();
		palette.push(Pixel::opaque(255, 0, 0));
		palette.push(Pixel::opaque(0, 255, 0));
		let decoder = LineDecoder::new(ColorMode::Indexed, Some(&palette), None, 0).unwrap();

		let data = [0b001_00011u8, 0x01];
		let out = decoder.decode_line(&mut Cursor::new(&data[..]), &line(0, 3, 2)).unwrap();
		assert_eq!(out, vec![Pixel::opaque(0, 255, 0); 3]);

		let data = [0b010_00001u8, 0x05];
		let err = decoder.decode_line(&mut Cursor::new(&data[..]), &line(0, 1, 2)).unwrap_err();
		assert!(matches!(err, TgrError::InvalidPaletteIndex { index: 5, count: 2 }));
	}
}
