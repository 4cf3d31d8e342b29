//! Line encoder: pixel row to minimal opcode stream.
//!
//! The encoder classifies each pixel and picks the cheapest operation with
//! a bounded look-ahead. Leading transparent pixels move into the header
//! offset instead of the opcode stream; trailing transparent pixels are
//! omitted entirely and restored by the decoder's tail padding. Player-
//! color pixels take priority over every run form so faction tinting
//! survives a repack.
//!
//! Encoding is 16bpp only; palette-indexed output is not supported.

use log::warn;

use crate::file::colors_ini::ShadeTable;
use crate::file::error::TgrError;

use super::line::pack_line;
use super::pixel::Pixel;
use super::opcodes;

/// Longest matching run collected per opcode. The count field holds 31,
/// but long runs confuse the GUI sprite renderer, so runs are split early.
const MAX_MATCH_RUN: usize = 23;

/// Matching-run cap when the run pixel is translucent.
const MAX_TRANSLUCENT_RUN: usize = 22;

/// Longest literal run (full 5-bit count field).
const MAX_LITERAL_RUN: usize = 31;

/// Composes an operation header byte from a flag and a 5-bit count.
#[inline]
fn op(flag: u8, count: usize) -> u8 {
	(flag << 5) | (count as u8 & 0x1F)
}

/// Encodes pixel rows against a fixed player-color configuration.
///
/// With no shade table every pixel is encoded literally by color; with one,
/// pixels found in the table become player-color opcodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineEncoder<'a> {
	shades: Option<&'a ShadeTable>,
}

impl<'a> LineEncoder<'a> {
	/// Creates an encoder. Pass the active player's shade table to encode
	/// faction-colorable regions as player-color opcodes.
	pub fn new(shades: Option<&'a ShadeTable>) -> Self {
		Self {
			shades,
		}
	}

	fn shade_of(&self, pixel: Pixel) -> Option<u8> {
		self.shades.and_then(|table| table.shade_of(pixel))
	}

	fn is_player_color(&self, pixel: Pixel) -> bool {
		self.shade_of(pixel).is_some()
	}

	/// Counts pixels after `start` strictly equal to `row[start]`, up to
	/// `cap`. With `break_on_player` set, a player-color pixel ends the run
	/// so the palette opcodes keep priority.
	fn matching_run(&self, row: &[Pixel], start: usize, cap: usize, break_on_player: bool) -> usize {
		let pixel = row[start];
		let mut collected = 0;
		while start + collected + 1 < row.len() {
			let next = row[start + collected + 1];
			if next != pixel {
				break;
			}
			if break_on_player && self.is_player_color(next) {
				break;
			}
			collected += 1;
			if collected == cap {
				break;
			}
		}
		collected
	}

	/// Counts pairwise-distinct, fully opaque, non-player pixels starting
	/// at `start`, stopping at the row end or at 31.
	fn literal_run(&self, row: &[Pixel], start: usize) -> usize {
		if start + 1 == row.len() {
			return 1;
		}
		let mut collected = 0;
		while start + collected < row.len() {
			let this = row[start + collected];
			if this.a != 0xFF {
				break;
			}
			if self.is_player_color(this) {
				break;
			}
			if start + collected + 1 == row.len() {
				// No successor to differ from; take the final pixel
				collected += 1;
				break;
			}
			if this == row[start + collected + 1] {
				break;
			}
			collected += 1;
			if collected == MAX_LITERAL_RUN {
				break;
			}
		}
		collected
	}

	/// Encodes one pixel row into a complete line: header plus opcode
	/// stream.
	///
	/// # Errors
	///
	/// Fails when the row cannot be represented in the container limits:
	/// opcode stream over 0x7FFA bytes, more than 255 leading transparent
	/// pixels, or an opcode-produced pixel count past 0x7FFF. No partial
	/// line is returned.
	pub fn encode_line(&self, row: &[Pixel]) -> Result<Vec<u8>, TgrError> {
		let width = row.len();
		let mut out = Vec::new();
		let mut index = 0;
		let mut offset = 0;
		let mut ct_pixels = 0;
		let mut padding_complete = false;

		while index < width {
			let pixel = row[index];
			if !padding_complete && pixel != Pixel::TRANSPARENT {
				padding_complete = true;
			}

			if pixel == Pixel::TRANSPARENT {
				let run = self.matching_run(row, index, MAX_MATCH_RUN, false) + 1;
				if !padding_complete {
					// Leading padding accumulates in the header offset
					offset += run;
					index += run;
				} else if index + run >= width {
					// Trailing padding is never written
					break;
				} else {
					out.push(op(opcodes::TRANSPARENT_RUN, run));
					ct_pixels += run;
					index += run;
				}
			} else if pixel == Pixel::SHADOW {
				let run = self.matching_run(row, index, MAX_MATCH_RUN, false) + 1;
				out.push(op(opcodes::SHADOW_RUN, run));
				ct_pixels += run;
				index += run;
			} else if let Some(shade) = self.shade_of(pixel) {
				if pixel.a < 0xFF {
					out.push(op(opcodes::PLAYER_VARIANTS, usize::from(0b1_1100 | (shade & 0b11))));
					out.push(((shade & 0b1_1100) << 3) | pixel.alpha5());
				} else {
					out.push(op(opcodes::PLAYER_PIXEL, usize::from(shade)));
				}
				ct_pixels += 1;
				index += 1;
			} else if pixel.a < 0xFF {
				let run = self.matching_run(row, index, MAX_TRANSLUCENT_RUN, false) + 1;
				let body = pixel.to_rgb565().to_le_bytes();
				if run == 1 {
					out.push(op(opcodes::SINGLE_TRANSLUCENT, usize::from(pixel.alpha5())));
					out.extend_from_slice(&body);
				} else {
					out.push(op(opcodes::TRANSLUCENT_RUN, run));
					out.push(pixel.alpha5());
					out.extend_from_slice(&body);
				}
				ct_pixels += run;
				index += run;
			} else {
				let matched = self.matching_run(row, index, MAX_MATCH_RUN, true);
				if matched > 0 {
					let run = matched + 1;
					out.push(op(opcodes::SOLID_RUN, run));
					out.extend_from_slice(&pixel.to_rgb565().to_le_bytes());
					ct_pixels += run;
					index += run;
				} else {
					let run = self.literal_run(row, index);
					match run {
						0 => {
							// Unreachable from classification; substitute
							// a one-pixel literal and keep going
							warn!("could not pack pixel {pixel} at column {index}, defaulting to 0x0000");
							out.push(op(opcodes::LITERAL_RUN, 1));
							out.extend_from_slice(&0u16.to_le_bytes());
							ct_pixels += 1;
							index += 1;
						}
						// A lone-pixel row is a solid run of one
						1 if width == 1 => {
							out.push(op(opcodes::SOLID_RUN, 1));
							out.extend_from_slice(&pixel.to_rgb565().to_le_bytes());
							ct_pixels += 1;
							index += 1;
						}
						_ => {
							out.push(op(opcodes::LITERAL_RUN, run));
							for literal in &row[index..index + run] {
								out.extend_from_slice(&literal.to_rgb565().to_le_bytes());
							}
							ct_pixels += run;
							index += run;
						}
					}
				}
			}
		}

		pack_line(&out, ct_pixels, offset)
	}
}
