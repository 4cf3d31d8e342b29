//! Benchmark helper utilities for tgr-rs
//!
//! This module generates synthetic sprite data shaped like real game
//! assets: large transparent margins, solid interior runs, shadow bands
//! and scattered faction-tinted pixels.

use tgr_types::file::tgr::{FileBuilder, Pixel};
use tgr_types::file::{PlayerColors, ShadeTable};

/// Builds a 32-shade ramp for one player id.
pub fn test_player_colors(player: u8) -> PlayerColors {
	let mut colors = PlayerColors::new();
	for shade in 0..32u8 {
		colors.insert(player, shade, Pixel::opaque(shade * 8, shade * 2, 0));
	}
	colors
}

/// Generates one row of sprite-like pixels.
///
/// The layout follows what unit sprites tend to look like: transparent
/// margins on both sides, a shadow band, a solid body with occasional
/// translucency and a sprinkle of player colors.
pub fn generate_row(width: usize, seed: u64, shades: Option<&ShadeTable>) -> Vec<Pixel> {
	let margin = width / 8 + (seed as usize % 7);
	let mut row = vec![Pixel::TRANSPARENT; width];
	let mut state = seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(1);

	let mut i = margin.min(width);
	while i < width.saturating_sub(margin) {
		state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
		let roll = (state >> 33) % 100;
		let run = 1 + ((state >> 20) % 9) as usize;
		let pixel = match roll {
			0..=9 => Pixel::SHADOW,
			10..=19 => Pixel::TRANSPARENT,
			20..=29 => Pixel::from_rgb565((state >> 40) as u16).with_alpha5(((state >> 8) % 32) as u8),
			30..=39 => match shades.and_then(|table| table.get(((state >> 16) % 32) as u8)) {
				Some(tint) => tint,
				None => Pixel::from_rgb565((state >> 40) as u16),
			},
			_ => Pixel::from_rgb565((state >> 40) as u16),
		};
		for slot in row.iter_mut().skip(i).take(run) {
			*slot = pixel;
		}
		i += run;
	}

	row
}

/// Generates a complete synthetic TGR file.
pub fn generate_test_file(width: u16, height: u16, frames: usize) -> Vec<u8> {
	let mut builder = FileBuilder::new(width, height);
	for frame in 0..frames {
		let mut pixels = Vec::with_capacity(usize::from(width) * usize::from(height));
		for y in 0..height {
			pixels.extend(generate_row(
				usize::from(width),
				u64::from(y) * 31 + frame as u64,
				None,
			));
		}
		// unwrap: generated frames always match the canvas size
		builder.add_frame(pixels).unwrap();
	}
	// unwrap: synthetic rows stay far below the container limits
	builder.build().unwrap()
}

/// Common benchmark sizes for synthetic test data
pub mod sizes {
	/// Small portrait: 64x64
	pub const PORTRAIT: (u16, u16) = (64, 64);
	/// Typical unit frame: 128x128
	pub const UNIT: (u16, u16) = (128, 128);
	/// Large building frame: 320x256
	pub const BUILDING: (u16, u16) = (320, 256);
}

#[cfg(test)]
mod tests {
	use super::*;
	use tgr_types::file::TgrFile;

	#[test]
	fn test_generate_row_width() {
		let row = generate_row(128, 7, None);
		assert_eq!(row.len(), 128);
	}

	#[test]
	fn test_generate_test_file_parses() {
		let data = generate_test_file(64, 32, 2);
		let file = TgrFile::from_bytes(&data).unwrap();
		assert_eq!(file.frame_count(), 2);
	}
}
