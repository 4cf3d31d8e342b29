//! COLORS.INI player-color table support.
//!
//! Faction-colorable regions of a sprite are stored as shade indices and
//! resolved against a per-player tint table at draw time. The table lives
//! in an INI file with a `[PlayerColors]` section whose keys follow the
//! `color_<player>_shade_<shade> = R,G,B` grammar:
//!
//! ```ini
//! [PlayerColors]
//! color_2_shade_7 = 255, 40, 40
//! ```
//!
//! The table is loaded once at startup and treated as read-only afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use regex::Regex;

use crate::file::error::PlayerColorsError;
use crate::file::tgr::Pixel;

/// Number of shade slots per player (the opcode shade field is 5 bits)
pub const SHADE_COUNT: usize = 32;

/// One player's tint ramp: up to 32 shades, all opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadeTable {
	shades: [Option<Pixel>; SHADE_COUNT],
}

impl ShadeTable {
	/// Creates an empty shade table.
	pub const fn new() -> Self {
		Self {
			shades: [None; SHADE_COUNT],
		}
	}

	/// Sets a shade. The stored pixel is forced opaque; translucency is
	/// reintroduced by the opcode carrying the shade, not by the table.
	pub fn set(&mut self, shade: u8, pixel: Pixel) {
		if let Some(slot) = self.shades.get_mut(shade as usize) {
			*slot = Some(Pixel::opaque(pixel.r, pixel.g, pixel.b));
		}
	}

	/// Gets the pixel for a shade index, if defined.
	#[inline]
	pub fn get(&self, shade: u8) -> Option<Pixel> {
		self.shades.get(shade as usize).copied().flatten()
	}

	/// Reverse lookup: finds the lowest shade whose color matches `pixel`,
	/// comparing color channels only.
	pub fn shade_of(&self, pixel: Pixel) -> Option<u8> {
		self.shades
			.iter()
			.enumerate()
			.find(|(_, slot)| slot.is_some_and(|c| c.eq_ignore_alpha(pixel)))
			.map(|(shade, _)| shade as u8)
	}

	/// Returns the number of defined shades.
	pub fn len(&self) -> usize {
		self.shades.iter().filter(|s| s.is_some()).count()
	}

	/// Returns true if no shade is defined.
	pub fn is_empty(&self) -> bool {
		self.shades.iter().all(Option::is_none)
	}

	/// Returns an iterator over `(shade, pixel)` pairs in ascending order.
	pub fn iter(&self) -> impl Iterator<Item = (u8, Pixel)> + '_ {
		self.shades
			.iter()
			.enumerate()
			.filter_map(|(shade, slot)| slot.map(|pixel| (shade as u8, pixel)))
	}
}

impl Default for ShadeTable {
	fn default() -> Self {
		Self::new()
	}
}

/// The full faction tint table: player id to shade ramp.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerColors {
	players: BTreeMap<u8, ShadeTable>,
}

impl PlayerColors {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Loads the table from a COLORS.INI file.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, PlayerColorsError> {
		let text = std::fs::read_to_string(path)?;
		Self::from_ini_str(&text)
	}

	/// Parses the table from INI text.
	///
	/// Keys in `[PlayerColors]` that do not match the
	/// `color_<player>_shade_<shade>` grammar are skipped, as the original
	/// tooling does. A matching key with an out-of-range shade or a channel
	/// value past 255 is an error.
	pub fn from_ini_str(text: &str) -> Result<Self, PlayerColorsError> {
		// unwraps: patterns are literals
		let key_re = Regex::new(r"(?i)^color_(\d{1,2})_shade_(\d{1,2})$").unwrap();
		let value_re = Regex::new(r"^\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})").unwrap();

		let mut players = BTreeMap::new();
		let mut in_section = false;
		let mut section_seen = false;

		for line in text.lines() {
			let line = line.trim();
			if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
				continue;
			}
			if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
				in_section = name.eq_ignore_ascii_case("PlayerColors");
				section_seen |= in_section;
				continue;
			}
			if !in_section {
				continue;
			}

			let Some((key, value)) = line.split_once('=') else {
				continue;
			};
			let (key, value) = (key.trim(), value.trim());
			let Some(caps) = key_re.captures(key) else {
				continue;
			};
			let Some(values) = value_re.captures(value) else {
				continue;
			};

			// unwraps: both groups are one or two digits
			let player: u8 = caps[1].parse().unwrap();
			let shade: u32 = caps[2].parse().unwrap();
			if shade as usize >= SHADE_COUNT {
				return Err(PlayerColorsError::ShadeOutOfRange {
					key: key.to_string(),
				});
			}

			let mut channels = [0u8; 3];
			for (slot, group) in channels.iter_mut().zip(1..=3) {
				*slot = values[group].parse().map_err(|_| PlayerColorsError::InvalidValue {
					key: key.to_string(),
					value: value.to_string(),
				})?;
			}

			players
				.entry(player)
				.or_insert_with(ShadeTable::new)
				.set(shade as u8, Pixel::opaque(channels[0], channels[1], channels[2]));
		}

		if !section_seen {
			return Err(PlayerColorsError::MissingSection);
		}

		Ok(Self {
			players,
		})
	}

	/// Inserts a single shade definition.
	pub fn insert(&mut self, player: u8, shade: u8, pixel: Pixel) {
		self.players.entry(player).or_insert_with(ShadeTable::new).set(shade, pixel);
	}

	/// Returns one player's shade table.
	#[inline]
	pub fn player(&self, player: u8) -> Option<&ShadeTable> {
		self.players.get(&player)
	}

	/// Looks up a shade for a player.
	pub fn lookup(&self, player: u8, shade: u8) -> Option<Pixel> {
		self.players.get(&player).and_then(|table| table.get(shade))
	}

	/// Reverse lookup: finds the shade of `pixel` in a player's ramp,
	/// comparing color channels only.
	pub fn reverse_lookup(&self, player: u8, pixel: Pixel) -> Option<u8> {
		self.players.get(&player).and_then(|table| table.shade_of(pixel))
	}

	/// Returns the defined player ids in ascending order.
	pub fn player_ids(&self) -> impl Iterator<Item = u8> + '_ {
		self.players.keys().copied()
	}

	/// Returns true if no player is defined.
	pub fn is_empty(&self) -> bool {
		self.players.is_empty()
	}
}

impl fmt::Display for PlayerColors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "PlayerColors: {} players", self.players.len())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = "\
; faction tints
[PlayerColors]
color_1_shade_0 = 16,16,64
color_1_shade_1 = 24,24,96
color_2_shade_7 = 255, 40, 40
color_2_shade_9 = 200,30,30
junk_key = 1,2,3
";

	#[test]
	fn test_parse() {
		let colors = PlayerColors::from_ini_str(SAMPLE).unwrap();
		assert_eq!(colors.player_ids().collect::<Vec<_>>(), vec![1, 2]);
		assert_eq!(colors.lookup(1, 0), Some(Pixel::opaque(16, 16, 64)));
		assert_eq!(colors.lookup(2, 7), Some(Pixel::opaque(255, 40, 40)));
		assert_eq!(colors.lookup(2, 8), None);
		assert_eq!(colors.lookup(3, 0), None);
	}

	#[test]
	fn test_reverse_lookup_ignores_alpha() {
		let colors = PlayerColors::from_ini_str(SAMPLE).unwrap();
		let translucent = Pixel::new(255, 40, 40, 90);
		assert_eq!(colors.reverse_lookup(2, translucent), Some(7));
		assert_eq!(colors.reverse_lookup(2, Pixel::opaque(1, 2, 3)), None);
	}

	#[test]
	fn test_missing_section() {
		let err = PlayerColors::from_ini_str("[Other]\nkey = 1").unwrap_err();
		assert!(matches!(err, PlayerColorsError::MissingSection));
	}

	#[test]
	fn test_shade_out_of_range() {
		let text = "[PlayerColors]\ncolor_1_shade_32 = 1,2,3\n";
		assert!(matches!(
			PlayerColors::from_ini_str(text).unwrap_err(),
			PlayerColorsError::ShadeOutOfRange { .. }
		));
	}

	#[test]
	fn test_channel_out_of_range() {
		let text = "[PlayerColors]\ncolor_1_shade_0 = 300,2,3\n";
		assert!(matches!(
			PlayerColors::from_ini_str(text).unwrap_err(),
			PlayerColorsError::InvalidValue { .. }
		));
	}

	#[test]
	fn test_shades_stored_opaque() {
		let mut colors = PlayerColors::new();
		colors.insert(1, 3, Pixel::new(10, 20, 30, 0));
		assert_eq!(colors.lookup(1, 3), Some(Pixel::opaque(10, 20, 30)));
	}
}
