//! sprite.ini repack metadata.
//!
//! When a TGR is unpacked to PNG frames, a `sprite.ini` is written next to
//! them carrying the header fields a later repack needs: bit depth,
//! hotspot, bounding box, the padding-frame list and the animation table.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use regex::Regex;

use crate::file::error::SpriteIniError;
use crate::file::tgr::Animation;

/// Maximum number of animations a sprite can carry
pub const MAX_ANIMATIONS: usize = 6;

/// Parsed sprite.ini contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteIni {
	/// Bits per pixel; 16 for direct color, 8 for paletted sources
	pub bit_depth: u8,
	/// Draw anchor relative to the owning game object
	pub hotspot: (u16, u16),
	/// Clickable region (x min, y min, x max, y max)
	pub bounding_box: [u16; 4],
	/// Indices of zero-length padding frames
	pub padding_frames: Vec<usize>,
	/// Animation table (up to [`MAX_ANIMATIONS`] entries)
	pub animations: Vec<Animation>,
}

impl Default for SpriteIni {
	fn default() -> Self {
		Self {
			bit_depth: 16,
			hotspot: (0, 0),
			bounding_box: [0; 4],
			padding_frames: Vec::new(),
			animations: Vec::new(),
		}
	}
}

fn required<'m>(
	sections: &'m BTreeMap<String, BTreeMap<String, String>>,
	section: &'static str,
	key: &'static str,
) -> Result<&'m str, SpriteIniError> {
	let values = sections.get(section).ok_or(SpriteIniError::MissingSection(section))?;
	values.get(key).map(String::as_str).ok_or(SpriteIniError::MissingKey {
		section,
		key,
	})
}

fn parse_number<T: std::str::FromStr>(
	section: &str,
	key: &str,
	value: &str,
) -> Result<T, SpriteIniError> {
	value.trim().parse().map_err(|_| SpriteIniError::InvalidValue {
		section: section.to_string(),
		key: key.to_string(),
		value: value.to_string(),
	})
}

impl SpriteIni {
	/// Reads a sprite.ini file.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, SpriteIniError> {
		let text = std::fs::read_to_string(path)?;
		Self::from_ini_str(&text)
	}

	/// Parses sprite.ini text.
	pub fn from_ini_str(text: &str) -> Result<Self, SpriteIniError> {
		let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
		let mut current = String::new();

		for line in text.lines() {
			let line = line.trim();
			if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
				continue;
			}
			if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
				current = name.to_string();
				sections.entry(current.clone()).or_default();
				continue;
			}
			if let Some((key, value)) = line.split_once('=') {
				sections
					.entry(current.clone())
					.or_default()
					.insert(key.trim().to_string(), value.trim().to_string());
			}
		}

		let bit_depth = parse_number("BitDepth", "Depth", required(&sections, "BitDepth", "Depth")?)?;
		let hotspot = (
			parse_number("HotSpot", "X", required(&sections, "HotSpot", "X")?)?,
			parse_number("HotSpot", "Y", required(&sections, "HotSpot", "Y")?)?,
		);
		let bounding_box = [
			parse_number("BoundingBox", "XMin", required(&sections, "BoundingBox", "XMin")?)?,
			parse_number("BoundingBox", "YMin", required(&sections, "BoundingBox", "YMin")?)?,
			parse_number("BoundingBox", "XMax", required(&sections, "BoundingBox", "XMax")?)?,
			parse_number("BoundingBox", "YMax", required(&sections, "BoundingBox", "YMax")?)?,
		];

		let frame_list = required(&sections, "PaddingFrames", "FrameList")?;
		let mut padding_frames = Vec::new();
		for item in frame_list.split(',') {
			let item = item.trim();
			if item.is_empty() {
				continue;
			}
			padding_frames.push(parse_number("PaddingFrames", "FrameList", item)?);
		}

		// unwrap: pattern is a literal
		let animation_re = Regex::new(r"^Animation(\d)$").unwrap();
		let mut animations = vec![Animation::default(); MAX_ANIMATIONS];
		let mut animation_count = 0;
		for name in sections.keys() {
			let Some(caps) = animation_re.captures(name) else {
				continue;
			};
			let index: usize = caps[1].parse().unwrap();
			if index >= MAX_ANIMATIONS {
				continue;
			}
			if index >= animation_count {
				animation_count = index + 1;
			}
			let section = name.as_str();
			animations[index] = Animation {
				start_frame: parse_number(
					section,
					"StartFrame",
					sections[section].get("StartFrame").map(String::as_str).unwrap_or("0"),
				)?,
				frame_count: parse_number(
					section,
					"FrameCount",
					sections[section].get("FrameCount").map(String::as_str).unwrap_or("0"),
				)?,
				animation_count: parse_number(
					section,
					"AnimationCount",
					sections[section].get("AnimationCount").map(String::as_str).unwrap_or("0"),
				)?,
			};
		}
		animations.truncate(animation_count);

		Ok(Self {
			bit_depth,
			hotspot,
			bounding_box,
			padding_frames,
			animations,
		})
	}

	/// Writes the metadata to a sprite.ini file.
	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SpriteIniError> {
		std::fs::write(path, self.to_ini_string())?;
		Ok(())
	}

	/// Renders the metadata as INI text.
	pub fn to_ini_string(&self) -> String {
		let mut out = String::new();

		out.push_str("[Description]\n");
		out.push_str("; Metadata for an extracted sprite, kept so the frames\n");
		out.push_str("; can be repacked into a .TGR\n\n");

		out.push_str("[BitDepth]\n");
		out.push_str("; 16 for direct color, 8 for a color palette\n");
		// unwraps: writing to a String cannot fail
		writeln!(out, "Depth = {}", self.bit_depth).unwrap();
		out.push('\n');

		out.push_str("[HotSpot]\n");
		out.push_str("; Position the sprite is drawn at relative to the game object\n");
		writeln!(out, "X = {}", self.hotspot.0).unwrap();
		writeln!(out, "Y = {}", self.hotspot.1).unwrap();
		out.push('\n');

		out.push_str("[BoundingBox]\n");
		out.push_str("; Clickable region of the sprite\n");
		writeln!(out, "XMin = {}", self.bounding_box[0]).unwrap();
		writeln!(out, "YMin = {}", self.bounding_box[1]).unwrap();
		writeln!(out, "XMax = {}", self.bounding_box[2]).unwrap();
		writeln!(out, "YMax = {}", self.bounding_box[3]).unwrap();
		out.push('\n');

		out.push_str("[PaddingFrames]\n");
		out.push_str("; Zero-length frames, kept as-is to avoid packing errors\n");
		let list: Vec<String> = self.padding_frames.iter().map(usize::to_string).collect();
		writeln!(out, "FrameList = {}", list.join(",")).unwrap();
		out.push('\n');

		out.push_str("[Animations]\n");
		out.push_str("; Up to six animations, each a start frame, a frame count\n");
		out.push_str("; and the number of facing variants\n");
		for (index, animation) in self.animations.iter().enumerate() {
			writeln!(out, "\n[Animation{index}]").unwrap();
			writeln!(out, "StartFrame = {}", animation.start_frame).unwrap();
			writeln!(out, "FrameCount = {}", animation.frame_count).unwrap();
			writeln!(out, "AnimationCount = {}", animation.animation_count).unwrap();
		}

		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_roundtrip() {
		let ini = SpriteIni {
			bit_depth: 16,
			hotspot: (31, 54),
			bounding_box: [2, 3, 60, 50],
			padding_frames: vec![2],
			animations: vec![
				Animation {
					start_frame: 0,
					frame_count: 8,
					animation_count: 8,
				},
				Animation {
					start_frame: 64,
					frame_count: 4,
					animation_count: 4,
				},
			],
		};

		let text = ini.to_ini_string();
		let parsed = SpriteIni::from_ini_str(&text).unwrap();
		assert_eq!(parsed, ini);
	}

	#[test]
	fn test_empty_padding_list() {
		let ini = SpriteIni::default();
		let parsed = SpriteIni::from_ini_str(&ini.to_ini_string()).unwrap();
		assert!(parsed.padding_frames.is_empty());
		assert!(parsed.animations.is_empty());
	}

	#[test]
	fn test_sparse_animation_sections() {
		let mut text = SpriteIni::default().to_ini_string();
		text.push_str("\n[Animation2]\nStartFrame = 5\nFrameCount = 3\nAnimationCount = 4\n");
		let parsed = SpriteIni::from_ini_str(&text).unwrap();
		// Animations 0 and 1 exist as defaults so indices stay aligned
		assert_eq!(parsed.animations.len(), 3);
		assert_eq!(parsed.animations[0], Animation::default());
		assert_eq!(parsed.animations[2].start_frame, 5);
	}

	#[test]
	fn test_missing_section() {
		assert!(matches!(
			SpriteIni::from_ini_str("[HotSpot]\nX = 1\nY = 2\n").unwrap_err(),
			SpriteIniError::MissingSection("BitDepth")
		));
	}

	#[test]
	fn test_invalid_value() {
		let text = SpriteIni::default().to_ini_string().replace("Depth = 16", "Depth = sixteen");
		assert!(matches!(
			SpriteIni::from_ini_str(&text).unwrap_err(),
			SpriteIniError::InvalidValue { .. }
		));
	}
}
