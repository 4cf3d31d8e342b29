//! `.TGR` file format support for the `tgr-rs` project.
//!
//! TGR is an IFF-based sprite container used for buildings, units and UI
//! portraits. A file is a `FORM` of type `TGAR` holding a `HEDR` chunk, an
//! optional `PALT` palette chunk for 8bpp files, and one `FRAM` chunk per
//! frame. Frames are stacks of independently encoded lines; each line is a
//! run-length-encoded opcode stream mixing opaque pixels, transparency,
//! shadow, translucency and faction-tinted player colors.
//!
//! # HEDR layout
//!
//! | Offset | Size | Field              | Description                          |
//! |--------|------|--------------------|--------------------------------------|
//! | 0x00   | 4    | `version`          | Format version (4)                   |
//! | 0x04   | 2    | `frame_count`      | Number of frame table entries        |
//! | 0x06   | 1    | `bits_per_pixel`   | 8 (paletted) or 16 (RGB565)          |
//! | 0x07   | 2    | reserved           |                                      |
//! | 0x09   | 1    | `index_mode`       | Paletted when `mode & 0x7F == 0x1A`  |
//! | 0x0A   | 1    | `offset_flag`      |                                      |
//! | 0x0B   | 1    | reserved           |                                      |
//! | 0x0C   | 4    | `size`             | Canvas width, height (u16 each)      |
//! | 0x10   | 4    | `hotspot`          | Draw anchor (u16 x, u16 y)           |
//! | 0x14   | 8    | `bounding_box`     | Clickable region (4 × u16)           |
//! | 0x1C   | 12   | reserved           |                                      |
//! | 0x28   | 12×n | frame table        | `ulx, uly, lrx, lry` u16, offset u32 |
//! |        | 2    | `animation_count`  |                                      |
//! |        | 6×a  | animations         | start, count, variants (u16 each)    |
//!
//! All HEDR fields are little-endian; chunk lengths are big-endian per IFF.
//!
//! # Usage Examples
//!
//! ```no_run
//! use tgr_types::file::TgrFile;
//! use tgr_types::file::PlayerColors;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let colors = PlayerColors::open("COLORS.INI")?;
//! let tgr = TgrFile::open("KEEP.TGR")?;
//!
//! for index in 0..tgr.frame_count() {
//!     let image = tgr.decode_frame(index, &colors, 2)?;
//!     println!("frame {index}: {}x{}", image.width(), image.height());
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod decode;
pub mod encode;
pub mod frame;
pub mod line;
pub mod palette;
pub mod pixel;


use std::fmt;
use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::file::colors_ini::PlayerColors;
use crate::file::error::TgrError;
use crate::file::iff::Form;

pub use builder::FileBuilder;
pub use decode::LineDecoder;
pub use encode::LineEncoder;
pub use frame::{Frame, FrameEntry, FrameImage};
pub use line::Line;
pub use palette::Palette;
pub use pixel::Pixel;

/// TGR file constants.
pub mod constants {
	/// Form type of the outer IFF container
	pub const FORM_TYPE: [u8; 4] = *b"TGAR";

	/// Header chunk id
	pub const HEDR_ID: [u8; 4] = *b"HEDR";

	/// Palette chunk id
	pub const PALT_ID: [u8; 4] = *b"PALT";

	/// Frame data chunk id
	pub const FRAM_ID: [u8; 4] = *b"FRAM";

	/// Format version written by the encoder
	pub const VERSION: u32 = 4;

	/// Fixed part of the HEDR body, before the frame table
	pub const HEADER_FIXED_SIZE: usize = 40;

	/// Size of each frame table entry
	pub const FRAME_ENTRY_SIZE: usize = 12;

	/// `index_mode` low bits marking a paletted file
	pub const INDEX_MODE_PALETTED: u8 = 0x1A;

	/// Maximum opcode stream size for one line
	pub const MAX_LINE_DATA: usize = 0x7FFA;

	/// Maximum leading transparent offset
	pub const MAX_LINE_OFFSET: usize = 0xFF;

	/// Maximum opcode-produced pixel count for one line
	pub const MAX_PIXEL_COUNT: usize = 0x7FFF;
}

/// Opcode flags (top 3 bits of an operation header byte).
pub(crate) mod opcodes {
	/// Run of transparent pixels
	pub const TRANSPARENT_RUN: u8 = 0b000;
	/// Run of one repeated opaque pixel
	pub const SOLID_RUN: u8 = 0b001;
	/// Back-to-back distinct opaque pixels
	pub const LITERAL_RUN: u8 = 0b010;
	/// Run of one repeated translucent pixel
	pub const TRANSLUCENT_RUN: u8 = 0b011;
	/// Single pixel with alpha carried in the count field
	pub const SINGLE_TRANSLUCENT: u8 = 0b100;
	/// Run of shadow pixels
	pub const SHADOW_RUN: u8 = 0b101;
	/// Single opaque player-color pixel, shade in the count field
	pub const PLAYER_PIXEL: u8 = 0b110;
	/// Player-color variants: translucent single or packed pairs
	pub const PLAYER_VARIANTS: u8 = 0b111;
}

/// Pixel storage mode of a TGR file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
	/// 16-bit little-endian RGB565 pixels
	Rgb565,
	/// 8-bit palette indices resolved against the PALT chunk
	Indexed,
}

impl ColorMode {
	/// Maps a bit depth to a color mode.
	pub fn from_bits(bits: u8) -> Result<Self, TgrError> {
		match bits {
			16 => Ok(Self::Rgb565),
			8 => Ok(Self::Indexed),
			_ => Err(TgrError::UnsupportedBitDepth(bits)),
		}
	}

	/// Bits per pixel.
	pub const fn bits(self) -> u8 {
		match self {
			Self::Rgb565 => 16,
			Self::Indexed => 8,
		}
	}

	/// Bytes one payload pixel occupies in an opcode stream.
	pub const fn bytes_per_pixel(self) -> usize {
		match self {
			Self::Rgb565 => 2,
			Self::Indexed => 1,
		}
	}
}

impl fmt::Display for ColorMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Rgb565 => write!(f, "16bpp RGB565"),
			Self::Indexed => write!(f, "8bpp indexed"),
		}
	}
}

/// One animation table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Animation {
	/// First frame of the west-facing variant
	pub start_frame: u16,
	/// Frames per variant
	pub frame_count: u16,
	/// Number of facing variants
	pub animation_count: u16,
}

/// Parsed HEDR chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
	version: u32,
	bits_per_pixel: u8,
	index_mode: u8,
	offset_flag: u8,
	size: (u16, u16),
	hotspot: (u16, u16),
	bounding_box: [u16; 4],
	entries: Vec<FrameEntry>,
	animations: Vec<Animation>,
}

impl Header {
	/// Parses a HEDR chunk body.
	pub fn from_bytes(data: &[u8]) -> Result<Self, TgrError> {
		if data.len() < constants::HEADER_FIXED_SIZE {
			return Err(TgrError::InsufficientData {
				expected: constants::HEADER_FIXED_SIZE,
				actual: data.len(),
			});
		}

		let version = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
		let frame_count = u16::from_le_bytes([data[4], data[5]]) as usize;
		let bits_per_pixel = data[6];
		let index_mode = data[9];
		let offset_flag = data[10];
		let size = (u16::from_le_bytes([data[12], data[13]]), u16::from_le_bytes([data[14], data[15]]));
		let hotspot =
			(u16::from_le_bytes([data[16], data[17]]), u16::from_le_bytes([data[18], data[19]]));
		let bounding_box = [
			u16::from_le_bytes([data[20], data[21]]),
			u16::from_le_bytes([data[22], data[23]]),
			u16::from_le_bytes([data[24], data[25]]),
			u16::from_le_bytes([data[26], data[27]]),
		];

		let table_end = constants::HEADER_FIXED_SIZE + frame_count * constants::FRAME_ENTRY_SIZE;
		if data.len() < table_end + 2 {
			return Err(TgrError::InsufficientData {
				expected: table_end + 2,
				actual: data.len(),
			});
		}

		let mut entries = Vec::with_capacity(frame_count);
		for i in 0..frame_count {
			let at = constants::HEADER_FIXED_SIZE + i * constants::FRAME_ENTRY_SIZE;
			entries.push(FrameEntry::new(
				u16::from_le_bytes([data[at], data[at + 1]]),
				u16::from_le_bytes([data[at + 2], data[at + 3]]),
				u16::from_le_bytes([data[at + 4], data[at + 5]]),
				u16::from_le_bytes([data[at + 6], data[at + 7]]),
				u32::from_le_bytes([data[at + 8], data[at + 9], data[at + 10], data[at + 11]]),
			));
		}

		let animation_count = u16::from_le_bytes([data[table_end], data[table_end + 1]]) as usize;
		let animations_end = table_end + 2 + animation_count * 6;
		if data.len() < animations_end {
			return Err(TgrError::InsufficientData {
				expected: animations_end,
				actual: data.len(),
			});
		}

		let mut animations = Vec::with_capacity(animation_count);
		for i in 0..animation_count {
			let at = table_end + 2 + i * 6;
			animations.push(Animation {
				start_frame: u16::from_le_bytes([data[at], data[at + 1]]),
				frame_count: u16::from_le_bytes([data[at + 2], data[at + 3]]),
				animation_count: u16::from_le_bytes([data[at + 4], data[at + 5]]),
			});
		}

		Ok(Self {
			version,
			bits_per_pixel,
			index_mode,
			offset_flag,
			size,
			hotspot,
			bounding_box,
			entries,
			animations,
		})
	}

	/// Serializes the header back to a HEDR chunk body.
	///
	/// A 2-byte pad follows an even animation count, as the original files
	/// carry.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut data = Vec::with_capacity(self.byte_size());

		data.extend_from_slice(&self.version.to_le_bytes());
		data.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
		data.push(self.bits_per_pixel);
		data.extend_from_slice(&[0, 0]);
		data.push(self.index_mode);
		data.push(self.offset_flag);
		data.push(0);
		data.extend_from_slice(&self.size.0.to_le_bytes());
		data.extend_from_slice(&self.size.1.to_le_bytes());
		data.extend_from_slice(&self.hotspot.0.to_le_bytes());
		data.extend_from_slice(&self.hotspot.1.to_le_bytes());
		for value in self.bounding_box {
			data.extend_from_slice(&value.to_le_bytes());
		}
		data.extend_from_slice(&[0u8; 12]);

		for entry in &self.entries {
			data.extend_from_slice(&entry.ulx.to_le_bytes());
			data.extend_from_slice(&entry.uly.to_le_bytes());
			data.extend_from_slice(&entry.lrx.to_le_bytes());
			data.extend_from_slice(&entry.lry.to_le_bytes());
			data.extend_from_slice(&entry.offset.to_le_bytes());
		}

		data.extend_from_slice(&(self.animations.len() as u16).to_le_bytes());
		for animation in &self.animations {
			data.extend_from_slice(&animation.start_frame.to_le_bytes());
			data.extend_from_slice(&animation.frame_count.to_le_bytes());
			data.extend_from_slice(&animation.animation_count.to_le_bytes());
		}
		if self.animations.len() % 2 == 0 {
			data.extend_from_slice(&[0, 0]);
		}

		data
	}

	/// Size of the serialized chunk body in bytes.
	pub fn byte_size(&self) -> usize {
		let animations = 2
			+ self.animations.len() * 6
			+ if self.animations.len() % 2 == 0 {
				2
			} else {
				0
			};
		constants::HEADER_FIXED_SIZE + self.entries.len() * constants::FRAME_ENTRY_SIZE + animations
	}

	/// Format version.
	pub fn version(&self) -> u32 {
		self.version
	}

	/// Bits per pixel (8 or 16).
	pub fn bits_per_pixel(&self) -> u8 {
		self.bits_per_pixel
	}

	/// Returns the pixel storage mode.
	pub fn color_mode(&self) -> Result<ColorMode, TgrError> {
		ColorMode::from_bits(self.bits_per_pixel)
	}

	/// Returns true when the index mode marks a paletted file.
	pub fn indexed_color(&self) -> bool {
		self.index_mode & 0x7F == constants::INDEX_MODE_PALETTED
	}

	/// Canvas size (width, height).
	pub fn size(&self) -> (u16, u16) {
		self.size
	}

	/// Draw anchor relative to the owning game object.
	pub fn hotspot(&self) -> (u16, u16) {
		self.hotspot
	}

	/// Clickable region (x min, y min, x max, y max).
	pub fn bounding_box(&self) -> [u16; 4] {
		self.bounding_box
	}

	/// Frame table entries.
	pub fn entries(&self) -> &[FrameEntry] {
		&self.entries
	}

	/// Animation table.
	pub fn animations(&self) -> &[Animation] {
		&self.animations
	}
}

impl fmt::Display for Header {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"TGR v{}: {}x{}, {}bpp, {} frames, {} animations",
			self.version,
			self.size.0,
			self.size.1,
			self.bits_per_pixel,
			self.entries.len(),
			self.animations.len()
		)
	}
}

/// A loaded TGR file.
///
/// The raw bytes stay resident; frames are walked and decoded on demand.
#[derive(Debug, Clone)]
pub struct File {
	raw: Vec<u8>,
	header: Header,
	palette: Option<Palette>,
}

impl File {
	/// Opens a TGR file from the specified path.
	pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, TgrError> {
		let data = std::fs::read(path)?;
		Self::from_raw(data)
	}

	/// Loads a TGR file from a byte slice.
	pub fn from_bytes(data: &[u8]) -> Result<Self, TgrError> {
		Self::from_raw(data.to_vec())
	}

	/// Loads a TGR file from any reader.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, TgrError> {
		let mut raw = Vec::new();
		reader.read_to_end(&mut raw)?;
		Self::from_raw(raw)
	}

	fn from_raw(raw: Vec<u8>) -> Result<Self, TgrError> {
		let form = Form::from_bytes(&raw)?;
		if form.form_type != constants::FORM_TYPE {
			return Err(TgrError::InvalidFormType(form.form_type));
		}

		let hedr = form.chunks.first().ok_or(TgrError::InvalidChunk {
			expected: "HEDR",
			actual: [0; 4],
		})?;
		if hedr.id != constants::HEDR_ID {
			return Err(TgrError::InvalidChunk {
				expected: "HEDR",
				actual: hedr.id,
			});
		}
		let header = Header::from_bytes(hedr.data(&raw)?)?;

		let palette = if header.indexed_color() {
			let palt = form.chunks.get(1).filter(|c| c.id == constants::PALT_ID);
			let palt = palt.ok_or(TgrError::PaletteMissing)?;
			Some(Palette::from_bytes(palt.data(&raw)?)?)
		} else {
			None
		};

		Ok(Self {
			raw,
			header,
			palette,
		})
	}

	/// Returns the parsed header.
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// Returns the palette of an 8bpp file.
	pub fn palette(&self) -> Option<&Palette> {
		self.palette.as_ref()
	}

	/// Returns the number of frames in the file.
	pub fn frame_count(&self) -> usize {
		self.header.entries.len()
	}

	/// Walks the line table of a frame.
	pub fn frame(&self, index: usize) -> Result<Frame, TgrError> {
		let entry = *self.header.entries.get(index).ok_or(TgrError::FrameOutOfRange {
			index,
			total: self.header.entries.len(),
		})?;

		if entry.is_padding() {
			return Ok(Frame::padding(entry));
		}

		let mut cursor = Cursor::new(self.raw.as_slice());
		cursor.seek(SeekFrom::Start(u64::from(entry.offset)))?;
		Frame::from_reader(&mut cursor, entry)
	}

	/// Decodes a frame into expanded RGBA pixels.
	///
	/// Rows shorter than the frame width are padded with the transparent
	/// sentinel; rows that over-produce are clipped at the width. Padding
	/// frames decode to an empty image.
	pub fn decode_frame(
		&self,
		index: usize,
		colors: &PlayerColors,
		player: u8,
	) -> Result<FrameImage, TgrError> {
		let frame = self.frame(index)?;
		if frame.is_padding() {
			return Ok(FrameImage::empty());
		}

		let width = frame.entry().width() as usize;
		let height = frame.entry().height() as usize;
		let decoder = LineDecoder::new(
			self.header.color_mode()?,
			self.palette.as_ref(),
			colors.player(player),
			player,
		)?;

		let mut pixels = Vec::with_capacity(width * height);
		let mut cursor = Cursor::new(self.raw.as_slice());
		for (line_index, line) in frame.lines().iter().enumerate() {
			cursor.seek(SeekFrom::Start(line.data_offset))?;
			let mut row = decoder
				.decode_line(&mut cursor, line)
				.map_err(|e| e.in_line(index, line_index))?;
			row.resize(width, Pixel::TRANSPARENT);
			pixels.extend_from_slice(&row);
		}

		Ok(FrameImage::new(width, height, pixels))
	}

	/// Returns an iterator over the parsed frames.
	pub fn frames(&self) -> FrameIterator<'_> {
		FrameIterator {
			file: self,
			current_index: 0,
		}
	}

	/// Returns the raw file bytes.
	pub fn as_bytes(&self) -> &[u8] {
		&self.raw
	}
}

impl fmt::Display for File {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TGR File: {} frames, {} bytes", self.frame_count(), self.raw.len())
	}
}

/// Iterator over the frames of a TGR file.
#[derive(Debug, Clone)]
pub struct FrameIterator<'a> {
	file: &'a File,
	current_index: usize,
}

impl Iterator for FrameIterator<'_> {
	type Item = Result<Frame, TgrError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.current_index >= self.file.frame_count() {
			return None;
		}
		let frame = self.file.frame(self.current_index);
		self.current_index += 1;
		Some(frame)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let remaining = self.file.frame_count() - self.current_index;
		(remaining, Some(remaining))
	}
}

impl ExactSizeIterator for FrameIterator<'_> {
	fn len(&self) -> usize {
		self.file.frame_count() - self.current_index
	}
}
