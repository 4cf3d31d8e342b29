//! Error types for file format parsing and manipulation.

use std::io::Read;

use thiserror::Error;

/// Errors that can occur when parsing, decoding or encoding TGR files
#[derive(Debug, Error)]
pub enum TgrError {
	/// Not enough data to parse
	#[error("Insufficient data: expected {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// Chunk id differs from the one required at this position
	#[error("Invalid chunk: expected {expected}, got {actual:02X?}")]
	InvalidChunk {
		/// Chunk id that was required
		expected: &'static str,
		/// Chunk id found in the file
		actual: [u8; 4],
	},

	/// FORM type is not `TGAR`
	#[error("Invalid FORM type: {0:02X?}")]
	InvalidFormType([u8; 4]),

	/// Reader hit end of stream before a required field
	#[error("Truncated stream while reading {what}")]
	TruncatedStream {
		/// Description of the field being read
		what: &'static str,
	},

	/// Reserved: all eight opcode flags are currently defined
	#[error("Invalid opcode 0x{0:02X}")]
	InvalidOpcode(u8),

	/// Encoded opcode stream for one line grew past the container limit
	#[error("Line opcode stream of {length} bytes exceeds the 0x7FFA maximum")]
	RowTooWide {
		/// Opcode stream length in bytes
		length: usize,
	},

	/// Leading transparent prefix does not fit the one-byte header field
	#[error("Leading transparent offset {offset} exceeds the 8-bit maximum")]
	OffsetOverflow {
		/// Number of leading transparent pixels
		offset: usize,
	},

	/// Opcode-produced pixel count does not fit 15 bits
	#[error("Pixel count {count} exceeds the 15-bit maximum")]
	CountOverflow {
		/// Opcode-produced pixel count
		count: usize,
	},

	/// Indexed-color decode requested without a palette
	#[error("Indexed-color decode requested without a palette")]
	PaletteMissing,

	/// Palette index past the end of the loaded palette
	#[error("Palette index {index} out of range (palette has {count} entries)")]
	InvalidPaletteIndex {
		/// Index read from the opcode stream
		index: u8,
		/// Number of palette entries
		count: usize,
	},

	/// Player-color opcode referenced an undefined shade
	#[error("No color defined for player {player}, shade {shade}")]
	UnknownPlayerColor {
		/// Active player id
		player: u8,
		/// Shade index from the opcode stream
		shade: u8,
	},

	/// Line header declares a total length smaller than the header itself
	#[error("Line header total length {total_length} smaller than its own {header_size} header bytes")]
	MalformedHeader {
		/// Total length field from the header
		total_length: u16,
		/// Size of the header in bytes
		header_size: u16,
	},

	/// Bit depth other than 8 or 16, or 8 on the encode path
	#[error("Unsupported bit depth: {0}")]
	UnsupportedBitDepth(u8),

	/// Frame index out of range
	#[error("Frame index {index} out of range (total frames: {total})")]
	FrameOutOfRange {
		/// Frame index that was requested
		index: usize,
		/// Total number of frames available
		total: usize,
	},

	/// An error located at a specific line of a specific frame
	#[error("Frame {frame}, line {line}: {source}")]
	FrameLine {
		/// Frame index (0-based)
		frame: usize,
		/// Line index within the frame (0-based)
		line: usize,
		/// Underlying error
		source: Box<TgrError>,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

impl TgrError {
	/// Wraps the error with the frame and line it occurred in.
	pub(crate) fn in_line(self, frame: usize, line: usize) -> Self {
		TgrError::FrameLine {
			frame,
			line,
			source: Box::new(self),
		}
	}
}

/// Reads exactly `buf.len()` bytes, reporting end-of-stream as
/// [`TgrError::TruncatedStream`] with the name of the field being read.
pub(crate) fn read_exact<R: Read>(
	reader: &mut R,
	buf: &mut [u8],
	what: &'static str,
) -> Result<(), TgrError> {
	reader.read_exact(buf).map_err(|e| {
		if e.kind() == std::io::ErrorKind::UnexpectedEof {
			TgrError::TruncatedStream {
				what,
			}
		} else {
			TgrError::IOError(e)
		}
	})
}

/// Errors that can occur when parsing COLORS.INI player-color tables
#[derive(Debug, Error)]
pub enum PlayerColorsError {
	/// The `[PlayerColors]` section is absent
	#[error("Missing [PlayerColors] section")]
	MissingSection,

	/// Shade index outside the 32-entry table
	#[error("Shade index out of range in key `{key}` (shades are 0-31)")]
	ShadeOutOfRange {
		/// Offending key name
		key: String,
	},

	/// A channel value failed to parse as 0-255
	#[error("Invalid color value `{value}` for key `{key}`")]
	InvalidValue {
		/// Offending key name
		key: String,
		/// Raw value text
		value: String,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

/// Errors that can occur when parsing sprite.ini repack metadata
#[derive(Debug, Error)]
pub enum SpriteIniError {
	/// A required section is absent
	#[error("Missing section [{0}]")]
	MissingSection(&'static str),

	/// A required key is absent
	#[error("Missing key `{key}` in section [{section}]")]
	MissingKey {
		/// Section the key belongs to
		section: &'static str,
		/// Key name
		key: &'static str,
	},

	/// A value failed to parse
	#[error("Invalid value `{value}` for `{section}.{key}`")]
	InvalidValue {
		/// Section the key belongs to
		section: String,
		/// Key name
		key: String,
		/// Raw value text
		value: String,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}
