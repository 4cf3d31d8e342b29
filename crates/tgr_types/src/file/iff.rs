//! Minimal IFF (EA-85 Interchange File Format) container support.
//!
//! TGR files are a single `FORM` whose form type is `TGAR`. The children
//! are addressed positionally: `HEDR` comes first, `PALT` second when the
//! header declares indexed color, and the frame data chunks follow. Frame
//! offsets in the header are absolute file offsets, so after locating the
//! leading chunks the walker is never consulted again.

use crate::file::error::TgrError;

/// Chunk id of the outer container
pub const FORM_ID: [u8; 4] = *b"FORM";

/// A child chunk: 4-byte id, big-endian u32 length, body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
	/// Four-character chunk id
	pub id: [u8; 4],
	/// Absolute offset of the chunk body within the file
	pub data_offset: usize,
	/// Body length in bytes
	pub length: u32,
}

impl Chunk {
	/// Returns the chunk body as a slice of `file`.
	pub fn data<'a>(&self, file: &'a [u8]) -> Result<&'a [u8], TgrError> {
		let end = self.data_offset + self.length as usize;
		file.get(self.data_offset..end).ok_or(TgrError::InsufficientData {
			expected: end,
			actual: file.len(),
		})
	}
}

/// A parsed `FORM` container with its child chunk table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
	/// Form type following the FORM header (`TGAR` for sprite containers)
	pub form_type: [u8; 4],
	/// Child chunks in file order
	pub chunks: Vec<Chunk>,
}

impl Form {
	/// Parses the FORM header and walks the child chunk table.
	///
	/// Chunk bodies are even-aligned per the IFF standard; a pad byte after
	/// an odd-length body is skipped and belongs to no chunk.
	pub fn from_bytes(data: &[u8]) -> Result<Self, TgrError> {
		if data.len() < 12 {
			return Err(TgrError::InsufficientData {
				expected: 12,
				actual: data.len(),
			});
		}

		let id = [data[0], data[1], data[2], data[3]];
		if id != FORM_ID {
			return Err(TgrError::InvalidChunk {
				expected: "FORM",
				actual: id,
			});
		}

		let form_length = u32::from_be_bytes([data[4], data[5], data[6], data[7]]) as usize;
		let form_type = [data[8], data[9], data[10], data[11]];
		let end = data.len().min(8 + form_length);

		let mut chunks = Vec::new();
		let mut pos = 12;
		while pos + 8 <= end {
			let id = [data[pos], data[pos + 1], data[pos + 2], data[pos + 3]];
			let length =
				u32::from_be_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]]);
			let data_offset = pos + 8;

			let body_end = data_offset + length as usize;
			if body_end > end {
				return Err(TgrError::InsufficientData {
					expected: body_end,
					actual: end,
				});
			}

			chunks.push(Chunk {
				id,
				data_offset,
				length,
			});

			pos = body_end + (body_end & 1);
		}

		Ok(Self {
			form_type,
			chunks,
		})
	}
}

/// Appends a chunk (id, big-endian length, body) to `out`, padding
/// odd-length bodies to an even boundary.
pub fn write_chunk(out: &mut Vec<u8>, id: [u8; 4], body: &[u8]) {
	out.extend_from_slice(&id);
	out.extend_from_slice(&(body.len() as u32).to_be_bytes());
	out.extend_from_slice(body);
	if body.len() % 2 != 0 {
		out.push(0);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_form() -> Vec<u8> {
		let mut children = Vec::new();
		write_chunk(&mut children, *b"AAAA", &[1, 2, 3, 4]);
		write_chunk(&mut children, *b"BBBB", &[5, 6, 7]); // odd, padded

		let mut data = Vec::new();
		data.extend_from_slice(&FORM_ID);
		data.extend_from_slice(&((children.len() + 4) as u32).to_be_bytes());
		data.extend_from_slice(b"TGAR");
		data.extend_from_slice(&children);
		data
	}

	#[test]
	fn test_walk_chunks() {
		let data = sample_form();
		let form = Form::from_bytes(&data).unwrap();

		assert_eq!(form.form_type, *b"TGAR");
		assert_eq!(form.chunks.len(), 2);
		assert_eq!(form.chunks[0].id, *b"AAAA");
		assert_eq!(form.chunks[0].data(&data).unwrap(), &[1, 2, 3, 4]);
		assert_eq!(form.chunks[1].id, *b"BBBB");
		assert_eq!(form.chunks[1].data(&data).unwrap(), &[5, 6, 7]);
	}

	#[test]
	fn test_not_a_form() {
		let err = Form::from_bytes(b"RIFF\x00\x00\x00\x04WAVE").unwrap_err();
		assert!(matches!(err, TgrError::InvalidChunk { expected: "FORM", .. }));
	}

	#[test]
	fn test_truncated_chunk_body() {
		let mut data = sample_form();
		data.truncate(data.len() - 2);
		// FORM length now runs past the buffer, so the last chunk is short
		assert!(Form::from_bytes(&data).is_err());
	}

	#[test]
	fn test_too_short() {
		assert!(matches!(
			Form::from_bytes(b"FORM").unwrap_err(),
			TgrError::InsufficientData { .. }
		));
	}
}
