use crate::gm::bytes::Cursor;
use crate::gm::{GmError, Result};

/// Known chunk kinds, tagged by their little-endian four-character codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
	/// Packed-integer vertex stream (old format).
	Dot2,
	/// Compressed vertex stream.
	FDot,
	/// Simple primitive stream.
	Prim,
	/// Complex primitive/surface stream.
	Line,
	/// Animation property frame.
	SoPF,
	/// Animation position frame.
	FPos,
	/// Texture names (opaque to the decoder).
	TxNm,
	/// Stream terminator (`"End "`, note the trailing space).
	End,
	/// Any id outside the known set; scanned over, never dispatched.
	Unknown,
}

impl ChunkKind {
	/// Map a raw little-endian chunk id to its kind.
	pub fn from_raw(raw: u32) -> Self {
		match raw {
			0x3274_6F44 => ChunkKind::Dot2,
			0x746F_4446 => ChunkKind::FDot,
			0x6D69_7250 => ChunkKind::Prim,
			0x656E_694C => ChunkKind::Line,
			0x4650_6F73 => ChunkKind::SoPF,
			0x736F_5046 => ChunkKind::FPos,
			0x6D4E_7854 => ChunkKind::TxNm,
			0x2064_6E45 => ChunkKind::End,
			_ => ChunkKind::Unknown,
		}
	}

	/// Resolve a four-character chunk name to a known kind.
	pub fn from_name(name: &str) -> Result<Self> {
		match name {
			"Dot2" => Ok(ChunkKind::Dot2),
			"FDot" => Ok(ChunkKind::FDot),
			"Prim" => Ok(ChunkKind::Prim),
			"Line" => Ok(ChunkKind::Line),
			"soPF" => Ok(ChunkKind::SoPF),
			"FPos" => Ok(ChunkKind::FPos),
			"TxNm" => Ok(ChunkKind::TxNm),
			"End" | "End " => Ok(ChunkKind::End),
			_ => Err(GmError::InvalidChunkName { name: name.to_owned() }),
		}
	}

	/// Canonical chunk name.
	pub fn name(&self) -> &'static str {
		match self {
			ChunkKind::Dot2 => "Dot2",
			ChunkKind::FDot => "FDot",
			ChunkKind::Prim => "Prim",
			ChunkKind::Line => "Line",
			ChunkKind::SoPF => "soPF",
			ChunkKind::FPos => "FPos",
			ChunkKind::TxNm => "TxNm",
			ChunkKind::End => "End ",
			ChunkKind::Unknown => "????",
		}
	}
}

/// Parsed chunk header record.
#[derive(Debug, Clone, Copy)]
pub struct ChunkHead {
	/// Raw little-endian chunk id.
	pub raw_id: u32,
	/// Classified chunk kind.
	pub kind: ChunkKind,
	/// Declared payload size in bytes.
	pub size: u32,
}

impl ChunkHead {
	/// Parse an 8-byte chunk header at the cursor.
	pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
		let raw_id = cursor.read_u32_le()?;
		let size = cursor.read_u32_le()?;
		Ok(Self {
			raw_id,
			kind: ChunkKind::from_raw(raw_id),
			size,
		})
	}

	/// Total chunk footprint including the 8-byte header.
	pub fn total_size(&self) -> usize {
		8 + self.size as usize
	}

	/// Whether this chunk terminates the stream.
	pub fn is_end(&self) -> bool {
		self.kind == ChunkKind::End
	}

	/// Printable label for the raw id (ASCII where possible).
	pub fn label(&self) -> String {
		let mut out = String::new();
		for byte in self.raw_id.to_le_bytes() {
			if byte.is_ascii_graphic() || byte == b' ' {
				out.push(char::from(byte));
			} else {
				out.push('.');
			}
		}
		out
	}
}

/// One chunk with its borrowed payload.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
	/// Parsed chunk header.
	pub head: ChunkHead,
	/// Payload bytes, `head.size` long.
	pub payload: &'a [u8],
	/// Offset of the chunk header within the file.
	pub file_offset: usize,
}

/// Iterator over the chunk stream, terminating at the first `End` chunk.
///
/// A stream that exhausts before an `End` chunk yields a final
/// [`GmError::Truncated`] item, as does any chunk whose declared footprint
/// overruns the input.
pub struct ChunkIter<'a> {
	cursor: Cursor<'a>,
	offset_base: usize,
	done: bool,
}

impl<'a> ChunkIter<'a> {
	/// Create an iterator over `bytes` starting at `offset`.
	pub fn new(bytes: &'a [u8], offset: usize) -> Self {
		let slice = bytes.get(offset..).unwrap_or(&[]);
		Self {
			cursor: Cursor::new(slice),
			offset_base: offset,
			done: false,
		}
	}
}

impl<'a> Iterator for ChunkIter<'a> {
	type Item = Result<Chunk<'a>>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}

		let file_offset = self.offset_base + self.cursor.pos();
		if self.cursor.remaining() < 8 {
			// No End chunk was seen; the stream is incomplete.
			self.done = true;
			return Some(Err(GmError::Truncated {
				at: file_offset,
				need: 8,
				rem: self.cursor.remaining(),
			}));
		}

		let head = match ChunkHead::parse(&mut self.cursor) {
			Ok(value) => value,
			Err(err) => {
				self.done = true;
				return Some(Err(err));
			}
		};

		let payload = match self.cursor.read_exact(head.size as usize) {
			Ok(value) => value,
			Err(_) => {
				self.done = true;
				return Some(Err(GmError::Truncated {
					at: file_offset,
					need: head.total_size(),
					rem: 8 + self.cursor.remaining(),
				}));
			}
		};

		if head.is_end() {
			self.done = true;
		}

		Some(Ok(Chunk { head, payload, file_offset }))
	}
}
