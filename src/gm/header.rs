use crate::gm::bytes::read_u32_le;
use crate::gm::{GmError, Result};

/// `3DGM` magic as a little-endian 32-bit value.
pub const MAGIC: u32 = 0x4D47_4433;

/// Inclusive bounds of the version-only header range.
pub const VERSION_RANGE: (u32, u32) = (0x0100_0100, 0x1000_0100);

/// How the leading bytes of a file were classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
	/// Chunks start at offset 0.
	NoHeader,
	/// Single 4-byte version word.
	VersionOnly,
	/// 12-byte magic + version + info header.
	FullHeader,
}

/// Parsed 3GM file header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
	/// Header classification.
	pub kind: HeaderKind,
	/// `3DGM` magic for full headers, 0 otherwise.
	pub magic: u32,
	/// Container version word.
	pub version: u32,
	/// Info field (full headers only).
	pub info: u32,
	/// Total header size in bytes.
	pub header_size: usize,
	/// Offset where the chunk stream begins.
	pub chunk_offset: usize,
}

impl FileHeader {
	/// Classify the leading bytes of `bytes`.
	///
	/// Classification is a total function of the first four bytes plus the
	/// length threshold for full headers; anything that is neither the magic
	/// nor a version word yields [`HeaderKind::NoHeader`].
	pub fn classify(bytes: &[u8]) -> Result<Self> {
		if bytes.len() < 4 {
			return Err(GmError::BadHeader);
		}

		let word = read_u32_le(bytes, 0)?;
		if word == MAGIC {
			if bytes.len() < 12 {
				return Err(GmError::BadHeader);
			}
			return Ok(Self {
				kind: HeaderKind::FullHeader,
				magic: word,
				version: read_u32_le(bytes, 4)?,
				info: read_u32_le(bytes, 8)?,
				header_size: 12,
				chunk_offset: 12,
			});
		}

		if in_version_range(word) {
			return Ok(Self {
				kind: HeaderKind::VersionOnly,
				magic: 0,
				version: word,
				info: 0,
				header_size: 4,
				chunk_offset: 4,
			});
		}

		Ok(Self {
			kind: HeaderKind::NoHeader,
			magic: 0,
			version: 0,
			info: 0,
			header_size: 0,
			chunk_offset: 0,
		})
	}

	/// Check the classified header against the containing file.
	///
	/// Requires that at least one 8-byte chunk header fits after the header,
	/// that full headers carry the magic, and that version-only headers stay
	/// in range.
	pub fn validate(&self, file_size: usize) -> Result<()> {
		if file_size < self.chunk_offset + 8 {
			return Err(GmError::BadHeader);
		}
		match self.kind {
			HeaderKind::FullHeader if self.magic != MAGIC => Err(GmError::BadHeader),
			HeaderKind::VersionOnly if !in_version_range(self.version) => Err(GmError::BadHeader),
			_ => Ok(()),
		}
	}

	/// Human-readable label for the header kind.
	pub fn kind_label(&self) -> &'static str {
		match self.kind {
			HeaderKind::NoHeader => "none",
			HeaderKind::VersionOnly => "version_only",
			HeaderKind::FullHeader => "full",
		}
	}
}

/// Version words appear in either byte order in the wild; a word qualifies
/// when the range check passes for the word itself or its byte reversal.
fn in_version_range(word: u32) -> bool {
	let range = VERSION_RANGE.0..=VERSION_RANGE.1;
	range.contains(&word) || range.contains(&word.swap_bytes())
}
