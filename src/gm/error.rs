use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, GmError>;

/// Errors produced while reading and decoding `.3GM` data.
#[derive(Debug, Error)]
pub enum GmError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// First bytes do not form a recognizable 3GM header.
	#[error("invalid 3GM header")]
	BadHeader,
	/// The input ended before a read could be satisfied.
	#[error("input ends early: wanted {need} bytes at offset {at}, only {rem} left")]
	Truncated {
		/// Offset of the failed read.
		at: usize,
		/// Bytes the read required.
		need: usize,
		/// Bytes actually left in the input.
		rem: usize,
	},
	/// A required buffer was missing or a declared size overran bounds.
	#[error("null or invalid input: {what}")]
	NullOrInvalidInput {
		/// Description of the offending input.
		what: &'static str,
	},
	/// An operation was attempted on an uninitialized subsystem.
	#[error("{system} system not initialized")]
	SystemNotInitialized {
		/// Subsystem name.
		system: &'static str,
	},
	/// Surface table was constructed with unusable bounds.
	#[error("surface system not ready (max_textures={max_textures}, max_surfaces={max_surfaces})")]
	SurfaceNotReady {
		/// Requested texture bound.
		max_textures: i32,
		/// Requested surface bound.
		max_surfaces: u16,
	},
	/// Surface allocation exceeded the configured surface bound.
	#[error("surface limit exceeded (max_surfaces={max_surfaces})")]
	SurfaceLimit {
		/// Configured surface bound.
		max_surfaces: u16,
	},
	/// Freshly allocated surface slot was already marked active.
	#[error("surface {surface_id} already allocated")]
	SurfaceAllocConflict {
		/// Conflicting surface id.
		surface_id: u16,
	},
	/// Surface id does not refer to an allocated surface.
	#[error("surface {surface_id} not allocated")]
	SurfaceNotAllocated {
		/// Offending surface id.
		surface_id: u16,
	},
	/// Texture id is outside the configured texture bound.
	#[error("invalid texture id {texture_id} (max_textures={max_textures})")]
	InvalidTexture {
		/// Offending texture id.
		texture_id: i16,
		/// Configured texture bound.
		max_textures: i32,
	},
	/// Expanded triangle count exceeded the shape's polygon budget.
	#[error("polygon limit exceeded (max_triangles={max_triangles})")]
	PolygonLimit {
		/// Maximum expanded triangle count.
		max_triangles: usize,
	},
	/// Property-frame payload declared more data than the chunk holds.
	#[error("invalid dynamic data: need {need} bytes, have {have}")]
	InvalidDynamicData {
		/// Required payload bytes.
		need: usize,
		/// Available payload bytes.
		have: usize,
	},
	/// Malformed animation payload or animation reference.
	#[error("invalid animation data: {what}")]
	InvalidAnimation {
		/// Description of the malformed item.
		what: &'static str,
	},
	/// Keyframe interpolation requested past the batch's target time.
	#[error("global time {global_time} exceeds batch target time {target_time}")]
	KeyframeTimeOrder {
		/// Current global animation time.
		global_time: f32,
		/// Batch target time.
		target_time: f32,
	},
	/// Chunk id is not one of the known kinds.
	#[error("unknown chunk id 0x{id:08x}")]
	UnknownChunk {
		/// Raw little-endian chunk id.
		id: u32,
	},
	/// CLI chunk name argument was invalid.
	#[error("invalid chunk name: {name}")]
	InvalidChunkName {
		/// User-provided chunk name.
		name: String,
	},
	/// Primitive stream carried an unrecognized type token.
	#[error("unsupported primitive type {raw} at offset {at}")]
	UnsupportedPrimitive {
		/// Raw 16-bit type token.
		raw: u16,
		/// Payload byte offset of the token.
		at: usize,
	},
	/// Vertex payload size does not match the codec's layout.
	#[error("bad {algorithm} vertex payload of {size} bytes")]
	VertexPayload {
		/// Codec name.
		algorithm: &'static str,
		/// Offending payload size.
		size: usize,
	},
	/// Primitive payload ran out mid-primitive.
	#[error("primitive stream truncated at offset {at}")]
	TruncatedPrimitive {
		/// Payload byte offset of the failed read.
		at: usize,
	},
	/// Line payload ran out before its pipeline completed.
	#[error("line stream truncated at offset {at}")]
	TruncatedLine {
		/// Payload byte offset of the failed read.
		at: usize,
	},
	/// FPos position data size disagrees with its frame count.
	#[error("FPos size mismatch: frame_count={frame_count}, position_data_size={position_data_size}")]
	FPosSizeMismatch {
		/// Declared frame count.
		frame_count: u32,
		/// Declared position data size in bytes.
		position_data_size: u32,
	},
	/// Decoded shape violated an internal consistency invariant.
	#[error("shape inconsistency: {detail}")]
	ShapeInconsistent {
		/// Violated invariant.
		detail: &'static str,
	},
}

impl GmError {
	/// Legacy engine event code carried as diagnostic metadata, when one exists.
	pub fn code(&self) -> Option<u32> {
		match self {
			GmError::NullOrInvalidInput { .. } => Some(0x6A),
			GmError::SystemNotInitialized { .. } => Some(0x64),
			GmError::SurfaceNotReady { .. } => Some(0x960),
			GmError::SurfaceLimit { .. } => Some(2402),
			GmError::SurfaceAllocConflict { .. } => Some(2403),
			GmError::SurfaceNotAllocated { .. } => Some(2404),
			GmError::InvalidTexture { .. } => Some(800),
			GmError::PolygonLimit { .. } => Some(221),
			GmError::InvalidDynamicData { .. } => Some(0xF4),
			GmError::InvalidAnimation { .. } => Some(0xF6),
			GmError::KeyframeTimeOrder { .. } => Some(249),
			_ => None,
		}
	}
}
