use crate::gm::anim::Animation;
use crate::gm::surface::Surface;
use crate::gm::vertex::{self, STRIDE, TERMINATOR_BITS};
use crate::gm::{GmError, Result};

/// Shape flag set when a `Prim` chunk was decoded.
pub const FLAG_PRIM_PATH: u32 = 1 << 2;
/// Shape flag set when a `Line` chunk was decoded.
pub const FLAG_LINE_PATH: u32 = 1 << 3;
/// Shape flag set when animation data was attached.
pub const FLAG_ANIMATED: u32 = 1 << 7;

/// Hard ceiling on expanded triangles per shape.
pub const MAX_TRIANGLES: usize = 0xFFFF;

/// Primitive kinds exposed to exporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
	/// Plain expanded triangle.
	Triangle,
	/// Triangle strip.
	TriangleStrip,
	/// Quad strip.
	QuadStrip,
	/// Line strip (degenerate, no triangle expansion).
	LineStrip,
	/// Point sprite (degenerate, no triangle expansion).
	PointSprite,
	/// Verbatim triangle list.
	TriangleList,
	/// Complex primitive carried as an opaque record.
	Complex,
}

/// One decoded primitive with exporter-facing indices.
#[derive(Debug, Clone)]
pub struct Primitive {
	/// Exported primitive kind.
	pub kind: ExportKind,
	/// Source vertex indices, widened for downstream consumers.
	pub indices: Vec<u32>,
	/// Texture the primitive was registered under.
	pub texture_id: i16,
	/// Low word of the primitive-flag register at decode time.
	pub flags: u16,
}

/// The decoder's single output: vertex geometry, expanded topology,
/// registered surfaces, and optional animation data.
#[derive(Debug, Default)]
pub struct Shape {
	/// Vertex floats, stride 8, closed by the terminator sentinel.
	pub vertex_buffer: Vec<f32>,
	/// Number of vertices held by `vertex_buffer`.
	pub vertex_count: usize,
	/// Expanded triangle-list indices into the vertex buffer.
	pub primitive_buffer: Vec<u16>,
	/// Decoded primitives in stream order.
	pub primitives: Vec<Primitive>,
	/// Surfaces registered during decode, in id order.
	pub surfaces: Vec<Surface>,
	/// Animation data, present once a `soPF` or `FPos` chunk was consumed.
	pub animation: Option<Animation>,
	/// Decode-path and animation flag bits.
	pub shape_flags: u32,
	/// Active texture id, `-1` for none.
	pub texture_id: i16,
	/// Min/max XYZ over the decoded positions; unset without vertices.
	pub bounding_box: Option<[f32; 6]>,
}

impl Shape {
	/// Create an empty, untextured shape.
	pub fn new() -> Self {
		Self {
			texture_id: -1,
			..Self::default()
		}
	}

	/// Floats stored per vertex.
	pub fn vertex_stride(&self) -> usize {
		STRIDE
	}

	/// Append a decoded vertex buffer, keeping a single trailing terminator.
	pub fn append_vertices(&mut self, buffer: Vec<f32>) {
		let added = vertex::vertex_count(&buffer);
		if self.vertex_buffer.is_empty() {
			self.vertex_buffer = buffer;
		} else {
			self.vertex_buffer.pop();
			self.vertex_buffer.extend_from_slice(&buffer);
		}
		self.vertex_count += added;
	}

	/// Append one expanded triangle, honoring the polygon budget.
	pub fn push_triangle(&mut self, a: u16, b: u16, c: u16) -> Result<()> {
		if self.primitive_buffer.len() / 3 >= MAX_TRIANGLES {
			return Err(GmError::PolygonLimit {
				max_triangles: MAX_TRIANGLES,
			});
		}
		self.primitive_buffer.extend_from_slice(&[a, b, c]);
		Ok(())
	}

	/// The strided vertex float slice (positions in lanes 0..3).
	pub fn positions(&self) -> &[f32] {
		let end = self.vertex_count * STRIDE;
		&self.vertex_buffer[..end.min(self.vertex_buffer.len())]
	}

	/// XYZ of one vertex.
	pub fn position(&self, index: usize) -> [f32; 3] {
		let base = index * STRIDE;
		[
			self.vertex_buffer[base],
			self.vertex_buffer[base + 1],
			self.vertex_buffer[base + 2],
		]
	}

	/// Per-vertex normals; this container format does not carry any.
	pub fn normals(&self) -> Option<&[f32]> {
		None
	}

	/// Per-vertex texture coordinates; this container format does not carry any.
	pub fn texcoords(&self) -> Option<&[f32]> {
		None
	}

	/// Per-vertex colors; this container format does not carry any.
	pub fn colors(&self) -> Option<&[f32]> {
		None
	}

	/// Whether animation chunks were consumed.
	pub fn has_animation(&self) -> bool {
		self.animation.is_some()
	}

	/// Total animation position frames across all ingested `FPos` chunks.
	pub fn animation_frame_count(&self) -> u32 {
		self.animation.as_ref().map_or(0, Animation::frame_count)
	}

	/// Animation store, created on first use.
	pub fn animation_mut(&mut self) -> &mut Animation {
		self.shape_flags |= FLAG_ANIMATED;
		self.animation.get_or_insert_with(Animation::default)
	}

	/// Recompute the min/max XYZ bounding box from the decoded positions.
	pub fn compute_bounding_box(&mut self) {
		if self.vertex_count == 0 {
			self.bounding_box = None;
			return;
		}

		let mut bounds = [f32::INFINITY, f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY];
		for index in 0..self.vertex_count {
			let [x, y, z] = self.position(index);
			bounds[0] = bounds[0].min(x);
			bounds[1] = bounds[1].min(y);
			bounds[2] = bounds[2].min(z);
			bounds[3] = bounds[3].max(x);
			bounds[4] = bounds[4].max(y);
			bounds[5] = bounds[5].max(z);
		}
		self.bounding_box = Some(bounds);
	}

	/// Check the shape's post-decode consistency invariants.
	pub fn validate(&self) -> Result<()> {
		if !self.vertex_buffer.is_empty() {
			if self.vertex_buffer.len() != self.vertex_count * STRIDE + 1 {
				return Err(GmError::ShapeInconsistent {
					detail: "vertex buffer length does not match vertex count",
				});
			}
			let last = self.vertex_buffer[self.vertex_buffer.len() - 1];
			if last.to_bits() != TERMINATOR_BITS {
				return Err(GmError::ShapeInconsistent {
					detail: "vertex buffer is missing its terminator",
				});
			}
			for &index in &self.primitive_buffer {
				if usize::from(index) >= self.vertex_count {
					return Err(GmError::ShapeInconsistent {
						detail: "primitive index out of vertex range",
					});
				}
			}
		}

		for surface in &self.surfaces {
			if !surface.is_active() || surface.primitive_count == 0 {
				return Err(GmError::ShapeInconsistent {
					detail: "registered surface inactive or empty",
				});
			}
		}
		Ok(())
	}
}
