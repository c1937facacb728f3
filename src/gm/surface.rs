use crate::gm::prim::PrimitiveKind;
use crate::gm::{GmError, Result};

/// Sentinel returned by [`SurfaceTable::get_surface_hash`] on a miss.
pub const SURFACE_MISS: u16 = 0xFFFF;

const CHAIN_END: i32 = -1;

/// One registered surface with its rendering data.
///
/// The table entry proper is the 8-byte logical record `texture_id`,
/// `primitive_type`, `flags`, `status`; the remaining fields are the
/// per-surface batch data accumulated during decode.
#[derive(Debug, Clone, Default)]
pub struct Surface {
	/// Surface identifier (0 is reserved).
	pub surface_id: u16,
	/// Texture identifier, `-1` for untextured.
	pub texture_id: i16,
	/// Raw primitive type value.
	pub primitive_type: u16,
	/// Surface flags, the low word of the primitive-flag register.
	pub flags: u16,
	/// Status bits: bit 0 active, bit 1 alpha.
	pub status: u16,
	/// Vertex indices batched for this surface.
	pub index_buffer: Vec<u16>,
	/// Raw primitive records attached to this surface.
	pub primitive_data: Vec<u32>,
	/// Offset into the shape's vertex buffer.
	pub vertex_offset: u32,
	/// Offset into the shape's index data.
	pub index_offset: u32,
	/// Number of primitives batched into this surface.
	pub primitive_count: u32,
}

impl Surface {
	/// Whether the surface slot is allocated.
	pub fn is_active(&self) -> bool {
		self.status & 0x01 != 0
	}

	/// Whether the surface renders with alpha.
	pub fn has_alpha(&self) -> bool {
		self.status & 0x02 != 0
	}

	fn set_active(&mut self, active: bool) {
		if active {
			self.status |= 0x01;
		} else {
			self.status &= !0x01;
		}
	}

	fn set_alpha(&mut self, alpha: bool) {
		if alpha {
			self.status |= 0x02;
		} else {
			self.status &= !0x02;
		}
	}
}

/// Hash entry linking one `(primitive_type, flags)` key into a texture's
/// collision chain. The on-record layout is 16 bytes; the padding and
/// reserved words carry no information and are not materialized.
#[derive(Debug, Clone, Copy)]
struct HashEntry {
	search_key: u32,
	surface_id: u16,
	next_entry: i32,
}

/// Deduplicating surface registry keyed by `(primitive_type, texture_id, flags)`.
///
/// Lookup starts from a texture-indexed head table (`texture_id + 1`, so the
/// `-1` "no texture" sentinel lands in slot 0) and walks a LIFO collision
/// chain comparing search keys.
pub struct SurfaceTable {
	first: Vec<i32>,
	entries: Vec<HashEntry>,
	surfaces: Vec<Surface>,
	max_textures: i32,
	max_surfaces: u16,
	next_surface: u16,
	next_entry: u16,
}

impl SurfaceTable {
	/// Create a table bounded by `max_textures` and `max_surfaces`.
	/// Surface id 0 is reserved.
	pub fn new(max_textures: i32, max_surfaces: u16) -> Result<Self> {
		if max_textures <= 0 || max_surfaces <= 1 {
			return Err(GmError::SurfaceNotReady { max_textures, max_surfaces });
		}

		Ok(Self {
			first: vec![CHAIN_END; max_textures as usize + 1],
			entries: Vec::with_capacity(max_surfaces as usize),
			surfaces: vec![Surface::default(); max_surfaces as usize],
			max_textures,
			max_surfaces,
			next_surface: 1,
			next_entry: 0,
		})
	}

	/// Read-only lookup; returns [`SURFACE_MISS`] when no surface matches.
	pub fn get_surface_hash(&self, primitive_type: u16, texture_id: i16, flags: u16) -> u16 {
		if !self.texture_in_bounds(texture_id) {
			return SURFACE_MISS;
		}

		let key = search_key(primitive_type, flags);
		let mut link = self.first[(i32::from(texture_id) + 1) as usize];
		while link != CHAIN_END {
			let entry = &self.entries[link as usize];
			if entry.search_key == key {
				return entry.surface_id;
			}
			link = entry.next_entry;
		}
		SURFACE_MISS
	}

	/// Find the surface for the key, creating and chaining a new one on miss.
	pub fn get_or_create_surface(&mut self, primitive_type: u16, texture_id: i16, flags: u16) -> Result<u16> {
		if !self.texture_in_bounds(texture_id) {
			return Err(GmError::InvalidTexture {
				texture_id,
				max_textures: self.max_textures,
			});
		}

		let existing = self.get_surface_hash(primitive_type, texture_id, flags);
		if existing != SURFACE_MISS {
			self.update_surface_alpha(existing)?;
			return Ok(existing);
		}

		let surface_id = self.next_surface;
		if surface_id >= self.max_surfaces {
			return Err(GmError::SurfaceLimit {
				max_surfaces: self.max_surfaces,
			});
		}

		let slot = &mut self.surfaces[surface_id as usize];
		if slot.is_active() {
			return Err(GmError::SurfaceAllocConflict { surface_id });
		}
		slot.surface_id = surface_id;
		slot.texture_id = texture_id;
		slot.primitive_type = primitive_type;
		slot.flags = flags;
		slot.set_active(true);
		self.next_surface += 1;

		let entry_index = self.next_entry;
		self.entries.push(HashEntry {
			search_key: search_key(primitive_type, flags),
			surface_id,
			next_entry: self.first[(i32::from(texture_id) + 1) as usize],
		});
		self.first[(i32::from(texture_id) + 1) as usize] = i32::from(entry_index);
		self.next_entry += 1;

		self.update_surface_alpha(surface_id)?;
		Ok(surface_id)
	}

	/// Refresh the alpha bit from the surface's primitive class.
	pub fn update_surface_alpha(&mut self, surface_id: u16) -> Result<()> {
		let surface = self
			.surfaces
			.get_mut(surface_id as usize)
			.filter(|slot| slot.is_active())
			.ok_or(GmError::SurfaceNotAllocated { surface_id })?;

		if surface.primitive_type == PrimitiveKind::TriangleStrip.raw() {
			surface.set_alpha(true);
		}
		Ok(())
	}

	/// Borrow an allocated surface.
	pub fn surface(&self, surface_id: u16) -> Option<&Surface> {
		self.surfaces.get(surface_id as usize).filter(|slot| slot.is_active())
	}

	/// Mutably borrow an allocated surface.
	pub fn surface_mut(&mut self, surface_id: u16) -> Result<&mut Surface> {
		self.surfaces
			.get_mut(surface_id as usize)
			.filter(|slot| slot.is_active())
			.ok_or(GmError::SurfaceNotAllocated { surface_id })
	}

	/// Number of allocated surfaces.
	pub fn allocated(&self) -> u16 {
		self.next_surface - 1
	}

	/// Remove and return every allocated surface in id order.
	pub fn drain_active(&mut self) -> Vec<Surface> {
		let count = self.next_surface as usize;
		self.next_surface = 1;
		self.next_entry = 0;
		self.entries.clear();
		for head in &mut self.first {
			*head = CHAIN_END;
		}
		self.surfaces
			.splice(1..count, std::iter::repeat_with(Surface::default).take(count - 1))
			.collect()
	}

	fn texture_in_bounds(&self, texture_id: i16) -> bool {
		texture_id >= -1 && i32::from(texture_id) < self.max_textures
	}
}

fn search_key(primitive_type: u16, flags: u16) -> u32 {
	(u32::from(primitive_type) << 16) | u32::from(flags)
}
