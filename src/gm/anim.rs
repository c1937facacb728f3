use crate::gm::bytes::Cursor;
use crate::gm::{GmError, Result};

/// One ingested `soPF` chunk: a shape property frame with opaque data.
#[derive(Debug, Clone)]
pub struct PropertyFrame {
	/// Owning shape identifier.
	pub shape_id: u32,
	/// Number of animated properties.
	pub property_count: u32,
	/// Frame timestamp.
	pub time_stamp: f32,
	/// Opaque property payload, `data_size` bytes.
	pub data: Vec<u8>,
}

/// One ingested `FPos` chunk: per-frame position data.
#[derive(Debug, Clone)]
pub struct PositionFrame {
	/// Number of frames.
	pub frame_count: u32,
	/// Animation start time.
	pub start_time: f32,
	/// Animation end time.
	pub end_time: f32,
	/// One little-endian float per frame.
	pub positions: Vec<f32>,
}

/// One animation batch over a window of the shared keyframe pool.
#[derive(Debug, Clone, Default)]
pub struct Batch {
	/// Batch identifier.
	pub batch_id: u32,
	/// Current animation time.
	pub current_time: f32,
	/// Target time for interpolation.
	pub target_time: f32,
	/// Keyframes belonging to this batch.
	pub keyframe_count: u32,
	/// Start of this batch's window in the keyframe pool.
	pub keyframe_offset: u32,
	/// Link to a child batch, 0 for none.
	pub child_batch: u32,
	/// Opaque render-data handle.
	pub render_data: u32,
	/// Whether the batch animates.
	pub is_active: bool,
	/// Whether the batch needs a re-evaluation.
	pub requires_update: bool,
}

/// One keyframe in the shared pool; windows are sorted by time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Keyframe {
	/// Keyframe timestamp.
	pub time: f32,
	/// Batch the keyframe resolves to.
	pub batch_id: u32,
}

/// Result of a batch keyframe interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolation {
	/// Source batch id.
	pub from_batch: u32,
	/// Target batch id.
	pub to_batch: u32,
	/// Blend factor in `[0, 1)`.
	pub factor: f32,
	/// Whether no blending is needed.
	pub is_static: bool,
}

impl Interpolation {
	fn fixed(batch: u32) -> Self {
		Self {
			from_batch: batch,
			to_batch: batch,
			factor: 0.0,
			is_static: true,
		}
	}
}

/// Animation data attached to a shape: ingested frames plus the batch and
/// keyframe pools they populate.
#[derive(Debug, Default)]
pub struct Animation {
	/// Property frames in chunk order.
	pub property_frames: Vec<PropertyFrame>,
	/// Position frames in chunk order.
	pub position_frames: Vec<PositionFrame>,
	/// Animation batches.
	pub batches: Vec<Batch>,
	/// Shared keyframe pool, windowed per batch.
	pub keyframes: Vec<Keyframe>,
	/// Global animation time.
	pub global_time: f32,
}

impl Animation {
	/// Total frame count across all ingested position frames.
	pub fn frame_count(&self) -> u32 {
		self.position_frames.iter().map(|frame| frame.frame_count).sum()
	}

	/// Decode a `soPF` payload and append it to the store.
	pub fn ingest_property_frame(&mut self, payload: &[u8]) -> Result<&PropertyFrame> {
		let mut cursor = Cursor::new(payload);
		let header = cursor.read_exact(16).map_err(|_| GmError::InvalidDynamicData {
			need: 16,
			have: payload.len(),
		})?;
		let shape_id = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
		let property_count = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
		let time_stamp = f32::from_le_bytes([header[8], header[9], header[10], header[11]]);
		let data_size = u32::from_le_bytes([header[12], header[13], header[14], header[15]]) as usize;

		let data = cursor.read_exact(data_size).map_err(|_| GmError::InvalidDynamicData {
			need: 16 + data_size,
			have: payload.len(),
		})?;

		self.property_frames.push(PropertyFrame {
			shape_id,
			property_count,
			time_stamp,
			data: data.to_vec(),
		});
		Ok(&self.property_frames[self.property_frames.len() - 1])
	}

	/// Decode an `FPos` payload and append it to the store.
	pub fn ingest_position_frame(&mut self, payload: &[u8]) -> Result<&PositionFrame> {
		let mut cursor = Cursor::new(payload);
		if payload.len() < 16 {
			return Err(GmError::InvalidAnimation {
				what: "FPos header shorter than 16 bytes",
			});
		}
		let frame_count = cursor.read_u32_le()?;
		let start_time = cursor.read_f32_le()?;
		let end_time = cursor.read_f32_le()?;
		let position_data_size = cursor.read_u32_le()?;

		if position_data_size != frame_count.wrapping_mul(4) {
			return Err(GmError::FPosSizeMismatch {
				frame_count,
				position_data_size,
			});
		}

		let mut positions = Vec::with_capacity(frame_count as usize);
		for _ in 0..frame_count {
			positions.push(cursor.read_f32_le().map_err(|_| GmError::InvalidAnimation {
				what: "FPos position data shorter than declared",
			})?);
		}

		self.position_frames.push(PositionFrame {
			frame_count,
			start_time,
			end_time,
			positions,
		});
		Ok(&self.position_frames[self.position_frames.len() - 1])
	}

	/// Set the animation time on one batch, or globally with `batch_index == -1`.
	///
	/// Recursion follows each batch's `child_batch` link (0 terminates); the
	/// hop count is bounded by the batch pool to survive malformed cycles.
	pub fn set_batch_time(&mut self, batch_index: i32, time: f32, recursive: bool) -> Result<()> {
		if batch_index == -1 {
			self.global_time = time;
			if recursive {
				for index in 0..self.batches.len() {
					self.set_batch_time_at(index, time, true)?;
				}
			}
			return Ok(());
		}

		let index = usize::try_from(batch_index).map_err(|_| GmError::InvalidAnimation {
			what: "negative batch index",
		})?;
		self.set_batch_time_at(index, time, recursive)
	}

	fn set_batch_time_at(&mut self, index: usize, time: f32, recursive: bool) -> Result<()> {
		let mut current = index;
		let mut hops = 0_usize;
		loop {
			let batch = self.batches.get_mut(current).ok_or(GmError::InvalidAnimation {
				what: "batch index out of range",
			})?;
			batch.current_time = time;
			if !recursive || batch.child_batch == 0 {
				return Ok(());
			}
			current = batch.child_batch as usize;
			hops += 1;
			if hops > self.batches.len() {
				return Err(GmError::InvalidAnimation {
					what: "child batch chain forms a cycle",
				});
			}
		}
	}

	/// Resolve the keyframe pair bracketing a batch's target time.
	pub fn interpolate_batch_keyframe(&self, batch_index: usize) -> Result<Interpolation> {
		let batch = self.batches.get(batch_index).ok_or(GmError::InvalidAnimation {
			what: "batch index out of range",
		})?;

		if batch.keyframe_count == 0 {
			return Ok(Interpolation::fixed(batch_index as u32));
		}

		let start = batch.keyframe_offset as usize;
		let end = start + batch.keyframe_count as usize;
		let window = self.keyframes.get(start..end).ok_or(GmError::InvalidAnimation {
			what: "keyframe window out of pool range",
		})?;

		if self.global_time > batch.target_time {
			return Err(GmError::KeyframeTimeOrder {
				global_time: self.global_time,
				target_time: batch.target_time,
			});
		}

		let target = batch.target_time;
		if target < window[0].time {
			return Ok(Interpolation::fixed(window[0].batch_id));
		}
		for pair in window.windows(2) {
			let (from, to) = (pair[0], pair[1]);
			if from.time <= target && target < to.time {
				if from.time == to.time {
					return Ok(Interpolation::fixed(from.batch_id));
				}
				return Ok(Interpolation {
					from_batch: from.batch_id,
					to_batch: to.batch_id,
					factor: (target - from.time) / (to.time - from.time),
					is_static: false,
				});
			}
		}
		Ok(Interpolation::fixed(window[window.len() - 1].batch_id))
	}
}

#[cfg(test)]
mod tests {
	use super::{Animation, Batch, Interpolation, Keyframe};
	use crate::gm::GmError;

	fn fpos_payload(frames: &[f32], start: f32, end: f32) -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(&(frames.len() as u32).to_le_bytes());
		out.extend_from_slice(&start.to_le_bytes());
		out.extend_from_slice(&end.to_le_bytes());
		out.extend_from_slice(&((frames.len() * 4) as u32).to_le_bytes());
		for value in frames {
			out.extend_from_slice(&value.to_le_bytes());
		}
		out
	}

	#[test]
	fn ingests_property_frames_verbatim() {
		let mut payload = Vec::new();
		payload.extend_from_slice(&3_u32.to_le_bytes());
		payload.extend_from_slice(&2_u32.to_le_bytes());
		payload.extend_from_slice(&1.5_f32.to_le_bytes());
		payload.extend_from_slice(&4_u32.to_le_bytes());
		payload.extend_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD, 0xEE]);

		let mut animation = Animation::default();
		let frame = animation.ingest_property_frame(&payload).expect("frame ingests");
		assert_eq!(frame.shape_id, 3);
		assert_eq!(frame.property_count, 2);
		assert_eq!(frame.time_stamp, 1.5);
		// Only data_size bytes are copied; the trailing byte is chunk slack.
		assert_eq!(frame.data, vec![0xAA, 0xBB, 0xCC, 0xDD]);
	}

	#[test]
	fn property_frame_overrun_is_invalid_dynamic_data() {
		let mut payload = vec![0_u8; 12];
		payload.extend_from_slice(&100_u32.to_le_bytes());
		let mut animation = Animation::default();
		let err = animation.ingest_property_frame(&payload).expect_err("declared overrun fails");
		assert!(matches!(err, GmError::InvalidDynamicData { need: 116, have: 16 }));
		assert_eq!(err.code(), Some(0xF4));
	}

	#[test]
	fn ingests_position_frames() {
		let mut animation = Animation::default();
		let frame = animation
			.ingest_position_frame(&fpos_payload(&[0.5, 0.75], 0.0, 1.0))
			.expect("frame ingests");
		assert_eq!(frame.frame_count, 2);
		assert_eq!(frame.positions, vec![0.5, 0.75]);
		assert_eq!(animation.frame_count(), 2);
	}

	#[test]
	fn position_size_mismatch_is_rejected() {
		let mut payload = fpos_payload(&[0.5, 0.75], 0.0, 1.0);
		payload[12..16].copy_from_slice(&12_u32.to_le_bytes());
		let mut animation = Animation::default();
		let err = animation.ingest_position_frame(&payload).expect_err("bad size fails");
		assert!(matches!(
			err,
			GmError::FPosSizeMismatch {
				frame_count: 2,
				position_data_size: 12,
			}
		));
	}

	fn batched_animation() -> Animation {
		Animation {
			batches: vec![
				Batch {
					batch_id: 10,
					keyframe_count: 3,
					keyframe_offset: 0,
					target_time: 1.5,
					child_batch: 1,
					..Batch::default()
				},
				Batch {
					batch_id: 11,
					..Batch::default()
				},
			],
			keyframes: vec![
				Keyframe { time: 0.0, batch_id: 20 },
				Keyframe { time: 1.0, batch_id: 21 },
				Keyframe { time: 2.0, batch_id: 22 },
			],
			..Animation::default()
		}
	}

	#[test]
	fn batch_time_propagates_to_children() {
		let mut animation = batched_animation();
		animation.set_batch_time(0, 0.25, true).expect("time sets");
		assert_eq!(animation.batches[0].current_time, 0.25);
		assert_eq!(animation.batches[1].current_time, 0.25);

		animation.set_batch_time(-1, 2.0, true).expect("global time sets");
		assert_eq!(animation.global_time, 2.0);
		assert_eq!(animation.batches[0].current_time, 2.0);

		let err = animation.set_batch_time(5, 0.0, false).expect_err("index out of range");
		assert!(matches!(err, GmError::InvalidAnimation { .. }));
	}

	#[test]
	fn interpolation_brackets_the_target_time() {
		let animation = batched_animation();
		let result = animation.interpolate_batch_keyframe(0).expect("interpolates");
		assert_eq!(
			result,
			Interpolation {
				from_batch: 21,
				to_batch: 22,
				factor: 0.5,
				is_static: false,
			}
		);
	}

	#[test]
	fn batch_without_keyframes_is_static() {
		let animation = batched_animation();
		let result = animation.interpolate_batch_keyframe(1).expect("static result");
		assert!(result.is_static);
		assert_eq!(result.from_batch, 1);
		assert_eq!(result.to_batch, 1);
	}

	#[test]
	fn global_time_past_target_is_an_error() {
		let mut animation = batched_animation();
		animation.global_time = 3.0;
		let err = animation.interpolate_batch_keyframe(0).expect_err("time order fails");
		assert!(matches!(err, GmError::KeyframeTimeOrder { .. }));
		assert_eq!(err.code(), Some(249));
	}
}
