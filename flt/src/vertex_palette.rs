// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::Cursor;

use binrw::BinRead;

use crate::opcode::KnownOpcode;
use crate::record::vertex::{
	VertexColorNormalRecord, VertexColorNormalUvRecord, VertexColorRecord, VertexColorUvRecord,
};
use crate::record::RecordHeader;
use crate::Error;

/// Offsets found in vertex list records are relative to the start of the
/// vertex palette record; the palette buffer starts after its 8 byte
/// header (opcode, length, palette byte count).
pub(crate) const PALETTE_OFFSET_BIAS: u32 = 8;

// the shortest source vertex record, used as the vertex count upper bound
const MIN_SOURCE_RECORD: usize = 40;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PositionPrecision {
	F64,
	F32,
}

/// Which components each re-encoded vertex carries, in this order:
/// position, normal, uv, packed color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexLayout {
	pub position: Option<PositionPrecision>,
	pub normal: bool,
	pub uv: bool,
	pub color: bool,
}

impl VertexLayout {
	/// Everything enabled, double precision positions.
	pub fn full() -> Self {
		VertexLayout {
			position: Some(PositionPrecision::F64),
			normal: true,
			uv: true,
			color: true,
		}
	}

	pub fn position_only() -> Self {
		VertexLayout {
			position: Some(PositionPrecision::F64),
			..VertexLayout::default()
		}
	}

	pub fn vertex_size(&self) -> usize {
		let mut size = match self.position {
			Some(PositionPrecision::F64) => 24,
			Some(PositionPrecision::F32) => 12,
			None => 0,
		};
		if self.normal {
			size += 12;
		}
		if self.uv {
			size += 8;
		}
		if self.color {
			size += 4;
		}
		size
	}

	fn normal_offset(&self) -> usize {
		match self.position {
			Some(PositionPrecision::F64) => 24,
			Some(PositionPrecision::F32) => 12,
			None => 0,
		}
	}

	fn uv_offset(&self) -> usize {
		self.normal_offset() + if self.normal { 12 } else { 0 }
	}

	fn color_offset(&self) -> usize {
		self.uv_offset() + if self.uv { 8 } else { 0 }
	}
}

/// The vertex palette during and after re-encoding.
///
/// While the file is parsed the verbatim palette bytes are kept in `raw`
/// and double as the lookup table: the first vertex list reference to a
/// source offset re-encodes that vertex into the interleaved output array
/// (host byte order) and overwrites the source slot with a zeroed opcode
/// word followed by the assigned output index, so later references are a
/// single read.
pub struct VertexPalette {
	raw: Vec<u8>,
	layout: VertexLayout,
	vertex_size: usize,
	interleaved: Vec<u8>,
	count: u32,
}

impl VertexPalette {
	pub(crate) fn new(raw: Vec<u8>, layout: VertexLayout) -> Result<Self, Error> {
		let vertex_size = layout.vertex_size();
		let mut interleaved = Vec::new();
		if vertex_size > 0 {
			let upper = (raw.len() / MIN_SOURCE_RECORD + 1) * vertex_size;
			interleaved
				.try_reserve(upper)
				.map_err(|_| Error::OutOfMemory { bytes: upper })?;
		}
		Ok(VertexPalette {
			raw,
			layout,
			vertex_size,
			interleaved,
			count: 0,
		})
	}

	pub fn layout(&self) -> VertexLayout {
		self.layout
	}

	pub fn vertex_size(&self) -> usize {
		self.vertex_size
	}

	pub fn vertex_count(&self) -> u32 {
		self.count
	}

	/// The re-encoded vertices, `vertex_count * vertex_size` bytes in host
	/// byte order.
	pub fn interleaved(&self) -> &[u8] {
		&self.interleaved
	}

	/// Maps a byte offset into the raw palette to an index into the
	/// interleaved array, re-encoding the source vertex on first visit.
	/// With an empty layout no re-encoding takes place and the offset is
	/// handed back unchanged.
	pub(crate) fn index_for_offset(&mut self, offset: u32) -> Result<u32, Error> {
		if self.vertex_size == 0 {
			return Ok(offset);
		}
		let off = offset as usize;
		if off + 6 > self.raw.len() {
			return Err(Error::Format(binrw::Error::AssertFail {
				pos: offset as u64,
				message: format!(
					"vertex list offset {offset} is outside the {} byte palette",
					self.raw.len()
				),
			}));
		}
		let opcode = u16::from_be_bytes([self.raw[off], self.raw[off + 1]]);
		if opcode != 0 {
			self.encode(off, opcode)?;
		}
		Ok(u32::from_ne_bytes(
			self.raw[off + 2..off + 6].try_into().unwrap(),
		))
	}

	fn encode(&mut self, off: usize, opcode: u16) -> Result<(), Error> {
		let mut cur = Cursor::new(&self.raw[off + RecordHeader::SIZE..]);
		let (position, normal, uv, abgr) = match KnownOpcode::try_from(opcode) {
			Ok(KnownOpcode::VertexColor) => {
				let v = VertexColorRecord::read(&mut cur)?;
				(v.position, None, None, v.abgr)
			}
			Ok(KnownOpcode::VertexColorNormal) => {
				let v = VertexColorNormalRecord::read(&mut cur)?;
				(v.position, Some(v.normal), None, v.abgr)
			}
			Ok(KnownOpcode::VertexColorUv) => {
				let v = VertexColorUvRecord::read(&mut cur)?;
				(v.position, None, Some(v.uv), v.abgr)
			}
			Ok(KnownOpcode::VertexColorNormalUv) => {
				let v = VertexColorNormalUvRecord::read(&mut cur)?;
				(v.position, Some(v.normal), Some(v.uv), v.abgr)
			}
			_ => {
				return Err(Error::Format(binrw::Error::AssertFail {
					pos: off as u64,
					message: format!("opcode {opcode} is not a vertex palette record"),
				}));
			}
		};

		match self.layout.position {
			Some(PositionPrecision::F64) => {
				for c in position {
					self.interleaved.extend_from_slice(&c.to_ne_bytes());
				}
			}
			Some(PositionPrecision::F32) => {
				for c in position {
					self.interleaved.extend_from_slice(&(c as f32).to_ne_bytes());
				}
			}
			None => {}
		}
		if self.layout.normal {
			for c in normal.unwrap_or([0.0; 3]) {
				self.interleaved.extend_from_slice(&c.to_ne_bytes());
			}
		}
		if self.layout.uv {
			for c in uv.unwrap_or([0.0; 2]) {
				self.interleaved.extend_from_slice(&c.to_ne_bytes());
			}
		}
		if self.layout.color {
			self.interleaved.extend_from_slice(&abgr.to_ne_bytes());
		}

		// stamp the source slot: zero opcode word, then the output index
		self.raw[off..off + 2].copy_from_slice(&[0, 0]);
		self.raw[off + 2..off + 6].copy_from_slice(&self.count.to_ne_bytes());
		self.count += 1;
		Ok(())
	}

	pub fn position(&self, index: u32) -> Option<[f64; 3]> {
		let base = self.base_of(index)?;
		let bytes = &self.interleaved;
		match self.layout.position {
			Some(PositionPrecision::F64) => Some(std::array::from_fn(|i| {
				f64::from_ne_bytes(bytes[base + i * 8..base + i * 8 + 8].try_into().unwrap())
			})),
			Some(PositionPrecision::F32) => Some(std::array::from_fn(|i| {
				f32::from_ne_bytes(bytes[base + i * 4..base + i * 4 + 4].try_into().unwrap()) as f64
			})),
			None => None,
		}
	}

	pub fn normal(&self, index: u32) -> Option<[f32; 3]> {
		if !self.layout.normal {
			return None;
		}
		let base = self.base_of(index)? + self.layout.normal_offset();
		Some(std::array::from_fn(|i| {
			f32::from_ne_bytes(
				self.interleaved[base + i * 4..base + i * 4 + 4]
					.try_into()
					.unwrap(),
			)
		}))
	}

	pub fn uv(&self, index: u32) -> Option<[f32; 2]> {
		if !self.layout.uv {
			return None;
		}
		let base = self.base_of(index)? + self.layout.uv_offset();
		Some(std::array::from_fn(|i| {
			f32::from_ne_bytes(
				self.interleaved[base + i * 4..base + i * 4 + 4]
					.try_into()
					.unwrap(),
			)
		}))
	}

	pub fn color(&self, index: u32) -> Option<u32> {
		if !self.layout.color {
			return None;
		}
		let base = self.base_of(index)? + self.layout.color_offset();
		Some(u32::from_ne_bytes(
			self.interleaved[base..base + 4].try_into().unwrap(),
		))
	}

	pub fn positions(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
		(0..self.count).filter_map(|i| self.position(i))
	}

	fn base_of(&self, index: u32) -> Option<usize> {
		if index < self.count {
			Some(index as usize * self.vertex_size)
		} else {
			None
		}
	}

	/// Drops the raw scratch buffer once parsing is done; every referenced
	/// vertex has been re-encoded by then.
	pub(crate) fn finalize(&mut self) {
		if self.vertex_size > 0 {
			self.raw = Vec::new();
		}
	}
}

impl std::fmt::Debug for VertexPalette {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("VertexPalette")
			.field("layout", &self.layout)
			.field("vertex_count", &self.count)
			.field("raw_bytes", &self.raw.len())
			.finish()
	}
}
