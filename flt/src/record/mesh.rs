// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use binrw::binrw;
#[cfg(test)]
use test_strategy::Arbitrary;

use crate::record::FixedString;

/// Mesh record (opcode 84). The attribute block mirrors the face record at
/// shifted offsets; only the leading 80 bytes are decoded, the remainder of
/// the body is skipped by the dispatcher.
#[binrw]
#[brw(big)]
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(Arbitrary))]
pub struct MeshRecord {
	pub name: FixedString<8>,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved0: i32,
	pub ir_color: i32,
	pub relative_priority: i16,
	pub draw_type: u8,
	pub texwhite: u8,
	pub color_name_index: u16,
	pub alt_color_name_index: u16,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved1: i8,
	pub billboard: u8,
	pub detail_texture_index: i16,
	pub base_texture_index: i16,
	pub material_index: i16,
	pub surface_material_code: i16,
	pub feature_id: i16,
	pub ir_material: i32,
	pub transparency: i16,
	pub lod_generation_control: u8,
	pub line_style_index: u8,
	pub flags: u32,
	pub light_mode: u8,
	#[br(temp)]
	#[bw(calc = [0; 3])]
	reserved2: [u8; 3],
	pub abgr: u32,
	pub alt_abgr: u32,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved3: i32,
	pub texture_mapping_index: u16,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved4: i16,
	pub color_index: u32,
	pub alt_color_index: u32,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved5: i16,
	pub shader_index: i16,
}

impl MeshRecord {
	/// Decoded prefix; real mesh records carry more body after this.
	pub const PREFIX_LEN: usize = 80;
}

/// Local Vertex Pool record (opcode 85) prefix. The pool contents are not
/// decoded, only the element count and the attribute mask are recorded on
/// the enclosing mesh node.
#[binrw]
#[brw(big)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalVertexPoolRecord {
	pub count: u32,
	pub attribute_mask: u32,
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use binrw::{BinRead, BinWrite};
	use proptest::prop_assert_eq;
	use test_strategy::proptest;

	use super::*;

	#[proptest]
	fn write_read_same(mesh: MeshRecord) {
		let mut cur = Cursor::new(vec![]);
		mesh.write(&mut cur)?;
		prop_assert_eq!(cur.get_ref().len(), MeshRecord::PREFIX_LEN);
		cur.set_position(0);
		let read = MeshRecord::read(&mut cur)?;
		prop_assert_eq!(mesh, read);
	}

	#[test]
	fn attribute_offsets_are_shifted_against_face() {
		let mesh = MeshRecord {
			billboard: 1,
			base_texture_index: 5,
			abgr: 0xaabb_ccdd,
			shader_index: 9,
			..MeshRecord::default()
		};
		let mut cur = Cursor::new(vec![]);
		mesh.write(&mut cur).unwrap();
		let body = cur.get_ref();
		assert_eq!(body[25], 1);
		assert_eq!(&body[28..30], &5i16.to_be_bytes());
		assert_eq!(&body[52..56], &0xaabb_ccddu32.to_be_bytes());
		assert_eq!(&body[78..80], &9i16.to_be_bytes());
	}
}
