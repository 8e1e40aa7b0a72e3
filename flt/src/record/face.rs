// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use binrw::binrw;
#[cfg(test)]
use test_strategy::Arbitrary;

use crate::record::FixedString;

/// Face record (opcode 5), 76 byte body.
#[binrw]
#[brw(big)]
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(Arbitrary))]
pub struct FaceRecord {
	pub name: FixedString<8>,
	pub ir_color: i32,
	pub relative_priority: i16,
	pub draw_type: u8,
	pub texwhite: u8,
	pub color_name_index: u16,
	pub alt_color_name_index: u16,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved0: i8,
	pub billboard: u8,
	pub base_texture_index: i16,
	pub detail_texture_index: i16,
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
	#[bw(calc = [0; 7])]
	reserved1: [u8; 7],
	pub abgr: u32,
	pub alt_abgr: u32,
	pub texture_mapping_index: u16,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved2: i16,
	pub color_index: u32,
	pub alt_color_index: u32,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved3: i16,
	pub shader_index: i16,
}

impl FaceRecord {
	pub const BODY_LEN: usize = 76;
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use binrw::{BinRead, BinWrite};
	use proptest::prop_assert_eq;
	use test_strategy::proptest;

	use super::*;

	#[proptest]
	fn write_read_same(face: FaceRecord) {
		let mut cur = Cursor::new(vec![]);
		face.write(&mut cur)?;
		prop_assert_eq!(cur.get_ref().len(), FaceRecord::BODY_LEN);
		cur.set_position(0);
		let read = FaceRecord::read(&mut cur)?;
		prop_assert_eq!(face, read);
	}

	#[test]
	fn field_offsets() {
		let face = FaceRecord {
			billboard: 2,
			base_texture_index: 7,
			flags: 0x8000_0000,
			abgr: 0x1122_3344,
			shader_index: 3,
			..FaceRecord::default()
		};
		let mut cur = Cursor::new(vec![]);
		face.write(&mut cur).unwrap();
		let body = cur.get_ref();
		assert_eq!(body[21], 2);
		assert_eq!(&body[22..24], &7i16.to_be_bytes());
		assert_eq!(&body[40..44], &0x8000_0000u32.to_be_bytes());
		assert_eq!(&body[52..56], &0x1122_3344u32.to_be_bytes());
		assert_eq!(&body[74..76], &3i16.to_be_bytes());
	}
}
