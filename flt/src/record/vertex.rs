// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use binrw::binrw;
#[cfg(test)]
use test_strategy::Arbitrary;

/// Vertex with Color record (opcode 68), 36 byte body.
#[binrw]
#[brw(big)]
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(Arbitrary))]
pub struct VertexColorRecord {
	pub color_name_index: u16,
	pub flags: u16,
	pub position: [f64; 3],
	pub abgr: u32,
	pub color_index: i32,
}

/// Vertex with Color and Normal record (opcode 69), 52 byte body.
#[binrw]
#[brw(big)]
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(Arbitrary))]
pub struct VertexColorNormalRecord {
	pub color_name_index: u16,
	pub flags: u16,
	pub position: [f64; 3],
	pub normal: [f32; 3],
	pub abgr: u32,
	pub color_index: i32,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved: i32,
}

/// Vertex with Color and UV record (opcode 71), 44 byte body.
#[binrw]
#[brw(big)]
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(Arbitrary))]
pub struct VertexColorUvRecord {
	pub color_name_index: u16,
	pub flags: u16,
	pub position: [f64; 3],
	pub uv: [f32; 2],
	pub abgr: u32,
	pub color_index: i32,
}

/// Vertex with Color, Normal and UV record (opcode 70), 60 byte body.
#[binrw]
#[brw(big)]
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(Arbitrary))]
pub struct VertexColorNormalUvRecord {
	pub color_name_index: u16,
	pub flags: u16,
	pub position: [f64; 3],
	pub normal: [f32; 3],
	pub uv: [f32; 2],
	pub abgr: u32,
	pub color_index: i32,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved: i32,
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use binrw::BinWrite;

	use super::*;

	#[test]
	fn body_lengths() {
		fn written_len<T: for<'a> BinWrite<Args<'a> = ()>>(value: &T) -> usize {
			let mut cur = Cursor::new(vec![]);
			value.write_be(&mut cur).unwrap();
			cur.get_ref().len()
		}

		assert_eq!(written_len(&VertexColorRecord::default()), 36);
		assert_eq!(written_len(&VertexColorNormalRecord::default()), 52);
		assert_eq!(written_len(&VertexColorUvRecord::default()), 44);
		assert_eq!(written_len(&VertexColorNormalUvRecord::default()), 60);
	}

	#[test]
	fn position_sits_after_the_flag_words() {
		let vertex = VertexColorRecord {
			position: [1.0, 2.0, 3.0],
			abgr: 0xff00_00ff,
			..VertexColorRecord::default()
		};
		let mut cur = Cursor::new(vec![]);
		vertex.write(&mut cur).unwrap();
		let body = cur.get_ref();
		assert_eq!(&body[4..12], &1.0f64.to_be_bytes());
		assert_eq!(&body[28..32], &0xff00_00ffu32.to_be_bytes());
	}
}
