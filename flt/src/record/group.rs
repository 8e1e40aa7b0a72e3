// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use binrw::binrw;
#[cfg(test)]
use test_strategy::Arbitrary;

use crate::record::FixedString;

/// Group record (opcode 2), 40 byte body.
#[binrw]
#[brw(big)]
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(Arbitrary))]
pub struct GroupRecord {
	pub name: FixedString<8>,
	pub priority: i16,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved0: i16,
	pub flags: u32,
	pub special_effect1: i16,
	pub special_effect2: i16,
	pub significance: i16,
	pub layer: i8,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved1: i8,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved2: i32,
	pub loop_count: u32,
	pub loop_duration: f32,
	pub last_frame_duration: f32,
}

impl GroupRecord {
	pub const BODY_LEN: usize = 40;
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use binrw::{BinRead, BinWrite};
	use proptest::prop_assert_eq;
	use test_strategy::proptest;

	use super::*;

	// float fields make struct equality unusable for NaN inputs,
	// so compare the re-written byte stream instead
	#[proptest]
	fn write_read_same(group: GroupRecord) {
		let mut cur = Cursor::new(vec![]);
		group.write(&mut cur)?;
		prop_assert_eq!(cur.get_ref().len(), GroupRecord::BODY_LEN);
		cur.set_position(0);
		let read = GroupRecord::read(&mut cur)?;
		let mut rewritten = Cursor::new(vec![]);
		read.write(&mut rewritten)?;
		prop_assert_eq!(cur.get_ref(), rewritten.get_ref());
	}
}
