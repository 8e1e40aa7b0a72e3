// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use binrw::binrw;
#[cfg(test)]
use test_strategy::Arbitrary;

use crate::record::FixedString;

/// Object record (opcode 4), 24 byte body.
#[binrw]
#[brw(big)]
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(Arbitrary))]
pub struct ObjectRecord {
	pub name: FixedString<8>,
	pub flags: u32,
	pub priority: i16,
	pub transparency: i16,
	pub special_effect1: i16,
	pub special_effect2: i16,
	pub significance: i16,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved: i16,
}

impl ObjectRecord {
	pub const BODY_LEN: usize = 24;
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use binrw::{BinRead, BinWrite};
	use proptest::prop_assert_eq;
	use test_strategy::proptest;

	use super::*;

	#[proptest]
	fn write_read_same(object: ObjectRecord) {
		let mut cur = Cursor::new(vec![]);
		object.write(&mut cur)?;
		prop_assert_eq!(cur.get_ref().len(), ObjectRecord::BODY_LEN);
		cur.set_position(0);
		let read = ObjectRecord::read(&mut cur)?;
		prop_assert_eq!(object, read);
	}
}
