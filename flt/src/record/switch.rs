// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use binrw::binrw;

use crate::record::FixedString;

/// Switch record (opcode 96), 24 byte body followed by
/// `mask_count * words_per_mask` 32-bit mask words.
#[binrw]
#[brw(big)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SwitchRecord {
	pub name: FixedString<8>,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved: i32,
	pub current_mask: u32,
	#[br(temp)]
	#[bw(calc = (mask_words.len() as u32).checked_div(*words_per_mask).unwrap_or(0))]
	mask_count: u32,
	pub words_per_mask: u32,
	#[br(count = mask_count as usize * words_per_mask as usize)]
	pub mask_words: Vec<u32>,
}

impl SwitchRecord {
	pub fn mask_count(&self) -> u32 {
		if self.words_per_mask == 0 {
			0
		} else {
			self.mask_words.len() as u32 / self.words_per_mask
		}
	}
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use binrw::{BinRead, BinWrite};

	use super::*;

	#[test]
	fn write_read_same() {
		let switch = SwitchRecord {
			name: "toggle".into(),
			current_mask: 1,
			words_per_mask: 2,
			mask_words: vec![0xffff_0000, 0x0000_ffff, 3, 4],
		};
		let mut cur = Cursor::new(vec![]);
		switch.write(&mut cur).unwrap();
		assert_eq!(cur.get_ref().len(), 24 + 16);
		cur.set_position(0);
		let read = SwitchRecord::read(&mut cur).unwrap();
		assert_eq!(read, switch);
		assert_eq!(read.mask_count(), 2);
	}
}
