// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use binrw::binrw;
#[cfg(test)]
use test_strategy::Arbitrary;

use crate::record::FixedString;

/// Level of Detail record (opcode 73), 76 byte body.
#[binrw]
#[brw(big)]
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(Arbitrary))]
pub struct LodRecord {
	pub name: FixedString<8>,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved: i32,
	pub switch_in: f64,
	pub switch_out: f64,
	pub special_effect1: i16,
	pub special_effect2: i16,
	pub flags: u32,
	pub center: [f64; 3],
	pub transition_range: f64,
	pub significant_size: f64,
}

impl LodRecord {
	pub const BODY_LEN: usize = 76;
}
