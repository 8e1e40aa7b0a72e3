// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use binrw::binrw;
#[cfg(test)]
use test_strategy::Arbitrary;

use crate::record::FixedString;

/// External Reference record (opcode 63), 212 byte body.
#[binrw]
#[brw(big)]
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(Arbitrary))]
pub struct ExternalReferenceRecord {
	pub path: FixedString<200>,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved0: i32,
	pub flags: i32,
	pub view_as_bounding_box: i16,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved1: i16,
}

impl ExternalReferenceRecord {
	pub const BODY_LEN: usize = 212;
}
