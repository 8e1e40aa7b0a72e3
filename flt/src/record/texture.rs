// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use binrw::binrw;
#[cfg(test)]
use test_strategy::Arbitrary;

use crate::record::FixedString;

/// Texture Palette record (opcode 64), 212 byte body.
#[binrw]
#[brw(big)]
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(test, derive(Arbitrary))]
pub struct TexturePaletteRecord {
	pub filename: FixedString<200>,
	pub pattern_index: i32,
	pub xy_location: [i32; 2],
}

impl TexturePaletteRecord {
	pub const BODY_LEN: usize = 212;
}
