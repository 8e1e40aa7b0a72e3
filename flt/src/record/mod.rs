// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod extref;
pub mod face;
pub mod group;
pub mod lod;
pub mod mesh;
pub mod object;
pub mod switch;
pub mod texture;
pub mod vertex;

use std::fmt::{Debug, Formatter};
use std::io::{Read, Seek, Write};

use binrw::{binrw, BinRead, BinResult, BinWrite, Endian};

use crate::opcode::Opcode;

/// Every record starts with these four bytes; `length` includes them.
#[binrw]
#[brw(big)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RecordHeader {
	pub opcode: u16,
	pub length: u16,
}

impl RecordHeader {
	pub const SIZE: usize = 4;

	pub fn new(opcode: Opcode, body_len: usize) -> Self {
		RecordHeader {
			opcode: opcode.code(),
			length: (body_len + Self::SIZE) as u16,
		}
	}

	/// Number of payload bytes following the header.
	pub fn body_len(&self) -> Option<usize> {
		(self.length as usize).checked_sub(Self::SIZE)
	}
}

/// Fixed-width ASCII field, NUL padded on disk.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct FixedString<const N: usize> {
	pub data: [u8; N],
}

impl<const N: usize> FixedString<N> {
	pub fn new(data: [u8; N]) -> Self {
		FixedString { data }
	}

	/// Everything before the first NUL, lossily decoded.
	pub fn to_string_lossy(&self) -> String {
		let end = self.data.iter().position(|&b| b == 0).unwrap_or(N);
		String::from_utf8_lossy(&self.data[..end]).into_owned()
	}

	pub fn is_empty(&self) -> bool {
		self.data[0] == 0
	}

	/// Replaces line breaks with spaces; the header datetime field
	/// is stored with embedded newlines by some exporters.
	pub fn normalized(mut self) -> Self {
		for b in self.data.iter_mut() {
			if *b == b'\n' || *b == b'\r' {
				*b = b' ';
			}
		}
		self
	}
}

impl<const N: usize> From<&str> for FixedString<N> {
	fn from(value: &str) -> Self {
		let mut data = [0u8; N];
		let len = value.len().min(N.saturating_sub(1));
		data[..len].copy_from_slice(&value.as_bytes()[..len]);
		FixedString { data }
	}
}

impl<const N: usize> Default for FixedString<N> {
	fn default() -> Self {
		FixedString { data: [0; N] }
	}
}

impl<const N: usize> Debug for FixedString<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "\"{}\"", self.to_string_lossy())
	}
}

impl<const N: usize> BinRead for FixedString<N> {
	type Args<'a> = ();

	fn read_options<R: Read + Seek>(
		reader: &mut R,
		_endian: Endian,
		_args: Self::Args<'_>,
	) -> BinResult<Self> {
		let mut data = [0u8; N];
		reader.read_exact(&mut data)?;
		Ok(FixedString { data })
	}
}

impl<const N: usize> BinWrite for FixedString<N> {
	type Args<'a> = ();

	fn write_options<W: Write + Seek>(
		&self,
		writer: &mut W,
		_endian: Endian,
		_args: Self::Args<'_>,
	) -> BinResult<()> {
		writer.write_all(&self.data)?;
		Ok(())
	}
}

#[cfg(test)]
impl<const N: usize> proptest::arbitrary::Arbitrary for FixedString<N> {
	type Parameters = ();
	type Strategy = proptest::strategy::BoxedStrategy<Self>;

	fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
		use proptest::prelude::*;
		any::<[u8; N]>().prop_map(FixedString::new).boxed()
	}
}
