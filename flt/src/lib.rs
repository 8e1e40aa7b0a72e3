// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reader (and skeleton writer) for the OpenFlight binary scene
//! description format.
//!
//! A [FltFile] holds the decoded header, the shared palettes, the node
//! hierarchy and the compacted geometry (interleaved vertices plus the
//! face/vertex index array) of one file. External references between
//! files are deduplicated through a [Registry], which also carries the
//! session counters.

pub mod face;
mod file;
pub mod header;
pub mod hierarchy;
pub mod index;
pub mod opcode;
mod parser;
pub mod paths;
pub mod record;
pub mod registry;
pub mod vertex_palette;
mod writer;

use std::path::PathBuf;

use thiserror::Error;

pub use file::{
	ExtrefCallback, FltFile, HierarchyOptions, Options, Palettes, TextureCallback,
	TexturePaletteEntry,
};
pub use opcode::{KnownOpcode, Opcode};
pub use registry::{FileEntry, LoadState, Registry};
pub use vertex_palette::{PositionPrecision, VertexLayout, VertexPalette};

/// Highest OpenFlight format revision this crate reads.
pub const MAX_SUPPORTED_VERSION: i32 = 1640;

/// Default level stack depth; see [Options::stack_capacity].
pub const DEFAULT_STACK_CAPACITY: usize = 32;

/// Default face dictionary capacity hint; see
/// [Options::faces_dict_capacity].
pub const DEFAULT_FACE_BANK_CAPACITY: usize = 1543;

/// Default initial index array capacity; see
/// [Options::indices_initial_capacity].
pub const DEFAULT_INDEX_CAPACITY: usize = 4096;

#[derive(Debug, Error)]
pub enum Error {
	#[error("could not open {path}: {source}")]
	FileOpen {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("record {} would read beyond its length of {length} bytes", opcode.name())]
	ReadBeyondRecord { opcode: Opcode, length: u16 },
	#[error("format revision {found} is newer than the highest supported revision {max}")]
	VersionUnsupported { found: i32, max: i32 },
	#[error("an allocation of {bytes} bytes failed")]
	OutOfMemory { bytes: usize },
	#[error("{path} is already registered in the shared file cache")]
	AlreadyLoaded { path: String },
	#[error(transparent)]
	Format(#[from] binrw::Error),
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl Error {
	/// Short, stable one-liner; [std::fmt::Display] carries the long
	/// form.
	pub fn brief(&self) -> &'static str {
		match self {
			Error::FileOpen { .. } => "file error",
			Error::ReadBeyondRecord { .. } => "read beyond record",
			Error::VersionUnsupported { .. } => "version unsupported",
			Error::OutOfMemory { .. } => "out of memory",
			Error::AlreadyLoaded { .. } => "already parsed",
			Error::Format(_) => "malformed record",
			Error::Io(_) => "i/o error",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn brief_and_long_error_forms() {
		let err = Error::VersionUnsupported {
			found: 1700,
			max: MAX_SUPPORTED_VERSION,
		};
		assert_eq!(err.brief(), "version unsupported");
		assert_eq!(
			err.to_string(),
			"format revision 1700 is newer than the highest supported revision 1640"
		);

		let err = Error::ReadBeyondRecord {
			opcode: Opcode::from(5),
			length: 20,
		};
		assert_eq!(err.brief(), "read beyond record");
		assert!(err.to_string().contains("Face"));
	}
}
