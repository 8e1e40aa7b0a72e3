// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt::{Debug, Formatter};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::face::FaceBank;
use crate::header::Header;
use crate::hierarchy::Hierarchy;
use crate::index::IndexArray;
use crate::parser::Parser;
use crate::paths;
use crate::record::extref::ExternalReferenceRecord;
use crate::record::texture::TexturePaletteRecord;
use crate::registry::Registry;
use crate::vertex_palette::VertexLayout;
use crate::vertex_palette::VertexPalette;
use crate::{
	Error, DEFAULT_FACE_BANK_CAPACITY, DEFAULT_INDEX_CAPACITY, DEFAULT_STACK_CAPACITY,
};

pub type TextureCallback = Arc<dyn Fn(&TexturePaletteRecord) + Send + Sync>;
pub type ExtrefCallback = Arc<dyn Fn(&ExternalReferenceRecord) + Send + Sync>;

/// Which node kinds participate in the hierarchy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HierarchyOptions {
	pub groups: bool,
	pub objects: bool,
	pub meshes: bool,
	pub lods: bool,
	pub extrefs: bool,
	pub switches: bool,
	pub faces: bool,
}

impl HierarchyOptions {
	pub fn none() -> Self {
		HierarchyOptions {
			groups: false,
			objects: false,
			meshes: false,
			lods: false,
			extrefs: false,
			switches: false,
			faces: false,
		}
	}

	pub(crate) fn any(&self) -> bool {
		self.groups
			|| self.objects
			|| self.meshes
			|| self.lods
			|| self.extrefs
			|| self.switches
			|| self.faces
	}
}

impl Default for HierarchyOptions {
	fn default() -> Self {
		HierarchyOptions {
			groups: true,
			objects: true,
			meshes: true,
			lods: true,
			extrefs: true,
			switches: true,
			faces: true,
		}
	}
}

/// Parsing options; the default reads everything but leaves external
/// references unresolved.
#[derive(Clone)]
pub struct Options {
	/// Decode and keep the full header; otherwise only the format
	/// revision is read from it.
	pub keep_header: bool,
	/// Retain name strings on nodes and faces.
	pub keep_names: bool,
	pub palette_texture: bool,
	/// Read the vertex palette and re-encode it into the interleaved
	/// array described by `vertex_layout`.
	pub palette_vertex: bool,
	pub vertex_layout: VertexLayout,
	pub hierarchy: HierarchyOptions,
	/// Follow external references as soon as the referencing file has
	/// been read, on the same thread.
	pub resolve_extrefs: bool,
	/// Fan triangulate vertex lists with more than three indices.
	pub triangulate: bool,
	/// Initial level stack depth; the stack grows past it when a file
	/// nests deeper.
	pub stack_capacity: usize,
	pub faces_dict_capacity: usize,
	pub indices_initial_capacity: usize,
	/// Fallback directories tried in order when a file is not found at
	/// its own path.
	pub search_paths: Vec<PathBuf>,
	pub callback_texture: Option<TextureCallback>,
	pub callback_extref: Option<ExtrefCallback>,
}

impl Default for Options {
	fn default() -> Self {
		Options {
			keep_header: true,
			keep_names: true,
			palette_texture: true,
			palette_vertex: true,
			vertex_layout: VertexLayout::full(),
			hierarchy: HierarchyOptions::default(),
			resolve_extrefs: false,
			triangulate: false,
			stack_capacity: DEFAULT_STACK_CAPACITY,
			faces_dict_capacity: DEFAULT_FACE_BANK_CAPACITY,
			indices_initial_capacity: DEFAULT_INDEX_CAPACITY,
			search_paths: Vec::new(),
			callback_texture: None,
			callback_extref: None,
		}
	}
}

impl Debug for Options {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Options")
			.field("keep_header", &self.keep_header)
			.field("keep_names", &self.keep_names)
			.field("palette_texture", &self.palette_texture)
			.field("palette_vertex", &self.palette_vertex)
			.field("vertex_layout", &self.vertex_layout)
			.field("hierarchy", &self.hierarchy)
			.field("resolve_extrefs", &self.resolve_extrefs)
			.field("triangulate", &self.triangulate)
			.field("search_paths", &self.search_paths)
			.finish()
	}
}

/// One texture palette entry, in palette order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TexturePaletteEntry {
	pub name: String,
	pub pattern_index: i32,
	pub xy_location: [i32; 2],
}

#[derive(Debug, Default)]
pub struct Palettes {
	pub textures: Vec<TexturePaletteEntry>,
	pub vertices: Option<VertexPalette>,
}

/// A parsed OpenFlight file.
#[derive(Debug)]
pub struct FltFile {
	/// The path the file was actually read from, empty for in-memory
	/// parses.
	pub filename: PathBuf,
	pub header: Option<Header>,
	pub palettes: Option<Palettes>,
	pub hierarchy: Option<Hierarchy>,
	pub faces: FaceBank,
	pub indices: IndexArray,
}

impl FltFile {
	/// Parses one record stream. The registry deduplicates and caches
	/// any external references that get resolved; the returned file
	/// itself is not registered.
	pub fn parse<R: Read + Seek>(
		reader: R,
		filename: impl Into<PathBuf>,
		options: &Options,
		registry: &Registry,
	) -> Result<FltFile, Error> {
		Parser::new(reader, filename.into(), options, registry)?.run()
	}

	/// Opens and parses `path`, consulting the search paths on a miss.
	///
	/// The result is owned by the caller and not registered, matching a
	/// plain single file load; go through [Registry::load] instead when
	/// the root file itself should take part in cross file caching.
	pub fn load_from_path(
		path: impl AsRef<Path>,
		options: &Options,
		registry: &Registry,
	) -> Result<FltFile, Error> {
		let path = path.as_ref();
		if registry.get(path).is_some() {
			return Err(Error::AlreadyLoaded {
				path: path.display().to_string(),
			});
		}
		Self::load_resolved(path, options, registry)
	}

	pub(crate) fn load_resolved(
		path: &Path,
		options: &Options,
		registry: &Registry,
	) -> Result<FltFile, Error> {
		let resolved =
			paths::resolve(path, &options.search_paths).ok_or_else(|| Error::FileOpen {
				path: path.to_path_buf(),
				source: std::io::Error::from(std::io::ErrorKind::NotFound),
			})?;
		let file = File::open(&resolved).map_err(|source| Error::FileOpen {
			path: resolved.clone(),
			source,
		})?;
		FltFile::parse(BufReader::new(file), resolved, options, registry)
	}

	pub fn vertex_palette(&self) -> Option<&VertexPalette> {
		self.palettes.as_ref()?.vertices.as_ref()
	}
}
