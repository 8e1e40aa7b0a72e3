// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::{Cursor, ErrorKind, Read, Seek, SeekFrom};
use std::path::PathBuf;

use binrw::BinRead;
use log::warn;

use crate::face::{FaceAttrs, FaceBank, FaceHandle};
use crate::file::{FltFile, Options, Palettes, TexturePaletteEntry};
use crate::header::Header;
use crate::hierarchy::{Hierarchy, NodeData, NodeId};
use crate::index::{IndexArray, IndexEntry, IndexPair};
use crate::opcode::{KnownOpcode, Opcode};
use crate::record::extref::ExternalReferenceRecord;
use crate::record::face::FaceRecord;
use crate::record::group::GroupRecord;
use crate::record::lod::LodRecord;
use crate::record::mesh::{LocalVertexPoolRecord, MeshRecord};
use crate::record::object::ObjectRecord;
use crate::record::switch::SwitchRecord;
use crate::record::texture::TexturePaletteRecord;
use crate::record::{FixedString, RecordHeader};
use crate::registry::Registry;
use crate::vertex_palette::{VertexPalette, PALETTE_OFFSET_BIAS};
use crate::{paths, Error, MAX_SUPPORTED_VERSION};

/// One slot of the level stack: the push marker, a node, or an interned
/// face tag (which also remembers the node carrying the face).
#[derive(Copy, Clone, Debug)]
enum StackSlot {
	Sentinel,
	Node(NodeId),
	Face { node: NodeId, handle: FaceHandle },
}

/// LIFO holding the current nesting context. Pre-sized to the configured
/// capacity and grown geometrically when a file nests deeper.
struct LevelStack {
	slots: Vec<StackSlot>,
}

impl LevelStack {
	fn with_capacity(capacity: usize) -> Self {
		LevelStack {
			slots: Vec::with_capacity(capacity.max(1)),
		}
	}

	fn len(&self) -> usize {
		self.slots.len()
	}

	fn top(&self) -> Option<&StackSlot> {
		self.slots.last()
	}

	fn pop(&mut self) -> Option<StackSlot> {
		self.slots.pop()
	}

	fn push_sentinel(&mut self) {
		self.slots.push(StackSlot::Sentinel);
	}

	fn push_node(&mut self, id: NodeId) {
		self.slots.push(StackSlot::Node(id));
	}

	fn push_face(&mut self, node: NodeId, handle: FaceHandle) {
		self.slots.push(StackSlot::Face { node, handle });
	}

	/// Nearest plain node from the top; face tags and sentinels do not
	/// count as parents.
	fn parent_node(&self) -> Option<NodeId> {
		self.slots.iter().rev().find_map(|slot| match slot {
			StackSlot::Node(id) => Some(*id),
			_ => None,
		})
	}

	/// Nearest face tag from the top.
	fn top_face(&self) -> Option<(NodeId, FaceHandle)> {
		self.slots.iter().rev().find_map(|slot| match slot {
			StackSlot::Face { node, handle } => Some((*node, *handle)),
			_ => None,
		})
	}
}

pub(crate) struct Parser<'a, R> {
	reader: R,
	path: PathBuf,
	base: PathBuf,
	options: &'a Options,
	registry: &'a Registry,
	stack: LevelStack,
	hierarchy: Option<Hierarchy>,
	textures: Vec<TexturePaletteEntry>,
	vertices: Option<VertexPalette>,
	faces: FaceBank,
	indices: IndexArray,
	header: Option<Header>,
	op_last: u16,
	use_palettes: bool,
}

impl<'a, R: Read + Seek> Parser<'a, R> {
	pub(crate) fn new(
		reader: R,
		path: PathBuf,
		options: &'a Options,
		registry: &'a Registry,
	) -> Result<Self, Error> {
		let mut stack = LevelStack::with_capacity(options.stack_capacity);
		let hierarchy = options.hierarchy.any().then(|| {
			Hierarchy::new(options.keep_names.then(|| "root".to_string()))
		});
		if let Some(hie) = &hierarchy {
			stack.push_node(hie.root());
		}
		let base = paths::base_path(&path);
		Ok(Parser {
			reader,
			path,
			base,
			options,
			registry,
			stack,
			hierarchy,
			textures: Vec::new(),
			vertices: None,
			faces: FaceBank::with_capacity(options.faces_dict_capacity),
			indices: IndexArray::with_capacity(options.indices_initial_capacity)?,
			header: None,
			op_last: 0,
			use_palettes: options.palette_texture || options.palette_vertex,
		})
	}

	pub(crate) fn run(mut self) -> Result<FltFile, Error> {
		loop {
			let mut head = [0u8; 4];
			match self.reader.read_exact(&mut head) {
				Ok(()) => {}
				Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
				Err(e) => return Err(e.into()),
			}
			let opcode = u16::from_be_bytes([head[0], head[1]]);
			let length = u16::from_be_bytes([head[2], head[3]]);
			self.registry.counters.record_opcode(opcode);
			let Some(body_len) = (length as usize).checked_sub(RecordHeader::SIZE) else {
				return Err(Error::ReadBeyondRecord {
					opcode: opcode.into(),
					length,
				});
			};
			self.dispatch(opcode, length, body_len)?;
			self.op_last = opcode;
		}
		self.finish()
	}

	fn dispatch(&mut self, opcode: u16, length: u16, body_len: usize) -> Result<(), Error> {
		let nodes = self.hierarchy.is_some();
		let h = self.options.hierarchy;
		match KnownOpcode::try_from(opcode) {
			Ok(KnownOpcode::Header) => {
				let body = self.read_body(body_len)?;
				self.header_record(opcode, length, &body)
			}
			Ok(KnownOpcode::VertexPalette) => self.vertex_palette_record(opcode, length, body_len),
			Ok(KnownOpcode::Continuation) => self.continuation_record(body_len),
			Ok(KnownOpcode::PushLevel) if nodes => {
				self.skip(body_len)?;
				self.stack.push_sentinel();
				Ok(())
			}
			Ok(KnownOpcode::PopLevel) if nodes => {
				self.skip(body_len)?;
				self.pop_level();
				Ok(())
			}
			Ok(KnownOpcode::LongId) if nodes && self.options.keep_names => {
				let body = self.read_body(body_len)?;
				self.long_id_record(&body);
				Ok(())
			}
			Ok(KnownOpcode::TexturePalette) if self.options.palette_texture => {
				let body = self.read_body(body_len)?;
				self.texture_palette_record(opcode, length, &body)
			}
			Ok(KnownOpcode::ExternalReference) if h.extrefs => {
				let body = self.read_body(body_len)?;
				self.extref_record(opcode, length, &body)
			}
			Ok(KnownOpcode::Group) if h.groups => {
				let body = self.read_body(body_len)?;
				let rec: GroupRecord = self.parse_record(opcode, length, &body)?;
				let name = self.node_name(&rec.name);
				self.add_node(NodeData::Group((&rec).into()), name);
				Ok(())
			}
			Ok(KnownOpcode::Object) if h.objects => {
				let body = self.read_body(body_len)?;
				let rec: ObjectRecord = self.parse_record(opcode, length, &body)?;
				let name = self.node_name(&rec.name);
				self.add_node(NodeData::Object((&rec).into()), name);
				Ok(())
			}
			Ok(KnownOpcode::Lod) if h.lods => {
				let body = self.read_body(body_len)?;
				let rec: LodRecord = self.parse_record(opcode, length, &body)?;
				let name = self.node_name(&rec.name);
				self.add_node(NodeData::Lod((&rec).into()), name);
				Ok(())
			}
			Ok(KnownOpcode::Switch) if h.switches => {
				let body = self.read_body(body_len)?;
				let rec: SwitchRecord = self.parse_record(opcode, length, &body)?;
				let name = self.node_name(&rec.name);
				self.add_node(NodeData::Switch((&rec).into()), name);
				Ok(())
			}
			Ok(KnownOpcode::Mesh) if h.meshes => {
				let body = self.read_body(body_len)?;
				let rec: MeshRecord = self.parse_record(opcode, length, &body)?;
				let name = self.node_name(&rec.name);
				self.add_node(NodeData::Mesh((&rec).into()), name);
				Ok(())
			}
			Ok(KnownOpcode::LocalVertexPool) if h.meshes => {
				let body = self.read_body(body_len)?;
				self.local_vertex_pool_record(opcode, length, &body)
			}
			Ok(KnownOpcode::MeshPrimitive) if h.meshes => {
				self.skip(body_len)?;
				warn!("mesh primitive records are not decoded, skipping");
				Ok(())
			}
			Ok(KnownOpcode::Face) if h.faces => {
				let body = self.read_body(body_len)?;
				self.face_record(opcode, length, &body)
			}
			Ok(KnownOpcode::VertexList) if h.faces => {
				let body = self.read_body(body_len)?;
				self.vertex_list_body(&body)
			}
			_ => self.skip(body_len),
		}
	}

	fn finish(mut self) -> Result<FltFile, Error> {
		if self.options.resolve_extrefs {
			self.resolve_extrefs();
		}
		if let Some(palette) = &mut self.vertices {
			palette.finalize();
		}
		let palettes = self.use_palettes.then(|| Palettes {
			textures: self.textures,
			vertices: self.vertices,
		});
		Ok(FltFile {
			filename: self.path,
			header: self.header,
			palettes,
			hierarchy: self.hierarchy,
			faces: self.faces,
			indices: self.indices,
		})
	}

	fn read_body(&mut self, len: usize) -> Result<Vec<u8>, Error> {
		let mut body = vec![0u8; len];
		self.reader.read_exact(&mut body)?;
		Ok(body)
	}

	fn skip(&mut self, len: usize) -> Result<(), Error> {
		if len > 0 {
			self.reader.seek(SeekFrom::Current(len as i64))?;
		}
		Ok(())
	}

	/// Parses a record body prefix; running out of body bytes means the
	/// record is shorter than its type requires.
	fn parse_record<T>(&self, opcode: u16, length: u16, body: &[u8]) -> Result<T, Error>
	where
		T: for<'b> BinRead<Args<'b> = ()>,
	{
		T::read_be(&mut Cursor::new(body)).map_err(|err| match err {
			binrw::Error::Io(ref io) if io.kind() == ErrorKind::UnexpectedEof => {
				Error::ReadBeyondRecord {
					opcode: opcode.into(),
					length,
				}
			}
			err => Error::Format(err),
		})
	}

	fn node_name(&self, name: &FixedString<8>) -> Option<String> {
		(self.options.keep_names && !name.is_empty()).then(|| name.to_string_lossy())
	}

	/// Hooks a fresh node into the tree: the previous sibling (or stale
	/// face tag) is popped off the stack, the nearest surviving node
	/// becomes the parent, and the new node goes on top so that deeper
	/// records attach to it. Sentinels stay put; Pop Level consumes them.
	fn add_node(&mut self, data: NodeData, name: Option<String>) -> Option<NodeId> {
		let hierarchy = self.hierarchy.as_mut()?;
		if self.stack.len() > 1 && !matches!(self.stack.top(), Some(StackSlot::Sentinel)) {
			self.stack.pop();
		}
		let parent = self.stack.parent_node().unwrap_or_else(|| hierarchy.root());
		let id = hierarchy.add(data, name);
		hierarchy.attach(parent, id);
		self.stack.push_node(id);
		Some(id)
	}

	fn pop_level(&mut self) {
		while self.stack.len() > 1 {
			if matches!(self.stack.pop(), Some(StackSlot::Sentinel)) {
				break;
			}
		}
	}

	fn header_record(&mut self, opcode: u16, length: u16, body: &[u8]) -> Result<(), Error> {
		let format_revision = if self.options.keep_header {
			let header: Header = self.parse_record(opcode, length, body)?;
			let revision = header.format_revision;
			self.header = Some(header);
			revision
		} else {
			let bytes = body.get(8..12).ok_or(Error::ReadBeyondRecord {
				opcode: opcode.into(),
				length,
			})?;
			i32::from_be_bytes(bytes.try_into().unwrap())
		};
		if format_revision > MAX_SUPPORTED_VERSION {
			return Err(Error::VersionUnsupported {
				found: format_revision,
				max: MAX_SUPPORTED_VERSION,
			});
		}
		Ok(())
	}

	/// The vertex palette record only carries the palette's total byte
	/// count; the palette block itself (the consecutive vertex records)
	/// follows the record and is consumed here in bulk.
	fn vertex_palette_record(
		&mut self,
		opcode: u16,
		length: u16,
		body_len: usize,
	) -> Result<(), Error> {
		if body_len < 4 {
			return Err(Error::ReadBeyondRecord {
				opcode: opcode.into(),
				length,
			});
		}
		let body = self.read_body(body_len)?;
		let palette_len = i32::from_be_bytes(body[..4].try_into().unwrap());
		let palette_body = (palette_len.max(0) as usize)
			.saturating_sub(RecordHeader::SIZE + 4);
		if palette_body == 0 {
			return Ok(());
		}
		if self.options.palette_vertex {
			let mut raw = Vec::new();
			raw.try_reserve_exact(palette_body)
				.map_err(|_| Error::OutOfMemory {
					bytes: palette_body,
				})?;
			raw.resize(palette_body, 0);
			self.reader.read_exact(&mut raw)?;
			self.vertices = Some(VertexPalette::new(raw, self.options.vertex_layout)?);
		} else {
			self.skip(palette_body)?;
		}
		Ok(())
	}

	fn texture_palette_record(
		&mut self,
		opcode: u16,
		length: u16,
		body: &[u8],
	) -> Result<(), Error> {
		let rec: TexturePaletteRecord = self.parse_record(opcode, length, body)?;
		if let Some(callback) = &self.options.callback_texture {
			callback(&rec);
		}
		self.textures.push(TexturePaletteEntry {
			name: rec.filename.to_string_lossy(),
			pattern_index: rec.pattern_index,
			xy_location: rec.xy_location,
		});
		Ok(())
	}

	fn extref_record(&mut self, opcode: u16, length: u16, body: &[u8]) -> Result<(), Error> {
		let rec: ExternalReferenceRecord = self.parse_record(opcode, length, body)?;
		if let Some(callback) = &self.options.callback_extref {
			callback(&rec);
		}
		// the name is the resolution key, it survives even without
		// keep_names
		let name = Some(rec.path.to_string_lossy());
		if let Some(id) = self.add_node(NodeData::ExternalReference((&rec).into()), name) {
			if let Some(hierarchy) = self.hierarchy.as_mut() {
				hierarchy.push_extref(id);
			}
		}
		Ok(())
	}

	fn local_vertex_pool_record(
		&mut self,
		opcode: u16,
		length: u16,
		body: &[u8],
	) -> Result<(), Error> {
		let rec: LocalVertexPoolRecord = self.parse_record(opcode, length, body)?;
		warn!(
			"local vertex pool ({} vertices) is not decoded, skipping",
			rec.count
		);
		if let (Some(hierarchy), Some(id)) = (self.hierarchy.as_mut(), self.stack.parent_node()) {
			if let NodeData::Mesh(mesh) = &mut hierarchy.node_mut(id).data {
				mesh.pool = Some(rec);
			}
		}
		Ok(())
	}

	fn long_id_record(&mut self, body: &[u8]) {
		let Some(StackSlot::Node(id)) = self.stack.top().copied() else {
			return;
		};
		let len = body.len().min(512);
		let end = body[..len].iter().position(|&b| b == 0).unwrap_or(len);
		if let Some(hierarchy) = self.hierarchy.as_mut() {
			hierarchy.node_mut(id).name =
				Some(String::from_utf8_lossy(&body[..end]).into_owned());
		}
	}

	fn face_record(&mut self, opcode: u16, length: u16, body: &[u8]) -> Result<(), Error> {
		let rec: FaceRecord = self.parse_record(opcode, length, body)?;
		let attrs: FaceAttrs = (&rec).into();
		let name = self.node_name(&rec.name);
		let (handle, inserted) = self.faces.intern(attrs, name.clone());
		self.registry.counters.record_face(inserted);

		// a face is both a node in the tree and the tag that stamps the
		// vertex lists that follow it
		let Some(hierarchy) = self.hierarchy.as_mut() else {
			return Ok(());
		};
		if self.stack.len() > 1 && !matches!(self.stack.top(), Some(StackSlot::Sentinel)) {
			self.stack.pop();
		}
		let parent = self.stack.parent_node().unwrap_or_else(|| hierarchy.root());
		let id = hierarchy.add(NodeData::Face(handle), name);
		hierarchy.attach(parent, id);
		self.stack.push_face(id, handle);
		Ok(())
	}

	/// Packs one batch of vertex list indices, shared by the vertex list
	/// record and its continuations.
	fn vertex_list_body(&mut self, body: &[u8]) -> Result<(), Error> {
		let count = body.len() / 4;
		if count == 0 {
			return Ok(());
		}
		self.registry.counters.record_indices(count as u64);
		let Some((face_node, handle)) = self.stack.top_face() else {
			return Ok(());
		};

		let mut resolved = Vec::with_capacity(count);
		for chunk in body.chunks_exact(4) {
			let wire = u32::from_be_bytes(chunk.try_into().unwrap());
			let offset = wire.saturating_sub(PALETTE_OFFSET_BIAS);
			let index = match &mut self.vertices {
				Some(palette) => palette.index_for_offset(offset)?,
				None => offset,
			};
			resolved.push(index);
		}

		let start = self.indices.len() as u32;
		if self.options.triangulate && resolved.len() > 3 {
			self.indices.ensure((resolved.len() - 2) * 3)?;
			for i in 1..resolved.len() - 1 {
				for vertex in [resolved[0], resolved[i], resolved[i + 1]] {
					self.indices.push(IndexEntry {
						face: handle,
						vertex,
					});
				}
			}
		} else {
			self.indices.ensure(resolved.len())?;
			for vertex in resolved {
				self.indices.push(IndexEntry {
					face: handle,
					vertex,
				});
			}
		}
		let end = self.indices.len() as u32 - 1;

		if let Some(hierarchy) = self.hierarchy.as_mut() {
			let pairs = &mut hierarchy.node_mut(face_node).index_pairs;
			let extended = match pairs.last_mut() {
				Some(last) => last.try_extend(start, end),
				None => false,
			};
			if !extended {
				pairs.push(IndexPair::new(start, end));
			}
		}
		Ok(())
	}

	/// A continuation enlarges the record before it; which of the three
	/// continuation bearing record types that was decides how the extra
	/// payload is read.
	fn continuation_record(&mut self, body_len: usize) -> Result<(), Error> {
		match KnownOpcode::try_from(self.op_last) {
			Ok(KnownOpcode::VertexList) if self.options.hierarchy.faces => {
				let body = self.read_body(body_len)?;
				self.vertex_list_body(&body)
			}
			Ok(KnownOpcode::LocalVertexPool) | Ok(KnownOpcode::MeshPrimitive) => {
				self.skip(body_len)?;
				warn!(
					"continuation of {} is not decoded, skipping",
					Opcode::from(self.op_last).name()
				);
				Ok(())
			}
			_ => {
				self.skip(body_len)?;
				warn!(
					"unexpected continuation after {}, skipping",
					Opcode::from(self.op_last).name()
				);
				Ok(())
			}
		}
	}

	fn resolve_extrefs(&mut self) {
		let Some(hierarchy) = &self.hierarchy else {
			return;
		};
		for &id in hierarchy.extrefs() {
			let node = hierarchy.node(id);
			let Some(name) = node.name.as_deref() else {
				continue;
			};
			let (entry, pending) = self.registry.prepare_extref(&self.base, name);
			if let NodeData::ExternalReference(extref) = &node.data {
				extref.attach(entry.clone());
			}
			if let Some(path) = pending {
				if entry.begin_loading() {
					let result = FltFile::load_resolved(&path, self.options, self.registry);
					if let Err(err) = &result {
						// a failed reference surfaces on its own entry,
						// the referencing file keeps loading
						warn!("external reference {} failed: {err}", path.display());
					}
					entry.complete(result);
				}
			}
		}
	}
}
