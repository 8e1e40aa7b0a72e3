// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt::{Debug, Formatter};
use std::sync::{Arc, OnceLock};

use derive_more::Display;

use crate::face::{FaceAttrs, FaceHandle};
use crate::index::IndexPair;
use crate::record::extref::ExternalReferenceRecord;
use crate::record::group::GroupRecord;
use crate::record::lod::LodRecord;
use crate::record::mesh::{LocalVertexPoolRecord, MeshRecord};
use crate::record::object::ObjectRecord;
use crate::record::switch::SwitchRecord;
use crate::registry::FileEntry;

/// Index of a node inside its [Hierarchy] arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
	fn index(self) -> usize {
		self.0 as usize
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum NodeKind {
	Base,
	ExternalReference,
	Group,
	Object,
	Mesh,
	Lod,
	Face,
	Switch,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Group {
	pub priority: i16,
	pub flags: u32,
	pub loop_count: u32,
	pub loop_duration: f32,
	pub last_frame_duration: f32,
}

impl From<&GroupRecord> for Group {
	fn from(rec: &GroupRecord) -> Self {
		Group {
			priority: rec.priority,
			flags: rec.flags,
			loop_count: rec.loop_count,
			loop_duration: rec.loop_duration,
			last_frame_duration: rec.last_frame_duration,
		}
	}
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Object {
	pub flags: u32,
	pub priority: i16,
	pub transparency: i16,
}

impl From<&ObjectRecord> for Object {
	fn from(rec: &ObjectRecord) -> Self {
		Object {
			flags: rec.flags,
			priority: rec.priority,
			transparency: rec.transparency,
		}
	}
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Lod {
	pub switch_in: f64,
	pub switch_out: f64,
	pub center: [f64; 3],
	pub transition_range: f64,
	pub significant_size: f64,
	pub flags: u32,
}

impl From<&LodRecord> for Lod {
	fn from(rec: &LodRecord) -> Self {
		Lod {
			switch_in: rec.switch_in,
			switch_out: rec.switch_out,
			center: rec.center,
			transition_range: rec.transition_range,
			significant_size: rec.significant_size,
			flags: rec.flags,
		}
	}
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Switch {
	pub current_mask: u32,
	pub words_per_mask: u32,
	pub mask_words: Vec<u32>,
}

impl Switch {
	pub fn mask_count(&self) -> u32 {
		if self.words_per_mask == 0 {
			0
		} else {
			self.mask_words.len() as u32 / self.words_per_mask
		}
	}
}

impl From<&SwitchRecord> for Switch {
	fn from(rec: &SwitchRecord) -> Self {
		Switch {
			current_mask: rec.current_mask,
			words_per_mask: rec.words_per_mask,
			mask_words: rec.mask_words.clone(),
		}
	}
}

/// Mesh node: the face style attribute block plus the (undecoded) local
/// vertex pool summary once one is seen.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Mesh {
	pub attrs: FaceAttrs,
	pub pool: Option<LocalVertexPoolRecord>,
}

impl From<&MeshRecord> for Mesh {
	fn from(rec: &MeshRecord) -> Self {
		Mesh {
			attrs: rec.into(),
			pool: None,
		}
	}
}

/// External reference node. `file` is attached when the reference is
/// resolved, either inline by the parser or later by an external
/// scheduler; the registry holds the other strong handle.
#[derive(Default)]
pub struct ExternalReference {
	pub flags: i32,
	pub view_as_bounding_box: i16,
	file: OnceLock<Arc<FileEntry>>,
}

impl ExternalReference {
	pub fn resolved(&self) -> Option<&Arc<FileEntry>> {
		self.file.get()
	}

	/// First attach wins; a second call is a no-op.
	pub fn attach(&self, entry: Arc<FileEntry>) {
		let _ = self.file.set(entry);
	}
}

impl From<&ExternalReferenceRecord> for ExternalReference {
	fn from(rec: &ExternalReferenceRecord) -> Self {
		ExternalReference {
			flags: rec.flags,
			view_as_bounding_box: rec.view_as_bounding_box,
			file: OnceLock::new(),
		}
	}
}

impl Debug for ExternalReference {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ExternalReference")
			.field("flags", &self.flags)
			.field("view_as_bounding_box", &self.view_as_bounding_box)
			.field("resolved", &self.file.get().is_some())
			.finish()
	}
}

#[derive(Debug, Default)]
pub enum NodeData {
	#[default]
	Base,
	ExternalReference(ExternalReference),
	Group(Group),
	Object(Object),
	Mesh(Mesh),
	Lod(Lod),
	Face(FaceHandle),
	Switch(Switch),
}

impl NodeData {
	pub fn kind(&self) -> NodeKind {
		match self {
			NodeData::Base => NodeKind::Base,
			NodeData::ExternalReference(_) => NodeKind::ExternalReference,
			NodeData::Group(_) => NodeKind::Group,
			NodeData::Object(_) => NodeKind::Object,
			NodeData::Mesh(_) => NodeKind::Mesh,
			NodeData::Lod(_) => NodeKind::Lod,
			NodeData::Face(_) => NodeKind::Face,
			NodeData::Switch(_) => NodeKind::Switch,
		}
	}
}

#[derive(Debug, Default)]
pub struct Node {
	pub name: Option<String>,
	pub data: NodeData,
	/// Half-open runs into the file level index array owned by this node.
	pub index_pairs: Vec<IndexPair>,
	next: Option<NodeId>,
	first_child: Option<NodeId>,
	last_child: Option<NodeId>,
	child_count: u16,
}

impl Node {
	fn new(data: NodeData, name: Option<String>) -> Self {
		Node {
			name,
			data,
			..Node::default()
		}
	}

	pub fn kind(&self) -> NodeKind {
		self.data.kind()
	}

	pub fn next_sibling(&self) -> Option<NodeId> {
		self.next
	}

	pub fn first_child(&self) -> Option<NodeId> {
		self.first_child
	}

	pub fn child_count(&self) -> u16 {
		self.child_count
	}
}

/// The scene graph of one file: an arena of nodes linked through sibling
/// and child indices, with a flat external reference list in discovery
/// order.
#[derive(Debug)]
pub struct Hierarchy {
	nodes: Vec<Node>,
	extrefs: Vec<NodeId>,
}

impl Hierarchy {
	pub(crate) fn new(root_name: Option<String>) -> Self {
		Hierarchy {
			nodes: vec![Node::new(NodeData::Base, root_name)],
			extrefs: Vec::new(),
		}
	}

	pub fn root(&self) -> NodeId {
		NodeId(0)
	}

	pub fn node(&self, id: NodeId) -> &Node {
		&self.nodes[id.index()]
	}

	pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
		&mut self.nodes[id.index()]
	}

	/// Total number of nodes, the root included.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub(crate) fn add(&mut self, data: NodeData, name: Option<String>) -> NodeId {
		let id = NodeId(self.nodes.len() as u32);
		self.nodes.push(Node::new(data, name));
		id
	}

	pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
		match self.nodes[parent.index()].last_child {
			Some(tail) => self.nodes[tail.index()].next = Some(child),
			None => self.nodes[parent.index()].first_child = Some(child),
		}
		let p = &mut self.nodes[parent.index()];
		p.last_child = Some(child);
		p.child_count += 1;
	}

	pub(crate) fn push_extref(&mut self, id: NodeId) {
		self.extrefs.push(id);
	}

	/// External reference nodes in the order they were discovered.
	pub fn extrefs(&self) -> &[NodeId] {
		&self.extrefs
	}

	pub fn children(&self, id: NodeId) -> Children<'_> {
		Children {
			hierarchy: self,
			next: self.node(id).first_child,
		}
	}

	/// Depth-first preorder walk starting at (and including) `start`.
	pub fn visit(&self, start: NodeId, f: &mut impl FnMut(NodeId, usize)) {
		self.visit_at(start, 0, f);
	}

	fn visit_at(&self, id: NodeId, depth: usize, f: &mut impl FnMut(NodeId, usize)) {
		f(id, depth);
		for child in self.children(id) {
			self.visit_at(child, depth + 1, f);
		}
	}
}

pub struct Children<'a> {
	hierarchy: &'a Hierarchy,
	next: Option<NodeId>,
}

impl Iterator for Children<'_> {
	type Item = NodeId;

	fn next(&mut self) -> Option<NodeId> {
		let id = self.next?;
		self.next = self.hierarchy.node(id).next;
		Some(id)
	}
}
