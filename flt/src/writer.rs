// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use binrw::BinWrite;
use log::warn;

use crate::file::FltFile;
use crate::header::Header;
use crate::hierarchy::{Hierarchy, NodeData, NodeId};
use crate::opcode::{KnownOpcode, Opcode};
use crate::record::extref::ExternalReferenceRecord;
use crate::record::group::GroupRecord;
use crate::record::lod::LodRecord;
use crate::record::RecordHeader;
use crate::Error;

fn record<W, T>(writer: &mut W, opcode: KnownOpcode, body: &T) -> Result<(), Error>
where
	W: Write + Seek,
	T: for<'a> BinWrite<Args<'a> = ()>,
{
	let mut cur = std::io::Cursor::new(vec![]);
	body.write_be(&mut cur)?;
	let body = cur.into_inner();
	RecordHeader::new(Opcode::Known(opcode), body.len()).write(writer)?;
	writer.write_all(&body)?;
	Ok(())
}

fn bracket<W: Write + Seek>(writer: &mut W, opcode: KnownOpcode) -> Result<(), Error> {
	RecordHeader::new(Opcode::Known(opcode), 0).write(writer)?;
	Ok(())
}

impl FltFile {
	/// Writes the header and the hierarchy skeleton back into the wire
	/// format. Groups, levels of detail and external references are
	/// emitted with their push/pop nesting; the remaining node kinds are
	/// not supported by the writer and are skipped (their children are
	/// still visited).
	pub fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<(), Error> {
		if let Some(header) = &self.header {
			record(writer, KnownOpcode::Header, header)?;
		}
		if let Some(hierarchy) = &self.hierarchy {
			let root = hierarchy.root();
			if hierarchy.node(root).first_child().is_some() {
				self.write_children(writer, hierarchy, root)?;
			}
		}
		Ok(())
	}

	pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), Error> {
		let path = path.as_ref();
		let file = File::create(path).map_err(|source| Error::FileOpen {
			path: path.to_path_buf(),
			source,
		})?;
		let mut writer = BufWriter::new(file);
		self.write(&mut writer)?;
		writer.flush()?;
		Ok(())
	}

	fn write_children<W: Write + Seek>(
		&self,
		writer: &mut W,
		hierarchy: &Hierarchy,
		parent: NodeId,
	) -> Result<(), Error> {
		bracket(writer, KnownOpcode::PushLevel)?;
		for id in hierarchy.children(parent) {
			let node = hierarchy.node(id);
			let name = node.name.as_deref().unwrap_or("");
			match &node.data {
				NodeData::Group(group) => {
					let rec = GroupRecord {
						name: name.into(),
						priority: group.priority,
						flags: group.flags,
						loop_count: group.loop_count,
						loop_duration: group.loop_duration,
						last_frame_duration: group.last_frame_duration,
						..GroupRecord::default()
					};
					record(writer, KnownOpcode::Group, &rec)?;
				}
				NodeData::Lod(lod) => {
					let rec = LodRecord {
						name: name.into(),
						switch_in: lod.switch_in,
						switch_out: lod.switch_out,
						flags: lod.flags,
						center: lod.center,
						transition_range: lod.transition_range,
						significant_size: lod.significant_size,
						..LodRecord::default()
					};
					record(writer, KnownOpcode::Lod, &rec)?;
				}
				NodeData::ExternalReference(extref) => {
					let rec = ExternalReferenceRecord {
						path: name.into(),
						flags: extref.flags,
						view_as_bounding_box: extref.view_as_bounding_box,
					};
					record(writer, KnownOpcode::ExternalReference, &rec)?;
				}
				NodeData::Base => {}
				other => {
					warn!("{} nodes are not written, skipping the record", other.kind());
				}
			}
			if node.first_child().is_some() {
				self.write_children(writer, hierarchy, id)?;
			}
		}
		bracket(writer, KnownOpcode::PopLevel)?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use binrw::BinWrite;

	use super::*;
	use crate::file::Options;
	use crate::hierarchy::NodeKind;
	use crate::record::face::FaceRecord;
	use crate::registry::Registry;

	fn raw_record(bytes: &mut Vec<u8>, opcode: u16, body: &[u8]) {
		let mut cur = Cursor::new(vec![]);
		RecordHeader::new(opcode.into(), body.len())
			.write(&mut cur)
			.unwrap();
		bytes.extend_from_slice(cur.get_ref());
		bytes.extend_from_slice(body);
	}

	fn typed_record<T: for<'a> BinWrite<Args<'a> = ()>>(bytes: &mut Vec<u8>, opcode: u16, body: &T) {
		let mut cur = Cursor::new(vec![]);
		body.write_be(&mut cur).unwrap();
		let body = cur.into_inner();
		raw_record(bytes, opcode, &body);
	}

	fn skeleton_stream() -> Vec<u8> {
		let mut bytes = vec![];
		typed_record(
			&mut bytes,
			1,
			&Header {
				ascii: "db".into(),
				format_revision: 1640,
				projection_type: 2,
				..Header::default()
			},
		);
		raw_record(&mut bytes, 10, &[]);
		typed_record(
			&mut bytes,
			2,
			&GroupRecord {
				name: "city".into(),
				priority: 7,
				loop_count: 2,
				..GroupRecord::default()
			},
		);
		raw_record(&mut bytes, 10, &[]);
		typed_record(
			&mut bytes,
			73,
			&LodRecord {
				name: "near".into(),
				switch_in: 100.0,
				center: [1.0, 2.0, 3.0],
				transition_range: 50.0,
				..LodRecord::default()
			},
		);
		typed_record(
			&mut bytes,
			63,
			&ExternalReferenceRecord {
				path: "tile.flt".into(),
				flags: 5,
				view_as_bounding_box: 1,
			},
		);
		raw_record(&mut bytes, 11, &[]);
		raw_record(&mut bytes, 11, &[]);
		bytes
	}

	fn parse(bytes: Vec<u8>) -> FltFile {
		let registry = Registry::new();
		FltFile::parse(Cursor::new(bytes), "w.flt", &Options::default(), &registry).unwrap()
	}

	fn shape(file: &FltFile) -> Vec<(NodeKind, Option<String>, usize)> {
		let hierarchy = file.hierarchy.as_ref().unwrap();
		let mut out = vec![];
		hierarchy.visit(hierarchy.root(), &mut |id, depth| {
			let node = hierarchy.node(id);
			out.push((node.kind(), node.name.clone(), depth));
		});
		out
	}

	#[test]
	fn skeleton_survives_a_roundtrip() {
		let first = parse(skeleton_stream());
		let mut written = Cursor::new(vec![]);
		first.write(&mut written).unwrap();
		let second = parse(written.get_ref().clone());

		assert_eq!(first.header, second.header);
		assert_eq!(shape(&first), shape(&second));

		let hierarchy = second.hierarchy.as_ref().unwrap();
		let group = hierarchy.children(hierarchy.root()).next().unwrap();
		match &hierarchy.node(group).data {
			NodeData::Group(g) => {
				assert_eq!(g.priority, 7);
				assert_eq!(g.loop_count, 2);
			}
			_ => panic!("expected the group"),
		}
		let children: Vec<_> = hierarchy.children(group).collect();
		match &hierarchy.node(children[0]).data {
			NodeData::Lod(lod) => {
				assert_eq!(lod.switch_in, 100.0);
				assert_eq!(lod.center, [1.0, 2.0, 3.0]);
			}
			_ => panic!("expected the lod"),
		}
		match &hierarchy.node(children[1]).data {
			NodeData::ExternalReference(x) => {
				assert_eq!(x.flags, 5);
				assert_eq!(x.view_as_bounding_box, 1);
			}
			_ => panic!("expected the reference"),
		}

		// a second cycle reproduces the bytes exactly
		let mut rewritten = Cursor::new(vec![]);
		second.write(&mut rewritten).unwrap();
		assert_eq!(written.get_ref(), rewritten.get_ref());
	}

	#[test]
	fn unsupported_kinds_are_left_out() {
		let mut bytes = vec![];
		typed_record(
			&mut bytes,
			1,
			&Header {
				format_revision: 1640,
				..Header::default()
			},
		);
		raw_record(&mut bytes, 10, &[]);
		typed_record(
			&mut bytes,
			2,
			&GroupRecord {
				name: "g".into(),
				..GroupRecord::default()
			},
		);
		raw_record(&mut bytes, 10, &[]);
		typed_record(
			&mut bytes,
			5,
			&FaceRecord {
				name: "f".into(),
				abgr: 0x10,
				..FaceRecord::default()
			},
		);
		raw_record(&mut bytes, 11, &[]);
		raw_record(&mut bytes, 11, &[]);

		let first = parse(bytes);
		let mut written = Cursor::new(vec![]);
		first.write(&mut written).unwrap();
		let second = parse(written.get_ref().clone());
		let kinds: Vec<_> = shape(&second).iter().map(|(kind, _, _)| *kind).collect();
		assert!(kinds.contains(&NodeKind::Group));
		assert!(!kinds.contains(&NodeKind::Face));
	}
}
