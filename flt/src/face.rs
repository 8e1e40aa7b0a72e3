// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use derive_more::{Display, From, Into};

use crate::record::face::FaceRecord;
use crate::record::mesh::MeshRecord;

/// The attribute set that decides face identity. Two faces are the same
/// face exactly when their attributes are equal; the name never
/// participates in the comparison.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FaceAttrs {
	pub abgr: u32,
	pub base_texture_index: i16,
	pub detail_texture_index: i16,
	pub material_index: i16,
	pub shader_index: i16,
	pub flags: u32,
	pub billboard: u8,
	pub ir_color: i32,
	pub ir_material: i32,
	pub surface_material_code: i16,
	pub feature_id: i16,
	pub transparency: i16,
	pub color_name_index: u16,
	pub alt_color_name_index: u16,
	pub texture_mapping_index: u16,
	pub draw_type: u8,
	pub light_mode: u8,
	pub lod_generation_control: u8,
	pub line_style_index: u8,
}

impl FaceAttrs {
	pub fn draw_type_name(&self) -> Cow<'static, str> {
		const NAMES: [&str; 11] = [
			"Draw Solid Culling",
			"Draw Solid DSided",
			"Draw Wireframe Close",
			"Draw Wireframe",
			"Sorround WF AltColor",
			"",
			"",
			"",
			"Omni light",
			"Unidir light",
			"Bidir light",
		];
		match self.draw_type as usize {
			t if t < NAMES.len() => Cow::Borrowed(NAMES[t]),
			_ => Cow::Owned(self.draw_type.to_string()),
		}
	}

	pub fn light_mode_name(&self) -> Cow<'static, str> {
		const NAMES: [&str; 4] = ["Flat", "Gouraud", "Lit", "Lit-Gouraud"];
		match self.light_mode as usize {
			m if m < NAMES.len() => Cow::Borrowed(NAMES[m]),
			_ => Cow::Owned(self.light_mode.to_string()),
		}
	}
}

impl From<&FaceRecord> for FaceAttrs {
	fn from(rec: &FaceRecord) -> Self {
		FaceAttrs {
			abgr: rec.abgr,
			base_texture_index: rec.base_texture_index,
			detail_texture_index: rec.detail_texture_index,
			material_index: rec.material_index,
			shader_index: rec.shader_index,
			flags: rec.flags,
			billboard: rec.billboard,
			ir_color: rec.ir_color,
			ir_material: rec.ir_material,
			surface_material_code: rec.surface_material_code,
			feature_id: rec.feature_id,
			transparency: rec.transparency,
			color_name_index: rec.color_name_index,
			alt_color_name_index: rec.alt_color_name_index,
			texture_mapping_index: rec.texture_mapping_index,
			draw_type: rec.draw_type,
			light_mode: rec.light_mode,
			lod_generation_control: rec.lod_generation_control,
			line_style_index: rec.line_style_index,
		}
	}
}

impl From<&MeshRecord> for FaceAttrs {
	fn from(rec: &MeshRecord) -> Self {
		FaceAttrs {
			abgr: rec.abgr,
			base_texture_index: rec.base_texture_index,
			detail_texture_index: rec.detail_texture_index,
			material_index: rec.material_index,
			shader_index: rec.shader_index,
			flags: rec.flags,
			billboard: rec.billboard,
			ir_color: rec.ir_color,
			ir_material: rec.ir_material,
			surface_material_code: rec.surface_material_code,
			feature_id: rec.feature_id,
			transparency: rec.transparency,
			color_name_index: rec.color_name_index,
			alt_color_name_index: rec.alt_color_name_index,
			texture_mapping_index: rec.texture_mapping_index,
			draw_type: rec.draw_type,
			light_mode: rec.light_mode,
			lod_generation_control: rec.lod_generation_control,
			line_style_index: rec.line_style_index,
		}
	}
}

/// An interned face.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Face {
	pub attrs: FaceAttrs,
	pub name: Option<String>,
}

/// Stable handle into a [FaceBank]; the same handle is packed next to the
/// vertex index in every index array element that uses the face.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, From, Into, Display)]
pub struct FaceHandle(pub u32);

/// Per-file face store. Faces are deduplicated on their attributes; the
/// first record to introduce an attribute set also donates its name.
#[derive(Default)]
pub struct FaceBank {
	faces: Vec<Face>,
	lookup: HashMap<FaceAttrs, FaceHandle>,
}

impl FaceBank {
	pub fn with_capacity(capacity: usize) -> Self {
		FaceBank {
			faces: Vec::new(),
			lookup: HashMap::with_capacity(capacity),
		}
	}

	/// Returns the handle for the attribute set, plus whether this call
	/// inserted it.
	pub fn intern(&mut self, attrs: FaceAttrs, name: Option<String>) -> (FaceHandle, bool) {
		if let Some(&handle) = self.lookup.get(&attrs) {
			return (handle, false);
		}
		let handle = FaceHandle(self.faces.len() as u32);
		self.lookup.insert(attrs.clone(), handle);
		self.faces.push(Face { attrs, name });
		(handle, true)
	}

	pub fn get(&self, handle: FaceHandle) -> Option<&Face> {
		self.faces.get(handle.0 as usize)
	}

	pub fn iter(&self) -> impl Iterator<Item = (FaceHandle, &Face)> {
		self.faces
			.iter()
			.enumerate()
			.map(|(i, f)| (FaceHandle(i as u32), f))
	}

	pub fn len(&self) -> usize {
		self.faces.len()
	}

	pub fn is_empty(&self) -> bool {
		self.faces.is_empty()
	}
}

impl Debug for FaceBank {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FaceBank")
			.field("faces", &self.faces.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn interning_dedupes_on_attributes() {
		let mut bank = FaceBank::with_capacity(16);
		let attrs = FaceAttrs {
			abgr: 0xff0000ff,
			base_texture_index: 2,
			..FaceAttrs::default()
		};

		let (first, inserted) = bank.intern(attrs.clone(), Some("wall".to_string()));
		assert!(inserted);
		// same attributes under a different name are the same face
		let (second, inserted) = bank.intern(attrs.clone(), Some("roof".to_string()));
		assert!(!inserted);
		assert_eq!(first, second);
		assert_eq!(bank.len(), 1);
		assert_eq!(bank.get(first).unwrap().name.as_deref(), Some("wall"));

		let different = FaceAttrs {
			abgr: 0x00ff00ff,
			..attrs
		};
		let (third, inserted) = bank.intern(different, None);
		assert!(inserted);
		assert_ne!(first, third);
		assert_eq!(bank.len(), 2);
	}

	#[test]
	fn descriptive_names() {
		let attrs = FaceAttrs {
			draw_type: 1,
			light_mode: 3,
			..FaceAttrs::default()
		};
		assert_eq!(attrs.draw_type_name(), "Draw Solid DSided");
		assert_eq!(attrs.light_mode_name(), "Lit-Gouraud");
		let odd = FaceAttrs {
			draw_type: 99,
			..FaceAttrs::default()
		};
		assert_eq!(odd.draw_type_name(), "99");
	}
}
