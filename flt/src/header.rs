// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::borrow::Cow;

use binrw::binrw;

use crate::record::FixedString;

/// Header record (opcode 1), 320 byte body.
///
/// All fields are big-endian on disk; reserved blocks are dropped on read
/// and zero filled on write.
#[binrw]
#[brw(big)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
	pub ascii: FixedString<8>,
	pub format_revision: i32,
	pub edit_revision: i32,
	/// Last revision date and time; embedded line breaks are normalized
	/// to spaces on read.
	#[br(map = |s: FixedString<32>| s.normalized())]
	pub date_time: FixedString<32>,
	pub next_group_node_id: i16,
	pub next_lod_node_id: i16,
	pub next_object_node_id: i16,
	pub next_face_node_id: i16,
	pub unit_multiplier: i16,
	pub vertex_coord_units: i8,
	pub texwhite_new_faces: i8,
	pub flags: i32,
	#[br(temp)]
	#[bw(calc = [0; 6])]
	reserved0: [i32; 6],
	pub projection_type: i32,
	#[br(temp)]
	#[bw(calc = [0; 7])]
	reserved1: [i32; 7],
	pub next_dof_node_id: i16,
	pub vertex_storage_type: i16,
	pub database_origin: i32,
	pub southwest_db_x: f64,
	pub southwest_db_y: f64,
	pub delta_db_x: f64,
	pub delta_db_y: f64,
	pub next_sound_node_id: i16,
	pub next_path_node_id: i16,
	#[br(temp)]
	#[bw(calc = [0; 2])]
	reserved2: [i32; 2],
	pub next_clip_node_id: i16,
	pub next_text_node_id: i16,
	pub next_bsp_node_id: i16,
	pub next_switch_node_id: i16,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved3: i32,
	pub southwest_corner_lat: f64,
	pub southwest_corner_lon: f64,
	pub northeast_corner_lat: f64,
	pub northeast_corner_lon: f64,
	pub origin_lat: f64,
	pub origin_lon: f64,
	pub lambert_upper_lat: f64,
	pub lambert_lower_lat: f64,
	pub next_light_source_node_id: i16,
	pub next_light_point_node_id: i16,
	pub next_road_node_id: i16,
	pub next_cat_node_id: i16,
	#[br(temp)]
	#[bw(calc = [0; 4])]
	reserved4: [i16; 4],
	pub earth_ellipsoid_model: i32,
	pub next_adaptive_node_id: i16,
	pub next_curve_node_id: i16,
	pub utm_zone: i16,
	#[br(temp)]
	#[bw(calc = [0; 6])]
	reserved5: [i8; 6],
	pub delta_db_z: f64,
	pub database_radius: f64,
	pub next_mesh_node_id: i16,
	pub next_light_point_system_node_id: i16,
	#[br(temp)]
	#[bw(calc = 0)]
	reserved6: i32,
	pub earth_major_axis: f64,
	pub earth_minor_axis: f64,
}

impl Header {
	pub const BODY_LEN: usize = 320;

	pub fn projection_name(&self) -> Cow<'static, str> {
		const NAMES: [&str; 7] = [
			"Flat Earth",
			"Trapezoidal",
			"Round Earth",
			"Lambert",
			"UTM",
			"Geodetic",
			"Geocentric",
		];
		match usize::try_from(self.projection_type) {
			Ok(p) if p < NAMES.len() => Cow::Borrowed(NAMES[p]),
			_ => Cow::Owned(self.projection_type.to_string()),
		}
	}

	pub fn database_origin_name(&self) -> Cow<'static, str> {
		match self.database_origin {
			100 => Cow::Borrowed("OpenFlight"),
			200 => Cow::Borrowed("DIG I/II"),
			300 => Cow::Borrowed("Evans and Sutherland CT5A/CT6"),
			400 => Cow::Borrowed("PSP DIG"),
			600 => Cow::Borrowed("General Electric CIV/CV/PT2000"),
			700 => Cow::Borrowed("Evans and Sutherland GDF"),
			other => Cow::Owned(other.to_string()),
		}
	}

	pub fn vertex_units_name(&self) -> Cow<'static, str> {
		const NAMES: [&str; 9] = [
			"Meters",
			"Kilometers",
			"",
			"",
			"Feet",
			"Inches",
			"",
			"",
			"Nautical miles",
		];
		match usize::try_from(self.vertex_coord_units) {
			Ok(u) if u < NAMES.len() => Cow::Borrowed(NAMES[u]),
			_ => Cow::Owned(self.vertex_coord_units.to_string()),
		}
	}

	pub fn earth_ellipsoid_name(&self) -> Cow<'static, str> {
		const NAMES: [&str; 5] = ["WGS 1984", "WGS 1972", "Bessel", "Clarke 1866", "NAD 1927"];
		match self.earth_ellipsoid_model {
			-1 => Cow::Borrowed("User Defined"),
			m => match usize::try_from(m) {
				Ok(m) if m < NAMES.len() => Cow::Borrowed(NAMES[m]),
				_ => Cow::Owned(self.earth_ellipsoid_model.to_string()),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use binrw::{BinRead, BinWrite};

	use super::*;

	fn sample() -> Header {
		Header {
			ascii: "db".into(),
			format_revision: 1640,
			edit_revision: 3,
			date_time: "Tue Mar 01 10:00:00 2016".into(),
			unit_multiplier: 1,
			projection_type: 2,
			database_origin: 100,
			southwest_db_x: -12.5,
			southwest_db_y: 4.25,
			earth_ellipsoid_model: 0,
			earth_major_axis: 6_378_137.0,
			earth_minor_axis: 6_356_752.3142,
			..Header::default()
		}
	}

	#[test]
	fn write_read_same() {
		let header = sample();
		let mut cur = Cursor::new(vec![]);
		header.write(&mut cur).unwrap();
		assert_eq!(cur.get_ref().len(), Header::BODY_LEN);
		cur.set_position(0);
		assert_eq!(Header::read(&mut cur).unwrap(), header);
	}

	#[test]
	fn field_offsets() {
		let mut cur = Cursor::new(vec![]);
		sample().write(&mut cur).unwrap();
		let body = cur.get_ref();
		assert_eq!(&body[8..12], &1640i32.to_be_bytes());
		assert_eq!(&body[88..92], &2i32.to_be_bytes());
		assert_eq!(&body[128..136], &(-12.5f64).to_be_bytes());
		assert_eq!(&body[304..312], &6_378_137.0f64.to_be_bytes());
	}

	#[test]
	fn datetime_newlines_become_spaces() {
		let mut header = sample();
		header.date_time = FixedString::new(*b"Mon Jan 01\n00:00:00\r2001\0\0\0\0\0\0\0\0");
		let mut cur = Cursor::new(vec![]);
		header.write(&mut cur).unwrap();
		cur.set_position(0);
		let read = Header::read(&mut cur).unwrap();
		assert_eq!(read.date_time.to_string_lossy(), "Mon Jan 01 00:00:00 2001");
	}

	#[test]
	fn descriptive_names() {
		let header = sample();
		assert_eq!(header.projection_name(), "Round Earth");
		assert_eq!(header.database_origin_name(), "OpenFlight");
		assert_eq!(header.vertex_units_name(), "Meters");
		assert_eq!(header.earth_ellipsoid_name(), "WGS 1984");
		let odd = Header {
			projection_type: 42,
			..Header::default()
		};
		assert_eq!(odd.projection_name(), "42");
	}
}
