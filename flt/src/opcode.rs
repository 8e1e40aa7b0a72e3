// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

// record opcodes and names taken from the OpenFlight 16.x scene description,
// up to and including format revision 1640

use binrw::binrw;
use derive_more::TryFrom;
use enum_iterator::Sequence;

/// Highest opcode carried by the name table.
pub const MAX_OPCODE: u16 = 154;

#[binrw]
#[brw(big, repr = u16)]
#[repr(u16)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Sequence, TryFrom)]
#[try_from(repr)]
#[non_exhaustive]
pub enum KnownOpcode {
	Header = 1,
	Group = 2,
	Object = 4,
	Face = 5,
	PushLevel = 10,
	PopLevel = 11,
	PushSubface = 19,
	PopSubface = 20,
	PushExtension = 21,
	PopExtension = 22,
	Continuation = 23,
	Comment = 31,
	LongId = 33,
	ExternalReference = 63,
	TexturePalette = 64,
	VertexPalette = 67,
	VertexColor = 68,
	VertexColorNormal = 69,
	VertexColorNormalUv = 70,
	VertexColorUv = 71,
	VertexList = 72,
	Lod = 73,
	Mesh = 84,
	LocalVertexPool = 85,
	MeshPrimitive = 86,
	Switch = 96,
}

#[binrw]
#[brw(big)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Opcode {
	Known(KnownOpcode),
	Unknown(u16),
}

impl Default for Opcode {
	fn default() -> Self {
		Self::Unknown(0)
	}
}

impl From<u16> for Opcode {
	fn from(value: u16) -> Self {
		KnownOpcode::try_from(value)
			.map(Opcode::Known)
			.unwrap_or(Opcode::Unknown(value))
	}
}

impl Opcode {
	pub fn code(&self) -> u16 {
		match self {
			Opcode::Known(k) => *k as u16,
			Opcode::Unknown(n) => *n,
		}
	}

	/// Human readable record name, subject to change at any time
	pub fn name(&self) -> &'static str {
		let code = self.code();
		if code <= MAX_OPCODE {
			OPCODE_NAMES[code as usize]
		} else {
			"Unknown"
		}
	}
}

impl KnownOpcode {
	pub fn name(&self) -> &'static str {
		Opcode::Known(*self).name()
	}

	/// Records that may be enlarged by a following Continuation record.
	pub fn continuation_capable(&self) -> bool {
		matches!(
			self,
			KnownOpcode::VertexList | KnownOpcode::LocalVertexPool | KnownOpcode::MeshPrimitive
		)
	}
}

static OPCODE_NAMES: [&str; MAX_OPCODE as usize + 1] = [
	"",                                    // 0
	"Header",                              // 1
	"Group",                               // 2
	"Level of Detail",                     // 3 (obsolete)
	"Object",                              // 4
	"Face",                                // 5
	"Vertex with ID",                      // 6 (obsolete)
	"Short Vertex w/o ID",                 // 7 (obsolete)
	"Vertex with Color",                   // 8 (obsolete)
	"Vertex with Color and Normal",        // 9 (obsolete)
	"Push Level",                          // 10
	"Pop Level",                           // 11
	"Translate",                           // 12 (obsolete)
	"Degree of Freedom",                   // 13 (obsolete)
	"Degree of Freedom",                   // 14
	"",                                    // 15
	"Instance Reference",                  // 16 (obsolete)
	"Instance Definition",                 // 17 (obsolete)
	"",                                    // 18
	"Push Subface",                        // 19
	"Pop Subface",                         // 20
	"Push Extension",                      // 21
	"Pop Extension",                       // 22
	"Continuation",                        // 23
	"", "", "", "", "", "", "",            // 24-30
	"Comment",                             // 31
	"Color Palette",                       // 32
	"Long ID",                             // 33
	"", "", "", "", "", "",                // 34-39
	"Translate",                           // 40 (obsolete)
	"Rotate about Point",                  // 41 (obsolete)
	"Rotate about Edge",                   // 42 (obsolete)
	"Scale",                               // 43 (obsolete)
	"Translate",                           // 44 (obsolete)
	"Scale nonuniform",                    // 45 (obsolete)
	"Rotate about Point",                  // 46 (obsolete)
	"Rotate and/or Scale to Point",        // 47 (obsolete)
	"Put",                                 // 48 (obsolete)
	"Matrix",                              // 49
	"Vector",                              // 50
	"Bounding Box",                        // 51 (obsolete)
	"Multitexture",                        // 52
	"UV List",                             // 53
	"",                                    // 54
	"Binary Separating Plane",             // 55
	"", "", "", "",                        // 56-59
	"Replicate",                           // 60
	"Instance Reference",                  // 61
	"Instance Definition",                 // 62
	"External Reference",                  // 63
	"Texture Palette",                     // 64
	"Eyepoint Palette",                    // 65 (obsolete)
	"Material Palette",                    // 66 (obsolete)
	"Vertex Palette",                      // 67
	"Vertex with Color",                   // 68
	"Vertex with Color and Normal",        // 69
	"Vertex with Color, Normal and UV",    // 70
	"Vertex with Color and UV",            // 71
	"Vertex List",                         // 72
	"Level of Detail",                     // 73
	"Bounding Box",                        // 74
	"",                                    // 75
	"Rotate About Edge",                   // 76
	"Scale",                               // 77 (obsolete)
	"Translate",                           // 78
	"Scale",                               // 79
	"Rotate About Point",                  // 80
	"Rotate and/or Scale to Point",        // 81
	"Put",                                 // 82
	"Eyepoint and Trackplane Palette",     // 83
	"Mesh",                                // 84
	"Local Vertex Pool",                   // 85
	"Mesh Primitive",                      // 86
	"Road Segment",                        // 87
	"Road Zone",                           // 88
	"Morph Vertex List",                   // 89
	"Linkage Palette",                     // 90
	"Sound",                               // 91
	"Road Path",                           // 92
	"Sound Palette",                       // 93
	"General Matrix",                      // 94
	"Text",                                // 95
	"Switch",                              // 96
	"Line Style Palette",                  // 97
	"Clip Region",                         // 98
	"",                                    // 99
	"Extension",                           // 100
	"Light Source",                        // 101
	"Light Source Palette",                // 102
	"Reserved",                            // 103
	"Reserved",                            // 104
	"Bounding Sphere",                     // 105
	"Bounding Cylinder",                   // 106
	"Bounding Convex Hull",                // 107
	"Bounding Volume Center",              // 108
	"Bounding Volume Orientation",         // 109
	"Reserved",                            // 110
	"Light Point",                         // 111
	"Texture Mapping Palette",             // 112
	"Material Palette",                    // 113
	"Name Table",                          // 114
	"Continuously Adaptive Terrain (CAT)", // 115
	"CAT Data",                            // 116
	"Reserved",                            // 117
	"Reserved",                            // 118
	"Bounding Histogram",                  // 119
	"Reserved",                            // 120
	"Reserved",                            // 121
	"Push Attribute",                      // 122
	"Pop Attribute",                       // 123
	"Reserved",                            // 124
	"Reserved",                            // 125
	"Curve",                               // 126
	"Road Construction",                   // 127
	"Light Point Appearance Palette",      // 128
	"Light Point Animation Palette",       // 129
	"Indexed Light Point",                 // 130
	"Light Point System",                  // 131
	"Indexed String",                      // 132
	"Shader Palette",                      // 133
	"Reserved",                            // 134
	"Extended Material Header",            // 135
	"Extended Material Ambient",           // 136
	"Extended Material Diffuse",           // 137
	"Extended Material Specular",          // 138
	"Extended Material Emissive",          // 139
	"Extended Material Alpha",             // 140
	"Extended Material Light Map",         // 141
	"Extended Material Normal Map",        // 142
	"Extended Material Bump Map",          // 143
	"Reserved",                            // 144
	"Extended Material Shadow Map",        // 145
	"Reserved",                            // 146
	"Extended Material Reflection Map",    // 147
	"Extension GUID Palette",              // 148
	"Extension Field Boolean",             // 149
	"Extension Field Integer",             // 150
	"Extension Field Float",               // 151
	"Extension Field Double",              // 152
	"Extension Field String",              // 153
	"Extension Field XML String",          // 154
];
