// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::{Path, PathBuf};

/// Directory part of a file path, used as the base for sibling reference
/// lookups.
pub fn base_path(path: &Path) -> PathBuf {
	match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
		_ => PathBuf::from("."),
	}
}

/// Picks the first readable location for `path`: the path itself, then
/// its bare file name under each search directory in order.
pub fn resolve(path: &Path, search_paths: &[PathBuf]) -> Option<PathBuf> {
	if path.is_file() {
		return Some(path.to_path_buf());
	}
	let name = path.file_name()?;
	search_paths
		.iter()
		.map(|dir| dir.join(name))
		.find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn base_path_of_bare_names_is_the_current_dir() {
		assert_eq!(base_path(Path::new("db.flt")), PathBuf::from("."));
		assert_eq!(base_path(Path::new("city/db.flt")), PathBuf::from("city"));
	}

	#[test]
	fn resolve_falls_back_to_search_paths() {
		let dir = tempfile::tempdir().unwrap();
		let file = dir.path().join("target.flt");
		std::fs::write(&file, b"x").unwrap();

		// direct hit
		assert_eq!(resolve(&file, &[]), Some(file.clone()));
		// missing file recovered through the search list
		let missing = Path::new("elsewhere/target.flt");
		assert_eq!(resolve(missing, &[dir.path().to_path_buf()]), Some(file));
		// nothing matches
		assert_eq!(
			resolve(Path::new("elsewhere/nope.flt"), &[dir.path().to_path_buf()]),
			None
		);
	}
}
