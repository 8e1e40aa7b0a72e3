// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use crate::file::{FltFile, Options};
use crate::opcode::{KnownOpcode, Opcode, MAX_OPCODE};
use crate::Error;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum LoadState {
	NotLoaded = 0,
	Loading = 1,
	Loaded = 2,
}

/// Per-session counters: one slot per opcode plus the three face/index
/// totals. All updates are atomic; concurrent file parses share one
/// instance through their [Registry].
pub struct Counters {
	opcodes: [AtomicU64; MAX_OPCODE as usize + 1],
	faces: AtomicU64,
	unique_faces: AtomicU64,
	indices: AtomicU64,
}

impl Counters {
	fn new() -> Self {
		Counters {
			opcodes: std::array::from_fn(|_| AtomicU64::new(0)),
			faces: AtomicU64::new(0),
			unique_faces: AtomicU64::new(0),
			indices: AtomicU64::new(0),
		}
	}

	pub(crate) fn record_opcode(&self, opcode: u16) {
		if let Some(slot) = self.opcodes.get(opcode as usize) {
			slot.fetch_add(1, Ordering::Relaxed);
		}
	}

	pub(crate) fn record_face(&self, unique: bool) {
		self.faces.fetch_add(1, Ordering::Relaxed);
		if unique {
			self.unique_faces.fetch_add(1, Ordering::Relaxed);
		}
	}

	pub(crate) fn record_indices(&self, count: u64) {
		self.indices.fetch_add(count, Ordering::Relaxed);
	}

	pub fn opcode_count(&self, opcode: Opcode) -> u64 {
		self.opcodes
			.get(opcode.code() as usize)
			.map_or(0, |slot| slot.load(Ordering::Relaxed))
	}

	/// Counts for every known opcode, in opcode order.
	pub fn known_counts(&self) -> impl Iterator<Item = (KnownOpcode, u64)> + '_ {
		enum_iterator::all::<KnownOpcode>().map(|op| (op, self.opcode_count(Opcode::Known(op))))
	}

	pub fn faces(&self) -> u64 {
		self.faces.load(Ordering::Relaxed)
	}

	pub fn unique_faces(&self) -> u64 {
		self.unique_faces.load(Ordering::Relaxed)
	}

	pub fn indices(&self) -> u64 {
		self.indices.load(Ordering::Relaxed)
	}
}

/// One slot in the shared file cache. The slot is created before its file
/// is parsed so that concurrent discoveries of the same path, including
/// reference cycles, all settle on this one entry.
pub struct FileEntry {
	path: PathBuf,
	state: AtomicU8,
	slot: OnceLock<Result<FltFile, Error>>,
}

impl FileEntry {
	fn new(path: PathBuf) -> Self {
		FileEntry {
			path,
			state: AtomicU8::new(LoadState::NotLoaded as u8),
			slot: OnceLock::new(),
		}
	}

	/// The path the entry was registered under.
	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn state(&self) -> LoadState {
		match self.state.load(Ordering::Acquire) {
			1 => LoadState::Loading,
			2 => LoadState::Loaded,
			_ => LoadState::NotLoaded,
		}
	}

	/// The parsed file, once the entry reached [LoadState::Loaded].
	pub fn file(&self) -> Option<&FltFile> {
		match self.slot.get() {
			Some(Ok(file)) => Some(file),
			_ => None,
		}
	}

	pub fn error(&self) -> Option<&Error> {
		match self.slot.get() {
			Some(Err(err)) => Some(err),
			_ => None,
		}
	}

	/// Claims the entry for parsing. Only the caller that wins the claim
	/// may call [FileEntry::complete].
	pub fn begin_loading(&self) -> bool {
		self.state
			.compare_exchange(
				LoadState::NotLoaded as u8,
				LoadState::Loading as u8,
				Ordering::AcqRel,
				Ordering::Acquire,
			)
			.is_ok()
	}

	pub fn complete(&self, result: Result<FltFile, Error>) {
		let state = if result.is_ok() {
			LoadState::Loaded
		} else {
			// a failed parse never reaches the loaded state; the error
			// stays readable on the entry
			LoadState::NotLoaded
		};
		if self.slot.set(result).is_ok() {
			self.state.store(state as u8, Ordering::Release);
		}
	}
}

impl Debug for FileEntry {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FileEntry")
			.field("path", &self.path)
			.field("state", &self.state())
			.field("error", &self.error())
			.finish()
	}
}

/// Process wide session object: the filename keyed file cache shared by
/// every parse, plus the session counters.
pub struct Registry {
	files: Mutex<HashMap<PathBuf, Arc<FileEntry>>>,
	pub counters: Counters,
}

impl Registry {
	pub fn new() -> Self {
		Registry {
			files: Mutex::new(HashMap::new()),
			counters: Counters::new(),
		}
	}

	/// Returns the entry for `path`, inserting a fresh one when absent.
	/// The bool reports whether this call created it; concurrent callers
	/// racing on the same path agree on a single winner.
	pub fn entry(&self, path: impl Into<PathBuf>) -> (Arc<FileEntry>, bool) {
		let path = path.into();
		let mut files = self.files.lock().unwrap();
		match files.get(&path) {
			Some(entry) => (entry.clone(), false),
			None => {
				let entry = Arc::new(FileEntry::new(path.clone()));
				files.insert(path, entry.clone());
				(entry, true)
			}
		}
	}

	pub fn get(&self, path: &Path) -> Option<Arc<FileEntry>> {
		self.files.lock().unwrap().get(path).cloned()
	}

	/// Snapshot of every registered entry.
	pub fn files(&self) -> Vec<Arc<FileEntry>> {
		self.files.lock().unwrap().values().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.files.lock().unwrap().len()
	}

	pub fn is_empty(&self) -> bool {
		self.files.lock().unwrap().is_empty()
	}

	/// Drops the registry's handle on one file; the file itself lives
	/// until its last holder (for instance a parent's reference node)
	/// goes away.
	pub fn remove(&self, path: &Path) -> Option<Arc<FileEntry>> {
		self.files.lock().unwrap().remove(path)
	}

	pub fn clear(&self) {
		self.files.lock().unwrap().clear();
	}

	/// Resolves a reference discovered in a file at `base` to its cache
	/// entry. When the entry is new the concrete path to parse is handed
	/// back, mirroring the single prepare step the parser and external
	/// schedulers share.
	pub fn prepare_extref(&self, base: &Path, name: &str) -> (Arc<FileEntry>, Option<PathBuf>) {
		let candidate = base.join(name);
		let (entry, created) = self.entry(candidate.clone());
		(entry, created.then_some(candidate))
	}

	/// Loads `path` through the cache: the first call parses the file and
	/// every later call gets the same entry back untouched, whatever
	/// state it is in.
	pub fn load(&self, path: impl Into<PathBuf>, options: &Options) -> Arc<FileEntry> {
		let (entry, _) = self.entry(path);
		if entry.begin_loading() {
			self.complete_load(&entry, options);
		}
		entry
	}

	/// Parses the file for an entry previously claimed with
	/// [FileEntry::begin_loading]. External schedulers use this to run
	/// claimed parses on their own workers.
	pub fn complete_load(&self, entry: &FileEntry, options: &Options) {
		let result = FltFile::load_resolved(entry.path(), options, self);
		entry.complete(result);
	}
}

impl Default for Registry {
	fn default() -> Self {
		Registry::new()
	}
}

impl Debug for Registry {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Registry")
			.field("files", &self.len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;

	#[test]
	fn entry_is_first_insert_wins() {
		let registry = Registry::new();
		let (a, created) = registry.entry("city/a.flt");
		assert!(created);
		let (b, created) = registry.entry("city/a.flt");
		assert!(!created);
		assert!(Arc::ptr_eq(&a, &b));
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn concurrent_entries_settle_on_one_winner() {
		let registry = Arc::new(Registry::new());
		let mut handles = vec![];
		for _ in 0..8 {
			let registry = registry.clone();
			handles.push(std::thread::spawn(move || {
				let (entry, created) = registry.entry("shared.flt");
				(Arc::as_ptr(&entry) as usize, created)
			}));
		}
		let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
		assert_eq!(results.iter().filter(|(_, created)| *created).count(), 1);
		assert_eq!(
			results.iter().map(|(ptr, _)| *ptr).collect::<std::collections::HashSet<_>>().len(),
			1
		);
	}

	#[test]
	fn begin_loading_claims_once() {
		let entry = FileEntry::new("x.flt".into());
		assert_eq!(entry.state(), LoadState::NotLoaded);
		assert!(entry.begin_loading());
		assert!(!entry.begin_loading());
		assert_eq!(entry.state(), LoadState::Loading);
	}

	#[test]
	fn counters_accumulate() {
		let counters = Counters::new();
		counters.record_opcode(10);
		counters.record_opcode(10);
		counters.record_opcode(11);
		counters.record_face(true);
		counters.record_face(false);
		counters.record_indices(3);

		assert_eq!(counters.opcode_count(Opcode::from(10)), 2);
		assert_eq!(counters.opcode_count(Opcode::from(11)), 1);
		assert_eq!(counters.faces(), 2);
		assert_eq!(counters.unique_faces(), 1);
		assert_eq!(counters.indices(), 3);
		let (op, count) = counters
			.known_counts()
			.find(|(op, _)| *op == KnownOpcode::PushLevel)
			.unwrap();
		assert_eq!((op, count), (KnownOpcode::PushLevel, 2));
	}
}
