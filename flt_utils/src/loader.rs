// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;
use std::sync::Arc;

use flt::hierarchy::NodeData;
use flt::{FileEntry, Options, Registry};
use futures::{stream, StreamExt};
use tracing::{info, instrument, warn};

/// Loads `path` and every file it transitively references through the
/// registry, fanning the per file parses out over blocking worker tasks.
/// Files are single threaded internally, so the fan out happens wave by
/// wave: all references discovered by the previous wave load
/// concurrently.
#[instrument(skip(registry, options))]
pub async fn load_tree(registry: Arc<Registry>, path: PathBuf, options: Options) -> Arc<FileEntry> {
    // references are scheduled here instead of inline in the parser
    let options = Arc::new(Options {
        resolve_extrefs: false,
        ..options
    });

    let root = {
        let registry = registry.clone();
        let options = options.clone();
        tokio::task::spawn_blocking(move || registry.load(path, &*options))
            .await
            .expect("root load task panicked")
    };

    let mut wave = vec![root.clone()];
    while !wave.is_empty() {
        let mut jobs = vec![];
        for entry in wave.drain(..) {
            let Some(file) = entry.file() else { continue };
            let Some(hierarchy) = file.hierarchy.as_ref() else {
                continue;
            };
            let base = flt::paths::base_path(&file.filename);
            for &id in hierarchy.extrefs() {
                let node = hierarchy.node(id);
                let Some(name) = node.name.as_deref() else {
                    continue;
                };
                let (child, created) = registry.prepare_extref(&base, name);
                if let NodeData::ExternalReference(extref) = &node.data {
                    extref.attach(child.clone());
                }
                if created.is_some() && child.begin_loading() {
                    let registry = registry.clone();
                    let options = options.clone();
                    jobs.push(async move {
                        let worker_child = child.clone();
                        tokio::task::spawn_blocking(move || {
                            registry.complete_load(&worker_child, &options)
                        })
                        .await
                        .expect("reference load task panicked");
                        if let Some(err) = child.error() {
                            warn!("{}: {err}", child.path().display());
                        }
                        child
                    });
                }
            }
        }
        wave = stream::iter(jobs)
            .buffer_unordered(num_cpus::get())
            .collect()
            .await;
    }

    info!(files = registry.len(), "reference tree loaded");
    root
}
