// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use flt::hierarchy::{Hierarchy, NodeData, NodeId};
use flt::{FltFile, Options, Registry};
use flt_utils::loader;
use humansize::{format_size, DECIMAL};
use itertools::Itertools;

/// Print the header, palettes and hierarchy of an OpenFlight file.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// file to inspect
    file: PathBuf,

    /// follow and load external references
    #[arg(short = 'x', long)]
    resolve: bool,

    /// drop name strings while parsing
    #[arg(long)]
    no_names: bool,

    /// fallback directory for file lookups, may be repeated
    #[arg(short = 's', long = "search-path")]
    search_paths: Vec<PathBuf>,
}

#[tokio::main]
async fn main() {
    flt_utils::application_main(run).await;
}

async fn run() -> Arc<Registry> {
    let args = Args::parse();
    let options = Options {
        keep_names: !args.no_names,
        search_paths: args.search_paths.clone(),
        ..Options::default()
    };
    let registry = Arc::new(Registry::new());

    let root = if args.resolve {
        loader::load_tree(registry.clone(), args.file.clone(), options).await
    } else {
        let registry = registry.clone();
        let file = args.file.clone();
        tokio::task::spawn_blocking(move || registry.load(file, &options))
            .await
            .expect("load task panicked")
    };

    match root.file() {
        Some(file) => dump(file, &registry),
        None => {
            if let Some(err) = root.error() {
                eprintln!("{}: {err}", root.path().display());
            }
            std::process::exit(1);
        }
    }
    registry
}

fn dump(file: &FltFile, registry: &Registry) {
    println!("file           : {}", file.filename.display());
    if let Ok(meta) = std::fs::metadata(&file.filename) {
        println!("size           : {}", format_size(meta.len(), DECIMAL));
    }

    if let Some(header) = &file.header {
        println!("format revision: {}", header.format_revision);
        println!("last revision  : {}", header.date_time.to_string_lossy());
        println!("units          : {}", header.vertex_units_name());
        println!("projection     : {}", header.projection_name());
        println!("origin         : {}", header.database_origin_name());
        println!("ellipsoid      : {}", header.earth_ellipsoid_name());
        println!(
            "sw corner      : {:.6}, {:.6}",
            header.southwest_corner_lat, header.southwest_corner_lon
        );
    }

    if let Some(palettes) = &file.palettes {
        println!("textures       : {}", palettes.textures.len());
        for tex in &palettes.textures {
            println!(
                "  [{}] {} at {},{}",
                tex.pattern_index, tex.name, tex.xy_location[0], tex.xy_location[1]
            );
        }
        if let Some(vertices) = &palettes.vertices {
            println!(
                "vertices       : {} x {} bytes",
                vertices.vertex_count(),
                vertices.vertex_size()
            );
        }
    }

    println!("faces          : {}", file.faces.len());
    for (handle, face) in file.faces.iter() {
        println!(
            "  [{handle}] {} abgr {:08x} tex {} {} ({})",
            face.name.as_deref().unwrap_or("-"),
            face.attrs.abgr,
            face.attrs.base_texture_index,
            face.attrs.draw_type_name(),
            face.attrs.light_mode_name(),
        );
    }
    println!("indices        : {}", file.indices.len());

    if let Some(hierarchy) = &file.hierarchy {
        println!("hierarchy      : {} nodes", hierarchy.len());
        hierarchy.visit(hierarchy.root(), &mut |id, depth| {
            print_node(hierarchy, id, depth);
        });
    }

    let counters = &registry.counters;
    println!(
        "records        : {} faces seen, {} unique, {} indices",
        counters.faces(),
        counters.unique_faces(),
        counters.indices()
    );
    for (op, count) in counters.known_counts().filter(|(_, count)| *count > 0) {
        println!("  {:<36} {count}", op.name());
    }
}

fn print_node(hierarchy: &Hierarchy, id: NodeId, depth: usize) {
    let node = hierarchy.node(id);
    let name = node.name.as_deref().unwrap_or("-");
    let mut extra = String::new();
    if !node.index_pairs.is_empty() {
        extra = format!(
            " [{}]",
            node.index_pairs
                .iter()
                .map(|pair| format!("{}..{}", pair.start(), pair.end() + 1))
                .join(" ")
        );
    }
    if let NodeData::ExternalReference(extref) = &node.data {
        extra = match extref.resolved() {
            Some(entry) => format!(" -> {:?}", entry.state()),
            None => " -> unresolved".to_string(),
        };
    }
    println!(
        "{:indent$}{} {name}{extra}",
        "",
        node.kind(),
        indent = depth * 2
    );
}
