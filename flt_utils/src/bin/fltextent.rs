// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use flt::{FileEntry, LoadState, Options, PositionPrecision, Registry, VertexLayout};
use flt_utils::loader;
use itertools::Itertools;

/// Compute the geometric extent of an OpenFlight file from its vertex
/// palette, optionally across all referenced files.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// file to measure
    file: PathBuf,

    /// also measure every referenced file
    #[arg(short = 'x', long)]
    resolve: bool,

    /// fallback directory for file lookups, may be repeated
    #[arg(short = 's', long = "search-path")]
    search_paths: Vec<PathBuf>,
}

#[derive(Clone, Copy)]
struct Extent {
    min: [f64; 3],
    max: [f64; 3],
    vertices: u64,
}

impl Extent {
    fn empty() -> Self {
        Extent {
            min: [f64::MAX; 3],
            max: [f64::MIN; 3],
            vertices: 0,
        }
    }

    fn add(&mut self, position: [f64; 3]) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(position[i]);
            self.max[i] = self.max[i].max(position[i]);
        }
        self.vertices += 1;
    }

    fn merge(&mut self, other: &Extent) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(other.min[i]);
            self.max[i] = self.max[i].max(other.max[i]);
        }
        self.vertices += other.vertices;
    }
}

#[tokio::main]
async fn main() {
    flt_utils::application_main(run).await;
}

async fn run() -> Arc<Registry> {
    let args = Args::parse();
    let options = Options {
        // only positions matter here, keep the vertices lean
        vertex_layout: VertexLayout {
            position: Some(PositionPrecision::F64),
            ..VertexLayout::default()
        },
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
    if let Some(err) = root.error() {
        eprintln!("{}: {err}", root.path().display());
        std::process::exit(1);
    }

    let mut total = Extent::empty();
    let mut per_file: Vec<(PathBuf, Extent)> = vec![];
    for entry in registry.files() {
        if entry.state() != LoadState::Loaded {
            report_failure(&entry);
            continue;
        }
        let extent = measure(&entry);
        total.merge(&extent);
        per_file.push((entry.path().to_path_buf(), extent));
    }

    println!("files          : {}", per_file.len());
    print_extent("total", &total);
    for (path, extent) in per_file
        .iter()
        .sorted_by(|a, b| b.1.vertices.cmp(&a.1.vertices))
    {
        print_extent(&path.display().to_string(), extent);
    }
    registry
}

fn measure(entry: &FileEntry) -> Extent {
    let mut extent = Extent::empty();
    if let Some(palette) = entry.file().and_then(|file| file.vertex_palette()) {
        for position in palette.positions() {
            extent.add(position);
        }
    }
    extent
}

fn report_failure(entry: &FileEntry) {
    if let Some(err) = entry.error() {
        eprintln!("{}: {err}", entry.path().display());
    }
}

fn print_extent(label: &str, extent: &Extent) {
    println!("{label}");
    println!("  vertices     : {}", extent.vertices);
    if extent.vertices == 0 {
        return;
    }
    let size: Vec<f64> = (0..3).map(|i| extent.max[i] - extent.min[i]).collect();
    let center: Vec<f64> = (0..3)
        .map(|i| extent.min[i] + size[i] * 0.5)
        .collect();
    println!(
        "  min          : {}, {}, {}",
        extent.min[0], extent.min[1], extent.min[2]
    );
    println!(
        "  max          : {}, {}, {}",
        extent.max[0], extent.max[1], extent.max[2]
    );
    println!("  size         : {}, {}, {}", size[0], size[1], size[2]);
    println!("  center       : {}, {}, {}", center[0], center[1], center[2]);
}
