// SPDX-FileCopyrightText: 2025 Chiel Douwes
//
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod loader;

use std::sync::Arc;

use flt::Registry;

/// Shared bootstrap for the command line tools: installs the tracing
/// subscriber, runs the tool body and closes with the session totals the
/// registry accumulated while parsing.
pub async fn application_main<Fut>(main: impl FnOnce() -> Fut)
    where Fut: std::future::Future<Output = Arc<Registry>> {
    use tokio::time::Instant;
    use tracing_subscriber::layer::SubscriberExt;

    tracing::subscriber::set_global_default(tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty())
        .with(tracing_subscriber::filter::EnvFilter::from_default_env())
    ).expect("set up the subscriber");

    let start = Instant::now();

    let registry = main().await;

    let elapsed = start.elapsed();
    let counters = &registry.counters;
    println!(
        "({} files, {} faces / {} unique, {} indices in {:?})",
        registry.len(),
        counters.faces(),
        counters.unique_faces(),
        counters.indices(),
        elapsed
    );
}
