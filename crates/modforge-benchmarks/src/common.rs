//! Common utilities for benchmarks

use std::time::Duration;

use criterion::Criterion;

use modforge_core::types::Version;
use modforge_registry::{MemoryRepository, ReleaseInfo};

/// Root module of a generated catalog
pub const ROOT_MODULE: &str = "bench-root";

/// Criterion settings shared by every benchmark
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_secs(3))
        .measurement_time(Duration::from_secs(10))
        .sample_size(100)
}

/// `count` ascending versions `1.0.0`, `1.1.0`, ...
pub fn version_list(count: usize) -> Vec<Version> {
    (0..count as u64).map(|minor| Version::new(1, minor, 0)).collect()
}

fn layer_module(layer: usize, index: usize) -> String {
    format!("bench-m{}_{}", layer, index)
}

fn archive(module: &str, version: &str) -> String {
    format!("/{}-{}.tar.gz", module, version)
}

/// A catalog of `layers` layers of `width` modules with `versions` releases
/// each
///
/// The root depends on every module of layer 0 and each module depends on
/// every module of the next layer, bounded below by its own version.
pub fn layered_catalog(layers: usize, width: usize, versions: usize) -> MemoryRepository {
    let mut repository = MemoryRepository::new();

    let root_release = (0..width).fold(
        ReleaseInfo::new("1.0.0", archive(ROOT_MODULE, "1.0.0")),
        |release, index| release.with_dependency(layer_module(0, index), ">= 1.0.0"),
    );
    repository = repository.with_module(ROOT_MODULE, vec![root_release]);

    for layer in 0..layers {
        for index in 0..width {
            let module = layer_module(layer, index);
            let releases = version_list(versions)
                .into_iter()
                .map(|version| {
                    let version = version.to_string();
                    let release = ReleaseInfo::new(version.clone(), archive(&module, &version));
                    if layer + 1 == layers {
                        return release;
                    }
                    let bound = format!(">= {}", version);
                    (0..width).fold(release, |release, dep| {
                        release.with_dependency(layer_module(layer + 1, dep), bound.clone())
                    })
                })
                .collect();
            repository = repository.with_module(&module, releases);
        }
    }

    repository
}
