#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use labmark::batch::Marker;
use labmark::config::MarkerConfig;
use labmark::fs::RealFileSystem;
use labmark_test_utils::fake_process::{LaunchLog, ScriptedLauncher};
use labmark_test_utils::recording_sink::{RecordingSinkFactory, SinkLog};

pub use labmark_test_utils::builders;
pub use labmark_test_utils::init_tracing;

/// A `Marker` over the real filesystem with scripted processes and
/// in-memory sinks, plus the handles to inspect both afterwards.
pub struct ScriptedMarker {
    pub marker: Marker,
    pub launches: Arc<Mutex<LaunchLog>>,
    pub sinks: SinkLog,
}

pub fn scripted_marker(config: &MarkerConfig, launcher: ScriptedLauncher) -> ScriptedMarker {
    let launches = launcher.log();
    let factory = RecordingSinkFactory::new();
    let sinks = factory.log();
    let marker = Marker::new(
        config,
        Arc::new(RealFileSystem),
        Box::new(launcher),
        Box::new(factory),
    );
    ScriptedMarker {
        marker,
        launches,
        sinks,
    }
}

/// Number of processes spawned with a working directory below `path`.
pub fn spawns_under(launches: &Arc<Mutex<LaunchLog>>, path: &Path) -> usize {
    launches
        .lock()
        .unwrap()
        .spawns
        .iter()
        .filter(|s| s.cwd.starts_with(path))
        .count()
}
