use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tracing::{error, info, warn};

use crate::error::PipelineError;
use crate::generator::Generator;

const DEBOUNCE: Duration = Duration::from_millis(300);

/// Regenerates everything once, then again after every burst of changes
/// under the content root. Returns only if the watcher itself fails.
pub fn watch(generator: &Generator) -> Result<(), PipelineError> {
    let root = generator.config().content_dir.clone();
    if !root.is_dir() {
        return Err(PipelineError::MissingSourceDir(root));
    }

    regenerate(generator);

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx)?;
    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!("👀 Watching {} for changes", root.display());

    while let Ok(first) = rx.recv() {
        let mut dirty = is_content_change(&first);
        thread::sleep(DEBOUNCE);
        while let Ok(next) = rx.try_recv() {
            dirty |= is_content_change(&next);
        }
        if dirty {
            info!("🔄 Change detected, regenerating");
            regenerate(generator);
        }
    }
    Ok(())
}

fn regenerate(generator: &Generator) {
    // Failures are reported and the watch keeps going.
    if let Err(err) = generator.run_all() {
        error!("❌ Generation failed: {}", err);
    }
}

fn is_content_change(event: &notify::Result<Event>) -> bool {
    match event {
        Ok(ev) => matches!(
            ev.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ),
        Err(err) => {
            warn!("⚠️  Watch error: {}", err);
            false
        }
    }
}
