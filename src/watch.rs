//! Watch loop.
//!
//! Watches the source document's directory and re-runs the pipeline when the
//! document changes. Events are debounced, and events arriving while a
//! conversion is running coalesce into a single follow-up run, so at most one
//! conversion is in flight.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::pipeline::{ConversionReport, Pipeline};
use crate::profile::schema::WatchSection;

/// Timing of the watch loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchSettings {
    /// Minimum gap between two accepted change events
    pub debounce: Duration,
    /// Delay between an accepted event and the conversion
    pub settle: Duration,
}

impl From<&WatchSection> for WatchSettings {
    fn from(section: &WatchSection) -> Self {
        Self {
            debounce: section.debounce(),
            settle: section.settle(),
        }
    }
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self::from(&WatchSection::default())
    }
}

/// Events from the file watcher
#[derive(Debug)]
enum WatcherEvent {
    SourceChanged(PathBuf),
    WatcherError(notify::Error),
}

/// Accepts an event only if the previous accepted one is old enough
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn accept(&mut self, now: Instant) -> bool {
        let ready = match self.last {
            Some(last) => now.saturating_duration_since(last) > self.interval,
            None => true,
        };
        if ready {
            self.last = Some(now);
        }
        ready
    }
}

/// Whether a conversion is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Converting,
}

/// Decides when a change event starts a conversion.
///
/// Every event goes through the debouncer first. While converting, accepted
/// events fill one queued slot; the slot starts exactly one more run when the
/// current one finishes.
#[derive(Debug, Clone)]
pub struct Trigger {
    state: WatchState,
    debouncer: Debouncer,
    queued: bool,
}

impl Trigger {
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: WatchState::Idle,
            debouncer: Debouncer::new(debounce),
            queued: false,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Start a run regardless of debounce (the initial conversion)
    pub fn begin(&mut self) {
        self.state = WatchState::Converting;
    }

    /// Handle a change of the watched file; true if a run should start now
    pub fn on_change(&mut self, now: Instant) -> bool {
        if !self.debouncer.accept(now) {
            return false;
        }
        match self.state {
            WatchState::Converting => {
                self.queued = true;
                false
            }
            WatchState::Idle => {
                self.state = WatchState::Converting;
                true
            }
        }
    }

    pub fn is_queued(&self) -> bool {
        self.queued
    }

    /// The current run ended; true if the queued slot starts another run
    pub fn finish(&mut self, now: Instant) -> bool {
        if std::mem::take(&mut self.queued) {
            self.debouncer.last = Some(now);
            true
        } else {
            self.state = WatchState::Idle;
            false
        }
    }
}

/// Whether an event path refers to the watched file
pub fn is_target(event_path: &Path, target: &Path) -> bool {
    if event_path == target {
        return true;
    }
    match (event_path.canonicalize(), target.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => match (event_path.file_name(), target.file_name()) {
            // Either side may be gone mid-save; compare by name within the
            // watched directory
            (Some(a), Some(b)) => a == b && event_path.parent() == target.parent(),
            _ => false,
        },
    }
}

/// Watch until Ctrl-C
pub async fn watch(pipeline: Arc<Pipeline>, settings: WatchSettings) -> Result<()> {
    watch_until(pipeline, settings, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Watch until `shutdown` resolves
pub async fn watch_until<F>(
    pipeline: Arc<Pipeline>,
    settings: WatchSettings,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let source = pipeline.source().to_path_buf();
    let source_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string());

    let mut trigger = Trigger::new(settings.debounce);

    log::info!("Performing initial conversion...");
    trigger.begin();
    let mut in_flight = Some(spawn_conversion(pipeline.clone(), Duration::ZERO));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if let EventKind::Create(_) | EventKind::Modify(_) = event.kind {
                    for path in event.paths {
                        let _ = tx.send(WatcherEvent::SourceChanged(path));
                    }
                }
            }
            Err(e) => {
                let _ = tx.send(WatcherEvent::WatcherError(e));
            }
        },
        Config::default().with_poll_interval(Duration::from_secs(1)),
    )?;

    let watch_dir = match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    watcher
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch directory: {}", watch_dir.display()))?;

    log::info!("Watching {}", source.display());
    log::info!("Press Ctrl+C to stop...");

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,

            event = rx.recv() => match event {
                Some(WatcherEvent::SourceChanged(path)) => {
                    if !is_target(&path, &source) {
                        continue;
                    }
                    let was_queued = trigger.is_queued();
                    if trigger.on_change(Instant::now()) {
                        log::info!("Change detected in {}", source_name);
                        in_flight = Some(spawn_conversion(pipeline.clone(), settings.settle));
                    } else if trigger.is_queued() && !was_queued {
                        log::info!("Change detected in {} during conversion, queued", source_name);
                    } else {
                        log::debug!("Change ignored: {}", path.display());
                    }
                }
                Some(WatcherEvent::WatcherError(e)) => {
                    log::error!("File watcher error: {}", e);
                }
                None => break,
            },

            result = wait_for(&mut in_flight) => {
                in_flight = None;
                report(result);
                if trigger.finish(Instant::now()) {
                    log::info!("Re-running for changes made during the last conversion");
                    in_flight = Some(spawn_conversion(pipeline.clone(), settings.settle));
                }
            }
        }
    }

    if in_flight.is_some() {
        log::info!("Waiting for the running conversion to finish...");
        report(wait_for(&mut in_flight).await);
    }

    drop(watcher);
    log::info!("Watcher stopped.");

    Ok(())
}

/// Run one conversion after `settle` on the blocking pool
fn spawn_conversion(
    pipeline: Arc<Pipeline>,
    settle: Duration,
) -> JoinHandle<Result<ConversionReport>> {
    tokio::spawn(async move {
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }
        tokio::task::spawn_blocking(move || pipeline.run_once())
            .await
            .context("Conversion task panicked")?
    })
}

/// Resolves when the in-flight conversion ends; never resolves without one
async fn wait_for(
    in_flight: &mut Option<JoinHandle<Result<ConversionReport>>>,
) -> Result<ConversionReport> {
    match in_flight {
        Some(handle) => handle.await.context("Conversion task panicked")?,
        None => std::future::pending().await,
    }
}

fn report(result: Result<ConversionReport>) {
    match result {
        Ok(report) => log::debug!("Wrote {} chapter file(s)", report.written.len()),
        Err(e) => log::error!("{:#}", e),
    }
}
