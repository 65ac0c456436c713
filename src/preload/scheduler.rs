use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::loader::{ImageLoader, LoadError};
use crate::config::PreloadConfig;
use crate::model::{CalendarDate, CameraKey, PhotoTimestamp};
use crate::observability::Metrics;
use crate::retrieval::{DateImages, ImageRetriever};

/// Progress bookkeeping for the current run only
#[derive(Debug, Default)]
struct RunState {
    run: u64,
    total: usize,
    loaded: HashSet<PhotoTimestamp>,
    loaded_count: usize,
}

impl RunState {
    fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.loaded_count as f64 / self.total as f64 * 100.0).clamp(0.0, 100.0)
    }
}

/// State shared between the scheduler, its batch drivers and fetch tasks
struct Shared {
    state: Mutex<RunState>,
    progress: watch::Sender<f64>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, run: u64) -> bool {
        self.lock().run == run
    }

    fn publish(&self, state: &RunState) {
        self.progress.send_replace(state.percent());
    }
}

/// Handle to one primary preload run
#[derive(Debug)]
pub struct PreloadHandle {
    run: u64,
    driver: JoinHandle<Vec<usize>>,
}

impl PreloadHandle {
    pub fn run(&self) -> u64 {
        self.run
    }

    /// Wait for the batch driver to stop and return the size of every batch
    /// it dispatched. Fetches from the last batch may still be in flight.
    pub async fn finished(self) -> Vec<usize> {
        match self.driver.await {
            Ok(batches) => batches,
            Err(e) => {
                warn!(run = self.run, error = %e, "Preload driver task failed");
                Vec::new()
            }
        }
    }
}

/// Background warming of the days around a selected date
#[derive(Debug)]
pub struct AdjacentWarmup {
    pub dates: Vec<CalendarDate>,
    tasks: Vec<JoinHandle<usize>>,
}

impl AdjacentWarmup {
    /// Total images loaded across all adjacent dates
    pub async fn finished(self) -> usize {
        let mut loaded = 0;
        for task in self.tasks {
            loaded += task.await.unwrap_or(0);
        }
        loaded
    }
}

/// Result of selecting a date in the viewer
#[derive(Debug)]
pub struct DateSelection {
    pub images: DateImages,
    pub primary: PreloadHandle,
    pub adjacent: AdjacentWarmup,
}

/// Throttled image prefetcher.
///
/// Photos are fetched in fixed-size batches with a pause between batches.
/// Only one run is current at a time: starting a run (or cancelling) makes
/// every earlier run stop dispatching, and results still arriving for it are
/// dropped without touching the new run's counters.
pub struct PreloadScheduler {
    retriever: Arc<ImageRetriever>,
    loader: Arc<dyn ImageLoader>,
    config: PreloadConfig,
    shared: Arc<Shared>,
}

impl PreloadScheduler {
    pub fn new(
        retriever: Arc<ImageRetriever>,
        loader: Arc<dyn ImageLoader>,
        config: PreloadConfig,
    ) -> Self {
        let (progress, _) = watch::channel(0.0);
        Self {
            retriever,
            loader,
            config,
            shared: Arc::new(Shared {
                state: Mutex::new(RunState::default()),
                progress,
            }),
        }
    }

    /// Percent of the current run's photos that finished loading, failures included
    pub fn progress(&self) -> f64 {
        self.shared.lock().percent()
    }

    pub fn loaded_count(&self) -> usize {
        self.shared.lock().loaded_count
    }

    pub fn total(&self) -> usize {
        self.shared.lock().total
    }

    pub fn is_loaded(&self, timestamp: &PhotoTimestamp) -> bool {
        self.shared.lock().loaded.contains(timestamp)
    }

    pub fn current_run(&self) -> u64 {
        self.shared.lock().run
    }

    pub fn watch_progress(&self) -> watch::Receiver<f64> {
        self.shared.progress.subscribe()
    }

    /// Invalidate the current run without starting another
    pub fn cancel(&self) {
        let run = self.begin_run();
        debug!(run, "Preload cancelled");
    }

    /// Start preloading `timestamps` for `key`, superseding any earlier run.
    pub fn start(&self, key: &CameraKey, timestamps: Vec<PhotoTimestamp>) -> PreloadHandle {
        let run = self.begin_run();
        self.launch(run, key, timestamps)
    }

    /// Fetch a day's photos, preload them, and warm the neighbouring days.
    ///
    /// Neighbours after today are never warmed, so selecting today warms
    /// only the days before it.
    pub async fn select_date(&self, key: &CameraKey, date: CalendarDate) -> DateSelection {
        // Claim the run before the fetch so a newer selection made while
        // this one is waiting on the network wins.
        let run = self.begin_run();
        let images = self.retriever.get_images_for_date(key, date).await;

        let primary = self.launch(run, key, images.timestamps.clone());
        let adjacent = self.schedule_adjacent(run, key, date);

        DateSelection {
            images,
            primary,
            adjacent,
        }
    }

    /// Opportunistically warm cache and images for the days around `date`.
    ///
    /// Nearest days go first. Days after today are skipped. Each day waits a
    /// staggered delay inside the configured window so it never competes
    /// with the primary batches. The warmup joins the current run, so a later
    /// `start`, `select_date` or `cancel` abandons it.
    pub fn preload_adjacent(&self, key: &CameraKey, date: CalendarDate) -> AdjacentWarmup {
        let run = self.current_run();
        self.schedule_adjacent(run, key, date)
    }

    fn begin_run(&self) -> u64 {
        let mut state = self.shared.lock();
        let run = state.run + 1;
        *state = RunState {
            run,
            ..RunState::default()
        };
        self.shared.publish(&state);
        run
    }

    fn launch(&self, run: u64, key: &CameraKey, timestamps: Vec<PhotoTimestamp>) -> PreloadHandle {
        {
            let mut state = self.shared.lock();
            if state.run != run {
                debug!(run, current = state.run, "Preload superseded before start");
                return PreloadHandle {
                    run,
                    driver: tokio::spawn(async { Vec::new() }),
                };
            }
            state.total = timestamps.len();
            self.shared.publish(&state);
        }

        let items: Vec<(PhotoTimestamp, String)> = timestamps
            .into_iter()
            .map(|ts| {
                let url = self.retriever.image_url(key, &ts);
                (ts, url)
            })
            .collect();

        info!(camera = %key, run, photos = items.len(), "Starting progressive preload");

        let batch_size = self.config.batch_size.max(1);
        let batch_delay = self.config.batch_delay.as_duration();
        let shared = self.shared.clone();
        let loader = self.loader.clone();
        let metrics = self.retriever.metrics().clone();

        let driver = tokio::spawn(async move {
            let mut dispatched = Vec::new();
            for (index, batch) in items.chunks(batch_size).enumerate() {
                if index > 0 {
                    tokio::time::sleep(batch_delay).await;
                }
                if !shared.is_current(run) {
                    debug!(run, batches = dispatched.len(), "Preload superseded, stopping");
                    break;
                }

                for (timestamp, url) in batch {
                    tokio::spawn(fetch_one(
                        run,
                        timestamp.clone(),
                        url.clone(),
                        loader.clone(),
                        shared.clone(),
                        metrics.clone(),
                    ));
                }
                dispatched.push(batch.len());
            }
            dispatched
        });

        PreloadHandle { run, driver }
    }

    fn schedule_adjacent(&self, run: u64, key: &CameraKey, date: CalendarDate) -> AdjacentWarmup {
        let today = self.retriever.clock().today();
        let dates = adjacent_dates(date, self.config.adjacent_days, today);
        let delays = stagger(
            dates.len(),
            self.config.adjacent_delay_min.as_duration(),
            self.config.adjacent_delay_max.as_duration(),
        );

        let tasks = dates
            .iter()
            .zip(delays)
            .map(|(&day, delay)| {
                tokio::spawn(warm_date(
                    run,
                    key.clone(),
                    day,
                    delay,
                    self.config.adjacent_images,
                    self.retriever.clone(),
                    self.loader.clone(),
                    self.shared.clone(),
                ))
            })
            .collect();

        AdjacentWarmup { dates, tasks }
    }
}

async fn fetch_one(
    run: u64,
    timestamp: PhotoTimestamp,
    url: String,
    loader: Arc<dyn ImageLoader>,
    shared: Arc<Shared>,
    metrics: Arc<Metrics>,
) {
    let result: Result<(), LoadError> = loader.load(&url).await;

    let mut state = shared.lock();
    if state.run != run {
        debug!(run, %timestamp, "Discarding result from superseded preload");
        return;
    }

    match result {
        Ok(()) => metrics.preload_loaded(),
        Err(e) => {
            // Counted as loaded so progress still reaches 100%
            metrics.preload_failed();
            debug!(run, %timestamp, error = %e, "Preload failed");
        }
    }

    state.loaded.insert(timestamp);
    state.loaded_count += 1;
    shared.publish(&state);
}

#[allow(clippy::too_many_arguments)]
async fn warm_date(
    run: u64,
    key: CameraKey,
    date: CalendarDate,
    delay: Duration,
    limit: usize,
    retriever: Arc<ImageRetriever>,
    loader: Arc<dyn ImageLoader>,
    shared: Arc<Shared>,
) -> usize {
    tokio::time::sleep(delay).await;
    if !shared.is_current(run) {
        return 0;
    }

    let images = retriever.get_images_for_date(&key, date).await;
    let mut loaded = 0;
    for url in images.urls.iter().take(limit) {
        if !shared.is_current(run) {
            break;
        }
        match loader.load(url).await {
            Ok(()) => loaded += 1,
            Err(e) => debug!(camera = %key, %date, error = %e, "Adjacent preload failed"),
        }
    }

    debug!(camera = %key, %date, loaded, "Adjacent date warmed");
    loaded
}

/// Days around `date`, nearest first, never after `today`
fn adjacent_dates(date: CalendarDate, span: u32, today: CalendarDate) -> Vec<CalendarDate> {
    let mut dates = Vec::new();
    for offset in 1..=i64::from(span) {
        for signed in [-offset, offset] {
            if let Some(day) = date.checked_add_signed(chrono::Duration::days(signed)) {
                if day <= today {
                    dates.push(day);
                }
            }
        }
    }
    dates
}

/// `count` delays spread evenly over `[min, max]`
fn stagger(count: usize, min: Duration, max: Duration) -> Vec<Duration> {
    if count <= 1 {
        return vec![min; count];
    }
    let spread = max.saturating_sub(min);
    (0..count)
        .map(|i| min + spread.mul_f64(i as f64 / (count - 1) as f64))
        .collect()
}
