use crate::{defaults::ModeDefaults, layers, normalize, AcquireError, AlertStore, Mode, Sources};
use risk_models::{Alert, AlertId, LayerSet};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Period between polls of the simulation feed.
pub const DEFAULT_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(12);

/// LayerRefresh is the policy of when map layers are re-fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerRefresh {
    /// Fetch layers once, when the controller starts.
    #[default]
    Startup,
    /// Also re-fetch layers alongside every simulation poll.
    EveryPoll,
}

impl std::str::FromStr for LayerRefresh {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "startup" => Ok(LayerRefresh::Startup),
            "every-poll" => Ok(LayerRefresh::EveryPoll),
            other => Err(format!(
                "invalid layer refresh policy {other:?} (expected 'startup' or 'every-poll')"
            )),
        }
    }
}

impl std::fmt::Display for LayerRefresh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerRefresh::Startup => f.write_str("startup"),
            LayerRefresh::EveryPoll => f.write_str("every-poll"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub poll_interval: std::time::Duration,
    pub layer_refresh: LayerRefresh,
    /// Districts requested of each map layer.
    pub districts: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            layer_refresh: LayerRefresh::default(),
            districts: vec![risk_models::ALL_DISTRICTS.to_string()],
        }
    }
}

/// Dashboard is the shared view model: everything the presentation derives from.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Dashboard {
    pub mode: Mode,
    /// Generation of the current mode, bumped on every transition.
    /// Acquisitions started under an older generation are discarded.
    pub generation: u64,
    pub store: AlertStore,
    pub layers: LayerSet,
    /// Sequence number of the layer pass which produced `layers`.
    /// Passes which started earlier never replace a later pass.
    #[serde(skip)]
    pub layer_pass: u64,
}

impl Dashboard {
    pub fn bootstrap() -> Self {
        Self {
            mode: Mode::Historical,
            generation: 0,
            store: AlertStore::bootstrap(),
            layers: LayerSet::new(),
            layer_pass: 0,
        }
    }
}

/// Controller is the acquisition state machine. It owns the mode, the
/// simulation poller, and the Dashboard which acquisitions publish into.
///
/// Operator actions go through `&mut self`, while the Dashboard lives in a
/// watch channel so that presentation can observe every change.
pub struct Controller<S: Sources> {
    sources: Arc<S>,
    settings: Arc<Settings>,
    state: Arc<watch::Sender<Dashboard>>,
    // Source of simulation poll cycles, from which alert ids are minted.
    cycles: Arc<AtomicU64>,
    // Source of layer pass sequence numbers.
    passes: Arc<AtomicU64>,
    poller: Option<Poller>,
}

struct Poller {
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

impl<S: Sources> Controller<S> {
    pub fn new(sources: S, settings: Settings) -> Self {
        let (state, _) = watch::channel(Dashboard::bootstrap());

        Self {
            sources: Arc::new(sources),
            settings: Arc::new(settings),
            state: Arc::new(state),
            cycles: Arc::new(AtomicU64::new(0)),
            passes: Arc::new(AtomicU64::new(0)),
            poller: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Dashboard> {
        self.state.subscribe()
    }

    pub fn dashboard(&self) -> Dashboard {
        self.state.borrow().clone()
    }

    pub fn mode(&self) -> Mode {
        self.state.borrow().mode
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Enter the initial Historical mode and begin the first layer pass.
    pub fn start(&mut self) {
        self.enter(Mode::Historical);
        self.refresh_layers();
    }

    /// Flip between Historical and Simulation modes, returning the new mode.
    pub fn toggle(&mut self) -> Mode {
        let next = self.mode().toggled();
        self.enter(next);
        next
    }

    /// Select the alert identified by `id`, returning whether it exists.
    /// An unknown `id` clears the selection.
    pub fn select(&self, id: &AlertId) -> bool {
        let mut found = false;
        self.state.send_modify(|dash| found = dash.store.select(id).is_some());
        found
    }

    pub fn clear_selection(&self) {
        self.state.send_modify(|dash| dash.store.clear_selection());
    }

    /// Start a pass over all map layers, which replaces the Dashboard's
    /// LayerSet once every layer kind has been attempted.
    pub fn refresh_layers(&self) -> tokio::task::JoinHandle<()> {
        spawn_layer_pass(
            self.sources.clone(),
            self.settings.clone(),
            self.state.clone(),
            &self.passes,
        )
    }

    /// Stop all acquisition. Results of any acquisition still in flight are discarded.
    pub async fn shutdown(mut self) {
        self.state.send_modify(|dash| dash.generation += 1);

        if let Some(Poller { cancel, handle }) = self.poller.take() {
            cancel.cancel();

            if let Err(err) = handle.await {
                tracing::error!(?err, "simulation poller failed");
            }
        }
        tracing::debug!("controller shut down");
    }

    fn enter(&mut self, mode: Mode) {
        let mut generation = 0;
        self.state.send_modify(|dash| {
            dash.mode = mode;
            dash.generation += 1;
            generation = dash.generation;
        });
        tracing::info!(%mode, generation, "entered acquisition mode");

        self.stop_polling();

        match mode {
            Mode::Historical => self.spawn_history(generation),
            Mode::Simulation => self.spawn_poller(generation),
        }
    }

    // Cancel a running poller. It's a no-op if there isn't one.
    fn stop_polling(&mut self) {
        if let Some(Poller { cancel, handle: _ }) = self.poller.take() {
            cancel.cancel();
            tracing::debug!("cancelled simulation poller");
        }
    }

    fn spawn_history(&self, generation: u64) {
        let (sources, state) = (self.sources.clone(), self.state.clone());

        tokio::spawn(
            async move {
                match acquire_history(&*sources).await {
                    Ok(alerts) => {
                        apply(&state, generation, Mode::Historical, alerts);
                    }
                    Err(err) => report(&err),
                }
            }
            .instrument(tracing::info_span!("history", generation)),
        );
    }

    fn spawn_poller(&mut self, generation: u64) {
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(
            poll_simulation(
                self.sources.clone(),
                self.settings.clone(),
                self.state.clone(),
                self.cycles.clone(),
                self.passes.clone(),
                generation,
                cancel.clone(),
            )
            .instrument(tracing::info_span!("simulation", generation)),
        );
        self.poller = Some(Poller { cancel, handle });
    }
}

impl<S: Sources> Drop for Controller<S> {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

/// Fetch and normalize the historical snapshot.
pub async fn acquire_history<S: Sources>(sources: &S) -> Result<Vec<Alert>, AcquireError> {
    let mode = Mode::Historical;

    let records = sources
        .history()
        .await
        .map_err(|source| AcquireError::Fetch { mode, source })?;

    let alerts = normalize::historical_batch(records, &ModeDefaults::for_mode(mode));
    if alerts.is_empty() {
        return Err(AcquireError::Empty { mode });
    }
    Ok(alerts)
}

/// Fetch and normalize simulation poll `cycle`.
pub async fn acquire_simulation<S: Sources>(
    sources: &S,
    cycle: u64,
) -> Result<Vec<Alert>, AcquireError> {
    let mode = Mode::Simulation;

    let records = sources
        .simulate()
        .await
        .map_err(|source| AcquireError::Fetch { mode, source })?;

    if records.is_empty() {
        return Err(AcquireError::Empty { mode });
    }
    normalize::simulation_batch(cycle, records, &ModeDefaults::for_mode(mode))
        .map_err(|source| AcquireError::Rejected { mode, source })
}

async fn poll_simulation<S: Sources>(
    sources: Arc<S>,
    settings: Arc<Settings>,
    state: Arc<watch::Sender<Dashboard>>,
    cycles: Arc<AtomicU64>,
    passes: Arc<AtomicU64>,
    generation: u64,
    cancel: CancellationToken,
) {
    // The first tick completes immediately.
    let mut interval = tokio::time::interval(settings.poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = interval.tick() => (),
        }
        let cycle = cycles.fetch_add(1, Ordering::Relaxed) + 1;

        // The layer pass runs on its own, and never holds up the poll.
        if settings.layer_refresh == LayerRefresh::EveryPoll {
            spawn_layer_pass(sources.clone(), settings.clone(), state.clone(), &passes);
        }

        let result = tokio::select! {
            () = cancel.cancelled() => break,
            result = acquire_simulation(&*sources, cycle) => result,
        };

        match result {
            Ok(alerts) => {
                apply(&state, generation, Mode::Simulation, alerts);
            }
            // A failed poll leaves the alerts as they are. The next tick tries again.
            Err(err) => report(&err),
        }
    }
    tracing::debug!("simulation poller stopped");
}

/// Replace the alerts of `state` if it's still at `generation`.
fn apply(
    state: &watch::Sender<Dashboard>,
    generation: u64,
    mode: Mode,
    alerts: Vec<Alert>,
) -> bool {
    let count = alerts.len();

    let applied = state.send_if_modified(move |dash| {
        if dash.generation != generation {
            return false;
        }
        dash.store.replace(alerts);
        true
    });

    if applied {
        tracing::info!(%mode, generation, count, "replaced alerts");
    } else {
        tracing::debug!(%mode, generation, "discarding alerts of a stale acquisition");
    }
    applied
}

fn spawn_layer_pass<S: Sources>(
    sources: Arc<S>,
    settings: Arc<Settings>,
    state: Arc<watch::Sender<Dashboard>>,
    passes: &AtomicU64,
) -> tokio::task::JoinHandle<()> {
    let pass = passes.fetch_add(1, Ordering::Relaxed) + 1;

    tokio::spawn(
        async move {
            let layers = layers::fetch(&*sources, &settings.districts).await;
            publish_layers(&state, pass, layers);
        }
        .instrument(tracing::info_span!("layers", pass)),
    )
}

/// Replace the layers of `state` unless a later pass already has.
fn publish_layers(state: &watch::Sender<Dashboard>, pass: u64, layers: LayerSet) -> bool {
    let published = state.send_if_modified(move |dash| {
        if pass < dash.layer_pass {
            return false;
        }
        dash.layers = layers;
        dash.layer_pass = pass;
        true
    });

    if !published {
        tracing::debug!(pass, "discarding layers of a superseded pass");
    }
    published
}

fn report(err: &AcquireError) {
    match err {
        AcquireError::Empty { .. } => tracing::info!(%err, "keeping current alerts"),
        _ => tracing::warn!(?err, "keeping current alerts"),
    }
}
