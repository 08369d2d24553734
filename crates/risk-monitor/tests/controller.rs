use risk_models::{
    AlertId, HistoryRecord, LayerKind, MapLayerRequest, MapLayerResponse, Risk, SimulationRecord,
};
use risk_monitor::{Controller, Dashboard, LayerRefresh, Mode, Settings, Sources};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

type Script<T> = Mutex<VecDeque<(Duration, anyhow::Result<T>)>>;

/// Sources which play back scripted responses, each after a delay.
/// An exhausted history script serves an empty snapshot, an exhausted
/// simulation script serves a single Yercaud record, and an exhausted
/// layer script serves tiles of host "tiles" right away.
#[derive(Clone, Default)]
struct Fake(Arc<Inner>);

#[derive(Default)]
struct Inner {
    history: Script<Vec<HistoryRecord>>,
    simulate: Script<Vec<SimulationRecord>>,
    // Tile hosts of successive map layer calls.
    layers: Mutex<VecDeque<(Duration, &'static str)>>,
    failing_layers: Vec<LayerKind>,

    history_calls: AtomicUsize,
    simulate_calls: AtomicUsize,
    layer_calls: AtomicUsize,
}

impl Fake {
    fn new(failing_layers: Vec<LayerKind>) -> Self {
        Self(Arc::new(Inner {
            failing_layers,
            ..Default::default()
        }))
    }

    fn push_history(&self, delay: Duration, result: anyhow::Result<Vec<HistoryRecord>>) {
        self.0.history.lock().unwrap().push_back((delay, result));
    }

    fn push_simulate(&self, delay: Duration, result: anyhow::Result<Vec<SimulationRecord>>) {
        self.0.simulate.lock().unwrap().push_back((delay, result));
    }

    fn push_layers(&self, delay: Duration, host: &'static str) {
        self.0.layers.lock().unwrap().push_back((delay, host));
    }

    fn history_calls(&self) -> usize {
        self.0.history_calls.load(Ordering::SeqCst)
    }

    fn simulate_calls(&self) -> usize {
        self.0.simulate_calls.load(Ordering::SeqCst)
    }

    fn layer_calls(&self) -> usize {
        self.0.layer_calls.load(Ordering::SeqCst)
    }
}

impl Sources for Fake {
    async fn history(&self) -> anyhow::Result<Vec<HistoryRecord>> {
        self.0.history_calls.fetch_add(1, Ordering::SeqCst);

        let next = self.0.history.lock().unwrap().pop_front();
        match next {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => Ok(Vec::new()),
        }
    }

    async fn simulate(&self) -> anyhow::Result<Vec<SimulationRecord>> {
        self.0.simulate_calls.fetch_add(1, Ordering::SeqCst);

        let next = self.0.simulate.lock().unwrap().pop_front();
        match next {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => Ok(vec![simulated("Yercaud (Salem)", "Medium")]),
        }
    }

    async fn map_layer(&self, request: MapLayerRequest) -> anyhow::Result<MapLayerResponse> {
        self.0.layer_calls.fetch_add(1, Ordering::SeqCst);

        let next = self.0.layers.lock().unwrap().pop_front();
        let (delay, host) = next.unwrap_or((Duration::ZERO, "tiles"));
        tokio::time::sleep(delay).await;

        if self.0.failing_layers.contains(&request.layer_type) {
            anyhow::bail!("500 Internal Server Error: Failed to generate map layer");
        }
        Ok(MapLayerResponse {
            tile_url: Some(format!(
                "https://{host}/{}/{{z}}/{{x}}/{{y}}",
                request.layer_type
            )),
        })
    }
}

fn historical(region: &str, risk: &str) -> HistoryRecord {
    HistoryRecord {
        region: region.to_string(),
        risk: Risk::from(risk),
        lat: None,
        lon: None,
        details: None,
        confidence: None,
        metrics: None,
    }
}

fn simulated(region: &str, risk: &str) -> SimulationRecord {
    SimulationRecord {
        region: region.to_string(),
        risk: Risk::from(risk),
        timestamp: "12:00:00".to_string(),
        lat: Some(11.7753),
        lon: Some(78.2093),
        metrics: None,
        details: None,
        confidence: None,
    }
}

fn settings(layer_refresh: LayerRefresh) -> Settings {
    Settings {
        layer_refresh,
        ..Default::default()
    }
}

fn ids(dash: &Dashboard) -> Vec<&str> {
    dash.store.alerts().iter().map(|a| a.id.as_str()).collect()
}

fn risk_tiles(dash: &Dashboard) -> Option<&str> {
    dash.layers.get(LayerKind::Risk)
}

// Wait for the Dashboard to satisfy `predicate`. Time is paused in these
// tests, so the timeout elapses only if nothing else could make progress.
async fn wait_until(
    updates: &mut watch::Receiver<Dashboard>,
    predicate: impl FnMut(&Dashboard) -> bool,
) -> Dashboard {
    let dash = tokio::time::timeout(Duration::from_secs(600), updates.wait_for(predicate))
        .await
        .expect("timed out waiting for the dashboard")
        .expect("controller was dropped");
    dash.clone()
}

#[tokio::test(start_paused = true)]
async fn test_historical_load_replaces_placeholder() {
    let sources = Fake::new(vec![LayerKind::Twi]);
    sources.push_history(
        Duration::from_millis(50),
        Ok(vec![
            historical("System Startup", "Low"),
            historical("Nilgiris (Ooty)", "High"),
            historical("Chennai", "Low"),
        ]),
    );

    let mut controller = Controller::new(sources.clone(), settings(LayerRefresh::Startup));
    let mut updates = controller.subscribe();
    controller.start();

    let dash = wait_until(&mut updates, |d| d.store.alerts().len() == 2).await;
    assert_eq!(dash.mode, Mode::Historical);
    assert_eq!(ids(&dash), vec!["0", "1"]);
    assert_eq!(dash.store.alerts()[0].region, "Nilgiris (Ooty)");
    assert_eq!(dash.store.alerts()[1].time, "Historical Data");

    let dash = wait_until(&mut updates, |d| !d.layers.is_empty()).await;
    assert_eq!(
        dash.layers.kinds().collect::<Vec<_>>(),
        vec![LayerKind::Risk, LayerKind::Slope, LayerKind::Ndvi]
    );
    assert_eq!(sources.history_calls(), 1);

    controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_unusable_history_keeps_placeholder() {
    let sources = Fake::default();
    sources.push_history(Duration::ZERO, Ok(vec![historical("System Startup", "Low")]));

    let mut controller = Controller::new(sources.clone(), settings(LayerRefresh::Startup));
    controller.start();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(sources.history_calls(), 1);
    assert_eq!(controller.dashboard().store, Dashboard::bootstrap().store);

    // A failed fetch is no different.
    let sources = Fake::default();
    sources.push_history(Duration::ZERO, Err(anyhow::anyhow!("connection refused")));

    let mut controller = Controller::new(sources.clone(), settings(LayerRefresh::Startup));
    controller.start();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(sources.history_calls(), 1);
    assert_eq!(controller.dashboard().store, Dashboard::bootstrap().store);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_polling_stops_replacements() {
    let sources = Fake::default();

    let mut controller = Controller::new(sources.clone(), settings(LayerRefresh::Startup));
    let mut updates = controller.subscribe();
    controller.start();

    assert_eq!(controller.toggle(), Mode::Simulation);
    let dash = wait_until(&mut updates, |d| ids(d) == ["sim-0-1"]).await;
    assert_eq!(dash.mode, Mode::Simulation);
    assert_eq!(dash.store.alerts()[0].time, "12:00:00");

    // The next poll is an interval later.
    let dash = wait_until(&mut updates, |d| ids(d) == ["sim-0-2"]).await;
    assert_eq!(sources.simulate_calls(), 2);

    assert_eq!(controller.toggle(), Mode::Historical);
    let polls = sources.simulate_calls();

    tokio::time::sleep(Duration::from_secs(120)).await;

    // The (empty) historical snapshot didn't replace anything, and nor did the poller.
    assert_eq!(sources.simulate_calls(), polls);
    assert_eq!(sources.history_calls(), 2);
    assert_eq!(controller.dashboard().store, dash.store);

    controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_stale_history_is_discarded() {
    let sources = Fake::default();
    sources.push_history(
        Duration::from_secs(5),
        Ok(vec![historical("Kodaikanal", "Medium")]),
    );

    let mut controller = Controller::new(sources.clone(), settings(LayerRefresh::Startup));
    let mut updates = controller.subscribe();
    controller.start();

    // Toggle while the historical fetch is still in flight.
    controller.toggle();
    wait_until(&mut updates, |d| ids(d) == ["sim-0-1"]).await;

    // The historical fetch completes in the meantime, but lands in a stale generation.
    tokio::time::sleep(Duration::from_secs(10)).await;

    let dash = controller.dashboard();
    assert_eq!(sources.history_calls(), 1);
    assert_eq!(ids(&dash), vec!["sim-0-1"]);
    assert_eq!(dash.generation, 2);

    controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_poll_is_discarded_on_leaving_simulation() {
    let sources = Fake::default();
    sources.push_simulate(
        Duration::from_secs(5),
        Ok(vec![simulated("Kodaikanal (Dindigul)", "High")]),
    );

    let mut controller = Controller::new(sources.clone(), settings(LayerRefresh::Startup));
    controller.start();

    assert_eq!(controller.toggle(), Mode::Simulation);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(sources.simulate_calls(), 1);

    // Leave Simulation while the first poll is still outstanding.
    assert_eq!(controller.toggle(), Mode::Historical);
    tokio::time::sleep(Duration::from_secs(60)).await;

    let dash = controller.dashboard();
    assert_eq!(dash.mode, Mode::Historical);
    assert_eq!(dash.store, Dashboard::bootstrap().store);
    assert_eq!(sources.simulate_calls(), 1);
    assert_eq!(sources.history_calls(), 2);

    controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_polls_are_retried_on_the_next_tick() {
    let sources = Fake::default();
    sources.push_simulate(Duration::ZERO, Err(anyhow::anyhow!("503 Service Unavailable")));

    let mut missing_coords = simulated("Megamalai (Theni)", "High");
    missing_coords.lon = None;
    sources.push_simulate(
        Duration::ZERO,
        Ok(vec![simulated("Yercaud (Salem)", "Low"), missing_coords]),
    );
    sources.push_simulate(Duration::ZERO, Ok(vec![]));
    sources.push_simulate(
        Duration::ZERO,
        Ok(vec![
            simulated("Kolli Hills (Namakkal)", "Low"),
            simulated("Nilgiris Slide Zone", "High"),
        ]),
    );

    let mut controller = Controller::new(sources.clone(), settings(LayerRefresh::Startup));
    let mut updates = controller.subscribe();
    controller.toggle();

    // Three unsuccessful polls leave the placeholder in place.
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(sources.simulate_calls(), 3);
    assert_eq!(controller.dashboard().store, Dashboard::bootstrap().store);

    let dash = wait_until(&mut updates, |d| d.store.alerts().len() == 2).await;
    assert_eq!(ids(&dash), vec!["sim-0-4", "sim-1-4"]);
    assert_eq!(
        dash.store.alerts()[1].overlay_image.as_deref(),
        Some("/risk_images/ooty_landslide.png")
    );

    controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_replacement_clears_selection() {
    let sources = Fake::default();

    let mut controller = Controller::new(sources.clone(), settings(LayerRefresh::Startup));
    let mut updates = controller.subscribe();
    controller.toggle();

    wait_until(&mut updates, |d| ids(d) == ["sim-0-1"]).await;
    assert!(controller.select(&AlertId::new("sim-0-1")));
    assert_eq!(
        controller.dashboard().store.selected_id(),
        Some(&AlertId::new("sim-0-1"))
    );

    let dash = wait_until(&mut updates, |d| ids(d) == ["sim-0-2"]).await;
    assert_eq!(dash.store.selected_id(), None);

    assert!(!controller.select(&AlertId::new("sim-0-1")));
    assert!(controller.select(&AlertId::new("sim-0-2")));
    controller.clear_selection();
    assert_eq!(controller.dashboard().store.selected(), None);

    controller.shutdown().await;
}

async fn layer_calls_after_two_polls(layer_refresh: LayerRefresh) -> usize {
    let sources = Fake::default();

    let mut controller = Controller::new(sources.clone(), settings(layer_refresh));
    let mut updates = controller.subscribe();
    controller.start();
    controller.toggle();

    wait_until(&mut updates, |d| ids(d) == ["sim-0-2"]).await;
    assert_eq!(controller.dashboard().layers.len(), 4);

    // Let layer passes spawned by the second poll run.
    tokio::time::sleep(Duration::from_secs(1)).await;
    controller.shutdown().await;
    sources.layer_calls()
}

#[tokio::test(start_paused = true)]
async fn test_layer_refresh_policy() {
    assert_eq!(layer_calls_after_two_polls(LayerRefresh::Startup).await, 4);
    assert_eq!(layer_calls_after_two_polls(LayerRefresh::EveryPoll).await, 12);
}

#[tokio::test(start_paused = true)]
async fn test_slow_layers_dont_hold_up_polls() {
    let sources = Fake::default();
    for _ in 0..4 {
        sources.push_layers(Duration::from_secs(25), "slow");
    }

    let mut controller = Controller::new(sources.clone(), settings(LayerRefresh::EveryPoll));
    controller.toggle();

    // The first poll lands while its layer pass is still outstanding.
    tokio::time::sleep(Duration::from_secs(1)).await;
    let dash = controller.dashboard();
    assert_eq!(ids(&dash), vec!["sim-0-1"]);
    assert_eq!(dash.store.alerts()[0].region, "Yercaud (Salem)");
    assert!(dash.layers.is_empty());

    // The second poll happens on schedule.
    tokio::time::sleep(Duration::from_secs(12)).await;
    let dash = controller.dashboard();
    assert_eq!(sources.simulate_calls(), 2);
    assert_eq!(ids(&dash), vec!["sim-0-2"]);
    assert_eq!(risk_tiles(&dash), Some("https://tiles/risk/{z}/{x}/{y}"));

    // The slow pass lands after a later one, and is ignored.
    controller.toggle();
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(sources.layer_calls(), 8);
    assert_eq!(
        risk_tiles(&controller.dashboard()),
        Some("https://tiles/risk/{z}/{x}/{y}")
    );

    controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_later_layer_pass_wins() {
    let sources = Fake::default();
    for _ in 0..4 {
        sources.push_layers(Duration::from_secs(25), "startup");
    }
    for _ in 0..4 {
        sources.push_layers(Duration::ZERO, "first-poll");
    }

    let mut controller = Controller::new(sources.clone(), settings(LayerRefresh::EveryPoll));
    let mut updates = controller.subscribe();

    // The startup pass is outstanding when the first poll's pass completes.
    controller.refresh_layers();
    tokio::task::yield_now().await;
    controller.toggle();

    let dash = wait_until(&mut updates, |d| risk_tiles(d).is_some()).await;
    assert_eq!(risk_tiles(&dash), Some("https://first-poll/risk/{z}/{x}/{y}"));
    assert_eq!(dash.layer_pass, 2);

    // Return to Historical so that no further passes start.
    controller.toggle();
    tokio::time::sleep(Duration::from_secs(30)).await;

    let dash = controller.dashboard();
    assert_eq!(sources.layer_calls(), 8);
    assert_eq!(risk_tiles(&dash), Some("https://first-poll/risk/{z}/{x}/{y}"));
    assert_eq!(dash.layer_pass, 2);

    controller.shutdown().await;
}
