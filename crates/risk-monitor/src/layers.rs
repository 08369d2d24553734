use crate::Sources;
use risk_models::{LayerKind, LayerSet, MapLayerRequest};

/// Outcome of an attempt to fetch one layer kind.
/// A pass over all kinds routinely has a mix of both.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LayerAttempt {
    Available {
        kind: LayerKind,
        tile_url: String,
    },
    Unavailable {
        kind: LayerKind,
        reason: String,
    },
}

impl LayerAttempt {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerAttempt::Available { kind, .. } | LayerAttempt::Unavailable { kind, .. } => *kind,
        }
    }
}

/// Attempt to fetch the tile reference of layer `kind`.
pub async fn attempt<S: Sources>(sources: &S, kind: LayerKind, districts: &[String]) -> LayerAttempt {
    let request = MapLayerRequest {
        districts: districts.to_vec(),
        layer_type: kind,
    };

    let outcome = match sources.map_layer(request).await {
        Ok(response) => match response.tile_url {
            Some(tile_url) => LayerAttempt::Available { kind, tile_url },
            None => LayerAttempt::Unavailable {
                kind,
                reason: "response has no tileUrl".to_string(),
            },
        },
        Err(err) => LayerAttempt::Unavailable {
            kind,
            reason: format!("{err:#}"),
        },
    };

    if let LayerAttempt::Unavailable { reason, .. } = &outcome {
        tracing::warn!(layer = %kind, %reason, "map layer is unavailable");
    }
    outcome
}

/// Attempt every layer kind concurrently, resolving once all attempts have.
pub async fn fetch_all<S: Sources>(sources: &S, districts: &[String]) -> Vec<LayerAttempt> {
    futures::future::join_all(
        LayerKind::ALL
            .iter()
            .map(|kind| attempt(sources, *kind, districts)),
    )
    .await
}

/// Collect the available layers of a pass into a fresh LayerSet.
pub fn collect(attempts: &[LayerAttempt]) -> LayerSet {
    attempts
        .iter()
        .filter_map(|attempt| match attempt {
            LayerAttempt::Available { kind, tile_url } => Some((*kind, tile_url.clone())),
            LayerAttempt::Unavailable { .. } => None,
        })
        .collect()
}

/// Fetch a fresh LayerSet.
#[tracing::instrument(skip(sources))]
pub async fn fetch<S: Sources>(sources: &S, districts: &[String]) -> LayerSet {
    let attempts = fetch_all(sources, districts).await;
    let layers = collect(&attempts);

    tracing::debug!(
        available = layers.len(),
        attempted = attempts.len(),
        "completed map layer pass"
    );
    layers
}

#[cfg(test)]
mod test {
    use super::*;
    use risk_models::{HistoryRecord, MapLayerResponse, SimulationRecord};

    // Serves map layers, failing `twi` with an error and `slope` with an empty response.
    struct Layers {
        fail: Vec<LayerKind>,
        empty: Vec<LayerKind>,
    }

    impl Sources for Layers {
        async fn history(&self) -> anyhow::Result<Vec<HistoryRecord>> {
            unreachable!()
        }
        async fn simulate(&self) -> anyhow::Result<Vec<SimulationRecord>> {
            unreachable!()
        }
        async fn map_layer(&self, request: MapLayerRequest) -> anyhow::Result<MapLayerResponse> {
            assert_eq!(request.districts, vec!["All".to_string()]);

            if self.fail.contains(&request.layer_type) {
                anyhow::bail!("500 Internal Server Error: Failed to generate map layer");
            } else if self.empty.contains(&request.layer_type) {
                Ok(MapLayerResponse::default())
            } else {
                Ok(MapLayerResponse {
                    tile_url: Some(format!("https://tiles/{}/{{z}}/{{x}}/{{y}}", request.layer_type)),
                })
            }
        }
    }

    fn all() -> Vec<String> {
        vec![risk_models::ALL_DISTRICTS.to_string()]
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn test_failed_kind_is_omitted() {
        let sources = Layers {
            fail: vec![LayerKind::Twi],
            empty: vec![],
        };
        let layers = fetch(&sources, &all()).await;

        assert_eq!(
            layers.kinds().collect::<Vec<_>>(),
            vec![LayerKind::Risk, LayerKind::Slope, LayerKind::Ndvi]
        );
        assert_eq!(layers.get(LayerKind::Slope), Some("https://tiles/slope/{z}/{x}/{y}"));
        assert!(logs_contain("map layer is unavailable"));
    }

    #[tokio::test]
    async fn test_attempts_are_tagged() {
        let sources = Layers {
            fail: vec![LayerKind::Twi],
            empty: vec![LayerKind::Slope],
        };
        let attempts = fetch_all(&sources, &all()).await;

        insta::assert_json_snapshot!(attempts, @r###"
        [
          {
            "status": "available",
            "kind": "risk",
            "tile_url": "https://tiles/risk/{z}/{x}/{y}"
          },
          {
            "status": "unavailable",
            "kind": "slope",
            "reason": "response has no tileUrl"
          },
          {
            "status": "unavailable",
            "kind": "twi",
            "reason": "500 Internal Server Error: Failed to generate map layer"
          },
          {
            "status": "available",
            "kind": "ndvi",
            "tile_url": "https://tiles/ndvi/{z}/{x}/{y}"
          }
        ]
        "###);
        assert_eq!(collect(&attempts).len(), 2);
    }

    #[tokio::test]
    async fn test_all_kinds_failing_yields_empty_set() {
        let sources = Layers {
            fail: LayerKind::ALL.to_vec(),
            empty: vec![],
        };
        assert!(fetch(&sources, &all()).await.is_empty());
    }
}
