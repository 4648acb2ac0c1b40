use axum::Router;
use axum::routing::get;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::info;

/// The global handle onto the installed Prometheus recorder. The `metrics`
/// facade permits a single recorder per process, so the handle is kept for
/// every subsequently created hub.
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Failure to install the Prometheus recorder.
#[derive(Debug, Error)]
pub enum MetricsHubError {
    /// The exporter could not be built, or another recorder (not installed
    /// through a [`MetricsHub`]) already occupies the global slot.
    #[error("failed to install the Prometheus metrics recorder")]
    Install(#[from] BuildError),
}

/// A handle onto the process-global Prometheus metrics recorder.
///
/// [Installing](MetricsHub::install) the hub registers the recorder behind
/// the `metrics` facade macros. Application code then records metrics with
/// those macros, and the hub [renders](MetricsHub::render) the Prometheus
/// exposition text, directly or through the [`/metrics` route](MetricsHub::router).
///
/// The recorder slot is process-wide, so installation happens at most once;
/// repeated calls yield additional hubs onto the same recorder.
///
/// ## Example
///
/// ```
/// use gantry_metrics::MetricsHub;
/// use metrics::counter;
///
/// let hub = MetricsHub::install().unwrap();
///
/// counter!("requests_total").increment(1);
///
/// assert!(hub.render().contains("requests_total"));
/// ```
#[derive(Debug, Clone)]
pub struct MetricsHub {
    handle: PrometheusHandle,
}

impl MetricsHub {
    /// Installs the Prometheus recorder as the global `metrics` recorder and
    /// returns a hub onto it.
    ///
    /// If a hub has already been installed in this process, returns another
    /// hub onto the same recorder.
    pub fn install() -> Result<Self, MetricsHubError> {
        if let Some(handle) = HANDLE.get() {
            return Ok(Self {
                handle: handle.clone(),
            });
        }

        let handle = PrometheusBuilder::new().install_recorder()?;
        let handle = HANDLE.get_or_init(|| handle).clone();

        info!("Metrics recorder installed");

        Ok(Self { handle })
    }

    /// Renders the current contents of the recorder in the Prometheus
    /// exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Performs the recorder’s periodic upkeep, draining histogram samples
    /// accumulated since the last call. Long-lived applications should call
    /// this on a timer to bound memory growth.
    pub fn run_upkeep(&self) {
        self.handle.run_upkeep();
    }

    /// Creates an [`axum` router](Router) serving the rendered exposition
    /// text at `/metrics`.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();

        Router::new().route(
            "/metrics",
            get(move || {
                let handle = handle.clone();

                async move { handle.render() }
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use metrics::{counter, gauge};
    use tower::ServiceExt;

    #[test]
    fn install_is_idempotent() {
        // Given
        let first = MetricsHub::install().unwrap();

        // When
        let second = MetricsHub::install().unwrap();

        // Then: both hubs observe the same recorder
        counter!("gantry_install_total").increment(1);
        assert!(first.render().contains("gantry_install_total"));
        assert!(second.render().contains("gantry_install_total"));
    }

    #[test]
    fn recorded_metrics_are_rendered() {
        // Given
        let hub = MetricsHub::install().unwrap();

        // When
        counter!("gantry_requests_total").increment(3);
        gauge!("gantry_active_connections").set(7.0);

        // Then
        let rendered = hub.render();
        assert!(rendered.contains("gantry_requests_total 3"));
        assert!(rendered.contains("gantry_active_connections 7"));
    }

    #[tokio::test]
    async fn router_serves_the_exposition() {
        // Given
        let hub = MetricsHub::install().unwrap();
        counter!("gantry_routed_total").increment(1);

        // When
        let response = hub
            .router()
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::OK);
    }
}
