use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use gantry_core::BoxError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// A registered health check: a fallible closure evaluated on demand.
type Check = Arc<dyn Fn() -> Result<(), BoxError> + Send + Sync + 'static>;

/// The value reported for a passing check.
const OUTCOME_OK: &str = "OK";

/// A registry of named liveness and readiness checks.
///
/// Liveness answers “should this process be restarted”; readiness answers
/// “should this process receive traffic”. Checks are registered up front with
/// the builder methods and evaluated on every probe, either
/// [directly](HealthProbes::evaluate_liveness) or through the
/// [`/live` and `/ready` routes](HealthProbes::router).
///
/// Checks may block (the ready-made [DNS](crate::check::dns_resolve) and
/// [TCP](crate::check::tcp_dial) checks do), so evaluation offloads them to
/// the blocking thread pool.
///
/// ## Example
///
/// ```
/// use gantry_probes::HealthProbes;
/// use gantry_probes::check;
/// use std::time::Duration;
///
/// let probes = HealthProbes::new()
///     .with_liveness_check("dns-works", check::dns_resolve("localhost", Duration::from_secs(10)))
///     .with_readiness_check("warmed-up", || Ok(()));
/// ```
#[derive(Clone, Default)]
pub struct HealthProbes {
    liveness: BTreeMap<String, Check>,
    readiness: BTreeMap<String, Check>,
}

/// The outcome of evaluating one family of [checks](HealthProbes): the value
/// under each check’s name is either `"OK"` or the failure message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProbeReport {
    checks: BTreeMap<String, String>,
}

impl ProbeReport {
    /// Reports whether every evaluated check passed. A report with no checks
    /// is healthy.
    pub fn healthy(&self) -> bool {
        self.checks.values().all(|outcome| outcome == OUTCOME_OK)
    }

    /// Reports the per-check outcomes: `"OK"` or the failure message, keyed
    /// by check name.
    pub fn checks(&self) -> &BTreeMap<String, String> {
        &self.checks
    }
}

impl HealthProbes {
    /// Creates a [`HealthProbes`] registry with no checks. Probes without
    /// checks always report healthy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named liveness check.
    pub fn with_liveness_check(
        mut self,
        name: impl Into<String>,
        check: impl Fn() -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.liveness.insert(name.into(), Arc::new(check));

        self
    }

    /// Registers a named readiness check.
    pub fn with_readiness_check(
        mut self,
        name: impl Into<String>,
        check: impl Fn() -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.readiness.insert(name.into(), Arc::new(check));

        self
    }
}

impl HealthProbes {
    /// Evaluates every registered liveness check.
    pub async fn evaluate_liveness(&self) -> ProbeReport {
        Self::evaluate(&self.liveness).await
    }

    /// Evaluates every registered readiness check.
    pub async fn evaluate_readiness(&self) -> ProbeReport {
        Self::evaluate(&self.readiness).await
    }

    async fn evaluate(checks: &BTreeMap<String, Check>) -> ProbeReport {
        let mut outcomes = BTreeMap::new();

        for (name, check) in checks {
            let check = Arc::clone(check);

            let outcome = match tokio::task::spawn_blocking(move || check()).await {
                Ok(Ok(())) => OUTCOME_OK.to_string(),
                Ok(Err(error)) => {
                    warn!(check = %name, %error, "Health check failed");

                    error.to_string()
                }
                Err(_) => {
                    warn!(check = %name, "Health check panicked");

                    "check panicked".to_string()
                }
            };

            outcomes.insert(name.clone(), outcome);
        }

        ProbeReport { checks: outcomes }
    }

    /// Creates an [`axum` router](Router) serving the liveness probe at
    /// `/live` and the readiness probe at `/ready`.
    ///
    /// Both respond with the JSON [`ProbeReport`]: status `200` when every
    /// check passes, `503` otherwise.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/live", get(serve_liveness))
            .route("/ready", get(serve_readiness))
            .with_state(self.clone())
    }
}

async fn serve_liveness(State(probes): State<HealthProbes>) -> (StatusCode, Json<ProbeReport>) {
    respond(probes.evaluate_liveness().await)
}

async fn serve_readiness(State(probes): State<HealthProbes>) -> (StatusCode, Json<ProbeReport>) {
    respond(probes.evaluate_readiness().await)
}

fn respond(report: ProbeReport) -> (StatusCode, Json<ProbeReport>) {
    let status = if report.healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report))
}
