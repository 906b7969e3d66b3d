use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Liveness response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Liveness check served at `/health`.
#[derive(Clone)]
pub struct HealthService;

impl HealthService {
    /// Reports the service as alive; the check needs no library access.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Holdings is alive".into(),
        }
    }
}
