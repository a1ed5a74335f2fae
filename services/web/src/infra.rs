use donor_finder::api::{DonorApi, HttpDonorApi};
use donor_finder::config::{ApiConfig, AppConfig};
use donor_finder::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Environment configuration with the `--api-url` override applied.
pub(crate) fn load_config(api_url: Option<&str>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(url) = api_url {
        config.api = ApiConfig::new(url, config.api.timeout)?;
    }
    Ok(config)
}

pub(crate) fn build_api(config: &ApiConfig) -> Result<Arc<dyn DonorApi>, AppError> {
    let client = HttpDonorApi::new(config)?;
    Ok(Arc::new(client))
}
