//! State behind one donor's profile page.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::api::{ApiError, DonorApi, Ein, Organization, OrganizationEnrichment};

/// Everything the profile page renders.
#[derive(Debug, Clone, PartialEq)]
pub struct DonorProfile {
    pub organization: Organization,
    pub enrichment: Option<OrganizationEnrichment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Idle,
    Loading,
    Ready(DonorProfile),
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailRequest {
    pub ticket: u64,
    pub ein: Ein,
}

impl DetailRequest {
    /// Fetches the organization and its enrichment record concurrently. Either
    /// failure fails the whole load.
    pub async fn execute<A>(&self, api: &A) -> DetailResponse
    where
        A: DonorApi + ?Sized,
    {
        let outcome = fetch_profile(api, self.ein).await;
        DetailResponse {
            ticket: self.ticket,
            outcome,
        }
    }
}

#[derive(Debug)]
pub struct DetailResponse {
    pub ticket: u64,
    pub outcome: Result<DonorProfile, ApiError>,
}

/// EINs with an enrichment trigger in flight. Clones share one set, so every
/// view of a donor can tell that its trigger is still running.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentTracker {
    in_flight: Arc<Mutex<HashSet<Ein>>>,
}

impl EnrichmentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self, ein: Ein) -> bool {
        self.in_flight().contains(&ein)
    }

    /// Marks `ein` as in flight until the returned claim is dropped. `None`
    /// when a trigger for it is already running.
    pub fn claim(&self, ein: Ein) -> Option<EnrichmentClaim> {
        if !self.in_flight().insert(ein) {
            return None;
        }
        Some(EnrichmentClaim {
            tracker: self.clone(),
            ein,
        })
    }

    fn in_flight(&self) -> MutexGuard<'_, HashSet<Ein>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
pub struct EnrichmentClaim {
    tracker: EnrichmentTracker,
    ein: Ein,
}

impl EnrichmentClaim {
    pub fn ein(&self) -> Ein {
        self.ein
    }
}

impl Drop for EnrichmentClaim {
    fn drop(&mut self) {
        self.tracker.in_flight().remove(&self.ein);
    }
}

pub async fn fetch_profile<A>(api: &A, ein: Ein) -> Result<DonorProfile, ApiError>
where
    A: DonorApi + ?Sized,
{
    let (organization, enrichment) = tokio::try_join!(
        api.get_organization(ein),
        api.get_organization_enrichment(ein)
    )?;
    Ok(DonorProfile {
        organization,
        enrichment,
    })
}

/// Queues an enrichment job, logging the outcome.
pub async fn request_enrichment<A>(api: &A, ein: Ein) -> Result<(), ApiError>
where
    A: DonorApi + ?Sized,
{
    match api.trigger_enrichment(ein).await {
        Ok(()) => {
            info!(%ein, "enrichment requested");
            Ok(())
        }
        Err(err) => {
            warn!(%ein, error = %err, "enrichment request failed");
            Err(err)
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetailController {
    ein: Ein,
    state: DetailState,
    enriching: bool,
    latest_ticket: u64,
}

impl DetailController {
    pub fn new(ein: Ein) -> Self {
        Self {
            ein,
            state: DetailState::Idle,
            enriching: false,
            latest_ticket: 0,
        }
    }

    pub fn ein(&self) -> Ein {
        self.ein
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn profile(&self) -> Option<&DonorProfile> {
        match &self.state {
            DetailState::Ready(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn is_enriching(&self) -> bool {
        self.enriching
    }

    pub fn begin_load(&mut self) -> DetailRequest {
        self.state = DetailState::Loading;
        self.latest_ticket += 1;
        DetailRequest {
            ticket: self.latest_ticket,
            ein: self.ein,
        }
    }

    /// Applies a finished load. Responses to superseded loads are dropped and
    /// reported as `false`.
    pub fn complete(&mut self, response: DetailResponse) -> bool {
        if response.ticket != self.latest_ticket {
            return false;
        }

        self.state = match response.outcome {
            Ok(profile) => DetailState::Ready(profile),
            Err(err) if err.is_not_found() => {
                info!(ein = %self.ein, "donor not found");
                DetailState::NotFound
            }
            Err(err) => {
                warn!(ein = %self.ein, error = %err, "donor profile failed to load");
                DetailState::Failed(err.to_string())
            }
        };
        true
    }

    pub async fn load<A>(&mut self, api: &A)
    where
        A: DonorApi + ?Sized,
    {
        let request = self.begin_load();
        let response = request.execute(api).await;
        self.complete(response);
    }

    pub async fn retry<A>(&mut self, api: &A)
    where
        A: DonorApi + ?Sized,
    {
        self.load(api).await;
    }

    /// Marks an enrichment as in flight. Returns `false` if one already is.
    pub fn begin_enrichment(&mut self) -> bool {
        if self.enriching {
            return false;
        }
        self.enriching = true;
        true
    }

    /// Clears the in-flight flag. A successful trigger yields the reload to
    /// run next.
    pub fn finish_enrichment(&mut self, result: Result<(), ApiError>) -> Option<DetailRequest> {
        self.enriching = false;
        match result {
            Ok(()) => Some(self.begin_load()),
            Err(_) => None,
        }
    }
}
