//! Creative suggestion ("sage") service.
//!
//! Sends the whole catalog and idea board to a [`SageClient`] and returns its
//! free-form suggestions. Nothing is persisted.

use crate::ai::{SageClient, SageRequest, SageResponse};
use crate::repo::idea_repo::IdeaRepository;
use crate::repo::record_repo::{RecordListQuery, RecordRepository};
use crate::service::{ServiceError, ServiceResult};
use log::{info, warn};

pub struct SageService<R, I, S> {
    records: R,
    ideas: I,
    client: S,
}

impl<R, I, S> SageService<R, I, S>
where
    R: RecordRepository,
    I: IdeaRepository,
    S: SageClient,
{
    pub fn new(records: R, ideas: I, client: S) -> Self {
        Self {
            records,
            ideas,
            client,
        }
    }

    /// Consults the sage with an optional theme.
    ///
    /// # Errors
    /// - `EmptyCatalog` when there are neither records nor ideas.
    /// - `Generation` when the remote call fails.
    pub async fn consult(&self, seed: Option<&str>) -> ServiceResult<SageResponse> {
        let records = self.records.list_records(&RecordListQuery::default())?;
        let ideas = self.ideas.list_ideas()?;
        if records.is_empty() && ideas.is_empty() {
            return Err(ServiceError::EmptyCatalog);
        }

        let request = SageRequest {
            records: &records,
            ideas: &ideas,
            seed,
        };
        match self.client.consult(request).await {
            Ok(response) => {
                info!(
                    "event=sage_consult module=service status=ok records={} ideas={} titles={}",
                    records.len(),
                    ideas.len(),
                    response.titles.len()
                );
                Ok(response)
            }
            Err(err) => {
                warn!(
                    "event=sage_consult module=service status=error error_code={} error={err}",
                    err.code()
                );
                Err(err.into())
            }
        }
    }
}
