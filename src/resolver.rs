use crate::client::{Fetch, FetchError};
use crate::normalize::{normalize, PayloadError};
use crate::report::CanonicalReport;
use crate::source::{SourceRegistry, SourceSpec};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Success(CanonicalReport),
    AllSourcesFailed,
}

/// Why a single source did not produce a report.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Tries the registry in order, one attempt per source, first answer wins.
pub struct Resolver<'a, F> {
    registry: &'a SourceRegistry,
    fetcher: &'a F,
}

impl<'a, F: Fetch> Resolver<'a, F> {
    pub fn new(registry: &'a SourceRegistry, fetcher: &'a F) -> Self {
        Self { registry, fetcher }
    }

    pub async fn resolve(&self, ip: &str) -> LookupOutcome {
        for source in self.registry {
            match self.try_source(source, ip).await {
                Ok(report) => {
                    log::info!(r#"lookup of "{}" answered by {}"#, ip, source.name);
                    return LookupOutcome::Success(report);
                }
                // The fetcher logs its own attempts
                Err(SourceError::Fetch(_)) => {}
                Err(err @ SourceError::Payload(_)) => {
                    log::warn!("{}: unusable response: {}", source.name, err)
                }
            }
        }
        log::warn!(
            r#"lookup of "{}" failed, all {} sources exhausted"#,
            ip,
            self.registry.len()
        );
        LookupOutcome::AllSourcesFailed
    }

    async fn try_source(&self, source: &SourceSpec, ip: &str) -> Result<CanonicalReport, SourceError> {
        let response = self.fetcher.fetch(source, ip).await?;
        Ok(normalize(source, &response.body)?)
    }
}
