//! Submission list loader
//!
//! Fetch -> map -> enrich. Enrichment backfills missing GPA values with one
//! student lookup each, bounded by a semaphore and a per-request timeout.

use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use serde_json::Value as JsonValue;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::clients::AgmsClient;
use crate::config::Config;
use crate::error::Result;
use crate::infrastructure::Backend;
use crate::models::submission::gpa_from_json;
use crate::models::{Role, Submission};
use crate::workflow::ReviewCtx;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    /// Backend answered 404: the endpoint is not deployed yet or there is nothing to show
    Unavailable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentStats {
    pub attempted: usize,
    pub filled: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct SubmissionsLoad {
    pub submissions: Vec<Submission>,
    pub availability: Availability,
    pub enrichment: EnrichmentStats,
}

pub struct SubmissionLoader {
    max_concurrent: usize,
    enrichment_timeout: Duration,
}

impl SubmissionLoader {
    pub fn new(config: &Config) -> Self {
        Self::with_limits(config.max_concurrent_enrichment, config.enrichment_timeout())
    }

    pub fn with_limits(max_concurrent: usize, enrichment_timeout: Duration) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            enrichment_timeout,
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Load the list for `ctx` and enrich it
    pub async fn load<B: Backend>(
        &self,
        client: &AgmsClient<B>,
        ctx: &ReviewCtx,
    ) -> Result<SubmissionsLoad> {
        let Some(mut submissions) = self.fetch(client, ctx.role, &ctx.list_path()).await? else {
            info!("{} list not available on backend, showing empty list", ctx);
            return Ok(SubmissionsLoad {
                submissions: Vec::new(),
                availability: Availability::Unavailable,
                enrichment: EnrichmentStats::default(),
            });
        };

        let enrichment = self.enrich(client, &mut submissions).await;
        info!(
            "{} loaded {} submissions (GPA backfilled {}/{})",
            ctx,
            submissions.len(),
            enrichment.filled,
            enrichment.attempted
        );

        Ok(SubmissionsLoad {
            submissions,
            availability: Availability::Available,
            enrichment,
        })
    }

    /// Fetch and map one collection; `None` on 404
    pub async fn fetch<B: Backend>(
        &self,
        client: &AgmsClient<B>,
        role: Role,
        path: &str,
    ) -> Result<Option<Vec<Submission>>> {
        let raw = if role == Role::Student {
            client.submission(path).await.map(|one| one.into_iter().collect::<Vec<_>>())
        } else {
            client.submissions(path).await
        };

        match raw {
            Ok(items) => Ok(Some(Submission::list_from_json(items, Utc::now()))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Backfill GPA where missing or invalid. Failures leave the GPA unset.
    pub async fn enrich<B: Backend>(
        &self,
        client: &AgmsClient<B>,
        submissions: &mut [Submission],
    ) -> EnrichmentStats {
        let targets: Vec<(usize, String)> = submissions
            .iter()
            .enumerate()
            .filter(|(_, s)| s.needs_gpa())
            .map(|(i, s)| (i, s.student_number.clone()))
            .collect();

        let mut stats = EnrichmentStats {
            attempted: targets.len(),
            ..Default::default()
        };
        if targets.is_empty() {
            return stats;
        }

        let semaphore = Semaphore::new(self.max_concurrent);
        let deadline = self.enrichment_timeout;
        let lookups = targets.into_iter().map(|(index, student_number)| {
            let semaphore = &semaphore;
            async move {
                if student_number.is_empty() {
                    return (index, None);
                }
                let Ok(_permit) = semaphore.acquire().await else {
                    return (index, None);
                };
                let gpa = match timeout(deadline, client.student(&student_number, deadline)).await {
                    Ok(Ok(record)) => extract_gpa(&record),
                    Ok(Err(e)) => {
                        debug!("GPA lookup for {} failed: {}", student_number, e);
                        None
                    }
                    Err(_) => {
                        debug!("GPA lookup for {} timed out", student_number);
                        None
                    }
                };
                (index, gpa)
            }
        });

        for (index, gpa) in join_all(lookups).await {
            match gpa {
                Some(gpa) => {
                    submissions[index].gpa = Some(gpa);
                    stats.filled += 1;
                }
                None => stats.failed += 1,
            }
        }

        if stats.failed > 0 {
            warn!("GPA backfill failed for {}/{} submissions", stats.failed, stats.attempted);
        }
        stats
    }
}

/// GPA from a student record: top level or under `data` / `student` / `academicInfo`
pub fn extract_gpa(record: &JsonValue) -> Option<f64> {
    const KEYS: [&str; 3] = ["gpa", "cgpa", "GPA"];
    let direct = KEYS.iter().find_map(|k| record.get(*k).and_then(gpa_from_json));
    direct.or_else(|| {
        ["data", "student", "academicInfo"]
            .iter()
            .filter_map(|wrapper| record.get(*wrapper))
            .find_map(|inner| KEYS.iter().find_map(|k| inner.get(*k).and_then(gpa_from_json)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gpa_found_at_top_level_or_nested() {
        assert_eq!(extract_gpa(&json!({ "gpa": 3.2 })), Some(3.2));
        assert_eq!(extract_gpa(&json!({ "data": { "cgpa": "2.75" } })), Some(2.75));
        assert_eq!(extract_gpa(&json!({ "student": { "gpa": 9.0 } })), None);
        assert_eq!(extract_gpa(&json!({ "name": "x" })), None);
    }
}
