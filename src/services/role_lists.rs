//! Subordinate list loader
//!
//! Reads each subordinate's finalization flag from the backend, then counts
//! that subordinate's submissions locally.

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::clients::{AgmsClient, RoleEndpoints};
use crate::error::Result;
use crate::infrastructure::Backend;
use crate::models::{Role, RoleList};
use crate::services::submissions::SubmissionLoader;

pub struct RoleListLoader<'a> {
    loader: &'a SubmissionLoader,
}

impl<'a> RoleListLoader<'a> {
    pub fn new(loader: &'a SubmissionLoader) -> Self {
        Self { loader }
    }

    /// Lists for every subordinate of `role`; empty for roles without subordinates
    pub async fn load<B: Backend>(&self, client: &AgmsClient<B>, role: Role) -> Result<Vec<RoleList>> {
        let Some(subordinate_role) = role.subordinate() else {
            return Ok(Vec::new());
        };

        let statuses = match client.subordinate_status().await {
            Ok(s) => s,
            Err(e) if e.is_not_found() => {
                info!("subordinate status not available on backend");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let endpoints = RoleEndpoints::for_role(subordinate_role);
        let semaphore = Semaphore::new(self.loader.max_concurrent());
        let fetches = statuses.iter().map(|status| {
            let semaphore = &semaphore;
            let path = endpoints.list_path(Some(&status.id.to_string()));
            async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return RoleList::empty(status, subordinate_role);
                };
                match self.loader.fetch(client, subordinate_role, &path).await {
                    Ok(Some(submissions)) => RoleList::derive(status, subordinate_role, &submissions),
                    Ok(None) => RoleList::empty(status, subordinate_role),
                    Err(e) => {
                        warn!("could not count {} list {}: {}", subordinate_role, status.id, e);
                        RoleList::empty(status, subordinate_role)
                    }
                }
            }
        });

        let lists = join_all(fetches).await;
        info!(
            "{} subordinate lists loaded, {} finalized",
            lists.len(),
            lists.iter().filter(|l| l.is_finalized).count()
        );
        Ok(lists)
    }
}
