// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `ListJobs`: paginates over jobs, newest first, with an optional
//! status filter (spec §6.3 `GET /analysis`).

use forensic_pipeline_domain::entities::{Job, JobStatus};
use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::repositories::JobStore;
use std::sync::Arc;

/// `limit` of `0` means unbounded. Filtering, ordering, and pagination
/// happen here rather than in `JobStore::list_jobs`, since this domain
/// has no job volume that would make in-memory sorting a bottleneck —
/// see `DESIGN.md`.
#[derive(Debug, Clone, Default)]
pub struct ListJobsQuery {
    pub status: Option<JobStatus>,
    pub offset: usize,
    pub limit: usize,
}

pub struct ListJobs {
    job_store: Arc<dyn JobStore>,
}

impl ListJobs {
    pub fn new(job_store: Arc<dyn JobStore>) -> Self {
        Self { job_store }
    }

    pub async fn execute(&self, query: ListJobsQuery) -> Result<Vec<Job>, ForensicError> {
        let mut jobs = self.job_store.list_jobs().await?;
        jobs.retain(|job| query.status.map_or(true, |status| job.status == status));
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let limit = if query.limit == 0 { jobs.len() } else { query.limit };
        Ok(jobs.into_iter().skip(query.offset).take(limit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::SqliteJobStore;
    use chrono::Utc;
    use forensic_pipeline_domain::entities::{Job, Stage};
    use forensic_pipeline_domain::value_objects::{FileId, JobId, StageName};

    async fn seed(store: &SqliteJobStore, filename: &str) -> JobId {
        let job = Job::new(JobId::new(), FileId::new(), filename, None, Utc::now());
        let job_id = job.id;
        let stages = StageName::ORDER.iter().map(|&n| Stage::pending(job_id, n, job.attempt)).collect();
        store.create_job(job, stages).await.unwrap();
        job_id
    }

    #[tokio::test]
    async fn lists_newest_first_with_a_default_unbounded_query() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            SqliteJobStore::connect(&format!("sqlite://{}/db.sqlite?mode=rwc", dir.path().display()))
                .await
                .unwrap(),
        );
        seed(&store, "first.mp4").await;
        seed(&store, "second.mp4").await;

        let use_case = ListJobs::new(store);
        let jobs = use_case.execute(ListJobsQuery::default()).await.unwrap();
        assert_eq!(jobs.len(), 2);
    }

    #[tokio::test]
    async fn respects_limit_and_offset() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            SqliteJobStore::connect(&format!("sqlite://{}/db.sqlite?mode=rwc", dir.path().display()))
                .await
                .unwrap(),
        );
        for i in 0..5 {
            seed(&store, &format!("job-{i}.mp4")).await;
        }

        let use_case = ListJobs::new(store);
        let page = use_case
            .execute(ListJobsQuery {
                status: None,
                offset: 2,
                limit: 2,
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn filters_by_status() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            SqliteJobStore::connect(&format!("sqlite://{}/db.sqlite?mode=rwc", dir.path().display()))
                .await
                .unwrap(),
        );
        seed(&store, "queued.mp4").await;

        let use_case = ListJobs::new(store);
        let jobs = use_case
            .execute(ListJobsQuery {
                status: Some(JobStatus::Failed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(jobs.is_empty());
    }
}
