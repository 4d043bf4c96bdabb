// /////////////////////////////////////////////////////////////////////////////
// Forensic Video Pipeline
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! `SqliteJobStore`: the durable `JobStore` (C3), backed by `sqlx`'s
//! SQLite driver with proper relational columns per table rather than a
//! single opaque JSON blob column, so the two composite operations of
//! spec §4.3 ("create job with stages", "admit stage") can be expressed
//! as ordinary transactions.

use forensic_pipeline_domain::entities::{FileRecord, Job, JobStatus, Stage, StageStatus, StorageLocation, Upload};
use forensic_pipeline_domain::error::ForensicError;
use forensic_pipeline_domain::repositories::JobStore;
use forensic_pipeline_domain::value_objects::{FileId, JobId, StageName, UploadId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use std::collections::BTreeSet;
use std::str::FromStr;

pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    pub async fn connect(database_url: &str) -> Result<Self, ForensicError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(database_url)
            .await
            .map_err(db_err)?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), ForensicError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS uploads (
                id TEXT PRIMARY KEY,
                original_filename TEXT NOT NULL,
                total_size_bytes INTEGER NOT NULL,
                total_chunks INTEGER NOT NULL,
                received_chunks TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS file_records (
                id TEXT PRIMARY KEY,
                original_filename TEXT NOT NULL,
                content_type TEXT,
                size_bytes INTEGER NOT NULL,
                sha256 TEXT NOT NULL,
                location TEXT NOT NULL,
                mirrored_location TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                source_file TEXT NOT NULL,
                original_filename TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                started_at TEXT,
                completed_at TEXT,
                failure_reason TEXT,
                webhook_url TEXT,
                attempt INTEGER NOT NULL,
                report_file_id TEXT,
                clean_video_id TEXT
            );

            CREATE TABLE IF NOT EXISTS stages (
                job_id TEXT NOT NULL,
                name TEXT NOT NULL,
                attempt INTEGER NOT NULL,
                status TEXT NOT NULL,
                started_at TEXT,
                completed_at TEXT,
                error_message TEXT,
                result TEXT,
                PRIMARY KEY (job_id, name)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }
}

fn db_err(err: sqlx::Error) -> ForensicError {
    ForensicError::transient(format!("database error: {err}"))
}

fn rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_rfc3339(s: &str) -> Result<DateTime<Utc>, ForensicError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ForensicError::internal(format!("corrupt timestamp in storage: {e}")))
}

fn parse_rfc3339_opt(s: Option<String>) -> Result<Option<DateTime<Utc>>, ForensicError> {
    s.map(|s| parse_rfc3339(&s)).transpose()
}

fn location_to_json(location: &StorageLocation) -> Result<String, ForensicError> {
    serde_json::to_string(location).map_err(ForensicError::from)
}

fn location_from_json(s: &str) -> Result<StorageLocation, ForensicError> {
    serde_json::from_str(s).map_err(ForensicError::from)
}

fn file_record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<FileRecord, ForensicError> {
    let id: String = row.try_get("id").map_err(db_err)?;
    let location: String = row.try_get("location").map_err(db_err)?;
    let mirrored: Option<String> = row.try_get("mirrored_location").map_err(db_err)?;
    Ok(FileRecord {
        id: FileId::from_str(&id).map_err(|e| ForensicError::internal(e.to_string()))?,
        original_filename: row.try_get("original_filename").map_err(db_err)?,
        content_type: row.try_get("content_type").map_err(db_err)?,
        size_bytes: row.try_get::<i64, _>("size_bytes").map_err(db_err)? as u64,
        sha256: row.try_get("sha256").map_err(db_err)?,
        location: location_from_json(&location)?,
        mirrored_location: mirrored.map(|s| location_from_json(&s)).transpose()?,
        created_at: parse_rfc3339(&row.try_get::<String, _>("created_at").map_err(db_err)?)?,
    })
}

fn job_status_str(status: JobStatus) -> &'static str {
    status.as_str()
}

fn job_status_from_str(s: &str) -> Result<JobStatus, ForensicError> {
    match s {
        "pending" => Ok(JobStatus::Pending),
        "running" => Ok(JobStatus::Running),
        "completed" => Ok(JobStatus::Completed),
        "failed" => Ok(JobStatus::Failed),
        other => Err(ForensicError::internal(format!("corrupt job status in storage: {other}"))),
    }
}

fn stage_status_str(status: StageStatus) -> &'static str {
    status.as_str()
}

fn stage_status_from_str(s: &str) -> Result<StageStatus, ForensicError> {
    match s {
        "pending" => Ok(StageStatus::Pending),
        "running" => Ok(StageStatus::Running),
        "completed" => Ok(StageStatus::Completed),
        "failed" => Ok(StageStatus::Failed),
        other => Err(ForensicError::internal(format!("corrupt stage status in storage: {other}"))),
    }
}

fn file_id_opt_from_str(s: Option<String>) -> Result<Option<FileId>, ForensicError> {
    s.map(|s| FileId::from_str(&s).map_err(|e| ForensicError::internal(e.to_string())))
        .transpose()
}

fn job_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Job, ForensicError> {
    let id: String = row.try_get("id").map_err(db_err)?;
    let source_file: String = row.try_get("source_file").map_err(db_err)?;
    let status: String = row.try_get("status").map_err(db_err)?;
    Ok(Job {
        id: JobId::from_str(&id).map_err(|e| ForensicError::internal(e.to_string()))?,
        source_file: FileId::from_str(&source_file).map_err(|e| ForensicError::internal(e.to_string()))?,
        original_filename: row.try_get("original_filename").map_err(db_err)?,
        status: job_status_from_str(&status)?,
        created_at: parse_rfc3339(&row.try_get::<String, _>("created_at").map_err(db_err)?)?,
        started_at: parse_rfc3339_opt(row.try_get("started_at").map_err(db_err)?)?,
        completed_at: parse_rfc3339_opt(row.try_get("completed_at").map_err(db_err)?)?,
        failure_reason: row.try_get("failure_reason").map_err(db_err)?,
        webhook_url: row.try_get("webhook_url").map_err(db_err)?,
        attempt: row.try_get::<i64, _>("attempt").map_err(db_err)? as u32,
        report_file_id: file_id_opt_from_str(row.try_get("report_file_id").map_err(db_err)?)?,
        clean_video_id: file_id_opt_from_str(row.try_get("clean_video_id").map_err(db_err)?)?,
    })
}

fn stage_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Stage, ForensicError> {
    let job_id: String = row.try_get("job_id").map_err(db_err)?;
    let name: String = row.try_get("name").map_err(db_err)?;
    let status: String = row.try_get("status").map_err(db_err)?;
    let result: Option<String> = row.try_get("result").map_err(db_err)?;
    Ok(Stage {
        job_id: JobId::from_str(&job_id).map_err(|e| ForensicError::internal(e.to_string()))?,
        name: StageName::from_str(&name)?,
        attempt: row.try_get::<i64, _>("attempt").map_err(db_err)? as u32,
        status: stage_status_from_str(&status)?,
        started_at: parse_rfc3339_opt(row.try_get("started_at").map_err(db_err)?)?,
        completed_at: parse_rfc3339_opt(row.try_get("completed_at").map_err(db_err)?)?,
        error_message: row.try_get("error_message").map_err(db_err)?,
        result: result.map(|s| serde_json::from_str(&s)).transpose().map_err(ForensicError::from)?,
    })
}

async fn insert_file_tx(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, file: &FileRecord) -> Result<(), ForensicError> {
    sqlx::query(
        "INSERT INTO file_records (id, original_filename, content_type, size_bytes, sha256, location, mirrored_location, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(file.id.to_string())
    .bind(&file.original_filename)
    .bind(&file.content_type)
    .bind(file.size_bytes as i64)
    .bind(&file.sha256)
    .bind(location_to_json(&file.location)?)
    .bind(file.mirrored_location.as_ref().map(location_to_json).transpose()?)
    .bind(rfc3339(file.created_at))
    .execute(&mut **tx)
    .await
    .map_err(db_err)?;
    Ok(())
}

async fn insert_job_tx(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, job: &Job) -> Result<(), ForensicError> {
    sqlx::query(
        "INSERT INTO jobs (id, source_file, original_filename, status, created_at, started_at, completed_at, failure_reason, webhook_url, attempt, report_file_id, clean_video_id) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(job.id.to_string())
    .bind(job.source_file.to_string())
    .bind(&job.original_filename)
    .bind(job_status_str(job.status))
    .bind(rfc3339(job.created_at))
    .bind(job.started_at.map(rfc3339))
    .bind(job.completed_at.map(rfc3339))
    .bind(&job.failure_reason)
    .bind(&job.webhook_url)
    .bind(job.attempt as i64)
    .bind(job.report_file_id.map(|id| id.to_string()))
    .bind(job.clean_video_id.map(|id| id.to_string()))
    .execute(&mut **tx)
    .await
    .map_err(db_err)?;
    Ok(())
}

async fn insert_stages_tx(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, stages: &[Stage]) -> Result<(), ForensicError> {
    for stage in stages {
        sqlx::query(
            "INSERT INTO stages (job_id, name, attempt, status, started_at, completed_at, error_message, result) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(stage.job_id.to_string())
        .bind(stage.name.as_str())
        .bind(stage.attempt as i64)
        .bind(stage_status_str(stage.status))
        .bind(stage.started_at.map(rfc3339))
        .bind(stage.completed_at.map(rfc3339))
        .bind(&stage.error_message)
        .bind(stage.result.as_ref().map(serde_json::to_string).transpose().map_err(ForensicError::from)?)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;
    }
    Ok(())
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn create_upload(&self, upload: Upload) -> Result<(), ForensicError> {
        let received: Vec<u32> = upload.received_chunks.iter().copied().collect();
        sqlx::query(
            "INSERT INTO uploads (id, original_filename, total_size_bytes, total_chunks, received_chunks, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(upload.id.to_string())
        .bind(&upload.original_filename)
        .bind(upload.total_size_bytes as i64)
        .bind(upload.total_chunks as i64)
        .bind(serde_json::to_string(&received).map_err(ForensicError::from)?)
        .bind(rfc3339(upload.created_at))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_upload(&self, id: UploadId) -> Result<Upload, ForensicError> {
        let row = sqlx::query("SELECT * FROM uploads WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ForensicError::not_found(format!("upload {id} not found")))?;

        let received_json: String = row.try_get("received_chunks").map_err(db_err)?;
        let received: Vec<u32> = serde_json::from_str(&received_json).map_err(ForensicError::from)?;
        Ok(Upload {
            id,
            original_filename: row.try_get("original_filename").map_err(db_err)?,
            total_size_bytes: row.try_get::<i64, _>("total_size_bytes").map_err(db_err)? as u64,
            total_chunks: row.try_get::<i64, _>("total_chunks").map_err(db_err)? as u32,
            received_chunks: received.into_iter().collect::<BTreeSet<u32>>(),
            created_at: parse_rfc3339(&row.try_get::<String, _>("created_at").map_err(db_err)?)?,
        })
    }

    async fn record_chunk(&self, id: UploadId, index: u32) -> Result<Upload, ForensicError> {
        let mut upload = self.get_upload(id).await?;
        upload.record_chunk(index)?;
        let received: Vec<u32> = upload.received_chunks.iter().copied().collect();
        sqlx::query("UPDATE uploads SET received_chunks = ? WHERE id = ?")
            .bind(serde_json::to_string(&received).map_err(ForensicError::from)?)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(upload)
    }

    async fn delete_upload(&self, id: UploadId) -> Result<(), ForensicError> {
        sqlx::query("DELETE FROM uploads WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn save_file(&self, file: FileRecord) -> Result<(), ForensicError> {
        sqlx::query(
            "INSERT INTO file_records (id, original_filename, content_type, size_bytes, sha256, location, mirrored_location, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(file.id.to_string())
        .bind(&file.original_filename)
        .bind(&file.content_type)
        .bind(file.size_bytes as i64)
        .bind(&file.sha256)
        .bind(location_to_json(&file.location)?)
        .bind(file.mirrored_location.as_ref().map(location_to_json).transpose()?)
        .bind(rfc3339(file.created_at))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_file(&self, id: FileId) -> Result<FileRecord, ForensicError> {
        let row = sqlx::query("SELECT * FROM file_records WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ForensicError::not_found(format!("file {id} not found")))?;
        file_record_from_row(&row)
    }

    async fn update_file(&self, file: FileRecord) -> Result<(), ForensicError> {
        sqlx::query("UPDATE file_records SET mirrored_location = ? WHERE id = ?")
            .bind(file.mirrored_location.as_ref().map(location_to_json).transpose()?)
            .bind(file.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn create_job(&self, job: Job, stages: Vec<Stage>) -> Result<(), ForensicError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        insert_job_tx(&mut tx, &job).await?;
        insert_stages_tx(&mut tx, &stages).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn create_job_with_file(&self, file: FileRecord, job: Job, stages: Vec<Stage>) -> Result<(), ForensicError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        insert_file_tx(&mut tx, &file).await?;
        insert_job_tx(&mut tx, &job).await?;
        insert_stages_tx(&mut tx, &stages).await?;
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn get_job(&self, id: JobId) -> Result<Job, ForensicError> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ForensicError::not_found(format!("job {id} not found")))?;
        job_from_row(&row)
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, ForensicError> {
        let rows = sqlx::query("SELECT * FROM jobs ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(job_from_row).collect()
    }

    async fn admit_stage(&self, job_id: JobId, stage: StageName) -> Result<(Job, Stage), ForensicError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let job_row = sqlx::query("SELECT * FROM jobs WHERE id = ?")
            .bind(job_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ForensicError::not_found(format!("job {job_id} not found")))?;
        let mut job = job_from_row(&job_row)?;

        let stage_row = sqlx::query("SELECT * FROM stages WHERE job_id = ? AND name = ?")
            .bind(job_id.to_string())
            .bind(stage.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ForensicError::not_found(format!("stage {stage} for job {job_id} not found")))?;
        let mut stage_row = stage_from_row(&stage_row)?;

        if stage_row.status != StageStatus::Pending {
            return Err(ForensicError::conflict(format!(
                "stage {stage} for job {job_id} is not pending"
            )));
        }

        let now = Utc::now();
        job.mark_running(now)?;
        stage_row.start(now);

        sqlx::query("UPDATE jobs SET status = ?, started_at = ? WHERE id = ?")
            .bind(job_status_str(job.status))
            .bind(job.started_at.map(rfc3339))
            .bind(job_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        sqlx::query("UPDATE stages SET status = ?, started_at = ? WHERE job_id = ? AND name = ?")
            .bind(stage_status_str(stage_row.status))
            .bind(stage_row.started_at.map(rfc3339))
            .bind(job_id.to_string())
            .bind(stage.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok((job, stage_row))
    }

    async fn update_job(&self, job: Job) -> Result<(), ForensicError> {
        sqlx::query(
            "UPDATE jobs SET status = ?, started_at = ?, completed_at = ?, failure_reason = ?, attempt = ?, report_file_id = ?, clean_video_id = ? WHERE id = ?",
        )
        .bind(job_status_str(job.status))
        .bind(job.started_at.map(rfc3339))
        .bind(job.completed_at.map(rfc3339))
        .bind(&job.failure_reason)
        .bind(job.attempt as i64)
        .bind(job.report_file_id.map(|id| id.to_string()))
        .bind(job.clean_video_id.map(|id| id.to_string()))
        .bind(job.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update_stage(&self, stage: Stage) -> Result<(), ForensicError> {
        sqlx::query(
            "UPDATE stages SET attempt = ?, status = ?, started_at = ?, completed_at = ?, error_message = ?, result = ? WHERE job_id = ? AND name = ?",
        )
        .bind(stage.attempt as i64)
        .bind(stage_status_str(stage.status))
        .bind(stage.started_at.map(rfc3339))
        .bind(stage.completed_at.map(rfc3339))
        .bind(&stage.error_message)
        .bind(stage.result.as_ref().map(serde_json::to_string).transpose().map_err(ForensicError::from)?)
        .bind(stage.job_id.to_string())
        .bind(stage.name.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_stage(&self, job_id: JobId, stage: StageName) -> Result<Stage, ForensicError> {
        let row = sqlx::query("SELECT * FROM stages WHERE job_id = ? AND name = ?")
            .bind(job_id.to_string())
            .bind(stage.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ForensicError::not_found(format!("stage {stage} for job {job_id} not found")))?;
        stage_from_row(&row)
    }

    async fn list_stages(&self, job_id: JobId) -> Result<Vec<Stage>, ForensicError> {
        let rows = sqlx::query("SELECT * FROM stages WHERE job_id = ?")
            .bind(job_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let mut stages: Vec<Stage> = rows.iter().map(stage_from_row).collect::<Result<_, _>>()?;
        stages.sort_by_key(|s| s.name.position());
        Ok(stages)
    }

    async fn list_running_jobs(&self) -> Result<Vec<Job>, ForensicError> {
        let rows = sqlx::query("SELECT * FROM jobs WHERE status = 'running'")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(job_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forensic_pipeline_domain::entities::StorageLocation;
    use forensic_pipeline_domain::value_objects::FileId;

    async fn new_store() -> SqliteJobStore {
        SqliteJobStore::connect("sqlite::memory:").await.unwrap()
    }

    fn new_job_with_stages() -> (Job, Vec<Stage>) {
        let job = Job::new(JobId::new(), FileId::new(), "clip.mp4", None, Utc::now());
        let stages = StageName::ORDER
            .iter()
            .map(|&name| Stage::pending(job.id, name, job.attempt))
            .collect();
        (job, stages)
    }

    #[tokio::test]
    async fn create_and_fetch_job_round_trips() {
        let store = new_store().await;
        let (job, stages) = new_job_with_stages();
        store.create_job(job.clone(), stages).await.unwrap();
        let fetched = store.get_job(job.id).await.unwrap();
        assert_eq!(fetched.id, job.id);
        assert_eq!(fetched.status, JobStatus::Pending);
        let stages = store.list_stages(job.id).await.unwrap();
        assert_eq!(stages.len(), 5);
        assert_eq!(stages[0].name, StageName::MetadataExtraction);
    }

    #[tokio::test]
    async fn create_job_with_file_writes_all_three_tables_together() {
        let store = new_store().await;
        let file = FileRecord::new(
            FileId::new(),
            "evidence.mp4",
            Some("video/mp4".to_string()),
            20,
            "deadbeef",
            StorageLocation::Local { path: "/data/evidence.mp4".to_string() },
            Utc::now(),
        );
        let job = Job::new(JobId::new(), file.id, "evidence.mp4", None, Utc::now());
        let stages = StageName::ORDER.iter().map(|&name| Stage::pending(job.id, name, job.attempt)).collect();
        let job_id = job.id;

        store.create_job_with_file(file.clone(), job, stages).await.unwrap();

        let fetched_job = store.get_job(job_id).await.unwrap();
        assert_eq!(fetched_job.source_file, file.id);
        let fetched_file = store.get_file(file.id).await.unwrap();
        assert_eq!(fetched_file.sha256, "deadbeef");
        assert_eq!(store.list_stages(job_id).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn admit_stage_is_conflict_when_not_pending() {
        let store = new_store().await;
        let (job, stages) = new_job_with_stages();
        store.create_job(job.clone(), stages).await.unwrap();
        store.admit_stage(job.id, StageName::MetadataExtraction).await.unwrap();
        let err = store.admit_stage(job.id, StageName::MetadataExtraction).await.unwrap_err();
        assert_eq!(err.category(), "conflict");
    }

    #[tokio::test]
    async fn admit_stage_transitions_job_and_stage_to_running() {
        let store = new_store().await;
        let (job, stages) = new_job_with_stages();
        store.create_job(job.clone(), stages).await.unwrap();
        let (job, stage) = store.admit_stage(job.id, StageName::MetadataExtraction).await.unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(stage.status, StageStatus::Running);
    }

    #[tokio::test]
    async fn file_record_round_trips_with_location() {
        let store = new_store().await;
        let file = FileRecord::new(
            FileId::new(),
            "clip.mp4",
            Some("video/mp4".to_string()),
            2048,
            "deadbeef",
            StorageLocation::Local { path: "/data/clip.mp4".to_string() },
            Utc::now(),
        );
        store.save_file(file.clone()).await.unwrap();
        let fetched = store.get_file(file.id).await.unwrap();
        assert_eq!(fetched.sha256, "deadbeef");
        assert!(matches!(fetched.location, StorageLocation::Local { .. }));
    }

    #[tokio::test]
    async fn upload_lifecycle_round_trips() {
        let store = new_store().await;
        let upload = Upload::new(UploadId::new(), "clip.mp4", 10, 2, Utc::now()).unwrap();
        store.create_upload(upload.clone()).await.unwrap();
        let refreshed = store.record_chunk(upload.id, 1).await.unwrap();
        assert_eq!(refreshed.chunks_received(), 1);
        store.delete_upload(upload.id).await.unwrap();
        let err = store.get_upload(upload.id).await.unwrap_err();
        assert_eq!(err.category(), "not_found");
    }
}
