//! Resume ingestion — text extraction and the background scoring batch.
//!
//! A batch runs in a spawned task after the HTTP response is sent. Batches
//! for the same job are serialized through `JobLocks`, so a second
//! `POST /api/jobs/:id/resumes` while the first batch is still running waits
//! instead of interleaving writes. Errors are caught at the task boundary
//! and become a terminal `failed` job status, never a crash.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use bytes::Bytes;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::job::JobStatus;
use crate::state::AppState;
use crate::store;

/// An uploaded resume file, held in memory for the duration of the batch.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub filename: String,
    pub bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Text extraction
// ────────────────────────────────────────────────────────────────────────────

/// Extracts scoring text from an upload. Total: every input produces text.
///
/// PDFs go through `pdf-extract`; anything else is decoded as UTF-8 with a
/// Latin-1 fallback. A failed PDF extraction also falls back to Latin-1;
/// the scorer will classify unreadable bytes as a non-resume document.
pub fn extract_resume_text(file: &ResumeFile) -> String {
    if is_pdf(file) {
        match pdf_extract::extract_text_from_mem(&file.bytes) {
            Ok(text) => return text,
            Err(e) => {
                warn!("PDF extraction failed for '{}': {e}", file.filename);
            }
        }
    }
    match std::str::from_utf8(&file.bytes) {
        Ok(text) => text.to_string(),
        Err(_) => decode_latin1(&file.bytes),
    }
}

fn is_pdf(file: &ResumeFile) -> bool {
    file.filename.to_ascii_lowercase().ends_with(".pdf") || file.bytes.starts_with(b"%PDF")
}

/// Latin-1 maps every byte to the code point of the same value, so this
/// decode cannot fail.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Per-job batch serialization
// ────────────────────────────────────────────────────────────────────────────

/// Registry of per-job async mutexes. Concurrent resume batches against the
/// same job run one after another; batches for different jobs overlap freely.
#[derive(Clone, Default)]
pub struct JobLocks {
    inner: Arc<StdMutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

impl JobLocks {
    pub fn lock_for(&self, job_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut map = self.inner.lock().expect("job lock registry poisoned");
        map.entry(job_id).or_default().clone()
    }

    /// Drops the registry entry once no batch holds a reference to it.
    pub fn release(&self, job_id: Uuid) {
        let mut map = self.inner.lock().expect("job lock registry poisoned");
        let idle = map
            .get(&job_id)
            .map(|lock| Arc::strong_count(lock) == 1)
            .unwrap_or(false);
        if idle {
            map.remove(&job_id);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Background batch
// ────────────────────────────────────────────────────────────────────────────

/// Processes one resume batch for a job: extract → score → persist, then
/// resolve the job to `completed` or `failed`. Runs inside `tokio::spawn`;
/// must never panic the serving process.
pub async fn process_resume_batch(
    state: AppState,
    job_id: Uuid,
    job_description: String,
    files: Vec<ResumeFile>,
) {
    let lock = state.ingest_locks.lock_for(job_id);
    {
        let _guard = lock.lock().await;

        match ingest_files(&state, job_id, &job_description, &files).await {
            Ok(count) => {
                info!("Processed {count} resume(s) for job {job_id}");
                if let Err(e) =
                    store::update_job_status(&state.db, job_id, JobStatus::Completed).await
                {
                    error!("Failed to mark job {job_id} completed: {e}");
                }
            }
            Err(e) => {
                error!("Error during background resume processing for job {job_id}: {e}");
                if let Err(e) = store::update_job_status(&state.db, job_id, JobStatus::Failed).await
                {
                    error!("Failed to mark job {job_id} failed: {e}");
                }
            }
        }
    }
    drop(lock);
    state.ingest_locks.release(job_id);
}

async fn ingest_files(
    state: &AppState,
    job_id: Uuid,
    job_description: &str,
    files: &[ResumeFile],
) -> Result<usize, sqlx::Error> {
    for file in files {
        let text = extract_resume_text(file);
        // Total call: provider failures degrade to the fallback record.
        let candidate = state.scorer.score(job_description, &text).await;
        store::add_candidate(&state.db, job_id, &candidate).await?;
    }
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, bytes: &[u8]) -> ResumeFile {
        ResumeFile {
            filename: name.to_string(),
            bytes: Bytes::copy_from_slice(bytes),
        }
    }

    #[test]
    fn test_utf8_decoded_directly() {
        let f = file("resume.txt", "Jane Doe — Backend Engineer".as_bytes());
        assert_eq!(extract_resume_text(&f), "Jane Doe — Backend Engineer");
    }

    #[test]
    fn test_invalid_utf8_falls_back_to_latin1() {
        // 0xE9 is 'é' in Latin-1 but invalid as a standalone UTF-8 byte.
        let f = file("resume.txt", &[b'R', b'e', b'n', 0xE9, b'e']);
        assert_eq!(extract_resume_text(&f), "Renée");
    }

    #[test]
    fn test_pdf_detected_by_extension_and_magic() {
        assert!(is_pdf(&file("cv.PDF", b"anything")));
        assert!(is_pdf(&file("upload.bin", b"%PDF-1.7 rest")));
        assert!(!is_pdf(&file("cv.txt", b"plain text")));
    }

    #[test]
    fn test_latin1_decode_is_total() {
        let all_bytes: Vec<u8> = (0..=255).collect();
        assert_eq!(decode_latin1(&all_bytes).chars().count(), 256);
    }

    #[tokio::test]
    async fn test_job_locks_serialize_same_job() {
        let locks = JobLocks::default();
        let job_id = Uuid::new_v4();

        let lock = locks.lock_for(job_id);
        let guard = lock.lock().await;

        // A second batch for the same job must not acquire while held.
        let second = locks.lock_for(job_id);
        assert!(second.try_lock().is_err());

        drop(guard);
        assert!(second.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_job_locks_release_drops_idle_entry() {
        let locks = JobLocks::default();
        let job_id = Uuid::new_v4();

        let lock = locks.lock_for(job_id);
        drop(lock);
        locks.release(job_id);

        let map = locks.inner.lock().unwrap();
        assert!(!map.contains_key(&job_id));
    }

    #[tokio::test]
    async fn test_job_locks_release_keeps_held_entry() {
        let locks = JobLocks::default();
        let job_id = Uuid::new_v4();

        let held = locks.lock_for(job_id);
        locks.release(job_id);

        let map = locks.inner.lock().unwrap();
        assert!(map.contains_key(&job_id));
        drop(held);
    }
}
