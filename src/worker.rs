//! Background decoding with a single completion channel.
//!
//! A [`Worker`] owns a dedicated rayon pool. Each submitted job decodes one whole file and
//! publishes exactly one [`JobCompletion`], carrying either the finished table or the error that
//! aborted it. Results never leave the worker half-built.
//!
//! Cancellation is cooperative: the mark is checked before the decode starts and again after it
//! finishes. A cancelled job still completes, with [`crate::Error::Cancelled`]. The job's entry
//! and its cancellation mark live in one map slot, so a mark never outlives its job.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use qvdscope::Worker;
//!
//! let worker = Worker::new(2)?;
//! worker.submit(1, "data/orders.qvd")?;
//!
//! if let Some(completion) = worker.recv_timeout(Duration::from_secs(30)) {
//!     match completion.result {
//!         Ok(table) => println!("job {}: {} rows", completion.job_id, table.row_count()),
//!         Err(error) => eprintln!("job {} failed: {}", completion.job_id, error),
//!     }
//! }
//! # Ok::<(), qvdscope::Error>(())
//! ```

use std::{
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc,
    },
    time::Duration,
};

use dashmap::{mapref::entry::Entry, DashMap};
use log::{debug, info};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{decoder, DecodeConfig, Error, QvdTable, Result};

/// Caller-chosen identifier of a submitted job
pub type JobId = u64;

/// The single outcome of a submitted job.
#[derive(Debug)]
pub struct JobCompletion {
    /// Identifier passed to [`Worker::submit`]
    pub job_id: JobId,
    /// The decoded table, or the error that aborted the job
    pub result: Result<QvdTable>,
}

/// Decodes files on a dedicated thread pool and reports completions in order of completion.
pub struct Worker {
    pool: ThreadPool,
    config: DecodeConfig,
    /// In-flight jobs and whether cancellation was requested
    jobs: Arc<DashMap<JobId, bool>>,
    sender: Sender<JobCompletion>,
    receiver: Receiver<JobCompletion>,
}

impl Worker {
    /// Creates a worker with `threads` pool threads, `0` picks the rayon default.
    ///
    /// # Errors
    /// Returns [`crate::Error::Error`] if the thread pool cannot be created.
    pub fn new(threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("qvdscope-worker-{index}"))
            .build()
            .map_err(|error| Error::Error(format!("Failed to create thread pool - {error}")))?;
        let (sender, receiver) = mpsc::channel();

        Ok(Worker {
            pool,
            config: DecodeConfig::default(),
            jobs: Arc::new(DashMap::new()),
            sender,
            receiver,
        })
    }

    /// Replaces the configuration used by subsequently submitted jobs
    #[must_use]
    pub fn with_config(mut self, config: DecodeConfig) -> Self {
        self.config = config;
        self
    }

    /// Queues the decode of the file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::JobInFlight`] if a job with the same identifier has not completed.
    pub fn submit(&self, job_id: JobId, path: impl AsRef<Path>) -> Result<()> {
        match self.jobs.entry(job_id) {
            Entry::Occupied(_) => return Err(Error::JobInFlight(job_id)),
            Entry::Vacant(entry) => {
                entry.insert(false);
            }
        }

        let path: PathBuf = path.as_ref().to_path_buf();
        info!("Job {} queued for '{}'", job_id, path.display());

        let config = self.config;
        let jobs = Arc::clone(&self.jobs);
        let sender = self.sender.clone();

        self.pool.spawn(move || {
            let result = if jobs.get(&job_id).is_some_and(|cancelled| *cancelled) {
                Err(Error::Cancelled(job_id))
            } else {
                decoder::decode_with_config(&path, config)
            };

            // Removal reads the final mark, later cancel calls find no entry
            let result = match jobs.remove(&job_id) {
                Some((_, true)) => Err(Error::Cancelled(job_id)),
                _ => result,
            };
            debug!("Job {} finished, success: {}", job_id, result.is_ok());

            // The receiver lives as long as the worker, a failed send means nobody is listening
            let _ = sender.send(JobCompletion { job_id, result });
        });

        Ok(())
    }

    /// Requests cancellation of an in-flight job.
    ///
    /// Returns false if no job with this identifier is in flight. A true result means the job
    /// will complete with [`crate::Error::Cancelled`].
    pub fn cancel(&self, job_id: JobId) -> bool {
        let Some(mut cancelled) = self.jobs.get_mut(&job_id) else {
            return false;
        };

        debug!("Job {} cancellation requested", job_id);
        *cancelled = true;
        true
    }

    /// Returns true while a job with this identifier has not completed
    #[must_use]
    pub fn is_in_flight(&self, job_id: JobId) -> bool {
        self.jobs.contains_key(&job_id)
    }

    /// Blocks until the next completion arrives.
    ///
    /// The worker keeps its own sender alive, so this blocks indefinitely when no job is pending.
    pub fn recv(&self) -> Option<JobCompletion> {
        self.receiver.recv().ok()
    }

    /// Returns the next completion if one is ready
    pub fn try_recv(&self) -> Option<JobCompletion> {
        self.receiver.try_recv().ok()
    }

    /// Waits at most `timeout` for the next completion
    pub fn recv_timeout(&self, timeout: Duration) -> Option<JobCompletion> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::test::crafted_table;

    const TIMEOUT: Duration = Duration::from_secs(30);

    fn crafted_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&crafted_table()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn completes_once() {
        let file = crafted_file();
        let worker = Worker::new(2).unwrap();

        worker.submit(7, file.path()).unwrap();
        let completion = worker.recv_timeout(TIMEOUT).unwrap();

        assert_eq!(completion.job_id, 7);
        assert_eq!(completion.result.unwrap().row_count(), 4);
        assert!(!worker.is_in_flight(7));
        assert!(worker.try_recv().is_none());

        // the identifier is free again once completed
        worker.submit(7, file.path()).unwrap();
        assert!(worker.recv_timeout(TIMEOUT).unwrap().result.is_ok());
    }

    #[test]
    fn failures_complete() {
        let worker = Worker::new(1)
            .unwrap()
            .with_config(DecodeConfig::sequential());

        worker.submit(1, "/nonexistent/path/table.qvd").unwrap();
        let completion = worker.recv_timeout(TIMEOUT).unwrap();

        assert_eq!(completion.job_id, 1);
        assert!(matches!(completion.result, Err(Error::FileError(_))));
    }

    #[test]
    fn duplicate_and_cancel() {
        let file = crafted_file();
        let worker = Worker::new(1).unwrap();

        // occupy the only pool thread so submitted jobs stay queued
        let (release, gate) = mpsc::channel::<()>();
        worker.pool.spawn(move || {
            let _ = gate.recv();
        });

        worker.submit(3, file.path()).unwrap();
        assert!(matches!(
            worker.submit(3, file.path()),
            Err(Error::JobInFlight(3))
        ));
        assert!(worker.is_in_flight(3));

        assert!(worker.cancel(3));
        assert!(!worker.cancel(4));

        release.send(()).unwrap();
        let completion = worker.recv_timeout(TIMEOUT).unwrap();

        assert_eq!(completion.job_id, 3);
        assert!(matches!(completion.result, Err(Error::Cancelled(3))));
        assert!(worker.try_recv().is_none());
    }

    #[test]
    fn cancel_after_completion() {
        let file = crafted_file();
        let worker = Worker::new(1).unwrap();

        worker.submit(5, file.path()).unwrap();
        assert!(worker.recv_timeout(TIMEOUT).unwrap().result.is_ok());

        // nothing is left to cancel, so the next job with this id is untouched
        assert!(!worker.cancel(5));
        worker.submit(5, file.path()).unwrap();
        let completion = worker.recv_timeout(TIMEOUT).unwrap();

        assert_eq!(completion.job_id, 5);
        assert_eq!(completion.result.unwrap().row_count(), 4);
    }
}
