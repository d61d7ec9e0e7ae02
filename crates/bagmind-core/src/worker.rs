//! # Worker Pool
//!
//! Owned threads for fire-and-forget work. A job never touches the memory
//! directly: it receives an [`InputHandle`] and may only enqueue inputs,
//! which the reasoner ingests at the start of a later cycle.
//!
//! The pool is shut down explicitly with [`WorkerPool::shutdown`] or on
//! drop; either way queued jobs finish before the threads are joined.

use crate::MindError;
use crate::input::InputHandle;
use crossbeam_channel::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// A unit of background work.
pub type Job = Box<dyn FnOnce(&InputHandle) + Send + 'static>;

/// Fixed set of threads draining a shared job queue.
#[derive(Debug)]
pub struct WorkerPool {
    jobs: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `threads` workers sharing `input`.
    pub fn start(threads: usize, input: &InputHandle) -> Result<Self, MindError> {
        let (tx, rx) = crossbeam_channel::unbounded::<Job>();
        let mut workers = Vec::with_capacity(threads);
        for n in 0..threads {
            let rx: Receiver<Job> = rx.clone();
            let input = input.clone();
            let handle = thread::Builder::new()
                .name(format!("bagmind-worker-{n}"))
                .spawn(move || {
                    for job in rx {
                        job(&input);
                    }
                })
                .map_err(|e| MindError::Io(format!("cannot start worker {n}: {e}")))?;
            workers.push(handle);
        }
        debug!(threads, "worker pool started");
        Ok(Self {
            jobs: Some(tx),
            workers,
        })
    }

    /// Queue a job. Fails once the pool is shut down.
    pub fn submit<F>(&self, job: F) -> Result<(), MindError>
    where
        F: FnOnce(&InputHandle) + Send + 'static,
    {
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| MindError::Io("worker pool is shut down".into()))?;
        jobs.send(Box::new(job))
            .map_err(|_| MindError::Io("worker pool is shut down".into()))
    }

    #[must_use]
    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.jobs.is_some()
    }

    /// Stop accepting jobs, let queued jobs finish, join every thread.
    ///
    /// Calling it again does nothing.
    pub fn shutdown(&mut self) {
        if self.jobs.take().is_none() {
            return;
        }
        let threads = self.workers.len();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("worker thread panicked");
            }
        }
        debug!(threads, "worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
