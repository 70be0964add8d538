//! Stress tests for the commit guard.
//!
//! These helpers race many threads against one `SharedTransaction` and
//! report how often the queue actually ran.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use tran_core::{SharedTransaction, Transaction};

/// Configuration for a commit race.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of threads calling `commit` at once.
    pub threads: usize,
    /// Number of calls queued before the race starts.
    pub calls: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 8,
            calls: 1_000,
        }
    }
}

/// Result of a commit race.
#[derive(Debug, Clone)]
pub struct RaceOutcome {
    /// Commits that returned `Ok`.
    pub successful_commits: usize,
    /// Commits refused with `AlreadyCommitted`.
    pub rejected_commits: usize,
    /// Total callable invocations across all threads.
    pub invocations: usize,
    /// Wall time of the race.
    pub duration: Duration,
}

impl RaceOutcome {
    /// True when the queue ran exactly once, in full.
    pub fn ran_once(&self, calls: usize) -> bool {
        self.successful_commits == 1 && self.invocations == calls
    }

    /// Prints a summary of the race.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Successful commits: {}", self.successful_commits);
        println!("Rejected commits: {}", self.rejected_commits);
        println!("Invocations: {}", self.invocations);
        println!("Duration: {:?}", self.duration);
    }
}

/// Queues `config.calls` counting calls, then has `config.threads` threads
/// commit simultaneously.
pub fn race_commits(config: &StressConfig) -> RaceOutcome {
    let invocations = Arc::new(AtomicUsize::new(0));
    let shared: Arc<SharedTransaction<'static>> = Arc::new(Transaction::new().into_shared());

    for _ in 0..config.calls {
        let invocations = Arc::clone(&invocations);
        shared
            .push(
                move |_| {
                    invocations.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
                Vec::new(),
            )
            .expect("open transaction accepts pushes");
    }

    let barrier = Arc::new(Barrier::new(config.threads));
    let successful = Arc::new(AtomicUsize::new(0));
    let rejected = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|_| {
            let shared = Arc::clone(&shared);
            let barrier = Arc::clone(&barrier);
            let successful = Arc::clone(&successful);
            let rejected = Arc::clone(&rejected);

            thread::spawn(move || {
                barrier.wait();
                match shared.commit() {
                    Ok(()) => successful.fetch_add(1, Ordering::SeqCst),
                    Err(e) if e.is_already_committed() => rejected.fetch_add(1, Ordering::SeqCst),
                    Err(e) => panic!("unexpected commit error: {e}"),
                };
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("commit thread panicked");
    }

    RaceOutcome {
        successful_commits: successful.load(Ordering::SeqCst),
        rejected_commits: rejected.load(Ordering::SeqCst),
        invocations: invocations.load(Ordering::SeqCst),
        duration: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn race_runs_queue_once() {
        let config = StressConfig {
            threads: 4,
            calls: 100,
        };
        let outcome = race_commits(&config);
        assert!(outcome.ran_once(config.calls));
        assert_eq!(outcome.rejected_commits, 3);
    }
}
