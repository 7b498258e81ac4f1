use crate::search::Job;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// A blocking multi-producer/multi-consumer job queue with graceful
/// termination.
///
/// Besides the jobs themselves the queue tracks `working`, the number of
/// jobs currently held by workers. [`JobQueue::wait_until_finished`] returns
/// only when the queue is empty *and* no job is in flight; checking only
/// emptiness would race against a worker that is about to enqueue children
/// of the job it still holds.
pub struct JobQueue {
    inner: Mutex<Inner>,
    cond: Condvar,
    /// Maximum queued jobs; `0` means unbounded.
    capacity: usize,
}

struct Inner {
    jobs: VecDeque<Job>,
    working: usize,
    stopped: bool,
}

impl JobQueue {
    /// Create a queue holding at most `capacity` jobs (`0` = unbounded).
    pub fn new(capacity: usize) -> JobQueue {
        JobQueue {
            inner: Mutex::new(Inner {
                jobs: VecDeque::new(),
                working: 0,
                stopped: false,
            }),
            cond: Condvar::new(),
            capacity,
        }
    }

    /// Enqueue a job, blocking while a bounded queue is full.
    pub fn push(&self, job: Job) {
        let mut inner = self.inner.lock().expect("job queue poisoned");
        if self.capacity > 0 {
            while inner.jobs.len() >= self.capacity && !inner.stopped {
                inner = self.cond.wait(inner).expect("job queue poisoned");
            }
        }
        inner.jobs.push_back(job);
        drop(inner);
        self.cond.notify_all();
    }

    /// Remove and return up to `max` jobs, blocking until at least one job is
    /// available or the queue is stopped. Returns an empty vector on stop,
    /// which tells the worker to exit.
    ///
    /// `working` is incremented by the number of jobs returned; the consumer
    /// must report them back via [`JobQueue::job_done`].
    pub fn pop(&self, max: usize) -> Vec<Job> {
        let mut inner = self.inner.lock().expect("job queue poisoned");
        while inner.jobs.is_empty() && !inner.stopped {
            inner = self.cond.wait(inner).expect("job queue poisoned");
        }

        if inner.stopped {
            return Vec::new();
        }

        let count = max.min(inner.jobs.len());
        let jobs: Vec<Job> = inner.jobs.drain(..count).collect();
        inner.working += jobs.len();
        drop(inner);
        self.cond.notify_all();
        jobs
    }

    /// Report `count` previously popped jobs as finished.
    pub fn job_done(&self, count: usize) {
        let mut inner = self.inner.lock().expect("job queue poisoned");
        inner.working -= count;
        let finished = inner.working == 0 && inner.jobs.is_empty();
        drop(inner);
        if finished {
            self.cond.notify_all();
        }
    }

    pub fn size(&self) -> usize {
        self.inner.lock().expect("job queue poisoned").jobs.len()
    }

    /// Unblock all waiting consumers; subsequent pops return empty.
    pub fn stop(&self) {
        let mut inner = self.inner.lock().expect("job queue poisoned");
        inner.stopped = true;
        drop(inner);
        self.cond.notify_all();
    }

    /// Block until every pushed job (including transitively produced
    /// children) has been consumed and finished.
    pub fn wait_until_finished(&self) {
        let mut inner = self.inner.lock().expect("job queue poisoned");
        while !(inner.jobs.is_empty() && inner.working == 0) {
            inner = self.cond.wait(inner).expect("job queue poisoned");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;
    use std::sync::Arc;
    use std::time::Duration;

    fn job(code: u8) -> Job {
        Job {
            code: BigUint::from(code),
            ..Job::root()
        }
    }

    #[test]
    fn pop_returns_at_most_the_requested_batch() {
        let queue = JobQueue::new(0);
        for code in 0..5 {
            queue.push(job(code));
        }
        assert_eq!(queue.size(), 5);

        let batch = queue.pop(3);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].code, BigUint::from(0u8));
        assert_eq!(queue.size(), 2);

        let batch = queue.pop(10);
        assert_eq!(batch.len(), 2);
        queue.job_done(3);
        queue.job_done(2);
    }

    #[test]
    fn stopped_queue_returns_empty_batches() {
        let queue = Arc::new(JobQueue::new(0));

        let waiter = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || queue.pop(1))
        };
        // Give the consumer a moment to block on the empty queue.
        std::thread::sleep(Duration::from_millis(20));
        queue.stop();

        let batch = waiter.join().expect("worker thread panicked");
        assert!(batch.is_empty());
    }

    #[test]
    fn wait_until_finished_covers_in_flight_jobs() {
        let queue = Arc::new(JobQueue::new(0));
        queue.push(job(1));

        let worker = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                let batch = queue.pop(10);
                assert_eq!(batch.len(), 1);
                // The queue is empty now, but the job is still in flight and
                // produces a child before it finishes.
                std::thread::sleep(Duration::from_millis(20));
                queue.push(job(2));
                queue.job_done(batch.len());

                let batch = queue.pop(10);
                assert_eq!(batch.len(), 1);
                queue.job_done(batch.len());
            })
        };

        queue.wait_until_finished();
        assert_eq!(queue.size(), 0);
        worker.join().expect("worker thread panicked");
    }

    #[test]
    fn bounded_push_blocks_until_space_is_available() {
        let queue = Arc::new(JobQueue::new(1));
        queue.push(job(1));

        let producer = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                // Blocks until the consumer below makes room.
                queue.push(job(2));
            })
        };

        std::thread::sleep(Duration::from_millis(20));
        let batch = queue.pop(1);
        assert_eq!(batch[0].code, BigUint::from(1u8));
        producer.join().expect("producer thread panicked");

        let batch2 = queue.pop(1);
        assert_eq!(batch2[0].code, BigUint::from(2u8));
        queue.job_done(2);
    }
}
