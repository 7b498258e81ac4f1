use crate::search::{JobQueue, SearchContext, node::SearchNode};
use log::debug;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Spawns the worker threads and joins them after the search has drained.
pub struct WorkerPool {
    ctx: Arc<SearchContext>,
    queue: Arc<JobQueue>,
    workers: usize,
    batch_size: usize,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// `workers == 0` selects the hardware's available parallelism,
    /// falling back to 1 if detection fails.
    pub fn new(
        ctx: Arc<SearchContext>,
        queue: Arc<JobQueue>,
        workers: usize,
        batch_size: usize,
    ) -> WorkerPool {
        let workers = if workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            workers
        };

        WorkerPool {
            ctx,
            queue,
            workers,
            batch_size: batch_size.max(1),
            handles: Vec::new(),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers
    }

    pub fn start(&mut self) {
        for id in 0..self.workers {
            let ctx = Arc::clone(&self.ctx);
            let queue = Arc::clone(&self.queue);
            let batch_size = self.batch_size;
            self.handles.push(std::thread::spawn(move || {
                worker_loop(id, &ctx, &queue, batch_size);
            }));
        }
    }

    /// Tell the queue to release all blocked workers.
    pub fn stop(&self) {
        self.queue.stop();
    }

    pub fn join(&mut self) {
        for handle in self.handles.drain(..) {
            handle.join().expect("worker thread panicked");
        }
    }
}

fn worker_loop(id: usize, ctx: &SearchContext, queue: &JobQueue, batch_size: usize) {
    debug!("worker {} started", id);
    loop {
        let jobs = queue.pop(batch_size);
        if jobs.is_empty() {
            // Poison pill from a stopped queue.
            debug!("worker {} stopped", id);
            return;
        }

        let count = jobs.len();
        for job in jobs {
            SearchNode::new(job, ctx, queue).execute();
        }
        queue.job_done(count);
    }
}
