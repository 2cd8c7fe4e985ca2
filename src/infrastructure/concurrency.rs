/// Concurrency management for scriptscope.
/// Sizes the thread pool used for batch analysis.

use anyhow::Result;
use tracing::info;

/// Worker count for batch analysis: half the cores, at least one.
pub fn worker_count() -> usize {
    std::cmp::max(1, num_cpus::get() / 2)
}

/// Initialize the global rayon thread pool with controlled worker count.
pub fn init_thread_pool() -> Result<()> {
    let cores = num_cpus::get();
    let workers = worker_count();

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()?;

    info!(workers, cores, "initialized analysis thread pool");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count_is_positive() {
        assert!(worker_count() >= 1);
        assert!(worker_count() <= num_cpus::get().max(1));
    }
}
