//! Fork-join helpers for the preprocessing stages.
//!
//! Only stages with no bar-to-bar dependency go through here (true range,
//! HL2 center, row parsing). Each worker owns a disjoint chunk of a
//! preallocated output buffer and the call returns once every chunk is
//! written. The band/trend pass never runs on this pool.
//!
//! `ParallelConfig` is the serializable tuning. `WorkerPool` is the runtime
//! handle built from it once: when `num_threads` is set it owns a private
//! rayon pool that every stage and every clone of the handle shares.
//! Otherwise stages borrow the global pool.

use std::sync::Arc;

use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;

/// Tuning for the parallel preprocessing stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Inputs shorter than this are processed on the calling thread.
    pub min_parallel_len: usize,
    /// Number of output slots handed to a worker at a time.
    pub chunk_len: usize,
    /// Private pool size. `None` uses the global rayon pool.
    pub num_threads: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            min_parallel_len: 4096,
            chunk_len: 1024,
            num_threads: None,
        }
    }
}

impl ParallelConfig {
    /// Never fan out.
    pub fn sequential() -> Self {
        Self {
            min_parallel_len: usize::MAX,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), IndicatorError> {
        if self.chunk_len == 0 {
            return Err(IndicatorError::invalid("chunk_len", "must be > 0"));
        }
        if self.num_threads == Some(0) {
            return Err(IndicatorError::invalid("num_threads", "must be > 0 when set"));
        }
        Ok(())
    }
}

/// Preprocessing runtime: tuning plus the optional private pool.
#[derive(Debug, Clone, Default)]
pub struct WorkerPool {
    config: ParallelConfig,
    pool: Option<Arc<ThreadPool>>,
}

impl WorkerPool {
    /// Validate `config` and build its private pool, if any.
    pub fn new(config: ParallelConfig) -> Result<Self, IndicatorError> {
        config.validate()?;
        let pool = match config.num_threads {
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("trendband-pool-{i}"))
                    .build()
                    .map_err(|e| IndicatorError::invalid("num_threads", e.to_string()))?;
                tracing::debug!(threads = n, "built private worker pool");
                Some(Arc::new(pool))
            }
            None => None,
        };
        Ok(Self { config, pool })
    }

    /// Never fan out.
    pub fn sequential() -> Self {
        Self {
            config: ParallelConfig::sequential(),
            pool: None,
        }
    }

    pub fn config(&self) -> &ParallelConfig {
        &self.config
    }

    /// Size of the private pool, `None` when the global pool is used.
    pub fn threads(&self) -> Option<usize> {
        self.pool.as_ref().map(|p| p.current_num_threads())
    }

    fn is_parallel_for(&self, len: usize) -> bool {
        len >= self.config.min_parallel_len
    }

    /// Run `op` on the private pool. Calls already running on it (nested
    /// stages) execute in place.
    fn install<R, OP>(&self, op: OP) -> R
    where
        R: Send,
        OP: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) if pool.current_thread_index().is_none() => pool.install(op),
            _ => op(),
        }
    }
}

/// Allocate a buffer of `len` slots and fill slot `i` with `f(i)`.
pub fn par_fill<T, F>(len: usize, pool: &WorkerPool, f: F) -> Vec<T>
where
    T: Default + Clone + Send,
    F: Fn(usize) -> T + Sync,
{
    let mut out = vec![T::default(); len];

    if !pool.is_parallel_for(len) {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = f(i);
        }
        return out;
    }

    let chunk = pool.config.chunk_len.max(1);
    pool.install(|| {
        out.par_chunks_mut(chunk)
            .enumerate()
            .for_each(|(c, slice)| {
                let base = c * chunk;
                for (j, slot) in slice.iter_mut().enumerate() {
                    *slot = f(base + j);
                }
            });
    });

    out
}

/// Run two independent stages, concurrently when `len` is above the
/// threshold. Returns once both have finished.
pub fn par_join<A, B, RA, RB>(len: usize, pool: &WorkerPool, a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    if !pool.is_parallel_for(len) {
        return (a(), b());
    }
    pool.install(|| rayon::join(a, b))
}

/// Fallible ordered map over `items`. The first error (in index order) wins.
pub fn par_try_map<T, U, E, F>(items: &[T], pool: &WorkerPool, f: F) -> Result<Vec<U>, E>
where
    T: Sync,
    U: Send,
    E: Send,
    F: Fn(usize, &T) -> Result<U, E> + Sync,
{
    if !pool.is_parallel_for(items.len()) {
        return items.iter().enumerate().map(|(i, item)| f(i, item)).collect();
    }

    pool.install(|| {
        items
            .par_iter()
            .enumerate()
            .map(|(i, item)| f(i, item))
            .collect::<Vec<Result<U, E>>>()
            .into_iter()
            .collect()
    })
}
