//! Parallel utilities with feature-gated implementations
//!
//! With the `native` feature the maps run on the rayon pool; without it they
//! fall back to sequential iterators with the same signatures. Callers only
//! hand in closures that read shared state and return owned results, so the
//! two paths produce identical output.

/// Check if parallel processing is available
#[cfg(feature = "native")]
pub fn is_parallel_available() -> bool {
    true
}

/// Check if parallel processing is available
#[cfg(not(feature = "native"))]
pub fn is_parallel_available() -> bool {
    false
}

/// Parallel map over a slice
#[cfg(feature = "native")]
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    use rayon::prelude::*;
    data.par_iter().map(f).collect()
}

/// Sequential map (fallback when parallel is not available)
#[cfg(not(feature = "native"))]
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    F: Fn(&T) -> U,
{
    data.iter().map(f).collect()
}

/// Parallel map with index
#[cfg(feature = "native")]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    use rayon::prelude::*;
    (0..count).into_par_iter().map(f).collect()
}

/// Sequential map with index (fallback)
#[cfg(not(feature = "native"))]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    F: Fn(usize) -> U,
{
    (0..count).map(f).collect()
}
