//! Global worker pool used by the parallel scan and integral passes.
use std::env;
use std::sync::OnceLock;

/// Environment variable consulted when no explicit thread count is given.
pub const THREADS_ENV: &str = "HAAR_CPU_THREADS";

static THREAD_POOL_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Configure the global rayon pool once. Later calls return the first result.
///
/// The thread count comes from `num_threads`, then [`THREADS_ENV`], then the
/// rayon default. Without the `parallel` feature this only validates the
/// request.
pub fn init_thread_pool(num_threads: Option<usize>) -> Result<(), String> {
    THREAD_POOL_INIT
        .get_or_init(|| {
            let threads = match num_threads {
                Some(0) => return Err("thread count must be >= 1".to_string()),
                Some(n) => Some(n),
                None => threads_from_env()?,
            };
            build_pool(threads)
        })
        .clone()
}

#[cfg(feature = "parallel")]
fn build_pool(threads: Option<usize>) -> Result<(), String> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build_global().map_err(|e| e.to_string())?;
    log::debug!("init_thread_pool: {} worker threads", rayon::current_num_threads());
    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn build_pool(_threads: Option<usize>) -> Result<(), String> {
    Ok(())
}

fn threads_from_env() -> Result<Option<usize>, String> {
    let raw = match env::var(THREADS_ENV) {
        Ok(v) => v,
        Err(env::VarError::NotPresent) => return Ok(None),
        Err(e) => return Err(format!("failed to read {THREADS_ENV}: {e}")),
    };
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("{THREADS_ENV} must be a positive integer, got '{raw}'")),
        Ok(n) => Ok(Some(n)),
    }
}
