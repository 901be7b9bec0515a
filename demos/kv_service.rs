//! A toy key-value service: one writer thread inserts and erases random keys
//! while a pool of reader threads looks keys up concurrently.
//!
//! Run with: `cargo run --example kv_service -- --readers 8 --seconds 2`
//!
//! Pass `--verbose` to log every operation.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use memskip::{Config, SkipList};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{Level, debug, info};

/// Keys are drawn from `0..KEY_SPACE`.
const KEY_SPACE: i32 = 100;

/// Tells the readers to stop once the writer is done, including when it
/// panics.
struct StopOnDrop<'a>(&'a AtomicBool);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

fn arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match args.iter().position(|a| a == flag) {
        Some(i) => args
            .get(i + 1)
            .with_context(|| format!("{flag} expects a value"))?
            .parse()
            .with_context(|| format!("invalid value for {flag}")),
        None => Ok(default),
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let readers: usize = arg(&args, "--readers", 4)?;
    let seconds: u64 = arg(&args, "--seconds", 1)?;
    let verbose = args.iter().any(|a| a == "--verbose");

    tracing_subscriber::fmt()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let mut list: SkipList<i32, String> = SkipList::with_config(Config::default())?;
    let reader = list.reader();
    let running = AtomicBool::new(true);
    let reads = AtomicU64::new(0);
    let hits = AtomicU64::new(0);

    info!("Starting {readers} readers and one writer for {seconds}s");
    let deadline = Instant::now() + Duration::from_secs(seconds);

    let (inserts, erases) = thread::scope(|s| {
        for id in 0..readers {
            let reader = reader.clone();
            let (running, reads, hits) = (&running, &reads, &hits);
            s.spawn(move || {
                let mut rng = SmallRng::from_rng(&mut rand::rng());
                while running.load(Ordering::Relaxed) {
                    let key = rng.random_range(0..KEY_SPACE);
                    let value = reader.read(&key);
                    debug!(reader = id, key, ?value, "read");
                    reads.fetch_add(1, Ordering::Relaxed);
                    if value.is_some() {
                        hits.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }

        let writer = s.spawn(|| {
            let _stop = StopOnDrop(&running);
            let mut rng = SmallRng::from_rng(&mut rand::rng());
            let (mut inserts, mut erases) = (0_u64, 0_u64);
            while Instant::now() < deadline {
                let key = rng.random_range(0..KEY_SPACE);
                if rng.random_ratio(1, 3) {
                    let erased = list.erase(&key);
                    debug!(key, erased, "erase");
                    erases += 1;
                } else {
                    let value = rng.random::<u32>().to_string();
                    debug!(key, %value, "insert");
                    list.insert(key, value);
                    inserts += 1;
                }
            }
            (inserts, erases)
        });

        writer.join()
    })
    .map_err(|_| anyhow::anyhow!("writer thread panicked"))?;

    info!(
        inserts,
        erases,
        reads = reads.load(Ordering::Relaxed),
        hits = hits.load(Ordering::Relaxed),
        len = reader.len(),
        height = reader.height(),
        "Finished"
    );
    Ok(())
}
