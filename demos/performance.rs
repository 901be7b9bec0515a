//! Throughput of the basic operations: sequential insert, random insert and
//! point reads from one and from many threads.
//!
//! Run with: `cargo run --release --example performance`

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use memskip::SkipList;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::{Level, info};

const WRITE_COUNT: i32 = 1_000_000;
const READ_COUNT: usize = 1_000_000;
const READ_THREADS: usize = 16;

fn report(label: &str, ops: usize, elapsed: Duration) {
    #[expect(clippy::cast_precision_loss, reason = "reporting only")]
    let qps = ops as f64 / elapsed.as_secs_f64();
    info!("{label}: {ops} operations in {elapsed:.3?} ({qps:.0} ops/s)");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let mut list: SkipList<i32, String> = SkipList::new();
    let start = Instant::now();
    for key in 0..WRITE_COUNT {
        list.insert(key, "testStr".to_owned());
    }
    report("sequential insert", list.len(), start.elapsed());

    let mut list: SkipList<i32, String> = SkipList::new();
    let mut rng = SmallRng::from_rng(&mut rand::rng());
    let start = Instant::now();
    for _ in 0..WRITE_COUNT {
        list.insert(rng.random(), "testStr".to_owned());
    }
    report("random insert", usize::try_from(WRITE_COUNT)?, start.elapsed());
    info!(len = list.len(), height = list.height(), "random list built");

    let start = Instant::now();
    let mut found = 0_usize;
    for _ in 0..READ_COUNT {
        found += usize::from(list.contains_key(&rng.random::<i32>()));
    }
    report("single-thread read", READ_COUNT, start.elapsed());
    info!(found, "single-thread read hits");

    let reader = list.reader();
    let start = Instant::now();
    thread::scope(|s| {
        for _ in 0..READ_THREADS {
            let reader = reader.clone();
            s.spawn(move || {
                let mut rng = SmallRng::from_rng(&mut rand::rng());
                for _ in 0..READ_COUNT {
                    std::hint::black_box(reader.get(&rng.random::<i32>()));
                }
            });
        }
    });
    report(
        &format!("{READ_THREADS}-thread read"),
        READ_COUNT * READ_THREADS,
        start.elapsed(),
    );

    Ok(())
}
