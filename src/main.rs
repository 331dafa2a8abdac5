/*!
 * Containers Demo - Main Entry Point
 *
 * Walks through the adapters with real threads:
 * - Producer/consumer hand-off over a SyncQueue
 * - Batch and all-or-nothing pops on a SyncVec
 * - Concurrent cross-assignment between two SyncMaps
 */

use std::error::Error;
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};

use threadsafe_containers::{init_tracing, ContainerConfig, SyncMap, SyncQueue, SyncVec};

const ITEMS: u64 = 1_000;
const CROSS_ROUNDS: usize = 500;

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing()?;

    let config = ContainerConfig::from_env();
    info!(
        label = %config.label,
        initial_capacity = config.initial_capacity,
        "Containers demo starting"
    );

    queue_hand_off(&config)?;
    vector_batches(&config);
    map_cross_assignment(&config)?;

    info!("Containers demo complete");
    Ok(())
}

fn queue_hand_off(config: &ContainerConfig) -> Result<(), Box<dyn Error>> {
    let queue = Arc::new(SyncQueue::with_config(config.clone().label("jobs")));

    let consumer = {
        let queue = queue.clone();
        thread::spawn(move || (0..ITEMS).map(|_| queue.wait_and_pop()).sum::<u64>())
    };

    for i in 1..=ITEMS {
        queue.push(i);
    }

    let total = consumer
        .join()
        .map_err(|_| "consumer thread panicked")?;
    info!(total, remaining = queue.len(), "Queue hand-off finished");
    Ok(())
}

fn vector_batches(config: &ContainerConfig) {
    let batch = SyncVec::with_config(config.clone().label("batch"));
    batch.extend([10, 20, 30, 40, 50]);

    let tail = batch.try_pop(3);
    info!(?tail, remaining = batch.len(), "Partial batch pop");

    match batch.try_pop_require(5) {
        Ok(all) => info!(?all, "All-or-nothing pop succeeded"),
        Err(err) => warn!("{:?}", miette::Report::new(err)),
    }
}

fn map_cross_assignment(config: &ContainerConfig) -> Result<(), Box<dyn Error>> {
    let a: Arc<SyncMap<u32, String>> = Arc::new(SyncMap::with_config(config.clone().label("a")));
    let b: Arc<SyncMap<u32, String>> = Arc::new(SyncMap::with_config(config.clone().label("b")));
    a.insert(1, "one".to_string());
    b.insert(2, "two".to_string());

    let forward = {
        let (a, b) = (a.clone(), b.clone());
        thread::spawn(move || {
            for _ in 0..CROSS_ROUNDS {
                a.assign_from(&b);
            }
        })
    };
    let backward = {
        let (a, b) = (a.clone(), b.clone());
        thread::spawn(move || {
            for _ in 0..CROSS_ROUNDS {
                b.assign_from(&a);
            }
        })
    };

    forward.join().map_err(|_| "assignment thread panicked")?;
    backward.join().map_err(|_| "assignment thread panicked")?;

    info!(a = ?a, b = ?b, "Cross-assignment finished without deadlock");

    if let Err(err) = a.at(&99) {
        warn!("{:?}", miette::Report::new(err));
    }
    Ok(())
}
