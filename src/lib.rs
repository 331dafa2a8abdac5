/*!
 * Threadsafe Containers
 *
 * Synchronized adapters over the standard sequential containers:
 * - `SyncQueue`: FIFO hand-off with blocking consumption
 * - `SyncVec`: random-access array with batch and blocking tail pops
 * - `SyncMap`: hash map with reader/writer lock splitting
 *
 * Each adapter owns exactly one container and one lock. Operations that
 * span two adapters acquire both locks jointly in a fixed order.
 */

pub mod config;
pub mod errors;
pub mod logging;
pub mod map;
pub mod queue;
mod serde_impls;
pub mod sync;
pub mod vector;

// Re-exports
pub use config::ContainerConfig;
pub use errors::{ContainerError, ContainerResult};
pub use logging::init_tracing;
pub use map::SyncMap;
pub use queue::SyncQueue;
pub use vector::SyncVec;
