/*!
 * Synchronization Primitives
 *
 * Building blocks shared by the container adapters:
 * - Joint acquisition of two locks in a deadlock-free order
 * - A wait gate that lets RwLock-guarded containers block consumers
 */

pub mod gate;
pub mod joint;

pub use gate::WaitGate;
