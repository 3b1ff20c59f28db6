// Cache module for the document listing and bodies.
// Generation-stamped TTL cache over a durable key/value medium.

pub mod clock;
pub mod medium;
pub mod paths;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use medium::{CacheMedium, FileMedium, MemoryMedium};
pub use store::{CacheStore, DEFAULT_TTL};
