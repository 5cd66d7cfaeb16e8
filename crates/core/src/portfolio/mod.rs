pub mod concentration;
pub mod holdings;
pub mod performance;
pub mod snapshot;

pub use concentration::*;
pub use holdings::*;
pub use performance::*;
pub use snapshot::*;
