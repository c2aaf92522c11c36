// Public API for integration tests and presentation layers

pub mod clock;
pub mod drafts;
pub mod driver;
pub mod events;
pub mod state;
pub mod timer;
pub mod types;
