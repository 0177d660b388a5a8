mod action;
pub mod environment;
mod snapshot;
mod space;
mod state;

pub use action::Action;
pub use environment::Environment;
pub use snapshot::Snapshot;
pub use space::BoxSpace;
pub use state::State;
