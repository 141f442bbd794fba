mod progress;
mod timer;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use progress::SessionProgress;
pub use view::SessionSnapshot;
pub use workflow::SessionLoopService;
