pub mod app;
pub mod config;
pub mod frames;
pub mod input;
pub mod labels;
pub mod navigation;
pub mod preview;
pub mod session;
pub mod table;

pub use app::{crash_log_path, init_logging, log_debug, log_file_path, log_panic};
pub use labels::LabelSequence;
pub use session::{SessionController, SessionOutcome};
