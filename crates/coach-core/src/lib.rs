pub mod analysis;
pub mod commitment;
pub mod config;
pub mod error;
pub mod feedback;
pub mod io;
pub mod paths;
pub mod round;
pub mod session;
pub mod types;
pub mod wallet;

pub use error::{CoachError, Result};
pub use session::{Session, SessionEvent, SessionSnapshot};
