//! Media toolchain access: subprocess seam, duration probing, chunk
//! extraction.

pub mod executor;
pub mod extract;
pub mod probe;

pub use executor::{CommandExecutor, MockCommandExecutor, SystemCommandExecutor};
pub use extract::{Chunk, ChunkExtractor, scratch_dir};
pub use probe::DurationProber;
