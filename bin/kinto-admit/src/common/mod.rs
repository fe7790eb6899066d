mod error;
mod hex;
mod logging;
mod state;

pub use error::*;
pub use hex::*;
pub use logging::*;
pub use state::*;
