pub mod signal;

pub use signal::{Connection, Signal};
