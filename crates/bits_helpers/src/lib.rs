mod bit;
pub use bit::*;

pub mod floating_score;
pub mod input;

mod ribbit_communication;
pub use ribbit_communication::*;

mod window_resizing;
