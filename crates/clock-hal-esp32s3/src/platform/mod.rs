pub mod board;
pub mod clock;
pub mod display;
