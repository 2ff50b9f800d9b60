pub mod report;
pub mod shuffle;
pub mod state;
