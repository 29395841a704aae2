pub mod two_phase;
