pub mod controller;
pub mod media;
pub mod playlist;
pub mod simulated;
pub mod state;
