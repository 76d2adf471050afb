// Fake Frog — Loop stages run by the scheduler

pub mod sampler;
pub mod scheduler;
pub mod ui;
