mod progress;
mod runner;

pub(crate) use runner::run_local;
