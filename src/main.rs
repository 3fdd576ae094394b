mod app;
mod entry;
mod logger;

use std::process::ExitCode;

fn main() -> ExitCode {
    entry::run()
}
