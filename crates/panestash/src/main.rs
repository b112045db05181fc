//! pstash: save, restore and cycle named pane layouts.

#![forbid(unsafe_code)]

mod cli;
mod output;

fn main() {
    std::process::exit(cli::run_from_env());
}
