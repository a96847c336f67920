mod bridge;
mod install;
pub mod utils;

fn main() {}
