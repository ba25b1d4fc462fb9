//! CLI domain: parse, route and output only.
//! Orchestration lives in the adder; the route table just wires it up.

mod output;
mod parse;
mod route;

pub use output::map_error;
pub use parse::Cli;
pub use route::RunContext;
