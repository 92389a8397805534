pub mod backend;

mod interpreter;
mod session;
