pub use server::{router, run, run_with_listener, spawn_with_listener};

mod server;
