pub mod config_io;
pub mod local_backend;
pub mod session_store;
pub mod state;
pub mod workspace_io;
