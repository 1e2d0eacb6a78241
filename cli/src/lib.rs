//! `petition` command-line client: drives the petition form from a file,
//! submits it to the server and saves what comes back.

pub mod client;
pub mod commands;
pub mod form_file;
pub mod naming;

pub use commands::PetitionCli;
