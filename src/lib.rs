//! Upfold: Default Upload Folder Resolution
//!
//! Decides where a file uploaded for a record field should be stored, based
//! on layered installation and actor configuration, and makes sure the folder
//! exists without needing write access to the storage root.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod expand;
pub mod info;
pub mod logging;
pub mod materialize;
pub mod records;
pub mod resolver;
pub mod store;
pub mod tree;
pub mod types;
