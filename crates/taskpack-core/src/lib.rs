pub mod archive;
pub mod execution;
pub mod layout;
pub mod linking;
pub mod models;
pub mod packager;
pub mod registry;
pub mod strings;
pub mod validation;
