pub mod analyzer;
pub mod cli;
pub mod config;
pub mod conventional;
pub mod domain;
pub mod error;
pub mod git;
pub mod notice;
pub mod ui;

pub use error::{GitSvError, Result};
