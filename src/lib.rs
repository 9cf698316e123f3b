pub mod cli;
pub mod config;
pub mod error;
pub mod grouping;
pub mod init;
pub mod models;
pub mod oracle;
pub mod services;

pub use error::CommentAiError;
