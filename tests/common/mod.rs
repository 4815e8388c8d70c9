#![allow(dead_code)]

pub mod builders;
pub mod mock_api;
pub mod mock_job;
pub mod strategies;

pub use builders::*;
pub use mock_api::*;
pub use mock_job::*;
