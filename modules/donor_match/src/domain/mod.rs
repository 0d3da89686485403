pub mod clock;
pub mod compatibility;
pub mod donation;
pub mod eligibility;
pub mod error;
pub mod matcher;
pub mod repo;
pub mod service;
