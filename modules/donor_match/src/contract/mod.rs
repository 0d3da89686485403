pub mod client;
pub mod error;
pub mod model;

pub use client::DonorMatchApi;
pub use error::DonorMatchError;
pub use model::{BloodGroup, BloodRequest, Donor, MatchSet, NewBloodRequest, NewDonor, Urgency};
