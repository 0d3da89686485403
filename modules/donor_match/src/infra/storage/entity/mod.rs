pub mod blood_request;
pub mod donor;
