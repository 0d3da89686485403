// === PUBLIC CONTRACT ===
// Other crates consume the module through `contract` only.
pub mod contract;

pub use contract::{client, error, model};

// === MODULE DEFINITION ===
pub mod module;
pub use module::DonorMatch;

// === INTERNAL MODULES ===
// Exposed for tests and the server binary. Not a stable API.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
