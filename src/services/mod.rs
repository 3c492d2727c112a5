pub mod admission;
pub use admission::{AdmissionKey, AdmissionRegistry, Reservation};

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{UserError, UserService};
pub use user_service_impl::DefaultUserService;
