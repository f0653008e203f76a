//! Core types for the API client and user resolution

pub mod options;
pub mod params;
pub mod user;
pub mod wrapper;

pub use options::{DEFAULT_PAGE_SIZE, FetchOptions};
pub use params::{ParamValue, Parameters, Scalar, VECTOR_SEPARATOR};
pub use user::{BadgeCounts, ExistingUser, MissingUser, User, UserId, UserType};
pub use wrapper::{ApiErrorBody, ApiWrapper, WrapperBody};
