//! Wire DTOs shared between the back-office tooling and the courier REST API.

pub mod domain;
pub mod enums;
pub mod shared;
