//! Batch composer: grouped orders, selection and batch payload assembly.

pub mod composer;
pub mod grouping;
pub mod selection;
pub mod session;
