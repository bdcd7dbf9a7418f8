//! Tariff builder: form state ↔ tariff payload.

pub mod builder;
pub mod deconstruct;
pub mod editor;
pub mod form;
pub mod validation;
