pub mod a001_tariff;
pub mod a002_batch;
