pub mod a001_tariff;
pub mod a002_batch;
pub mod a003_order;
pub mod a004_vehicle_type;
pub mod a005_branch;
