pub mod service_type;
pub mod shipping_scope;

pub use service_type::ServiceType;
pub use shipping_scope::{ShippingScope, SCOPE_WIRE_KEYS};
