pub mod envelope;
pub mod value;

pub use envelope::{data, envelope, Envelope};
pub use value::{to_transport_value, Value};
