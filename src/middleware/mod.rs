pub mod actor;
pub mod request_id;

pub use actor::ActingUser;
pub use request_id::{make_span_with_request_id, request_id_middleware, RequestId};
