//! Live service: shared state, pipeline and request boundary

mod live;
mod protocol;

pub use live::{BatchOutcome, LiveService};
pub use protocol::{Reply, Request, RequestHandler, ResponseStatus, SelectionResponse, GENERIC_ERROR};
