//! Chat-completion adapter core.
//!
//! One parameterized request/response cycle replaces the per-backend
//! wrapper code: a [`ProviderProfile`] selects endpoint, auth, and payload
//! shape; the request builder assembles a deterministic JSON body (threading
//! an image through normalization when present); and the transport executes
//! it with a bounded retry loop.

pub(crate) mod client;
pub(crate) mod profile;
pub(crate) mod request;
pub(crate) mod transport;

pub use client::ChatClient;
pub use profile::{ParamMode, Provider, ProviderProfile};
pub use request::{build, BuiltRequest, CallRequest, Sampling};
pub use transport::{
    AttemptObserver, ChatTransport, HttpResponse, HttpSend, ReqwestSender, TracingObserver,
};
