pub mod browsable;
pub mod config;
pub mod dom;
pub mod extract;
pub mod form;
pub mod recording;
pub mod serialize;
pub mod session;
pub mod values;

pub use browsable::{Browsable, Encoding, Submission};
pub use form::{Form, FormError};
pub use values::Values;
