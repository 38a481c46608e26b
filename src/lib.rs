mod cont_frac;
mod error;
pub mod traits;

pub use cont_frac::{continued_fraction, ContinuedFractionResult, LogValue, Options, Status, Tolerances};
pub use error::{ContinuedFractionError, ErrorKind};
pub use traits::{Element, TermGenerator};
