//! Form state management for the letter being edited.
//!
//! - `form_state`: typed field values, repeating-field operations, validation.
//! - `session`: wraps a form with the generation counter used to cancel
//!   attachment conversions that outlive their template.
//! - `attachment`: binary upload to data URI conversion.

pub mod attachment;
mod form_state;
mod session;

pub use form_state::{FormState, REQUIRED_MESSAGE};
pub use session::{AttachmentTicket, EditingSession};
