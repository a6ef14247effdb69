//! Store-backed operations. Handlers stay thin and call into these with the
//! authenticated [`Caller`](crate::middleware::Caller) so ownership rules live
//! next to the writes they guard.

pub mod application;
pub mod opportunity;
