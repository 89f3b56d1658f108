//! Doorwatch side-effect channels.
//!
//! - [`capture`]: camera snapshot capture over HTTP ([`ImageCapture`]).
//! - [`delivery`]: outbound notification delivery ([`EmailDelivery`]).
//!
//! Both sit behind capability traits ([`ImageFetcher`], [`Notifier`]).

pub mod capture;
pub mod delivery;

pub use capture::{CaptureError, HttpImageFetcher, ImageCapture, ImageFetcher};
pub use delivery::email::{EmailDelivery, EmailError, Notifier};
