//! fwimage - Intel HEX / binary firmware image core
//!
//! This library provides the image model and codecs shared by the programmer front end and the fwx CLI tool.

pub mod binary;
pub mod buffer;
pub mod ihex;
pub mod inspect;
pub mod logging;
pub mod session;

pub use buffer::{BufferError, FirmwareImage, Provenance};
pub use session::{ImageFormat, Session, SessionError};
