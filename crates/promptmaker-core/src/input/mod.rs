//! Reference images and request validation.
//!
//! - **image**: load reference images and sniff their format from content
//! - **validate**: the checks every request passes before any network call

pub mod image;
pub mod validate;

pub use self::image::{GenerationRequest, ImageKind, ReferenceImage};
pub use validate::Validator;
