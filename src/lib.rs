pub mod annotation;
pub mod cldf;
pub mod dataset;
pub mod error;
pub mod metadata;
pub mod refind;
