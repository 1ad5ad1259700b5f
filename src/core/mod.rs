pub mod admission;
pub mod lifecycle;
pub mod validation;

pub use admission::AdmissionEngine;
