//! Saturation module
pub mod policy;

pub use self::policy::SaturationPolicy;
