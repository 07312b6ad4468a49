pub mod advice;
pub mod alert;
pub mod contract;
pub mod metrics;
pub mod money;
pub mod profile;
