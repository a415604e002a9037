pub mod accounts;
pub mod lifecycle;
