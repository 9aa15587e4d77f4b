pub mod analyzer;
pub mod session;
pub mod take;
