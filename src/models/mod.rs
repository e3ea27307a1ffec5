pub mod interview;
pub mod profile;
pub mod shadowing_request;
