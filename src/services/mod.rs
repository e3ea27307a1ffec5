pub mod auth_service;
pub mod calendar_service;
pub mod google_oauth;
pub mod interview_service;
pub mod session_service;
pub mod shadowing_service;
