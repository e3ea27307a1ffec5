pub mod auth_dto;
pub mod interview_dto;
pub mod profile_dto;
pub mod shadowing_dto;
