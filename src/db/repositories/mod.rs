pub mod device_repository;
pub mod instructions_repository;
pub mod progress_repository;
pub mod speech_log_repository;
