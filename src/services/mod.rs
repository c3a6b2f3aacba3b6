pub mod device_service;
pub mod instruction_service;
pub mod progress_events;
pub mod progress_service;
pub mod speech_log_service;
