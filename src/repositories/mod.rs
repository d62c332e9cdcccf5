pub mod owner_repository;
pub mod ownership_repository;
pub mod user_log_repository;
pub mod user_repository;
pub mod vehicle_repository;
