pub mod screening_service;
