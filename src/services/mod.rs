pub mod completion_client;
pub mod dedup_service;
pub mod generation_service;
pub mod grading_service;
pub mod mock_service;
pub mod normalizer;
pub mod prompt_builder;
pub mod relevance_validator;
pub mod response_parser;
pub mod session_timer;
