pub mod gallery_service;
pub mod import_service;
pub mod registration_service;
pub mod student_table_service;
