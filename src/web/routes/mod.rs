pub mod form;
pub mod gallery;
pub mod import;
pub mod students_api;
