pub mod column;
pub mod raw_table;
pub mod student;

pub use column::{Column, DEFAULT_DEDUP_KEY, REQUIRED_COLUMNS};
pub use raw_table::RawTable;
pub use student::{Gender, GradeLevel, NewStudent, StudentRecord, StudentTable};
