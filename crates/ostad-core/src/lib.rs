pub mod collection;
pub mod entities;
pub mod error;
pub mod id;

pub use collection::Collection;
pub use entities::{Academy, Category, Course, CourseStatus, Lesson, Review, Section, Teacher};
pub use error::{CoreError, ErrorCategory, Result};
pub use id::{IdError, generate_id, validate_id};
