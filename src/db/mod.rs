pub mod contents;
pub mod courses;
pub mod enrollments;
pub mod modules;
pub mod subjects;
pub mod users;
