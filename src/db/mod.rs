//! Persistence module split across logical submodules. Every function takes
//! the connection explicitly; callers decide which store is current.

mod connection;
mod courses;

pub use connection::{ensure_schema, open_store};
pub(crate) use courses::insert_course;
pub use courses::{
    clear_courses, course_exists, create_course, delete_course, fetch_courses, find_course,
    update_course,
};
