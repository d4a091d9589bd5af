pub mod attendance;
pub mod class;
pub mod guardian;
pub mod student;
