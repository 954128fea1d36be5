pub mod allocation;
pub mod class;
pub mod event;
pub mod report;
pub mod semester;
pub mod student;
pub mod workshop;
