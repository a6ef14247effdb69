pub mod application;
pub mod opportunity;
pub mod permission;
pub mod results;
