pub mod generation;
pub mod grade;
pub mod question;
pub mod session;
