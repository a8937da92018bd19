pub mod band;
pub mod check;
pub mod grade;
pub mod init;
pub mod report;
pub mod validate;
