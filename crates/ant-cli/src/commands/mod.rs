pub mod create;
pub mod lint;
