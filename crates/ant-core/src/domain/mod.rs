pub mod error;
pub mod model;
pub mod question;
pub mod validation;
