pub mod auth;
pub mod confirmation;
pub mod intake;
