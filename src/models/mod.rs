pub mod address;
pub mod delivery;
pub mod event;
