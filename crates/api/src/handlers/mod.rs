pub mod admin;
pub mod airports;
pub mod history;
pub mod journey;
pub mod reseed;
pub mod timezone;
