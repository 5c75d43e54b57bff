pub mod cli;
pub mod janua;
