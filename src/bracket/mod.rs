pub mod connector;
pub mod layout;
