pub mod catalog;
pub mod feed;
pub mod system;
pub mod warehouse;
