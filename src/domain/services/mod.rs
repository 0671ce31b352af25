pub mod decoder;
pub mod economics;
pub mod link_resolver;
