pub mod geocode;
pub mod template_store;
