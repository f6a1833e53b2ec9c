pub mod geocode;
pub mod model;
pub mod server;
