mod posts;

pub use posts::api_routes;
