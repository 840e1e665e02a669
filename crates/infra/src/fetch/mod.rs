pub mod paginated;
pub mod resource;
