pub mod post_id;
