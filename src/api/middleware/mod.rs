pub mod credential;
pub mod request_id;
