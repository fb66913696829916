pub mod body;

pub use body::{Body, BodyDesc, BodyId, BodyUpdate, DEFAULT_LAYER};
