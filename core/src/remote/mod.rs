pub mod client;

pub use client::{ClassifierClient, UPLOAD_FIELD};
