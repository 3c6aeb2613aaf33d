pub mod client;
pub mod groq;

pub use client::{AudioUpload, ChatRequest, InferenceClient, TranscriptionRequest};
pub use groq::GroqClient;
