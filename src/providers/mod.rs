pub mod groq;
pub mod ollama;
pub mod openai;
