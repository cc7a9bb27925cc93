pub mod answer;
pub mod embeddings;
pub mod http;
pub mod index;
pub mod llm;
pub mod ollama;
pub mod openai;
pub mod providers;
pub mod retrieve;
pub mod session;

pub use session::Session;

#[cfg(test)]
mod tests {
    use super::http::HttpTimeouts;
    use super::ollama::OllamaClient;
    use super::openai::OpenAiClient;
    use super::providers::build_providers_with_env;
    use docqa_core::config::ProviderConfig;
    use docqa_core::error::codes;

    #[test]
    fn enforces_localhost_only_base_url() {
        assert!(OllamaClient::new("http://127.0.0.1:11434").is_ok());
        assert!(OllamaClient::new("http://127.0.0.1").is_ok());

        assert!(OllamaClient::new("http://localhost:11434").is_err());
        assert!(OllamaClient::new("http://0.0.0.0:11434").is_err());
        assert!(OllamaClient::new("http://[::1]:11434").is_err());
        assert!(OllamaClient::new("https://example.com").is_err());

        // Prefix tricks.
        assert!(OllamaClient::new("http://127.0.0.1.evil.com:11434").is_err());
        assert!(OllamaClient::new("http://127.0.0.1@evil.com:11434").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:0").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:99999").is_err());
        assert!(OllamaClient::new("http://127.0.0.1:11434/").is_ok());
        assert!(OllamaClient::new("http://127.0.0.1:11434/api").is_err());

        let err = OllamaClient::new("http://localhost:11434").unwrap_err();
        assert_eq!(err.code, codes::PROVIDER_REMOTE_NOT_ALLOWED);
    }

    #[test]
    fn openai_client_requires_key_and_http_scheme() {
        let t = HttpTimeouts::default();
        assert!(OpenAiClient::new("https://api.openai.com", "sk-test", t).is_ok());
        assert_eq!(
            OpenAiClient::new("https://api.openai.com", "  ", t).unwrap_err().code,
            codes::CONFIG_INVALID
        );
        assert_eq!(
            OpenAiClient::new("ftp://api.openai.com", "sk-test", t).unwrap_err().code,
            codes::CONFIG_INVALID
        );
    }

    #[test]
    fn openai_providers_read_key_from_configured_env_var() {
        let cfg = ProviderConfig::openai();
        let err = build_providers_with_env(&cfg, |_| None).err().expect("missing key");
        assert_eq!(err.code, codes::CONFIG_INVALID);

        let providers =
            build_providers_with_env(&cfg, |k| (k == "OPENAI_API_KEY").then(|| "sk-test".to_string()))
                .expect("providers");
        assert_eq!(providers.embedder.model_id(), "text-embedding-ada-002");
        assert_eq!(providers.llm.model_id(), "gpt-4o-mini");
    }
}
