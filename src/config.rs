use clap::Parser;
use sha2::{Digest, Sha256};

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "lume-gateway")]
#[command(about = "Rate limited chat and image gateway for the OpenAI API")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // OpenAI API key, never printed
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    // OpenAI compatible base url
    #[arg(long, default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    // Model used for text requests
    #[arg(long, default_value = "gpt-4o-mini")]
    pub text_model: String,

    // Rate limit max requests per window
    #[arg(long, default_value_t = 2)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,

    // How often expired rate limit entries are swept, in seconds
    #[arg(long, default_value_t = 300)]
    pub sweep_interval: u64,

    // Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Rejects settings the gateway cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.openai_api_key.trim().is_empty() {
            anyhow::bail!("OPENAI_API_KEY is set but empty");
        }
        if self.rate_window == 0 {
            anyhow::bail!("--rate-window must be at least 1 second");
        }
        if self.sweep_interval == 0 {
            anyhow::bail!("--sweep-interval must be at least 1 second");
        }
        Ok(())
    }
}

/// Short SHA-256 fingerprint of a credential, safe to put in logs.
pub fn key_fingerprint(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["lume-gateway", "--openai-api-key", "sk-test"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_the_public_endpoint() {
        let args = parse(&[]);
        assert_eq!(args.port, 8080);
        assert_eq!(args.rate_limit, 2);
        assert_eq!(args.rate_window, 60);
        assert_eq!(args.text_model, "gpt-4o-mini");
        assert_eq!(args.openai_base_url, "https://api.openai.com/v1");
        assert!(args.validate().is_ok());
    }

    #[test]
    fn missing_key_fails_to_parse() {
        // an ambient key would satisfy clap's env fallback
        if std::env::var_os("OPENAI_API_KEY").is_some() {
            return;
        }
        assert!(Args::try_parse_from(["lume-gateway"]).is_err());
    }

    #[test]
    fn blank_key_fails_validation() {
        let mut args = parse(&[]);
        args.openai_api_key = "   ".to_string();
        assert!(args.validate().is_err());
    }

    #[test]
    fn zero_window_fails_validation() {
        let args = parse(&["--rate-window", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn fingerprint_is_stable_and_hides_the_key() {
        let a = key_fingerprint("sk-secret");
        assert_eq!(a, key_fingerprint("sk-secret"));
        assert_eq!(a.len(), 12);
        assert!(!a.contains("secret"));
        assert_ne!(a, key_fingerprint("sk-other"));
    }
}
