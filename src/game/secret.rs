use std::time::Duration;

use anyhow::{anyhow, Result};
use rand::Rng;

use crate::models::Code;

/// Secret-code source. Prefers the remote integer service and falls back to
/// a local generator, so producing a secret can never fail; external outages
/// are logged and absorbed here.
pub struct SecretGenerator {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl SecretGenerator {
    pub fn new(client: reqwest::Client, url: String, timeout_s: u64) -> Self {
        Self {
            client,
            url,
            timeout: Duration::from_secs(timeout_s),
        }
    }

    /// Produce a fresh secret code.
    pub async fn generate(&self) -> Code {
        match self.fetch_remote().await {
            Ok(code) => code,
            Err(e) => {
                tracing::warn!("remote secret source unavailable, using local generator: {e}");
                local_secret()
            }
        }
    }

    async fn fetch_remote(&self) -> Result<Code> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("num", "4"),
                ("min", "0"),
                ("max", "7"),
                ("col", "1"),
                ("base", "10"),
                ("format", "plain"),
                ("rnd", "new"),
            ])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        parse_plain_integers(&body)
    }
}

/// Parse the provider's plain-text format: one integer per line.
fn parse_plain_integers(body: &str) -> Result<Code> {
    let digits = body
        .trim()
        .lines()
        .map(|line| line.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()?;

    let digits: [u8; Code::LEN] = digits
        .try_into()
        .map_err(|v: Vec<u8>| anyhow!("expected {} integers, got {}", Code::LEN, v.len()))?;

    Ok(Code::from_digits(digits)?)
}

/// Local fallback. ThreadRng is a CSPRNG reseeded from the OS.
fn local_secret() -> Code {
    let mut rng = rand::rng();
    let digits = std::array::from_fn(|_| rng.random_range(0..=Code::DIGIT_MAX));
    Code::from_digits(digits).expect("digits drawn in range")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_integers_accepts_provider_format() {
        let code = parse_plain_integers("1\n5\n0\n7\n").unwrap();
        assert_eq!(code.digits(), [1, 5, 0, 7]);
    }

    #[test]
    fn test_parse_plain_integers_tolerates_crlf_and_padding() {
        let code = parse_plain_integers("  3\r\n2\r\n7\r\n0\r\n").unwrap();
        assert_eq!(code.digits(), [3, 2, 7, 0]);
    }

    #[test]
    fn test_parse_plain_integers_rejects_wrong_count() {
        assert!(parse_plain_integers("1\n2\n3\n").is_err());
        assert!(parse_plain_integers("1\n2\n3\n4\n5\n").is_err());
        assert!(parse_plain_integers("").is_err());
    }

    #[test]
    fn test_parse_plain_integers_rejects_out_of_range() {
        assert!(parse_plain_integers("1\n2\n3\n8\n").is_err());
        assert!(parse_plain_integers("1\n2\n3\n255\n").is_err());
    }

    #[test]
    fn test_parse_plain_integers_rejects_garbage() {
        assert!(parse_plain_integers("<html>Error</html>").is_err());
        assert!(parse_plain_integers("1\n2\nthree\n4\n").is_err());
    }

    #[test]
    fn test_local_secret_is_always_well_formed() {
        for _ in 0..100 {
            let code = local_secret();
            assert!(code.digits().iter().all(|&d| d <= Code::DIGIT_MAX));
        }
    }

    #[test]
    fn test_generate_falls_back_when_source_unreachable() {
        // Port 9 (discard) refuses connections on any sane host
        let generator = SecretGenerator::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/integers/".to_string(),
            1,
        );
        let code = tokio_test::block_on(generator.generate());
        assert!(code.digits().iter().all(|&d| d <= Code::DIGIT_MAX));
    }
}
