//! Verify a proof-of-service token.

use path402_crypto::{verify_token as verify, SigningSecret};

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, Render, TokenOutput};

/// Execute the verify-token command.
///
/// Needs `[security].signing_secret`; tokens signed with an ephemeral
/// secret cannot be checked after the fact.
pub fn verify_token(config: CliConfig, format: OutputFormat, token: &str) -> CliResult<String> {
    let secret = config.security.signing_secret.as_deref().ok_or_else(|| {
        CliError::user("No [security].signing_secret configured; cannot verify tokens")
    })?;
    let secret = SigningSecret::from_bytes(secret.as_bytes().to_vec())?;

    let claims = verify(token.trim(), &secret)?;

    Ok(TokenOutput { claims }.render(format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use path402_crypto::{CryptoError, TokenIssuer};
    use std::time::Duration;

    fn config_with_secret(secret: &str) -> CliConfig {
        let mut config = CliConfig::default();
        config.security.signing_secret = Some(secret.to_string());
        config
    }

    fn issue(secret: &str) -> String {
        TokenIssuer::new(
            SigningSecret::from_bytes(secret.as_bytes().to_vec()).unwrap(),
            Duration::from_secs(600),
        )
        .issue("/$doc", &"ab".repeat(32), 1000, "node-1")
        .unwrap()
    }

    #[test]
    fn test_valid_token() {
        let output = verify_token(config_with_secret("k1"), OutputFormat::Json, &issue("k1")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["claims"]["path"], "/$doc");
        assert_eq!(json["claims"]["paid"], 1000);
        assert_eq!(json["claims"]["iss"], "node-1");
    }

    #[test]
    fn test_wrong_secret() {
        let result = verify_token(config_with_secret("k2"), OutputFormat::Human, &issue("k1"));
        assert!(matches!(
            result,
            Err(CliError::Crypto(CryptoError::SignatureVerificationFailed))
        ));
    }

    #[test]
    fn test_missing_secret() {
        let result = verify_token(CliConfig::default(), OutputFormat::Human, &issue("k1"));
        assert!(matches!(result, Err(CliError::User(_))));
    }
}
