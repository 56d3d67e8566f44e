use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::code_input::{CodeInputConfig, DEFAULT_CODE_LENGTH, MIN_CODE_LENGTH};
use crate::phone::PHONE_DIGITS;

pub const DEFAULT_VERIFICATION_DELAY_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("code_length must be at least {MIN_CODE_LENGTH} (got {0})")]
    CodeLength(usize),
    #[error("phone_digits must be > 0")]
    PhoneDigits,
    #[error("verification_delay_ms must be > 0")]
    VerificationDelay,
}

/// Tunables the shell may override at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    pub code_length: usize,
    pub phone_digits: usize,
    pub verification_delay_ms: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            phone_digits: PHONE_DIGITS,
            verification_delay_ms: DEFAULT_VERIFICATION_DELAY_MS,
        }
    }
}

impl CoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_length < MIN_CODE_LENGTH {
            return Err(ConfigError::CodeLength(self.code_length));
        }
        if self.phone_digits == 0 {
            return Err(ConfigError::PhoneDigits);
        }
        if self.verification_delay_ms == 0 {
            return Err(ConfigError::VerificationDelay);
        }
        Ok(())
    }

    #[must_use]
    pub const fn code_input(&self) -> CodeInputConfig {
        CodeInputConfig {
            length: self.code_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = CoreConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.code_length, 6);
        assert_eq!(config.phone_digits, 9);
        assert_eq!(config.verification_delay_ms, 1_000);
    }

    #[test]
    fn test_config_validation() {
        let short = CoreConfig {
            code_length: 1,
            ..CoreConfig::default()
        };
        assert_eq!(short.validate(), Err(ConfigError::CodeLength(1)));

        let no_phone = CoreConfig {
            phone_digits: 0,
            ..CoreConfig::default()
        };
        assert_eq!(no_phone.validate(), Err(ConfigError::PhoneDigits));

        let instant = CoreConfig {
            verification_delay_ms: 0,
            ..CoreConfig::default()
        };
        assert_eq!(instant.validate(), Err(ConfigError::VerificationDelay));
    }
}
