use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {var}")]
    MissingEnv { var: &'static str },

    #[error("environment variable {var} has invalid value '{value}': expected an integer")]
    InvalidInt { var: &'static str, value: String },
}
