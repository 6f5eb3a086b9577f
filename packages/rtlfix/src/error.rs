use rtlfix_dom::MutationError;
use rtlfix_traits::settings::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("settings request failed: {0}")]
    Transport(#[from] ProviderError),

    #[error("malformed settings response: {0}")]
    Malformed(String),

    #[error("settings unavailable after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<SettingsError>,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum FixError {
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Mutation(#[from] MutationError),
}
