use alloc::string::String;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseStageErrorKind {
    #[error("Unknown stage `{0}`, expected `development` or `production`")]
    Unknown(String),
}
