use thiserror::Error;

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("frequency must be between 1 and 60 seconds, got {0}")]
    InvalidFrequency(u32),
    #[error("duration must be one of the offered choices, got {0} minutes")]
    InvalidDuration(u32),
    #[error("run length must be positive, got {0} seconds")]
    InvalidRunLength(i64),
    #[error("failed to launch the jiggler thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl PanelError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFrequency(_) | Self::InvalidDuration(_) | Self::InvalidRunLength(_) => {
                "validation"
            }
            Self::Spawn(_) => "internal",
        }
    }

    pub fn is_validation(&self) -> bool {
        self.code() == "validation"
    }
}
