use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Skill not found: {0}")]
    SkillNotFound(String),

    #[error("NPC not found: {0}")]
    NpcNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),

    #[error("Invalid save data: {0}")]
    InvalidSave(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
