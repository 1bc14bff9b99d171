use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Agent not found: {0:?}")]
    AgentNotFound(crate::core::types::AgentId),

    #[error("Cell {0} is already occupied")]
    CellOccupied(crate::spatial::Coordinates),

    #[error("Position {0} is outside the lattice")]
    OutOfBounds(crate::spatial::Coordinates),

    #[error("Converter {0} does not change its resource")]
    DegenerateConverter(crate::core::types::TypePair),

    #[error("Incompatible snapshot: {0}")]
    IncompatibleSnapshot(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, SimError>;
