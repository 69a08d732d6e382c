/// Errors from loading, saving or validating a scene description.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported scene file extension: {0:?}")]
    UnknownFormat(Option<String>),
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
    #[error("body {name}: {reason}")]
    InvalidBody { name: String, reason: &'static str },
    #[error("object {name}: malformed {kind} geometry")]
    InvalidGeometry { name: String, kind: &'static str },
    #[error("unknown material {material:?} referenced by {referrer}")]
    UnknownMaterial { material: String, referrer: String },
    #[error("camera: fov must be in (0, 180) and 0 < near < far")]
    InvalidCamera,
    #[error("fog: near must be non-negative and below far")]
    InvalidFog,
    #[error("binding {index}: {reason}")]
    InvalidBinding { index: usize, reason: &'static str },
}
