use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0} (only 3.x is supported)")]
    UnsupportedVersion(String),

    #[error("missing OpenAPI version field")]
    MissingVersion,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid schema reference format: {0}")]
    InvalidRefFormat(String),

    #[error("schema not found in components: {0}")]
    SchemaNotFound(String),

    #[error("operation at {path} has no 200 response")]
    MissingSuccessResponse { path: String },

    #[error("allOf member of {schema}.{property} is an inline schema, not a reference")]
    InlineComposition { schema: String, property: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml_ng::Error,
    },
}
