use std::fmt;

/// Custom error type for Reward Cloud operations
#[derive(Debug)]
pub enum CloudError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// API returned an error response
    Api { status: u16, message: String },
    /// API rejected the bearer token (HTTP 401)
    Unauthorized,
    /// Failed to read or write the token cache
    Token(String),
    /// Configuration error (context file, settings)
    Config(String),
    /// JSON parsing error
    Json(String),
    /// Failed to read operator input
    Prompt(String),
    /// Operator input failed validation
    Selection(String),
    /// A required entity or context could not be resolved
    Resolution(String),
    /// Operation cancelled by the operator
    Cancelled,
    /// Error wrapped with the name of the operation that failed
    Context {
        context: String,
        source: Box<CloudError>,
    },
}

impl CloudError {
    /// Wrap this error with one line of operation context
    pub fn context(self, context: impl Into<String>) -> Self {
        CloudError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True if this error (or any error it wraps) is the unauthorized sentinel
    pub fn is_unauthorized(&self) -> bool {
        match self {
            CloudError::Unauthorized => true,
            CloudError::Context { source, .. } => source.is_unauthorized(),
            _ => false,
        }
    }

    /// True if this error (or any error it wraps) is an operator cancellation
    pub fn is_cancelled(&self) -> bool {
        match self {
            CloudError::Cancelled => true,
            CloudError::Context { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

impl fmt::Display for CloudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudError::Http(e) => write!(f, "HTTP request failed: {}", e),
            CloudError::Api { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            CloudError::Unauthorized => write!(f, "unauthorized"),
            CloudError::Token(msg) => write!(f, "{}", msg),
            CloudError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CloudError::Json(msg) => write!(f, "JSON error: {}", msg),
            CloudError::Prompt(msg) => write!(f, "{}", msg),
            CloudError::Selection(msg) => write!(f, "{}", msg),
            CloudError::Resolution(msg) => write!(f, "{}", msg),
            CloudError::Cancelled => write!(f, "operation cancelled"),
            CloudError::Context { context, source } => write!(f, "{}: {}", context, source),
        }
    }
}

impl std::error::Error for CloudError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CloudError::Http(e) => Some(e),
            CloudError::Context { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CloudError {
    fn from(err: reqwest::Error) -> Self {
        CloudError::Http(err)
    }
}

impl From<serde_json::Error> for CloudError {
    fn from(err: serde_json::Error) -> Self {
        CloudError::Json(err.to_string())
    }
}

impl From<serde_yml::Error> for CloudError {
    fn from(err: serde_yml::Error) -> Self {
        CloudError::Config(err.to_string())
    }
}

impl From<std::io::Error> for CloudError {
    fn from(err: std::io::Error) -> Self {
        CloudError::Config(err.to_string())
    }
}

impl From<dialoguer::Error> for CloudError {
    fn from(err: dialoguer::Error) -> Self {
        CloudError::Prompt(format!("reading from prompt: {}", err))
    }
}

/// Result type alias for Reward Cloud operations
pub type Result<T> = std::result::Result<T, CloudError>;

/// Attach operation context to the error side of a `Result`
pub trait ResultExt<T> {
    fn context(self, context: &str) -> Result<T>;
}

impl<T, E: Into<CloudError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|e| e.into().context(context))
    }
}
