//! Request and controller context handed to widgets.

use std::collections::HashMap;
use std::fmt;

use http::{Extensions, HeaderMap, Method};
use rand::Rng;

use crate::session::SharedSession;

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let salt: u32 = rand::thread_rng().gen();
        Self(format!("{:x}-{:08x}", nanos, salt))
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Query string parameters.
pub type QueryParams = HashMap<String, String>;

/// The current request as seen by widgets.
///
/// Widgets only use the session; everything else is carried so that widget
/// hooks and templates can inspect it.
pub struct RequestContext {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Query string parameters.
    pub query: QueryParams,
    /// HTTP headers.
    pub headers: HeaderMap,
    session: Option<SharedSession>,
}

impl RequestContext {
    /// Create a new request context without a session.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::generate(),
            method,
            path: path.into(),
            query: HashMap::new(),
            headers: HeaderMap::new(),
            session: None,
        }
    }

    /// Attach the visitor's session.
    pub fn with_session(mut self, session: SharedSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Add a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// The visitor's session, if the host supplied one.
    pub fn session(&self) -> Option<&SharedSession> {
        self.session.as_ref()
    }

    /// Get a query parameter by name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|s| s.as_str())
    }

    /// Get a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("has_session", &self.session.is_some())
            .finish()
    }
}

/// The host controller handling the request.
///
/// Opaque to the runtime; hosts can stash typed data in `extensions`.
#[derive(Debug, Clone, Default)]
pub struct ControllerContext {
    /// Controller name.
    pub controller: String,
    /// Action being executed.
    pub action: String,
    /// Host-defined typed values.
    pub extensions: Extensions,
}

impl ControllerContext {
    /// Create a controller context.
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
            extensions: Extensions::new(),
        }
    }

    /// Attach a typed host value.
    pub fn with_extension<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }
}
