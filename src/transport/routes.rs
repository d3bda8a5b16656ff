//! Route table: request path to framing.
//!
//! Built once before the server starts listening and shared read-only with
//! every connection task. Paths that are not registered fall through to the
//! static info page.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::protocol::Framing;

// ============================================================================
// Route
// ============================================================================

/// A registered `(path, framing)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Request path, starting with `/`.
    pub path: String,
    /// Framing applied to connections upgraded on this path.
    pub framing: Framing,
}

// ============================================================================
// RouteTable
// ============================================================================

/// Mapping from request path to [`Framing`].
///
/// Routes keep their registration order, which is the order the info page
/// lists them in.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    /// Routes in registration order.
    routes: Vec<Route>,
    /// Path to index into `routes`.
    index: FxHashMap<String, usize>,
}

impl RouteTable {
    /// Creates an empty route table.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the standard echo routes.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` - Buffer size for the `/readWrite` fixed-buffer route
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `chunk_size` is zero.
    pub fn standard(chunk_size: usize) -> Result<Self> {
        Self::new()
            .with_route("/copy", Framing::Copy)?
            .with_route("/readWrite", Framing::FixedBuffer { size: chunk_size })?
            .with_route("/sendRecvText", Framing::Text)?
            .with_route("/sendRecvArrayBuffer", Framing::Binary)?
            .with_route("/sendRecvBlob", Framing::Binary)?
            .with_route("/json", Framing::Json)
    }

    /// Registers `framing` for `path`, replacing any earlier registration.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if `path` does not start with `/`, carries a query,
    ///   or uses capture syntax (`{name}`, `:name`, `*name`)
    /// - [`Error::Config`] if a fixed-buffer framing has a zero size
    pub fn register(&mut self, path: impl Into<String>, framing: Framing) -> Result<()> {
        let path = path.into();

        if !is_literal_path(&path) {
            return Err(Error::config(format!("invalid route path: {path:?}")));
        }
        if let Framing::FixedBuffer { size: 0 } = framing {
            return Err(Error::config(format!("route {path}: chunk size must be positive")));
        }

        match self.index.get(&path) {
            Some(&i) => self.routes[i].framing = framing,
            None => {
                self.index.insert(path.clone(), self.routes.len());
                self.routes.push(Route { path, framing });
            }
        }

        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn with_route(mut self, path: impl Into<String>, framing: Framing) -> Result<Self> {
        self.register(path, framing)?;
        Ok(self)
    }

    /// Looks up the framing for a request path.
    ///
    /// Any query string or fragment is ignored.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<Framing> {
        let end = path.find(['?', '#']).unwrap_or(path.len());
        self.index
            .get(&path[..end])
            .map(|&i| self.routes[i].framing)
    }

    /// Iterates over routes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Returns the number of routes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// A path the router matches literally.
fn is_literal_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.contains(['?', '#', '{', '}'])
        && !path
            .split('/')
            .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
}

// ============================================================================
// Tests
// ============================================================================
