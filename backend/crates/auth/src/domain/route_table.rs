//! Route Table
//!
//! Static classification of frontend paths into public and protected routes.
//!
//! Public routes are matched exactly. Protected routes are matched by plain
//! string prefix, longest prefix first: `/admin` governs `/admin/users` but
//! also `/admin.html` and `/admin.txt`, the files a static export writes for
//! the route. A public exact match wins over any protected prefix.

use std::collections::HashSet;

use crate::domain::value_object::user_role::{RoleSet, UserRole};
use crate::error::{AuthError, AuthResult};

/// Outcome of classifying a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Reachable without a session. `auth_page` marks login/register style
    /// pages that an authenticated visitor is bounced away from.
    Public { auth_page: bool },
    /// Needs a session; the roles are enforced downstream of the edge.
    Protected(RoleSet),
    /// Not in the table.
    Unclassified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRoute {
    prefix: String,
    roles: RoleSet,
}

impl ProtectedRoute {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn roles(&self) -> RoleSet {
        self.roles
    }

    fn matches(&self, path: &str) -> bool {
        path.starts_with(self.prefix.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    public: HashSet<String>,
    auth_pages: HashSet<String>,
    protected: Vec<ProtectedRoute>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// The application's route table.
    pub fn standard() -> Self {
        use UserRole::{Admin, User};

        Self::builder()
            .public("/")
            .auth_page("/login")
            .auth_page("/register")
            .public("/forgot-password")
            .protected("/dashboard", RoleSet::of(&[User, Admin]))
            .protected("/users", RoleSet::of(&[Admin]))
            .protected("/admin", RoleSet::of(&[Admin]))
            .protected("/settings", RoleSet::of(&[Admin, User]))
            .build()
            .unwrap_or_else(|e| unreachable!("standard route table is valid: {e}"))
    }

    /// Classify a raw request path. The path is normalized first.
    pub fn classify(&self, path: &str) -> RouteClass {
        self.classify_normalized(&normalize_path(path))
    }

    /// Classify a path already passed through [`normalize_path`].
    ///
    /// Normalizing twice would decode percent-escapes twice, so callers that
    /// normalized on their own must use this.
    pub fn classify_normalized(&self, path: &str) -> RouteClass {
        if self.public.contains(path) {
            return RouteClass::Public {
                auth_page: self.auth_pages.contains(path),
            };
        }

        self.protected
            .iter()
            .find(|route| route.matches(path))
            .map_or(RouteClass::Unclassified, |route| {
                RouteClass::Protected(route.roles)
            })
    }

    /// Protected routes in match order (longest prefix first).
    pub fn protected_routes(&self) -> &[ProtectedRoute] {
        &self.protected
    }
}

#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    public: Vec<String>,
    auth_pages: Vec<String>,
    protected: Vec<(String, RoleSet)>,
}

impl RouteTableBuilder {
    pub fn public(mut self, path: impl Into<String>) -> Self {
        self.public.push(path.into());
        self
    }

    /// A public page that authenticated visitors are redirected away from.
    pub fn auth_page(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.public.push(path.clone());
        self.auth_pages.push(path);
        self
    }

    pub fn protected(mut self, prefix: impl Into<String>, roles: RoleSet) -> Self {
        self.protected.push((prefix.into(), roles));
        self
    }

    /// Validate and freeze the table.
    ///
    /// Rejects paths that do not start with `/`, protected prefixes with an
    /// empty role set, and duplicate protected prefixes.
    pub fn build(self) -> AuthResult<RouteTable> {
        let mut public = HashSet::with_capacity(self.public.len());
        for path in &self.public {
            public.insert(validated(path)?);
        }

        let auth_pages = self
            .auth_pages
            .iter()
            .map(|path| validated(path))
            .collect::<AuthResult<HashSet<_>>>()?;

        let mut protected: Vec<ProtectedRoute> = Vec::with_capacity(self.protected.len());
        for (prefix, roles) in self.protected {
            let prefix = validated(&prefix)?;
            if roles.is_empty() {
                return Err(AuthError::InvalidRouteTable(format!(
                    "protected prefix {prefix} allows no role"
                )));
            }
            if protected.iter().any(|route| route.prefix == prefix) {
                return Err(AuthError::InvalidRouteTable(format!(
                    "protected prefix {prefix} is declared twice"
                )));
            }
            protected.push(ProtectedRoute { prefix, roles });
        }

        // Stable sort keeps declaration order among equal lengths.
        protected.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        Ok(RouteTable {
            public,
            auth_pages,
            protected,
        })
    }
}

fn validated(path: &str) -> AuthResult<String> {
    if !path.starts_with('/') {
        return Err(AuthError::InvalidRouteTable(format!(
            "route {path:?} must start with '/'"
        )));
    }
    Ok(normalize_path(path))
}

/// Canonical form of a request path.
///
/// Percent-escapes are decoded, empty and `.` segments dropped, `..` pops a
/// segment (never above the root), and the result has a single leading
/// slash and no trailing slash unless it is the root.
pub fn normalize_path(path: &str) -> String {
    let decoded = urlencoding::decode(path)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| path.to_string());

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut normalized = String::with_capacity(decoded.len() + 1);
    for segment in &segments {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}
