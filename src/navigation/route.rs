//! Route table.
//!
//! Pure path matching; knows nothing about tokens or sessions.

use std::fmt::Display;

use crate::config::PageConfig;

/// Routes the auth layer itself navigates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    /// Home page, where a successful login lands.
    Index,
    Login,
    NotFound,
}

impl RouteName {
    /// The page name used in the route table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Login => "login",
            Self::NotFound => "not-found",
        }
    }

    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Index => "/",
            Self::Login => "/login",
            Self::NotFound => "/not-found",
        }
    }
}

impl Display for RouteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// A path that matched a known page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub name: String,
    /// The normalised path that was requested.
    pub path: String,
}

impl ResolvedRoute {
    pub fn is(&self, route: RouteName) -> bool {
        self.name == route.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Page {
    name: String,
    segments: Vec<String>,
}

impl Page {
    fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            segments: split_segments(pattern),
        }
    }

    fn matches(&self, segments: &[&str]) -> bool {
        self.segments.len() == segments.len()
            && self
                .segments
                .iter()
                .zip(segments)
                .all(|(pattern, actual)| pattern.starts_with(':') || pattern == actual)
    }
}

/// Every page the admin panel can render.
#[derive(Debug, Clone)]
pub struct RouteTable {
    pages: Vec<Page>,
}

/// The admin panel's built-in pages.
const ADMIN_PAGES: &[(&str, &str)] = &[
    ("index", "/"),
    ("login", "/login"),
    ("not-found", "/not-found"),
    ("dashboard", "/dashboard"),
    ("orders", "/orders"),
    ("orders-id", "/orders/:id"),
    ("sales", "/sales"),
    ("items", "/items"),
    ("items-id", "/items/:id"),
    ("products", "/products"),
    ("categories", "/categories"),
    ("brands", "/brands"),
    ("colors", "/colors"),
    ("sizes", "/sizes"),
    ("seasons", "/seasons"),
    ("promotions", "/promotions"),
    ("roles", "/roles"),
    ("permissions", "/permissions"),
    ("profile", "/profile"),
];

impl RouteTable {
    /// A table with only the pages the auth layer needs: index, login, not-found.
    pub fn new() -> Self {
        let pages = [RouteName::Index, RouteName::Login, RouteName::NotFound]
            .iter()
            .map(|r| Page::new(r.as_str(), r.to_path()))
            .collect();
        Self { pages }
    }

    /// The built-in admin pages.
    pub fn admin() -> Self {
        let mut table = Self { pages: Vec::new() };
        for (name, path) in ADMIN_PAGES {
            table.add(name, path);
        }
        table
    }

    /// The built-in admin pages plus any configured extras.
    pub fn from_config(pages: &[PageConfig]) -> Self {
        let mut table = Self::admin();
        for page in pages {
            table.add(&page.name, &page.path);
        }
        table
    }

    /// Registers a page. Earlier registrations win when patterns overlap.
    pub fn add(&mut self, name: &str, pattern: &str) {
        self.pages.push(Page::new(name, pattern));
    }

    /// Matches a requested path against the known pages.
    ///
    /// Query strings, fragments, repeated and trailing slashes are ignored.
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute> {
        let path = strip_suffixes(path);
        let segments = split_segments(path);
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

        self.pages
            .iter()
            .find(|page| page.matches(&segments))
            .map(|page| ResolvedRoute {
                name: page.name.clone(),
                path: normalise(&segments),
            })
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::admin()
    }
}

fn strip_suffixes(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

fn split_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalise(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}
