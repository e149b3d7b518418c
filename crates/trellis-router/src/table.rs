//! The route table: a tree of route nodes built once from declared files
//!
//! Each node corresponds to one directory segment and records which route
//! files (page, layout, loading, error, not-found) live there. The tree is
//! immutable after `RouterBuilder::build` and nodes are shared behind `Arc`,
//! so matches can outlive the borrow of the router and cross task boundaries.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::path::{segment_eq, split_segments};
use crate::{
    BuildError, FileRole, MatchError, ParamBindings, RouteFile, RoutePattern, RouteSegment,
};

// ============================================================================
// Route Nodes
// ============================================================================

/// File ids attached to a route node, one optional slot per role
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteFiles {
    pub page: Option<String>,
    pub layout: Option<String>,
    pub loading: Option<String>,
    pub error: Option<String>,
    pub not_found: Option<String>,
}

impl RouteFiles {
    pub fn get(&self, role: FileRole) -> Option<&str> {
        match role {
            FileRole::Page => self.page.as_deref(),
            FileRole::Layout => self.layout.as_deref(),
            FileRole::Loading => self.loading.as_deref(),
            FileRole::Error => self.error.as_deref(),
            FileRole::NotFound => self.not_found.as_deref(),
        }
    }

    fn slot_mut(&mut self, role: FileRole) -> &mut Option<String> {
        match role {
            FileRole::Page => &mut self.page,
            FileRole::Layout => &mut self.layout,
            FileRole::Loading => &mut self.loading,
            FileRole::Error => &mut self.error,
            FileRole::NotFound => &mut self.not_found,
        }
    }
}

/// A node of the route tree
#[derive(Debug)]
pub struct RouteNode {
    segment: Option<RouteSegment>,
    pattern: RoutePattern,
    files: RouteFiles,
    children: Vec<Arc<RouteNode>>,
}

impl RouteNode {
    /// The segment this node matches; `None` for the root
    pub fn segment(&self) -> Option<&RouteSegment> {
        self.segment.as_ref()
    }

    /// Pattern from the root down to this node
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn files(&self) -> &RouteFiles {
        &self.files
    }

    pub fn file(&self, role: FileRole) -> Option<&str> {
        self.files.get(role)
    }

    /// Children in match order: static, group, dynamic, catch-all
    pub fn children(&self) -> &[Arc<RouteNode>] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.segment.is_none()
    }
}

// ============================================================================
// Resolution Results
// ============================================================================

/// A path matched to a page
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Nodes from the root down to the page's node
    pub chain: Vec<Arc<RouteNode>>,
    /// Parameters bound along the chain
    pub params: ParamBindings,
    page: String,
}

impl RouteMatch {
    pub fn leaf(&self) -> &Arc<RouteNode> {
        // chain always holds at least the root
        &self.chain[self.chain.len() - 1]
    }

    pub fn pattern(&self) -> &RoutePattern {
        self.leaf().pattern()
    }

    /// Id of the page file that answers this match
    pub fn page_file(&self) -> &str {
        &self.page
    }
}

/// A path that matched no page but has a not-found fallback on its chain
#[derive(Debug, Clone)]
pub struct NotFoundMatch {
    /// Nodes from the root down to the node owning the fallback
    pub chain: Vec<Arc<RouteNode>>,
    /// The requested path
    pub path: String,
    file: String,
}

impl NotFoundMatch {
    /// Id of the not-found file that answers this path
    pub fn not_found_file(&self) -> &str {
        &self.file
    }
}

/// Outcome of a successful resolution
#[derive(Debug, Clone)]
pub enum Resolution {
    Matched(RouteMatch),
    NotFound(NotFoundMatch),
}

impl Resolution {
    pub fn chain(&self) -> &[Arc<RouteNode>] {
        match self {
            Resolution::Matched(m) => &m.chain,
            Resolution::NotFound(m) => &m.chain,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Resolution::Matched(_))
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Collects route files and builds an immutable [`Router`]
///
/// # Examples
///
/// ```
/// use trellis_router::{Resolution, RouteFile, Router};
///
/// let router = Router::builder()
///     .with_file(RouteFile::from_path("app/products/[slug]/page", "app").unwrap())
///     .with_file(RouteFile::from_path("app/products/featured/page", "app").unwrap())
///     .build()
///     .unwrap();
///
/// match router.resolve("/products/featured").unwrap() {
///     Resolution::Matched(m) => assert_eq!(m.page_file(), "app/products/featured/page"),
///     Resolution::NotFound(_) => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouterBuilder {
    files: Vec<RouteFile>,
    case_insensitive: bool,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare static segments without regard to ASCII case
    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    pub fn with_file(mut self, file: RouteFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_files<I>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = RouteFile>,
    {
        self.files.extend(files);
        self
    }

    /// Parses `file_path` relative to `app_dir` and adds it
    pub fn with_path(self, file_path: &str, app_dir: &str) -> Result<Self, BuildError> {
        Ok(self.with_file(RouteFile::from_path(file_path, app_dir)?))
    }

    pub fn build(self) -> Result<Router, BuildError> {
        let mut root = NodeDraft::new(None, RoutePattern::root());
        for file in &self.files {
            root.insert(file, 0)?;
        }

        let root = root.freeze();
        let routes = collect_pages(&root, self.case_insensitive)?;

        debug!(
            files = self.files.len(),
            routes = routes.len(),
            "route table built"
        );

        Ok(Router {
            root,
            routes,
            case_insensitive: self.case_insensitive,
        })
    }
}

struct NodeDraft {
    segment: Option<RouteSegment>,
    pattern: RoutePattern,
    files: RouteFiles,
    children: Vec<NodeDraft>,
}

impl NodeDraft {
    fn new(segment: Option<RouteSegment>, pattern: RoutePattern) -> Self {
        Self {
            segment,
            pattern,
            files: RouteFiles::default(),
            children: Vec::new(),
        }
    }

    fn insert(&mut self, file: &RouteFile, depth: usize) -> Result<(), BuildError> {
        let segments = file.pattern.segments();

        let Some(segment) = segments.get(depth) else {
            let slot = self.files.slot_mut(file.role);
            if slot.is_some() {
                return Err(BuildError::DuplicateFile {
                    pattern: self.pattern.to_string(),
                    role: file.role,
                });
            }
            *slot = Some(file.id.clone());
            return Ok(());
        };

        let index = match self.children.iter().position(|c| c.segment.as_ref() == Some(segment)) {
            Some(index) => index,
            None => {
                self.check_param_conflict(segment)?;
                let pattern = self
                    .pattern
                    .child(segment.clone())
                    .map_err(|source| BuildError::Pattern {
                        file: file.id.clone(),
                        source,
                    })?;
                self.children.push(NodeDraft::new(Some(segment.clone()), pattern));
                self.children.len() - 1
            }
        };

        self.children[index].insert(file, depth + 1)
    }

    fn check_param_conflict(&self, segment: &RouteSegment) -> Result<(), BuildError> {
        let Some(name) = segment.param_name() else {
            return Ok(());
        };

        let existing = self
            .children
            .iter()
            .filter_map(|c| c.segment.as_ref()?.param_name())
            .find(|other| *other != name);

        match existing {
            Some(other) => Err(BuildError::ConflictingParamNames {
                pattern: self.pattern.to_string(),
                first: other.to_string(),
                second: name.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn freeze(mut self) -> Arc<RouteNode> {
        self.children
            .sort_by_key(|c| c.segment.as_ref().map(RouteSegment::rank).unwrap_or(0));

        Arc::new(RouteNode {
            segment: self.segment,
            pattern: self.pattern,
            files: self.files,
            children: self.children.into_iter().map(NodeDraft::freeze).collect(),
        })
    }
}

/// Lists page patterns by specificity and rejects two pages answering the same URL shape
fn collect_pages(root: &Arc<RouteNode>, case_insensitive: bool) -> Result<Vec<RoutePattern>, BuildError> {
    fn walk(node: &Arc<RouteNode>, out: &mut Vec<RoutePattern>) {
        if node.files.page.is_some() {
            out.push(node.pattern.clone());
        }
        for child in &node.children {
            walk(child, out);
        }
    }

    let mut pages = Vec::new();
    walk(root, &mut pages);

    let mut shapes: HashMap<String, &RoutePattern> = HashMap::new();
    for pattern in &pages {
        let shape = url_shape(pattern, case_insensitive);
        if let Some(first) = shapes.insert(shape, pattern) {
            return Err(BuildError::AmbiguousRoute {
                first: first.to_string(),
                second: pattern.to_string(),
            });
        }
    }

    pages.sort_by(|a, b| a.cmp_specificity(b).then_with(|| a.url_pattern().cmp(&b.url_pattern())));
    Ok(pages)
}

fn url_shape(pattern: &RoutePattern, case_insensitive: bool) -> String {
    pattern
        .segments()
        .iter()
        .filter_map(|segment| match segment {
            RouteSegment::Static(name) if case_insensitive => Some(name.to_ascii_lowercase()),
            RouteSegment::Static(name) => Some(name.clone()),
            RouteSegment::Group(_) => None,
            RouteSegment::Dynamic(_) => Some("\u{0}dynamic".to_string()),
            RouteSegment::OptionalCatchAll(_) => Some("\u{0}catch-all".to_string()),
        })
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// Router
// ============================================================================

/// Immutable route table, safe to share between concurrent renders
#[derive(Debug, Clone)]
pub struct Router {
    root: Arc<RouteNode>,
    routes: Vec<RoutePattern>,
    case_insensitive: bool,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn root(&self) -> &Arc<RouteNode> {
        &self.root
    }

    /// Page patterns, most specific first
    pub fn routes(&self) -> &[RoutePattern] {
        &self.routes
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Resolves a request path to a page, or to the nearest not-found fallback
    ///
    /// Children are tried static first, then groups, dynamic segments and
    /// finally the optional catch-all. A branch that holds no page for the
    /// remaining path falls through to the next candidate, so the most
    /// specific declared route wins. Anything after `?` or `#` is ignored.
    pub fn resolve(&self, path: &str) -> Result<Resolution, MatchError> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments = split_segments(path);
        let refs: Vec<&str> = segments.iter().map(String::as_str).collect();

        if let Some((mut chain, params)) = self.descend(&self.root, &refs, &ParamBindings::new()) {
            chain.reverse();
            let leaf = &chain[chain.len() - 1];
            let page = leaf.files.page.clone().unwrap_or_default();
            debug!(path, route = %leaf.pattern, "route matched");
            return Ok(Resolution::Matched(RouteMatch {
                chain,
                params,
                page,
            }));
        }

        let mut chain = self.reachable_chain(&refs);
        let Some(nearest) = chain.iter().rposition(|n| n.files.not_found.is_some()) else {
            debug!(path, "no route and no not-found fallback");
            return Err(MatchError::NoRoute {
                path: path.to_string(),
            });
        };

        chain.truncate(nearest + 1);
        let file = chain[nearest].files.not_found.clone().unwrap_or_default();
        debug!(path, fallback = %file, "route not found");
        Ok(Resolution::NotFound(NotFoundMatch {
            chain,
            path: path.to_string(),
            file,
        }))
    }

    /// Resolves `path` to a page match, ignoring not-found fallbacks
    pub fn match_route(&self, path: &str) -> Option<RouteMatch> {
        match self.resolve(path) {
            Ok(Resolution::Matched(m)) => Some(m),
            _ => None,
        }
    }

    /// Generates a URL for the page declared at `pattern`
    ///
    /// `pattern` may be given with or without route groups.
    ///
    /// ```
    /// use trellis_router::{ParamBindings, Router};
    ///
    /// let router = Router::builder()
    ///     .with_path("app/products/[slug]/page", "app").unwrap()
    ///     .build().unwrap();
    ///
    /// let params = ParamBindings::new().with_one("slug", "7");
    /// assert_eq!(router.url_for("/products/[slug]", &params).unwrap(), "/products/7");
    /// assert_eq!(router.url_for("/missing", &params), None);
    /// ```
    pub fn url_for(&self, pattern: &str, params: &ParamBindings) -> Option<String> {
        self.routes
            .iter()
            .find(|route| route.to_string() == pattern || route.url_pattern() == pattern)
            .and_then(|route| route.generate_url(params))
    }

    /// Depth-first search for a page node matching the remaining path
    ///
    /// Returns the chain leaf-first; callers reverse it.
    fn descend(
        &self,
        node: &Arc<RouteNode>,
        path: &[&str],
        bindings: &ParamBindings,
    ) -> Option<(Vec<Arc<RouteNode>>, ParamBindings)> {
        if path.is_empty() && node.files.page.is_some() {
            return Some((vec![Arc::clone(node)], bindings.clone()));
        }

        candidates(node).into_iter().find_map(|steps| {
            let (target, groups) = steps.split_last()?;
            let found = match target.segment.as_ref()? {
                RouteSegment::Static(name) => {
                    let (first, rest) = path.split_first()?;
                    if !segment_eq(name, first, self.case_insensitive) {
                        return None;
                    }
                    self.descend(target, rest, bindings)
                }
                // a group reached here answers only with its own page
                RouteSegment::Group(_) => {
                    if !path.is_empty() {
                        return None;
                    }
                    target.files.page.as_ref()?;
                    Some((vec![Arc::clone(target)], bindings.clone()))
                }
                RouteSegment::Dynamic(name) => {
                    let (first, rest) = path.split_first()?;
                    let mut bound = bindings.clone();
                    bound.insert_one(name.as_str(), *first);
                    self.descend(target, rest, &bound)
                }
                RouteSegment::OptionalCatchAll(name) => {
                    target.files.page.as_ref()?;
                    let mut bound = bindings.clone();
                    bound.insert_many(name.as_str(), path.iter().copied());
                    Some((vec![Arc::clone(target)], bound))
                }
            };

            found.map(|(mut chain, params)| {
                chain.extend(groups.iter().rev().cloned());
                chain.push(Arc::clone(node));
                (chain, params)
            })
        })
    }

    /// Nodes reachable by following `path` as far as the tree allows
    fn reachable_chain(&self, path: &[&str]) -> Vec<Arc<RouteNode>> {
        let mut chain = vec![Arc::clone(&self.root)];

        for segment in path {
            let current = Arc::clone(&chain[chain.len() - 1]);
            if matches!(current.segment, Some(RouteSegment::OptionalCatchAll(_))) {
                break;
            }
            match self.step(&current, segment) {
                Some(steps) => chain.extend(steps),
                None => break,
            }
        }

        chain
    }

    fn step(&self, node: &Arc<RouteNode>, segment: &str) -> Option<Vec<Arc<RouteNode>>> {
        candidates(node).into_iter().find(|steps| {
            match steps.last().and_then(|target| target.segment.as_ref()) {
                Some(RouteSegment::Static(name)) => segment_eq(name, segment, self.case_insensitive),
                Some(RouteSegment::Dynamic(_)) | Some(RouteSegment::OptionalCatchAll(_)) => true,
                _ => false,
            }
        })
    }
}

/// Match candidates below `node`, groups flattened into their parent's position
///
/// Each candidate is the run of nodes from a child of `node` down to the
/// target: the groups crossed on the way, then the target itself. A group
/// is also a target of its own, for its page. Candidates are ordered by the
/// target's rank, so a catch-all inside a group still yields to a sibling
/// dynamic segment; equal ranks keep tree order.
fn candidates(node: &Arc<RouteNode>) -> Vec<Vec<Arc<RouteNode>>> {
    fn gather(
        node: &Arc<RouteNode>,
        through: &mut Vec<Arc<RouteNode>>,
        out: &mut Vec<Vec<Arc<RouteNode>>>,
    ) {
        for child in &node.children {
            through.push(Arc::clone(child));
            out.push(through.clone());
            if matches!(child.segment, Some(RouteSegment::Group(_))) {
                gather(child, through, out);
            }
            through.pop();
        }
    }

    let mut out = Vec::new();
    gather(node, &mut Vec::new(), &mut out);
    out.sort_by_key(|steps| {
        steps
            .last()
            .and_then(|target| target.segment.as_ref())
            .map(RouteSegment::rank)
            .unwrap_or(0)
    });
    out
}
