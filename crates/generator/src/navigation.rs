//! Breadcrumbs and page listings derived from a page's place in the tree.

use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::path::Path;

use crate::paths::{INDEX_FILE, PathResolver, is_index};

/// A navigable page. Two pages are the same page when their URLs match.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub title: String,
    pub url: String,
}

impl Page {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Page {}

impl Hash for Page {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

/// Sort pages by case-insensitive title.
///
/// The sort is stable, so pages with equal titles keep their input order.
pub fn sort_pages(pages: &mut [Page]) {
    pages.sort_by_cached_key(|page| page.title.to_lowercase());
}

/// Navigation handed to converters and templates for one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavContext {
    pub title: String,
    pub url: String,
    pub breadcrumb: Vec<Page>,
    pub pages: Vec<Page>,
    pub children: Vec<Page>,
}

/// Builds navigation for destination paths using a [`PathResolver`].
#[derive(Debug, Clone, Copy)]
pub struct Navigation<'a> {
    resolver: &'a PathResolver,
}

impl<'a> Navigation<'a> {
    pub fn new(resolver: &'a PathResolver) -> Self {
        Self { resolver }
    }

    /// Ancestor chain from the site root down to the page's directory.
    ///
    /// The chain is strictly root-to-leaf and never re-sorted. An index page
    /// excludes its own directory, so the root index has no breadcrumb and
    /// `a/index.html` has only the root.
    pub fn breadcrumb(&self, dest: &Path) -> Vec<Page> {
        let output_root = self.resolver.output_root();
        let Ok(relative) = dest.strip_prefix(output_root) else {
            return vec![self.resolver.root_page()];
        };

        let mut crumbs = vec![self.resolver.root_page()];
        let mut partial = output_root.to_path_buf();
        if let Some(dir) = relative.parent() {
            for component in dir.components() {
                partial.push(component);
                crumbs.push(self.resolver.page(&partial.join(INDEX_FILE)));
            }
        }

        if is_index(dest) {
            crumbs.pop();
        }
        crumbs
    }

    /// One page per destination, sorted by title
    pub fn siblings<P: AsRef<Path>>(&self, dests: &[P]) -> Vec<Page> {
        let mut pages: Vec<Page> = dests
            .iter()
            .map(|dest| self.resolver.page(dest.as_ref()))
            .collect();
        sort_pages(&mut pages);
        pages
    }

    /// Full navigation for one page.
    ///
    /// `siblings` and `children` are the listings of the page's directory.
    /// Pages already in the breadcrumb and the directory's own index are
    /// left out of `pages` so nothing links back to itself.
    pub fn context(&self, dest: &Path, siblings: &[Page], children: &[Page]) -> NavContext {
        let breadcrumb = self.breadcrumb(dest);
        let own_index = dest
            .parent()
            .map(|dir| self.resolver.to_url(&dir.join(INDEX_FILE)))
            .unwrap_or_default();

        let pages = siblings
            .iter()
            .filter(|page| page.url != own_index && !breadcrumb.contains(page))
            .cloned()
            .collect();

        NavContext {
            title: self.resolver.title_of(dest),
            url: self.resolver.to_url(dest),
            breadcrumb,
            pages,
            children: children.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::default_title_formatter;
    use std::path::PathBuf;

    fn resolver() -> PathResolver {
        PathResolver::new(
            "/wiki",
            "/out",
            "/",
            Some("Home".to_string()),
            default_title_formatter(),
        )
    }

    fn urls(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(|p| p.url.as_str()).collect()
    }

    fn titles(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_page_equality_by_url() {
        assert_eq!(Page::new("One", "/a.html"), Page::new("Two", "/a.html"));
        assert_ne!(Page::new("Same", "/a.html"), Page::new("Same", "/b.html"));
    }

    #[test]
    fn test_breadcrumb_nested_page() {
        let r = resolver();
        let nav = Navigation::new(&r);
        let crumbs = nav.breadcrumb(Path::new("/out/a/b_c/page.html"));
        assert_eq!(urls(&crumbs), vec!["/", "/a/", "/a/b_c/"]);
        assert_eq!(titles(&crumbs), vec!["Home", "A", "B C"]);
    }

    #[test]
    fn test_breadcrumb_index_pages() {
        let r = resolver();
        let nav = Navigation::new(&r);
        assert!(nav.breadcrumb(Path::new("/out/index.html")).is_empty());
        assert_eq!(urls(&nav.breadcrumb(Path::new("/out/a/index.html"))), vec!["/"]);
        assert_eq!(
            urls(&nav.breadcrumb(Path::new("/out/a/b/index.html"))),
            vec!["/", "/a/"]
        );
    }

    #[test]
    fn test_breadcrumb_root_page() {
        let r = resolver();
        let nav = Navigation::new(&r);
        assert_eq!(urls(&nav.breadcrumb(Path::new("/out/hello.html"))), vec!["/"]);
    }

    #[test]
    fn test_sort_is_case_insensitive_and_stable() {
        let mut pages = vec![
            Page::new("banana", "/banana.html"),
            Page::new("Apple", "/Apple.html"),
            Page::new("apple", "/apple.html"),
        ];
        sort_pages(&mut pages);
        assert_eq!(titles(&pages), vec!["Apple", "apple", "banana"]);
        assert_eq!(urls(&pages), vec!["/Apple.html", "/apple.html", "/banana.html"]);
    }

    #[test]
    fn test_siblings_sorted_by_title() {
        let r = resolver();
        let nav = Navigation::new(&r);
        let dests = vec![
            PathBuf::from("/out/zebra.html"),
            PathBuf::from("/out/alpha_beta.html"),
        ];
        let pages = nav.siblings(&dests);
        assert_eq!(titles(&pages), vec!["Alpha Beta", "Zebra"]);
        assert!(nav.siblings::<PathBuf>(&[]).is_empty());
    }

    #[test]
    fn test_root_index_excludes_itself() {
        let r = resolver();
        let nav = Navigation::new(&r);
        let siblings = nav.siblings(&[
            PathBuf::from("/out/index.html"),
            PathBuf::from("/out/hello.html"),
        ]);
        let ctx = nav.context(Path::new("/out/index.html"), &siblings, &[]);
        assert_eq!(ctx.title, "Home");
        assert_eq!(ctx.url, "/");
        assert!(ctx.breadcrumb.is_empty());
        assert_eq!(urls(&ctx.pages), vec!["/hello.html"]);
    }

    #[test]
    fn test_context_excludes_breadcrumb_pages() {
        let r = resolver();
        let nav = Navigation::new(&r);
        let siblings = nav.siblings(&[
            PathBuf::from("/out/docs/index.html"),
            PathBuf::from("/out/docs/child.html"),
        ]);
        let children = nav.siblings(&[PathBuf::from("/out/docs/deep/index.html")]);

        let ctx = nav.context(Path::new("/out/docs/child.html"), &siblings, &children);
        assert_eq!(urls(&ctx.breadcrumb), vec!["/", "/docs/"]);
        assert_eq!(urls(&ctx.pages), vec!["/docs/child.html"]);
        assert_eq!(urls(&ctx.children), vec!["/docs/deep/"]);

        let ctx = nav.context(Path::new("/out/docs/index.html"), &siblings, &children);
        assert_eq!(ctx.title, "Docs");
        assert_eq!(urls(&ctx.breadcrumb), vec!["/"]);
        assert_eq!(urls(&ctx.pages), vec!["/docs/child.html"]);
    }

    #[test]
    fn test_context_empty_listings() {
        let r = resolver();
        let nav = Navigation::new(&r);
        let ctx = nav.context(Path::new("/out/lonely/index.html"), &[], &[]);
        assert!(ctx.pages.is_empty());
        assert!(ctx.children.is_empty());
    }
}
