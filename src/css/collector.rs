/// Raw stylesheet fragments in first-seen order, deduplicated by exact text.
///
/// # Example
///
/// ```
/// use blockliquid::CssCollector;
///
/// let mut css = CssCollector::new();
/// assert!(css.insert(".a{color:red}"));
/// assert!(!css.insert(".a{color:red}"));
/// assert!(!css.insert("   "));
/// assert_eq!(css.fragments().collect::<Vec<_>>(), vec![".a{color:red}"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssCollector {
    fragments: Vec<String>,
}

impl CssCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fragment. Returns `false` if it was blank or already present.
    pub fn insert(&mut self, css: impl Into<String>) -> bool {
        let css = css.into();
        if css.trim().is_empty() || self.fragments.contains(&css) {
            return false;
        }
        self.fragments.push(css);
        true
    }

    pub fn fragments(&self) -> impl Iterator<Item = &str> {
        self.fragments.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl Extend<String> for CssCollector {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        for css in iter {
            self.insert(css);
        }
    }
}
