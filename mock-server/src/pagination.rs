//! Page-number pagination with `count`/`next`/`previous`/`results` envelopes.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MAX_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Page selection taken from the raw query string. Everything that is not
/// `page` is kept verbatim so neighbour links reproduce the same search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: Option<String>,
    page_size: usize,
    other: Vec<(String, String)>,
}

/// The requested page does not exist (non-numeric, zero, or past the end).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPage;

impl PageRequest {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut page = None;
        let mut page_size = DEFAULT_PAGE_SIZE;
        let mut other = Vec::new();
        for (key, value) in pairs {
            match key.as_str() {
                "page" => page = Some(value),
                "page_size" => {
                    page_size = match value.parse::<usize>() {
                        Ok(0) | Err(_) => DEFAULT_PAGE_SIZE,
                        Ok(n) => n.min(MAX_PAGE_SIZE),
                    };
                    other.push((key, value));
                }
                _ => other.push((key, value)),
            }
        }
        Self {
            page,
            page_size,
            other,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Slice `items` into the requested page. `base_url` is the absolute
    /// endpoint URL the neighbour links are built on.
    pub fn paginate<T: Clone>(&self, items: &[T], base_url: &str) -> Result<Page<T>, InvalidPage> {
        let page = match self.page.as_deref() {
            None => 1,
            Some("last") => num_pages(items.len(), self.page_size),
            Some(raw) => raw.parse::<usize>().map_err(|_| InvalidPage)?,
        };
        let pages = num_pages(items.len(), self.page_size);
        if page == 0 || page > pages {
            return Err(InvalidPage);
        }

        let start = (page - 1) * self.page_size;
        let end = (start + self.page_size).min(items.len());
        Ok(Page {
            count: items.len(),
            next: (page < pages).then(|| self.link(base_url, Some(page + 1))),
            previous: (page > 1).then(|| self.link(base_url, (page > 2).then_some(page - 1))),
            results: items[start..end].to_vec(),
        })
    }

    fn link(&self, base_url: &str, page: Option<usize>) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.other {
            query.append_pair(key, value);
        }
        if let Some(page) = page {
            query.append_pair("page", &page.to_string());
        }
        let query = query.finish();
        if query.is_empty() {
            base_url.to_string()
        } else {
            format!("{base_url}?{query}")
        }
    }
}

/// An empty result still has one (empty) first page.
fn num_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size).max(1)
}
