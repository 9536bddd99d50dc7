use crate::UrlError;
use url::Url;

/// Placeholder substituted with the page number
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Expands a listing template into the URL of page `page`
///
/// # Examples
///
/// ```
/// use shelf_crawler::url::page_url;
///
/// let url = page_url("http://books.toscrape.com/catalogue/page-{page}.html", 3).unwrap();
/// assert_eq!(url.as_str(), "http://books.toscrape.com/catalogue/page-3.html");
/// ```
pub fn page_url(template: &str, page: u32) -> Result<Url, UrlError> {
    if !template.contains(PAGE_PLACEHOLDER) {
        return Err(UrlError::MissingPlaceholder(template.to_string()));
    }

    let expanded = template.replace(PAGE_PLACEHOLDER, &page.to_string());
    let url = Url::parse(&expanded).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}
