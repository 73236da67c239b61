pub struct PathMutator;

impl PathMutator {
    const SEGMENT_SUFFIXES: &'static [&'static str] = &["%2f", "/", "..;/", ";/"];

    pub fn mutations(url: &str) -> Vec<String> {
        let mut variants = vec![format!("{}.", url), format!("{}/", url)];

        if let Some(end) = Self::segment_end(url) {
            for suffix in Self::SEGMENT_SUFFIXES {
                variants.push(format!("{}{}{}", &url[..end], suffix, &url[end..]));
            }
        }

        variants
    }

    fn segment_end(url: &str) -> Option<usize> {
        let after_scheme = url.find("://").map(|i| i + 3).unwrap_or(0);
        let path_start = after_scheme + url[after_scheme..].find('/')?;
        let path_end = url[path_start..]
            .find(['?', '#'])
            .map(|i| path_start + i)
            .unwrap_or(url.len());

        let trimmed = url[path_start..path_end].trim_end_matches('/');
        let segment = trimmed.rsplit('/').next().unwrap_or("");
        if segment.is_empty() {
            None
        } else {
            Some(path_start + trimmed.len())
        }
    }
}
