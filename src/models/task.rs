/// A pending unit of work. An empty fragment marks a directory task: the
/// wordlist gets replayed against `base_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub base_url: String,
    pub fragment: String,
    pub depth: usize,
}

impl Task {
    pub fn new(base_url: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            fragment: fragment.into(),
            depth: 0,
        }
    }

    pub fn directory(base_url: impl Into<String>, depth: usize) -> Self {
        Self {
            base_url: base_url.into(),
            fragment: String::new(),
            depth,
        }
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn is_directory(&self) -> bool {
        self.fragment.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub path: String,
}

impl ProbeTarget {
    pub fn new(path: String) -> Self {
        Self { path }
    }

    pub fn is_directory(&self) -> bool {
        self.path.ends_with('/')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub status: Option<u16>,
    pub body: Option<String>,
    pub url: String,
}

impl ProbeResult {
    pub fn new(url: String, status: u16, body: String) -> Self {
        Self {
            status: Some(status),
            body: Some(body),
            url,
        }
    }

    pub fn failed(url: String) -> Self {
        Self {
            status: None,
            body: None,
            url,
        }
    }
}
