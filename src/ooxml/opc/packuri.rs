/// Part names inside an OPC package.
///
/// A PackURI always begins with a forward slash and uses forward slashes as
/// path separators. ZIP member names are the same string without the
/// leading slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackURI {
    /// The full pack URI string (e.g., "/ppt/slides/slide1.xml")
    uri: String,
}

impl PackURI {
    /// Create a new PackURI, rejecting strings without a leading slash.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Build a PackURI from a ZIP member name.
    pub fn from_member(member: &str) -> Self {
        PackURI {
            uri: format!("/{}", member.trim_start_matches('/')),
        }
    }

    /// Resolve a relationship target against the directory of its source.
    ///
    /// Absolute targets are taken as they are; relative ones may use `..`.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        if relative_ref.starts_with('/') {
            return Self::new(normalize_path(relative_ref));
        }
        let joined = if base_uri.ends_with('/') {
            format!("{}{}", base_uri, relative_ref)
        } else {
            format!("{}/{}", base_uri, relative_ref)
        };
        Self::new(normalize_path(&joined))
    }

    /// Directory portion ("/ppt/slides" for "/ppt/slides/slide1.xml").
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Filename portion ("slide1.xml").
    pub fn filename(&self) -> &str {
        match self.uri.rfind('/') {
            Some(pos) => &self.uri[pos + 1..],
            None => "",
        }
    }

    /// ZIP member name (the URI without its leading slash).
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// PackURI of the relationships part belonging to this part.
    pub fn rels_uri(&self) -> PackURI {
        let base = self.base_uri();
        let uri = if base == "/" {
            format!("/_rels/{}.rels", self.filename())
        } else {
            format!("{}/_rels/{}.rels", base, self.filename())
        };
        PackURI { uri }
    }

    /// Get the full URI string.
    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

/// Resolve `.` and `..` segments, keeping the leading slash.
fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {},
            ".." => {
                parts.pop();
            },
            _ => parts.push(part),
        }
    }
    format!("/{}", parts.join("/"))
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

/// The presentation part of a PowerPoint package
pub const PRESENTATION_URI: &str = "/ppt/presentation.xml";
