use slug::slugify;
use url::Url;
use uuid::Uuid;

use crate::{constants::PROJECTS_PREFIX, errors::AppError};

const UNTITLED: &str = "untitled";

/// Storage folder for one project: `projects/<owner>/<title-slug>`.
pub fn project_namespace(owner_id: &str, title: &str) -> String {
    let slug = slugify(title);
    let slug = if slug.is_empty() { UNTITLED.to_string() } else { slug };
    format!("{}/{}/{}", PROJECTS_PREFIX, urlencoding::encode(owner_id), slug)
}

/// Each upload gets its own file so projects sharing a folder never
/// overwrite one another.
pub fn thumbnail_path(namespace: &str, file_id: &Uuid) -> String {
    format!("{namespace}/thumbnail_{file_id}")
}

pub fn screenshot_path(namespace: &str, slot_id: &Uuid) -> String {
    format!("{namespace}/screenshot_{slot_id}")
}

/// A project folder recovered from a blob path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Namespace {
    pub owner_id: String,
    pub title_slug: String,
    pub path: String,
}

impl Namespace {
    pub fn matches(&self, owner_id: &str, title: &str) -> bool {
        self.path == project_namespace(owner_id, title)
    }
}

/// Splits `projects/<owner>/<slug>/<file>` into its namespace. Paths outside
/// the projects folder, or without a file part, yield `None`.
pub fn split_namespace(path: &str) -> Option<Namespace> {
    let mut parts = path.splitn(4, '/');
    let (prefix, owner, slug, file) = (parts.next()?, parts.next()?, parts.next()?, parts.next()?);

    if prefix != PROJECTS_PREFIX || owner.is_empty() || slug.is_empty() || file.is_empty() {
        return None;
    }

    let owner_id = urlencoding::decode(owner).ok()?.into_owned();
    Some(Namespace {
        owner_id,
        title_slug: slug.to_string(),
        path: format!("{prefix}/{owner}/{slug}"),
    })
}

/// Decodes a percent-encoded blob path taken from a URL. Rejects empty and
/// parent segments.
pub fn decode_path(raw: &str) -> Option<String> {
    let segments = raw
        .trim_matches('/')
        .split('/')
        .map(|segment| urlencoding::decode(segment).ok().map(|s| s.into_owned()))
        .collect::<Option<Vec<_>>>()?;

    if segments.iter().any(|s| s.is_empty() || s == "." || s == "..") {
        return None;
    }

    Some(segments.join("/"))
}

/// Translates between blob paths and the download URLs handed to clients.
#[derive(Debug, Clone)]
pub struct MediaUrls {
    base: String,
}

impl MediaUrls {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        Url::parse(base_url)
            .map_err(|e| AppError::InternalError(format!("Invalid media base URL {base_url}: {e}")))?;

        Ok(MediaUrls {
            base: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        let encoded = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}", self.base, encoded)
    }

    /// The blob path behind `url`, if `url` was produced by this store.
    pub fn path_of(&self, url: &str) -> Option<String> {
        let rest = url.strip_prefix(&self.base)?.strip_prefix('/')?;
        let rest = rest.split(['?', '#']).next().unwrap_or_default();
        decode_path(rest)
    }

    /// Accepts either a URL from this store or a bare path.
    pub fn resolve(&self, path_or_url: &str) -> Option<String> {
        if path_or_url.contains("://") {
            self.path_of(path_or_url)
        } else {
            Some(path_or_url.trim_matches('/').to_string()).filter(|p| is_safe_path(p))
        }
    }
}

fn is_safe_path(path: &str) -> bool {
    !path.is_empty()
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_uses_title_slug() {
        assert_eq!(
            project_namespace("user-1", "My Cool App!"),
            "projects/user-1/my-cool-app"
        );
        assert_eq!(project_namespace("user-1", "   "), "projects/user-1/untitled");
    }

    #[test]
    fn owner_segment_is_encoded() {
        let ns = project_namespace("a/b@c", "Site");
        assert_eq!(ns, "projects/a%2Fb%40c/site");

        let split = split_namespace(&thumbnail_path(&ns, &Uuid::new_v4())).unwrap();
        assert_eq!(split.owner_id, "a/b@c");
        assert_eq!(split.title_slug, "site");
        assert!(split.matches("a/b@c", "Site"));
    }

    #[test]
    fn split_ignores_foreign_paths() {
        assert!(split_namespace("avatars/u1/me.png").is_none());
        assert!(split_namespace("projects/u1/site").is_none());
    }

    #[test]
    fn urls_round_trip_through_paths() {
        let urls = MediaUrls::new("http://localhost/media/").unwrap();
        let path = "projects/a%2Fb/site/thumbnail";
        let url = urls.url_for(path);

        assert_eq!(url, "http://localhost/media/projects/a%252Fb/site/thumbnail");
        assert_eq!(urls.path_of(&url).as_deref(), Some(path));
        assert_eq!(urls.resolve(&url).as_deref(), Some(path));
        assert!(urls.path_of("https://elsewhere.test/media/x").is_none());
    }

    #[test]
    fn parent_segments_are_rejected() {
        assert!(decode_path("projects/../../etc/passwd").is_none());
        assert!(decode_path("projects/%2e%2e/x").is_none());
    }
}
