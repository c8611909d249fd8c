//! crates/novaread_core/src/route.rs
//!
//! Maps a location fragment (`#/novel/abc`) to a page identity with typed
//! parameters. Parsing is pure: the same fragment always yields the same route.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

//=========================================================================================
// Browse Filters
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Latest,
    Popular,
    Rating,
    Saves,
    Votes,
    Reviews,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Latest => "latest",
            SortBy::Popular => "popular",
            SortBy::Rating => "rating",
            SortBy::Saves => "saves",
            SortBy::Votes => "votes",
            SortBy::Reviews => "reviews",
        }
    }
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(SortBy::Latest),
            "popular" => Ok(SortBy::Popular),
            "rating" => Ok(SortBy::Rating),
            "saves" => Ok(SortBy::Saves),
            "votes" => Ok(SortBy::Votes),
            "reviews" => Ok(SortBy::Reviews),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

/// Query parameters of `#/browse`. Informational: consumed by the search page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub query: Option<String>,
    pub genre: Option<String>,
    pub tag: Option<String>,
    pub sort_by: Option<SortBy>,
    pub status: Option<String>,
}

impl SearchFilters {
    pub fn from_query(query: &str) -> Self {
        let mut filters = SearchFilters::default();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode_component(value);
            if value.is_empty() {
                continue;
            }
            match key {
                "q" => filters.query = Some(value),
                "genre" => filters.genre = Some(value),
                "tag" => filters.tag = Some(value),
                "sortBy" => filters.sort_by = value.parse().ok(),
                "status" => filters.status = Some(value),
                _ => {}
            }
        }
        filters
    }

    pub fn to_query(&self) -> String {
        let pairs = [
            ("q", self.query.as_deref()),
            ("genre", self.genre.as_deref()),
            ("tag", self.tag.as_deref()),
            ("sortBy", self.sort_by.map(SortBy::as_str)),
            ("status", self.status.as_deref()),
        ];
        pairs
            .iter()
            .filter_map(|(key, value)| value.map(|v| format!("{}={}", key, encode_component(v))))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn is_empty(&self) -> bool {
        *self == SearchFilters::default()
    }
}

/// Unreserved characters pass through; everything else is percent-encoded.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Form-style decoding: `+` is a space, malformed escapes are kept literally.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT)
        .to_string()
        .replace("%20", "+")
}

//=========================================================================================
// Routes
//=========================================================================================

/// The page identity without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageId {
    Home,
    NovelDetail,
    Reader,
    Browse,
    Library,
    Rankings,
    Login,
    Register,
    ForgotPassword,
    Admin,
    Profile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "page", rename_all = "camelCase")]
pub enum Route {
    Home,
    /// `id` is the raw path segment, possibly empty or unknown to the catalog.
    NovelDetail { id: String },
    Reader { id: String },
    Browse { filters: SearchFilters },
    Library,
    Rankings,
    Login,
    Register,
    ForgotPassword,
    Admin,
    Profile,
}

const NOVEL_PREFIX: &str = "#/novel/";
const READ_PREFIX: &str = "#/read/";

impl Route {
    /// Parses a location fragment. Unknown fragments fall back to [`Route::Home`].
    pub fn parse(fragment: &str) -> Route {
        let fragment = normalize_fragment(fragment);

        if let Some(rest) = fragment.strip_prefix(NOVEL_PREFIX) {
            return Route::NovelDetail { id: first_segment(rest) };
        }
        if let Some(rest) = fragment.strip_prefix(READ_PREFIX) {
            return Route::Reader { id: first_segment(rest) };
        }
        if let Some(rest) = fragment.strip_prefix("#/browse") {
            let query = rest.split_once('?').map(|(_, q)| q).unwrap_or("");
            return Route::Browse { filters: SearchFilters::from_query(query) };
        }
        if fragment.starts_with("#/library") {
            return Route::Library;
        }

        match fragment.as_str() {
            "#/rankings" => Route::Rankings,
            "#/login" => Route::Login,
            "#/register" => Route::Register,
            "#/forgot-password" => Route::ForgotPassword,
            "#/admin" => Route::Admin,
            "#/profile" => Route::Profile,
            _ => Route::Home,
        }
    }

    pub fn page(&self) -> PageId {
        match self {
            Route::Home => PageId::Home,
            Route::NovelDetail { .. } => PageId::NovelDetail,
            Route::Reader { .. } => PageId::Reader,
            Route::Browse { .. } => PageId::Browse,
            Route::Library => PageId::Library,
            Route::Rankings => PageId::Rankings,
            Route::Login => PageId::Login,
            Route::Register => PageId::Register,
            Route::ForgotPassword => PageId::ForgotPassword,
            Route::Admin => PageId::Admin,
            Route::Profile => PageId::Profile,
        }
    }

    /// The entity id carried by detail and reader routes.
    /// The canonical fragment that parses back to this route.
    pub fn fragment(&self) -> String {
        match self {
            Route::Home => "#/".to_string(),
            Route::NovelDetail { id } => format!("{}{}", NOVEL_PREFIX, id),
            Route::Reader { id } => format!("{}{}", READ_PREFIX, id),
            Route::Browse { filters } if filters.is_empty() => "#/browse".to_string(),
            Route::Browse { filters } => format!("#/browse?{}", filters.to_query()),
            Route::Library => "#/library".to_string(),
            Route::Rankings => "#/rankings".to_string(),
            Route::Login => "#/login".to_string(),
            Route::Register => "#/register".to_string(),
            Route::ForgotPassword => "#/forgot-password".to_string(),
            Route::Admin => "#/admin".to_string(),
            Route::Profile => "#/profile".to_string(),
        }
    }
}

/// Brings a user- or code-supplied path into `#/...` form.
///
/// `""`, `"#"` and `"/"` all mean the root; `"/browse"` and `"browse"` become `"#/browse"`.
pub fn normalize_fragment(raw: &str) -> String {
    let raw = raw.trim();
    let path = raw.strip_prefix('#').unwrap_or(raw);
    if path.is_empty() {
        return "#/".to_string();
    }
    if path.starts_with('/') {
        format!("#{}", path)
    } else {
        format!("#/{}", path)
    }
}

fn first_segment(rest: &str) -> String {
    rest.split('/').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn novel_and_reader_ids_pass_through_verbatim() {
        assert_eq!(
            Route::parse("#/novel/abc-123"),
            Route::NovelDetail { id: "abc-123".to_string() }
        );
        assert_eq!(
            Route::parse("#/read/ch%20one"),
            Route::Reader { id: "ch%20one".to_string() }
        );
        assert_eq!(Route::parse("#/novel/"), Route::NovelDetail { id: String::new() });
        assert_eq!(
            Route::parse("#/novel/n1/reviews"),
            Route::NovelDetail { id: "n1".to_string() }
        );
    }

    #[test]
    fn static_pages_match_exactly_and_unknown_falls_back_home() {
        assert_eq!(Route::parse("#/rankings"), Route::Rankings);
        assert_eq!(Route::parse("#/forgot-password"), Route::ForgotPassword);
        assert_eq!(Route::parse("#/admin"), Route::Admin);
        assert_eq!(Route::parse("#/admin/users"), Route::Home);
        assert_eq!(Route::parse("#/nowhere"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("#/library/reading"), Route::Library);
    }

    #[test]
    fn browse_query_parses_into_filters() {
        let route = Route::parse("#/browse?q=dragon+king&genre=Fantasy&sortBy=popular&x=1");
        let Route::Browse { filters } = route else {
            panic!("expected browse route");
        };
        assert_eq!(filters.query.as_deref(), Some("dragon king"));
        assert_eq!(filters.genre.as_deref(), Some("Fantasy"));
        assert_eq!(filters.sort_by, Some(SortBy::Popular));
        assert_eq!(filters.tag, None);
    }

    #[test]
    fn malformed_escapes_in_queries_are_kept_literally() {
        let filters = SearchFilters::from_query("q=%+1ab");
        assert_eq!(filters.query.as_deref(), Some("% 1ab"));

        let filters = SearchFilters::from_query("q=100%&genre=%zzSci%2DFi&tag=%E2%9C%93");
        assert_eq!(filters.query.as_deref(), Some("100%"));
        assert_eq!(filters.genre.as_deref(), Some("%zzSci-Fi"));
        assert_eq!(filters.tag.as_deref(), Some("\u{2713}"));
    }

    #[test]
    fn query_values_are_encoded_for_the_fragment() {
        let filters = SearchFilters {
            query: Some("a+b c/d".to_string()),
            ..Default::default()
        };
        assert_eq!(filters.to_query(), "q=a%2Bb+c%2Fd");
        assert_eq!(SearchFilters::from_query(&filters.to_query()), filters);
    }

    #[test]
    fn canonical_fragment_parses_back_to_the_same_route() {
        let routes = [
            Route::Home,
            Route::NovelDetail { id: "n1".to_string() },
            Route::Reader { id: "c7".to_string() },
            Route::Browse {
                filters: SearchFilters {
                    query: Some("sky & sea".to_string()),
                    sort_by: Some(SortBy::Rating),
                    ..Default::default()
                },
            },
            Route::Profile,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.fragment()), route);
        }
    }

    #[test]
    fn fragments_are_normalized() {
        assert_eq!(normalize_fragment("/novel/x"), "#/novel/x");
        assert_eq!(normalize_fragment("login"), "#/login");
        assert_eq!(normalize_fragment("#"), "#/");
        assert_eq!(normalize_fragment("#/read/1"), "#/read/1");
    }
}
