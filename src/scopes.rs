//! Spotify authorization scopes.
//!
//! Scopes are the permissions a user grants to the application. They are
//! fixed for the lifetime of a token; asking for more requires running the
//! authorization flow again.
//! See <https://developer.spotify.com/documentation/web-api/concepts/scopes>.

// Images
pub const UGC_IMAGE_UPLOAD: &str = "ugc-image-upload";

// Spotify Connect
pub const USER_READ_PLAYBACK_STATE: &str = "user-read-playback-state";
pub const USER_MODIFY_PLAYBACK_STATE: &str = "user-modify-playback-state";
pub const USER_READ_CURRENTLY_PLAYING: &str = "user-read-currently-playing";

// Playback
pub const APP_REMOTE_CONTROL: &str = "app-remote-control";
pub const STREAMING: &str = "streaming";

// Playlists
pub const PLAYLIST_READ_PRIVATE: &str = "playlist-read-private";
pub const PLAYLIST_READ_COLLABORATIVE: &str = "playlist-read-collaborative";
pub const PLAYLIST_MODIFY_PRIVATE: &str = "playlist-modify-private";
pub const PLAYLIST_MODIFY_PUBLIC: &str = "playlist-modify-public";

// Follow
pub const USER_FOLLOW_MODIFY: &str = "user-follow-modify";
pub const USER_FOLLOW_READ: &str = "user-follow-read";

// Listening history
pub const USER_READ_PLAYBACK_POSITION: &str = "user-read-playback-position";
pub const USER_TOP_READ: &str = "user-top-read";
pub const USER_READ_RECENTLY_PLAYED: &str = "user-read-recently-played";

// Library
pub const USER_LIBRARY_MODIFY: &str = "user-library-modify";
pub const USER_LIBRARY_READ: &str = "user-library-read";

// Users
pub const USER_READ_EMAIL: &str = "user-read-email";
pub const USER_READ_PRIVATE: &str = "user-read-private";

// Open Access
pub const USER_SOA_LINK: &str = "user-soa-link";
pub const USER_SOA_UNLINK: &str = "user-soa-unlink";
pub const SOA_MANAGE_ENTITLEMENTS: &str = "soa-manage-entitlements";
pub const SOA_MANAGE_PARTNER: &str = "soa-manage-partner";
pub const SOA_CREATE_PARTNER: &str = "soa-create-partner";

pub const ALL_SCOPES: &[&str] = &[
    UGC_IMAGE_UPLOAD,
    USER_READ_PLAYBACK_STATE,
    USER_MODIFY_PLAYBACK_STATE,
    USER_READ_CURRENTLY_PLAYING,
    APP_REMOTE_CONTROL,
    STREAMING,
    PLAYLIST_READ_PRIVATE,
    PLAYLIST_READ_COLLABORATIVE,
    PLAYLIST_MODIFY_PRIVATE,
    PLAYLIST_MODIFY_PUBLIC,
    USER_FOLLOW_MODIFY,
    USER_FOLLOW_READ,
    USER_READ_PLAYBACK_POSITION,
    USER_TOP_READ,
    USER_READ_RECENTLY_PLAYED,
    USER_LIBRARY_MODIFY,
    USER_LIBRARY_READ,
    USER_READ_EMAIL,
    USER_READ_PRIVATE,
    USER_SOA_LINK,
    USER_SOA_UNLINK,
    SOA_MANAGE_ENTITLEMENTS,
    SOA_MANAGE_PARTNER,
    SOA_CREATE_PARTNER,
];

/// Ordered set of requested scopes. Insertion order is kept, duplicates and
/// blank entries are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scopes(Vec<String>);

impl Scopes {
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Scopes::default();
        for scope in scopes {
            set.insert(scope);
        }
        set
    }

    pub fn all() -> Self {
        Self::new(ALL_SCOPES.iter().copied())
    }

    /// Returns `false` if the scope was already present or blank.
    pub fn insert(&mut self, scope: impl Into<String>) -> bool {
        let scope = scope.into().trim().to_string();
        if scope.is_empty() || self.0.contains(&scope) {
            return false;
        }
        self.0.push(scope);
        true
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.0.iter().any(|s| s == scope)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Space separated form used in the `scope` query parameter.
    pub fn to_param(&self) -> String {
        self.0.join(" ")
    }
}

impl<S: Into<String>> FromIterator<S> for Scopes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Scopes::new(iter)
    }
}

impl std::str::FromStr for Scopes {
    type Err = std::convert::Infallible;

    /// Parses a space or comma separated list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Scopes::new(s.split([' ', ','])))
    }
}
