//! # Remote Client
//!
//! Talks to the music service's web API:
//!
//! | Operation                            | Endpoint                               | Cached |
//! |--------------------------------------|----------------------------------------|--------|
//! | [`RemoteClient::search_song`]        | `GET  /api/search/get/web`             | no     |
//! | [`RemoteClient::get_song_detail`]    | `GET  /api/song/detail`                | yes    |
//! | [`RemoteClient::get_hot_comments`]   | `POST /weapi/comment/resource/...`     | yes    |
//!
//! ## Failure policy
//!
//! - Transport failures (connection, timeout, non-2xx) are retried up to the
//!   configured number of attempts, sleeping `2^attempt` seconds in between
//!   but not after the last attempt.
//! - A body that arrives is never retried. If it doesn't parse, or its
//!   `code` isn't 200, or it has no usable data, the answer is "nothing".
//! - Nothing crosses the public boundary as an error: search and detail
//!   give `None`, comments give an empty list.
//!
//! Every outbound request first goes through the rate limiter.

use chrono::{Local, TimeZone};
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::time::Duration;

use crate::cache::ResultCache;
use crate::config::AppConfig;
use crate::crypto;
use crate::error::TransportError;
use crate::models::{CommentRecord, SongRecord};
use crate::transport::{Clock, HttpTransport, RateLimiter, SystemClock, Transport};

pub const SEARCH_URL: &str = "https://music.163.com/api/search/get/web";
pub const DETAIL_URL: &str = "https://music.163.com/api/song/detail";
pub const COMMENTS_URL: &str =
    "https://music.163.com/weapi/comment/resource/comments/get?csrf_token=";

/// `code` of a successful response.
const SUCCESS: i64 = 200;

/// Search results requested per query.
const SEARCH_LIMIT: u32 = 5;

/// Most hot comments returned per song.
pub const MAX_HOT_COMMENTS: usize = 20;

/// Comment threads for songs are named `R_SO_4_{id}`.
const SONG_THREAD_PREFIX: &str = "R_SO_4_";

/// Genre used when the album carries neither a type nor a sub-type.
pub const FALLBACK_GENRE: &str = "流行";

/// Numbers the client needs from the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub attempts: u32,
    pub min_request_interval: Duration,
    pub cache_size: usize,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ClientSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            attempts: config.attempts(),
            min_request_interval: config.min_request_interval(),
            cache_size: config.cache_size,
        }
    }
}

// Response shapes. Only the fields we read; the service adds and drops
// others freely, and sends `null` for missing strings.

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    result: Option<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    songs: Option<Vec<SearchSong>>,
}

#[derive(Debug, Deserialize)]
struct SearchSong {
    #[serde(default)]
    id: Value,
}

#[derive(Debug, Deserialize)]
struct DetailResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    songs: Option<Vec<DetailSong>>,
}

#[derive(Debug, Deserialize)]
struct DetailSong {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    artists: Option<Vec<DetailArtist>>,
    #[serde(default)]
    album: Option<DetailAlbum>,
    /// Milliseconds.
    #[serde(default)]
    duration: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct DetailArtist {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DetailAlbum {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    release_type: Option<String>,
    #[serde(rename = "subType", default)]
    sub_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommentsResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<CommentsData>,
}

#[derive(Debug, Deserialize)]
struct CommentsData {
    #[serde(rename = "hotComments", default)]
    hot_comments: Option<Vec<HotComment>>,
}

#[derive(Debug, Deserialize)]
struct HotComment {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    user: Option<CommentUser>,
    #[serde(rename = "likedCount", default)]
    liked_count: i64,
    /// Milliseconds since the epoch.
    #[serde(default)]
    time: i64,
}

#[derive(Debug, Deserialize)]
struct CommentUser {
    #[serde(default)]
    nickname: Option<String>,
}

/// Ids come back as numbers from some endpoints and strings from others.
fn id_string(id: &Value) -> Option<String> {
    match id {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Display name of an album release type. Unknown types pass through.
pub fn translate_release_type(release_type: &str) -> String {
    match release_type {
        "Single" => "单曲",
        "Album" => "专辑",
        "EP" => "EP",
        other => other,
    }
    .to_string()
}

/// Genre tags derived from album metadata: the translated release type,
/// then the sub-type if it adds something. Never empty.
///
/// The detail endpoint has no real genre field, so this is the best
/// available stand-in.
pub fn album_genres(release_type: Option<&str>, sub_type: Option<&str>) -> Vec<String> {
    let mut genres = Vec::new();

    if let Some(release_type) = release_type.filter(|t| !t.is_empty()) {
        genres.push(translate_release_type(release_type));
    }

    if let Some(sub_type) = sub_type.filter(|t| !t.is_empty()) {
        if !genres.iter().any(|g| g == sub_type) {
            genres.push(sub_type.to_string());
        }
    }

    if genres.is_empty() {
        genres.push(FALLBACK_GENRE.to_string());
    }
    genres
}

/// Format epoch milliseconds as `YYYY-MM-DD HH:MM` in the given zone.
pub fn format_timestamp_in<Tz>(millis: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    tz.timestamp_millis_opt(millis)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// [`format_timestamp_in`] for the local time zone.
pub fn format_timestamp(millis: i64) -> String {
    format_timestamp_in(millis, &Local)
}

fn parse_body<T: DeserializeOwned>(label: &str, body: &str) -> Option<T> {
    match serde_json::from_str(body) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            error!("{label}: response is not valid JSON: {e}");
            None
        }
    }
}

/// Rate-limited, retrying client for the three lookups, with one LRU cache
/// each for details and comments.
pub struct RemoteClient {
    transport: Box<dyn Transport>,
    clock: Box<dyn Clock>,
    limiter: RateLimiter,
    attempts: u32,
    details: ResultCache<SongRecord>,
    comments: ResultCache<Vec<CommentRecord>>,
}

impl RemoteClient {
    pub fn new(transport: Box<dyn Transport>, clock: Box<dyn Clock>, settings: ClientSettings) -> Self {
        Self {
            transport,
            clock,
            limiter: RateLimiter::new(settings.min_request_interval),
            attempts: settings.attempts.max(1),
            details: ResultCache::new("detail", settings.cache_size),
            comments: ResultCache::new("comment", settings.cache_size),
        }
    }

    /// Client over real HTTP and the wall clock.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(config.api_timeout())?;
        Ok(Self::new(
            Box::new(transport),
            Box::new(SystemClock),
            ClientSettings::from(config),
        ))
    }

    /// Run one request with rate limiting and retries. `None` means every
    /// attempt failed at the transport level.
    fn send_with_retry<F>(&mut self, label: &str, send: F) -> Option<String>
    where
        F: Fn(&dyn Transport) -> Result<String, TransportError>,
    {
        for attempt in 0..self.attempts {
            self.limiter.wait(self.clock.as_ref());

            match send(self.transport.as_ref()) {
                Ok(body) => return Some(body),
                Err(e) => {
                    warn!(
                        "{label}: request failed (attempt {}/{}): {e}",
                        attempt + 1,
                        self.attempts
                    );
                    if attempt + 1 < self.attempts {
                        let backoff = Duration::from_secs(1u64 << attempt.min(16));
                        debug!("{label}: backing off {}s", backoff.as_secs());
                        self.clock.sleep(backoff);
                    }
                }
            }
        }

        error!("{label}: giving up after {} attempts", self.attempts);
        None
    }

    /// Id of the best single-track match for `"{song} {artist}"`.
    pub fn search_song(&mut self, song_name: &str, artist_name: &str) -> Option<String> {
        let keywords = format!("{song_name} {artist_name}");
        info!("Searching for: {keywords}");

        let query = [
            ("s", keywords.clone()),
            ("type", "1".to_string()),
            ("offset", "0".to_string()),
            ("limit", SEARCH_LIMIT.to_string()),
        ];
        let body = self.send_with_retry("search", |t| t.get(SEARCH_URL, &query))?;
        let response: SearchResponse = parse_body("search", &body)?;

        if response.code != SUCCESS {
            error!("Search for {keywords:?} failed with code {}", response.code);
            return None;
        }

        let songs = response.result.and_then(|r| r.songs).unwrap_or_default();
        let Some(first) = songs.first() else {
            warn!("No song found for: {keywords}");
            return None;
        };

        let song_id = id_string(&first.id);
        match &song_id {
            Some(id) => info!("Found song id: {id}"),
            None => warn!("First search result for {keywords:?} has no id"),
        }
        song_id
    }

    /// Song metadata for `remote_id`. Cached.
    pub fn get_song_detail(&mut self, remote_id: &str) -> Option<SongRecord> {
        if let Some(song) = self.details.get(remote_id) {
            return Some(song);
        }

        debug!("Fetching song detail: {remote_id}");
        let query = [("ids", format!("[\"{remote_id}\"]"))];
        let body = self.send_with_retry("detail", |t| t.get(DETAIL_URL, &query))?;
        let response: DetailResponse = parse_body("detail", &body)?;

        if response.code != SUCCESS {
            error!("Song detail for {remote_id} failed with code {}", response.code);
            return None;
        }

        let Some(song) = response.songs.and_then(|songs| songs.into_iter().next()) else {
            warn!("Song detail for {remote_id} is empty");
            return None;
        };

        let album = song.album.unwrap_or_default();
        let artist = song
            .artists
            .and_then(|artists| artists.into_iter().next())
            .and_then(|a| a.name)
            .unwrap_or_default();

        let record = SongRecord {
            remote_id: id_string(&song.id).unwrap_or_else(|| remote_id.to_string()),
            name: song.name.unwrap_or_default(),
            artist,
            genres: album_genres(album.release_type.as_deref(), album.sub_type.as_deref()),
            album: album.name.unwrap_or_default(),
            duration_seconds: song.duration.unwrap_or(0) / 1000,
        };

        self.details.insert(remote_id, record.clone());
        Some(record)
    }

    /// Up to [`MAX_HOT_COMMENTS`] hot comments for `remote_id`, in server
    /// order. Cached. Empty on any failure.
    pub fn get_hot_comments(&mut self, remote_id: &str) -> Vec<CommentRecord> {
        if let Some(comments) = self.comments.get(remote_id) {
            return comments;
        }

        debug!("Fetching hot comments: {remote_id}");
        let thread_id = format!("{SONG_THREAD_PREFIX}{remote_id}");
        let request = BTreeMap::from([
            ("csrf_token".to_string(), String::new()),
            ("cursor".to_string(), "-1".to_string()),
            ("offset".to_string(), "0".to_string()),
            ("orderType".to_string(), "1".to_string()),
            ("pageNo".to_string(), "1".to_string()),
            ("pageSize".to_string(), MAX_HOT_COMMENTS.to_string()),
            ("rid".to_string(), thread_id.clone()),
            ("threadId".to_string(), thread_id),
        ]);

        let form = match crypto::encrypt_request(&request) {
            Ok(encrypted) => encrypted.form(),
            Err(e) => {
                error!("Failed to encrypt comment request for {remote_id}: {e}");
                return Vec::new();
            }
        };

        let Some(body) = self.send_with_retry("comments", |t| t.post_form(COMMENTS_URL, &form))
        else {
            return Vec::new();
        };
        let Some(response) = parse_body::<CommentsResponse>("comments", &body) else {
            return Vec::new();
        };

        if response.code != SUCCESS {
            error!(
                "Comments for {remote_id} failed with code {}: {}",
                response.code,
                response.message.as_deref().unwrap_or("unknown error")
            );
            return Vec::new();
        }

        let Some(hot) = response.data.and_then(|d| d.hot_comments) else {
            warn!("Comment response for {remote_id} has no hot comment list");
            return Vec::new();
        };

        let comments: Vec<CommentRecord> = hot
            .into_iter()
            .take(MAX_HOT_COMMENTS)
            .map(|c| CommentRecord {
                content: c.content.unwrap_or_default(),
                author: c.user.and_then(|u| u.nickname).unwrap_or_default(),
                like_count: u64::try_from(c.liked_count).unwrap_or(0),
                posted_at: format_timestamp(c.time),
            })
            .collect();

        if comments.is_empty() {
            warn!("Song {remote_id} has no hot comments");
        } else {
            info!("Fetched {} hot comments for {remote_id}", comments.len());
        }

        self.comments.insert(remote_id, comments.clone());
        comments
    }

    /// Drop every cached detail and comment list.
    pub fn clear_cache(&mut self) {
        self.details.clear();
        self.comments.clear();
        info!("Remote client caches cleared");
    }

    /// `(details, comment lists)` currently cached.
    pub fn cached_entries(&self) -> (usize, usize) {
        (self.details.len(), self.comments.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::time::Instant;

    #[derive(Debug, Clone)]
    struct Call {
        method: &'static str,
        url: String,
        params: Vec<(String, String)>,
    }

    #[derive(Default)]
    struct Script {
        responses: VecDeque<Result<String, TransportError>>,
        calls: Vec<Call>,
    }

    #[derive(Clone, Default)]
    struct FakeTransport(Rc<RefCell<Script>>);

    impl FakeTransport {
        fn respond(&self, response: Result<&str, TransportError>) -> &Self {
            self.0
                .borrow_mut()
                .responses
                .push_back(response.map(str::to_string));
            self
        }

        fn calls(&self) -> Vec<Call> {
            self.0.borrow().calls.clone()
        }

        fn record(&self, method: &'static str, url: &str, params: &[(&str, String)]) -> Result<String, TransportError> {
            let mut script = self.0.borrow_mut();
            script.calls.push(Call {
                method,
                url: url.to_string(),
                params: params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            });
            script
                .responses
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Request("nothing scripted".to_string())))
        }
    }

    impl Transport for FakeTransport {
        fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, TransportError> {
            self.record("GET", url, query)
        }

        fn post_form(&self, url: &str, form: &[(&str, String)]) -> Result<String, TransportError> {
            self.record("POST", url, form)
        }
    }

    struct ClockState {
        start: Instant,
        offset: Cell<Duration>,
        sleeps: RefCell<Vec<Duration>>,
    }

    #[derive(Clone)]
    struct FakeClock(Rc<ClockState>);

    impl FakeClock {
        fn new() -> Self {
            Self(Rc::new(ClockState {
                start: Instant::now(),
                offset: Cell::new(Duration::ZERO),
                sleeps: RefCell::new(Vec::new()),
            }))
        }

        fn sleeps(&self) -> Vec<Duration> {
            self.0.sleeps.borrow().clone()
        }

        fn advance(&self, by: Duration) {
            self.0.offset.set(self.0.offset.get() + by);
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            self.0.start + self.0.offset.get()
        }

        fn sleep(&self, duration: Duration) {
            self.0.sleeps.borrow_mut().push(duration);
            self.advance(duration);
        }
    }

    fn client() -> (RemoteClient, FakeTransport, FakeClock) {
        client_with(ClientSettings::default())
    }

    fn client_with(settings: ClientSettings) -> (RemoteClient, FakeTransport, FakeClock) {
        let transport = FakeTransport::default();
        let clock = FakeClock::new();
        let client = RemoteClient::new(Box::new(transport.clone()), Box::new(clock.clone()), settings);
        (client, transport, clock)
    }

    fn param<'a>(call: &'a Call, key: &str) -> Option<&'a str> {
        call.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    const DETAIL_SINGLE: &str = r#"{
        "code": 200,
        "songs": [{
            "id": 5257138,
            "name": "浪人情歌",
            "artists": [{"name": "伍佰"}, {"name": "China Blue"}],
            "album": {"name": "浪人情歌", "type": "Single"},
            "duration": 281000
        }]
    }"#;

    fn comments_body(count: usize) -> String {
        let items: Vec<String> = (0..count)
            .map(|i| {
                format!(
                    r#"{{"content":"comment {i}","user":{{"nickname":"user{i}"}},"likedCount":{},"time":1577880000000}}"#,
                    1000 - i
                )
            })
            .collect();
        format!(r#"{{"code":200,"data":{{"hotComments":[{}]}}}}"#, items.join(","))
    }

    #[test]
    fn test_search_returns_first_id() {
        let (mut client, transport, _clock) = client();
        transport.respond(Ok(r#"{"code":200,"result":{"songs":[{"id":5257138},{"id":1}]}}"#));

        assert_eq!(client.search_song("浪人情歌", "伍佰"), Some("5257138".to_string()));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "GET");
        assert_eq!(calls[0].url, SEARCH_URL);
        assert_eq!(param(&calls[0], "s"), Some("浪人情歌 伍佰"));
        assert_eq!(param(&calls[0], "type"), Some("1"));
        assert_eq!(param(&calls[0], "limit"), Some("5"));
    }

    #[test]
    fn test_search_semantic_failures_are_not_retried() {
        let (mut client, transport, clock) = client();
        transport
            .respond(Ok(r#"{"code":200,"result":{"songs":[]}}"#))
            .respond(Ok(r#"{"code":400,"msg":"bad"}"#))
            .respond(Ok(r#"{"code":200}"#))
            .respond(Ok("<html>not json</html>"));

        assert_eq!(client.search_song("a", "b"), None);
        assert_eq!(client.search_song("a", "b"), None);
        assert_eq!(client.search_song("a", "b"), None);
        assert_eq!(client.search_song("a", "b"), None);

        // One request per call, and only rate-limit waits in between.
        assert_eq!(transport.calls().len(), 4);
        assert!(clock.sleeps().iter().all(|d| *d <= Duration::from_secs(1)));
    }

    #[test]
    fn test_transport_failures_back_off_exponentially() {
        let (mut client, transport, clock) = client();
        transport
            .respond(Err(TransportError::Timeout))
            .respond(Err(TransportError::Status(502)))
            .respond(Ok(r#"{"code":200,"result":{"songs":[{"id":"77"}]}}"#));

        assert_eq!(client.search_song("a", "b"), Some("77".to_string()));
        assert_eq!(transport.calls().len(), 3);
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[test]
    fn test_no_backoff_after_last_attempt() {
        let (mut client, transport, clock) = client_with(ClientSettings {
            attempts: 4,
            ..ClientSettings::default()
        });
        for _ in 0..4 {
            transport.respond(Err(TransportError::Request("refused".to_string())));
        }

        assert_eq!(client.search_song("a", "b"), None);
        assert_eq!(transport.calls().len(), 4);
        assert_eq!(
            clock.sleeps(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[test]
    fn test_consecutive_requests_are_rate_limited() {
        let (mut client, transport, clock) = client();
        transport
            .respond(Ok(r#"{"code":200,"result":{"songs":[{"id":1}]}}"#))
            .respond(Ok(DETAIL_SINGLE));

        client.search_song("a", "b");
        clock.advance(Duration::from_millis(250));
        client.get_song_detail("5257138");

        assert_eq!(clock.sleeps(), vec![Duration::from_millis(750)]);
    }

    #[test]
    fn test_detail_single_without_subtype() {
        let (mut client, transport, _clock) = client();
        transport.respond(Ok(DETAIL_SINGLE));

        let song = client.get_song_detail("5257138").unwrap();
        assert_eq!(song.remote_id, "5257138");
        assert_eq!(song.name, "浪人情歌");
        assert_eq!(song.artist, "伍佰");
        assert_eq!(song.album, "浪人情歌");
        assert_eq!(song.genres, vec!["单曲".to_string()]);
        assert_eq!(song.duration_seconds, 281);

        let calls = transport.calls();
        assert_eq!(calls[0].url, DETAIL_URL);
        assert_eq!(param(&calls[0], "ids"), Some(r#"["5257138"]"#));
    }

    #[test]
    fn test_detail_is_cached_until_cleared() {
        let (mut client, transport, _clock) = client();
        transport.respond(Ok(DETAIL_SINGLE)).respond(Ok(DETAIL_SINGLE));

        let first = client.get_song_detail("5257138");
        let second = client.get_song_detail("5257138");
        assert_eq!(first, second);
        assert_eq!(transport.calls().len(), 1);
        assert_eq!(client.cached_entries(), (1, 0));

        client.clear_cache();
        assert_eq!(client.cached_entries(), (0, 0));
        assert_eq!(client.get_song_detail("5257138"), first);
        assert_eq!(transport.calls().len(), 2);
    }

    #[test]
    fn test_detail_failures_are_absent_and_not_cached() {
        let (mut client, transport, _clock) = client();
        transport
            .respond(Ok(r#"{"code":404}"#))
            .respond(Ok(r#"{"code":200,"songs":[]}"#));

        assert_eq!(client.get_song_detail("1"), None);
        assert_eq!(client.get_song_detail("1"), None);
        assert_eq!(client.cached_entries(), (0, 0));
    }

    #[test]
    fn test_detail_handles_nulls() {
        let (mut client, transport, _clock) = client();
        transport.respond(Ok(
            r#"{"code":200,"songs":[{"id":9,"name":null,"artists":null,"album":null,"duration":null}]}"#,
        ));

        let song = client.get_song_detail("9").unwrap();
        assert_eq!(song.remote_id, "9");
        assert_eq!(song.name, "");
        assert_eq!(song.genres, vec![FALLBACK_GENRE.to_string()]);
        assert_eq!(song.duration_seconds, 0);
    }

    #[test]
    fn test_album_genres() {
        assert_eq!(album_genres(Some("Single"), None), vec!["单曲"]);
        assert_eq!(album_genres(Some("Album"), Some("录音室版")), vec!["专辑", "录音室版"]);
        assert_eq!(album_genres(Some("EP"), Some("EP")), vec!["EP"]);
        assert_eq!(album_genres(Some("Compilation"), Some("")), vec!["Compilation"]);
        assert_eq!(album_genres(None, Some("现场版")), vec!["现场版"]);
        assert_eq!(album_genres(Some(""), None), vec![FALLBACK_GENRE]);
        assert_eq!(album_genres(None, None), vec![FALLBACK_GENRE]);
    }

    #[test]
    fn test_comments_are_capped_and_formatted() {
        let (mut client, transport, _clock) = client();
        transport.respond(Ok(comments_body(25).as_str()));

        let comments = client.get_hot_comments("5257138");
        assert_eq!(comments.len(), MAX_HOT_COMMENTS);
        assert_eq!(comments[0].content, "comment 0");
        assert_eq!(comments[0].author, "user0");
        assert_eq!(comments[0].like_count, 1000);
        assert_eq!(comments[19].content, "comment 19");
        assert_eq!(comments[0].posted_at.len(), "2020-01-01 12:00".len());

        let calls = transport.calls();
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].url, COMMENTS_URL);
        assert!(param(&calls[0], "params").is_some_and(|p| !p.is_empty()));
        assert_eq!(param(&calls[0], "encSecKey"), Some(crypto::ENC_SEC_KEY));
    }

    #[test]
    fn test_comments_cached_including_empty_lists() {
        let (mut client, transport, _clock) = client();
        transport.respond(Ok(r#"{"code":200,"data":{"hotComments":[]}}"#));

        assert!(client.get_hot_comments("3").is_empty());
        assert!(client.get_hot_comments("3").is_empty());
        assert_eq!(transport.calls().len(), 1);
        assert_eq!(client.cached_entries(), (0, 1));
    }

    #[test]
    fn test_comments_failures_are_empty_never_absent() {
        let (mut client, transport, clock) = client();
        transport
            .respond(Ok(r#"{"code":-460,"message":"Cheating"}"#))
            .respond(Ok(r#"{"code":200}"#))
            .respond(Ok("garbage"));

        assert!(client.get_hot_comments("1").is_empty());
        assert!(client.get_hot_comments("1").is_empty());
        assert!(client.get_hot_comments("1").is_empty());

        for _ in 0..3 {
            transport.respond(Err(TransportError::Timeout));
        }
        assert!(client.get_hot_comments("1").is_empty());
        assert_eq!(transport.calls().len(), 6);
        assert!(clock.sleeps().contains(&Duration::from_secs(2)));
        assert_eq!(client.cached_entries(), (0, 0));
    }

    #[test]
    fn test_format_timestamp_in_utc() {
        assert_eq!(format_timestamp_in(1_577_880_000_000, &Utc), "2020-01-01 12:00");
        assert_eq!(format_timestamp_in(0, &Utc), "1970-01-01 00:00");
    }

    #[test]
    fn test_translate_release_type() {
        assert_eq!(translate_release_type("Single"), "单曲");
        assert_eq!(translate_release_type("Album"), "专辑");
        assert_eq!(translate_release_type("EP/Single"), "EP/Single");
    }
}
