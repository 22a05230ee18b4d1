//! Episode stream resolution
//!
//! The streaming site names episode pages `{slug}-{number}-vostfr`, but is
//! inconsistent about zero-padding the number. [`StreamResolver`] tries each
//! [`NamingVariant`] in order, one request at a time, and stops at the first
//! page that carries a player frame.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::{HttpClient, PageFetcher};
use crate::config::{OverrideEntry, StreamingConfig};
use crate::error::{AnistreamError, Result};
use crate::parser::extract_player_src;
use crate::slug::Slug;
use crate::types::{ResolvedStream, StreamSource};

/// How the episode number is written in a page URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingVariant {
    /// `5`
    Unpadded,
    /// `005`
    ZeroPadded,
    /// `05`, a single leading zero whatever the width
    LeadingZero,
}

impl NamingVariant {
    /// Order in which variants are tried
    pub const DEFAULT_ORDER: [NamingVariant; 3] = [
        NamingVariant::Unpadded,
        NamingVariant::ZeroPadded,
        NamingVariant::LeadingZero,
    ];

    pub fn episode_segment(self, episode: u32) -> String {
        match self {
            Self::Unpadded => episode.to_string(),
            Self::ZeroPadded => format!("{:03}", episode),
            Self::LeadingZero => format!("0{}", episode),
        }
    }
}

/// A guessed episode page address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateUrl {
    pub variant: NamingVariant,
    pub url: String,
}

/// Read-only map from MyAnimeList ID to a known-good embed URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamOverrides {
    links: HashMap<u32, String>,
}

/// Curated embeds shipped with the application
const BUILTIN_OVERRIDES: &[(u32, &str)] = &[
    (11061, "https://streamtape.com/e/prxL663adYtr4Xy"),
    (38524, "https://streamtape.com/e/goge8O7PpwtqDpq"),
    (19, "https://streamtape.com/e/r0oglQ0ABrS81r"),
    (41467, "https://streamtape.com/e/p4ZjkeWjbAHr2P9"),
    (52991, " https://streamtape.com/e/y09aoRaaj3t3Kj"),
    (5114, "https://streamtape.com/e/myJvjA1x8rfbwz9"),
    (9253, "https://streamtape.com/e/1z1A21zebMceaoA"),
    (28977, "https://streamtape.com/e/zJoMVoGX06tYwpm"),
    (918, "https://streamtape.com/e/mOM4o1kpV9FbZdg"),
    (16498, "https://voe.sx/e/be5f5qx0evy5"),
    (20, "https://streamtape.com/e/pajZWVkB3vtrd8m"),
    (1735, "https://streamtape.com/e/vodzMWPRx1HYxa"),
    (21, "https://streamtape.com/e/3popy1kWWesard"),
    (813, "https://streamtape.com/e/4q14x7AGjvUKPxY"),
    (30694, "https://streamtape.com/e/BGvLQ2jPYmfyaQ6"),
    (1535, "https://streamtape.com/e/OXkeAvW9eOUggK"),
    (820, "https://streamtape.com/e/lQ9G36Z12Wu7Jv8"),
    (43608, "https://streamtape.com/e/ePgZXo1JOOhYG1R"),
    (42938, "https://streamtape.com/e/41pjPVzJeOfKo3R"),
    (4181, "https://streamtape.com/e/9RX3PrRJq6takp3"),
];

impl StreamOverrides {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self::empty().extend(
            BUILTIN_OVERRIDES
                .iter()
                .map(|&(anime_id, url)| (anime_id, url.to_string())),
        )
    }

    /// Built-in table plus configured entries; configured entries win.
    pub fn from_config(config: &StreamingConfig) -> Self {
        Self::builtin().extend(
            config
                .overrides
                .iter()
                .map(|OverrideEntry { anime_id, url }| (*anime_id, url.clone())),
        )
    }

    /// Add entries. URLs are trimmed; blank ones are skipped.
    pub fn extend(mut self, entries: impl IntoIterator<Item = (u32, String)>) -> Self {
        for (anime_id, url) in entries {
            let url = url.trim();
            if !url.is_empty() {
                self.links.insert(anime_id, url.to_string());
            }
        }
        self
    }

    pub fn get(&self, anime_id: u32) -> Option<&str> {
        self.links.get(&anime_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Finds the embedded player for an episode
///
/// # Example
/// ```no_run
/// use anistream_core::{Slug, StreamResolver};
///
/// # async fn example() -> Result<(), anistream_core::AnistreamError> {
/// let resolver = StreamResolver::new()?;
/// let slug = Slug::parse("one-piece")?;
/// let stream = resolver.resolve(&slug, 5).await?;
/// println!("{}", stream.url);
/// # Ok(())
/// # }
/// ```
pub struct StreamResolver<F> {
    fetcher: F,
    base_url: String,
    player_host: String,
    variants: Vec<NamingVariant>,
    overrides: StreamOverrides,
    use_overrides: bool,
}

impl StreamResolver<HttpClient> {
    /// Create a resolver with default configuration
    pub fn new() -> Result<Self> {
        Self::from_config(&StreamingConfig::default())
    }

    pub fn from_config(config: &StreamingConfig) -> Result<Self> {
        let fetcher = HttpClient::with_config(config.client_config())?;
        Ok(Self::with_fetcher(fetcher, config))
    }
}

impl<F: PageFetcher> StreamResolver<F> {
    pub fn with_fetcher(fetcher: F, config: &StreamingConfig) -> Self {
        Self {
            fetcher,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            player_host: config.player_host.clone(),
            variants: NamingVariant::DEFAULT_ORDER.to_vec(),
            overrides: StreamOverrides::from_config(config),
            use_overrides: config.use_overrides,
        }
    }

    /// Replace the override table
    pub fn with_overrides(mut self, overrides: StreamOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Replace the naming variants and the order they are tried in
    pub fn with_variants(mut self, variants: Vec<NamingVariant>) -> Self {
        self.variants = variants;
        self
    }

    pub fn overrides(&self) -> &StreamOverrides {
        &self.overrides
    }

    /// Candidate page URLs for an episode, in the order they are tried
    pub fn candidate_urls(&self, slug: &Slug, episode: u32) -> Vec<CandidateUrl> {
        let host = urlencoding::encode(&self.player_host);
        self.variants
            .iter()
            .map(|&variant| CandidateUrl {
                variant,
                url: format!(
                    "{base}/anime/{slug}/{slug}-{segment}-vostfr/?host={host}",
                    base = self.base_url,
                    slug = slug,
                    segment = variant.episode_segment(episode),
                    host = host,
                ),
            })
            .collect()
    }

    /// Resolve an episode by scraping the streaming site.
    ///
    /// Candidates are fetched one after another; a failed fetch or a page
    /// without a player frame moves on to the next candidate.
    ///
    /// # Errors
    /// * `AnistreamError::InvalidEpisode` if `episode` is 0
    /// * `AnistreamError::NoStreamFound` once every candidate has failed
    pub async fn resolve(&self, slug: &Slug, episode: u32) -> Result<ResolvedStream> {
        if episode == 0 {
            return Err(AnistreamError::InvalidEpisode(episode));
        }

        info!(slug = %slug, episode, "Resolving stream");

        for candidate in self.candidate_urls(slug, episode) {
            debug!(url = %candidate.url, variant = ?candidate.variant, "Trying candidate");

            let html = match self.fetcher.fetch_page(&candidate.url).await {
                Ok(html) => html,
                Err(e) => {
                    debug!(url = %candidate.url, error = %e, "Candidate fetch failed");
                    continue;
                }
            };

            match extract_player_src(&html) {
                Ok(Some(src)) => {
                    info!(slug = %slug, episode, url = %src, "Stream resolved");
                    return Ok(ResolvedStream {
                        url: src,
                        source: StreamSource::Scraped {
                            page_url: candidate.url,
                        },
                    });
                }
                Ok(None) => {
                    debug!(url = %candidate.url, "No player frame on page");
                }
                Err(e) => {
                    debug!(url = %candidate.url, error = %e, "Candidate page unparseable");
                }
            }
        }

        warn!(slug = %slug, episode, "No stream found");
        Err(AnistreamError::NoStreamFound {
            slug: slug.to_string(),
            episode,
        })
    }

    /// Resolve an episode of a catalog entry.
    ///
    /// When overrides are enabled and the entry has one, its URL is returned
    /// without touching the network.
    pub async fn resolve_entry(
        &self,
        anime_id: u32,
        slug: &Slug,
        episode: u32,
    ) -> Result<ResolvedStream> {
        if episode == 0 {
            return Err(AnistreamError::InvalidEpisode(episode));
        }

        if self.use_overrides {
            if let Some(url) = self.overrides.get(anime_id) {
                info!(anime_id, episode, url = %url, "Using stream override");
                return Ok(ResolvedStream {
                    url: url.to_string(),
                    source: StreamSource::Override,
                });
            }
        }

        self.resolve(slug, episode).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BASE: &str = "https://v6.voiranime.com";

    fn page_with_player(src: &str) -> String {
        format!(
            r#"<html><body><div id="chapter-video-frame"><iframe src="{}"></iframe></div></body></html>"#,
            src
        )
    }

    const PAGE_WITHOUT_PLAYER: &str =
        r#"<html><body><div class="entry-content"><p>Episode introuvable</p></div></body></html>"#;

    /// Fetcher answering from a fixed URL -> outcome table and recording every call
    struct MockFetcher {
        pages: HashMap<String, std::result::Result<String, u16>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        fn new() -> Self {
            Self {
                pages: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), Ok(html.to_string()));
            self
        }

        fn status(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(url.to_string(), Err(status));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PageFetcher for MockFetcher {
        fn fetch_page(&self, url: &str) -> impl Future<Output = Result<String>> + Send {
            self.calls.lock().unwrap().push(url.to_string());
            let outcome = match self.pages.get(url) {
                Some(Ok(html)) => Ok(html.clone()),
                Some(Err(status)) => Err(AnistreamError::HttpStatus {
                    status: *status,
                    url: url.to_string(),
                }),
                None => Err(AnistreamError::NotFound(url.to_string())),
            };
            async move { outcome }
        }
    }

    fn resolver(fetcher: MockFetcher) -> StreamResolver<MockFetcher> {
        StreamResolver::with_fetcher(fetcher, &StreamingConfig::default())
    }

    fn one_piece() -> Slug {
        Slug::parse("one-piece").unwrap()
    }

    fn candidate(segment: &str) -> String {
        format!(
            "{}/anime/one-piece/one-piece-{}-vostfr/?host=LECTEUR%20FHD1",
            BASE, segment
        )
    }

    #[test]
    fn test_episode_segments() {
        assert_eq!(NamingVariant::Unpadded.episode_segment(5), "5");
        assert_eq!(NamingVariant::ZeroPadded.episode_segment(5), "005");
        assert_eq!(NamingVariant::LeadingZero.episode_segment(5), "05");

        assert_eq!(NamingVariant::ZeroPadded.episode_segment(42), "042");
        assert_eq!(NamingVariant::LeadingZero.episode_segment(42), "042");
        assert_eq!(NamingVariant::ZeroPadded.episode_segment(1089), "1089");
        assert_eq!(NamingVariant::LeadingZero.episode_segment(1089), "01089");
    }

    #[test]
    fn test_candidate_order() {
        let resolver = resolver(MockFetcher::new());
        let candidates = resolver.candidate_urls(&one_piece(), 5);

        let urls: Vec<&str> = candidates.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://v6.voiranime.com/anime/one-piece/one-piece-5-vostfr/?host=LECTEUR%20FHD1",
                "https://v6.voiranime.com/anime/one-piece/one-piece-005-vostfr/?host=LECTEUR%20FHD1",
                "https://v6.voiranime.com/anime/one-piece/one-piece-05-vostfr/?host=LECTEUR%20FHD1",
            ]
        );
        assert_eq!(
            candidates.iter().map(|c| c.variant).collect::<Vec<_>>(),
            NamingVariant::DEFAULT_ORDER.to_vec()
        );
    }

    #[test]
    fn test_custom_variants() {
        let resolver = resolver(MockFetcher::new())
            .with_variants(vec![NamingVariant::ZeroPadded]);
        let candidates = resolver.candidate_urls(&one_piece(), 7);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, candidate("007"));
    }

    #[tokio::test]
    async fn test_first_candidate_short_circuits() {
        let fetcher = MockFetcher::new()
            .page(&candidate("5"), &page_with_player("https://vidmoly.to/embed-1.html"))
            .page(&candidate("005"), &page_with_player("https://wrong.example/2"))
            .page(&candidate("05"), &page_with_player("https://wrong.example/3"));
        let resolver = resolver(fetcher);

        let stream = resolver.resolve(&one_piece(), 5).await.unwrap();

        assert_eq!(stream.url, "https://vidmoly.to/embed-1.html");
        assert_eq!(
            stream.source,
            StreamSource::Scraped {
                page_url: candidate("5"),
            }
        );
        assert_eq!(resolver.fetcher.calls(), vec![candidate("5")]);
    }

    #[tokio::test]
    async fn test_falls_through_failures_in_order() {
        let fetcher = MockFetcher::new()
            .status(&candidate("5"), 500)
            .page(&candidate("005"), PAGE_WITHOUT_PLAYER)
            .page(&candidate("05"), &page_with_player("https://voe.sx/e/found"));
        let resolver = resolver(fetcher);

        let stream = resolver.resolve(&one_piece(), 5).await.unwrap();

        assert_eq!(stream.url, "https://voe.sx/e/found");
        assert_eq!(
            resolver.fetcher.calls(),
            vec![candidate("5"), candidate("005"), candidate("05")]
        );
    }

    #[tokio::test]
    async fn test_full_miss_reports_no_stream() {
        let fetcher = MockFetcher::new()
            .page(&candidate("5"), PAGE_WITHOUT_PLAYER)
            .page(&candidate("005"), PAGE_WITHOUT_PLAYER)
            .page(&candidate("05"), PAGE_WITHOUT_PLAYER);
        let resolver = resolver(fetcher);

        let result = resolver.resolve(&one_piece(), 5).await;

        match result {
            Err(AnistreamError::NoStreamFound { slug, episode }) => {
                assert_eq!(slug, "one-piece");
                assert_eq!(episode, 5);
            }
            other => panic!("Expected NoStreamFound, got {:?}", other),
        }
        assert_eq!(
            resolver.fetcher.calls(),
            vec![candidate("5"), candidate("005"), candidate("05")]
        );
    }

    #[tokio::test]
    async fn test_empty_frame_src_is_a_miss() {
        let fetcher = MockFetcher::new()
            .page(&candidate("1"), &page_with_player(""))
            .page(&candidate("001"), &page_with_player("https://vidmoly.to/embed-x.html"));
        let resolver = resolver(fetcher);

        let stream = resolver.resolve(&one_piece(), 1).await.unwrap();
        assert_eq!(stream.url, "https://vidmoly.to/embed-x.html");
        assert_eq!(resolver.fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_episode_zero_is_rejected() {
        let resolver = resolver(MockFetcher::new());
        assert!(matches!(
            resolver.resolve(&one_piece(), 0).await,
            Err(AnistreamError::InvalidEpisode(0))
        ));
        assert!(resolver.fetcher.calls().is_empty());
    }

    #[test]
    fn test_builtin_overrides_are_trimmed() {
        let overrides = StreamOverrides::builtin();
        assert_eq!(overrides.len(), BUILTIN_OVERRIDES.len());
        assert_eq!(
            overrides.get(52991),
            Some("https://streamtape.com/e/y09aoRaaj3t3Kj")
        );
        assert_eq!(overrides.get(1), None);
    }

    #[test]
    fn test_configured_overrides_win() {
        let config = StreamingConfig {
            overrides: vec![
                OverrideEntry {
                    anime_id: 21,
                    url: "https://example.com/e/custom".to_string(),
                },
                OverrideEntry {
                    anime_id: 99999,
                    url: "   ".to_string(),
                },
            ],
            ..StreamingConfig::default()
        };
        let overrides = StreamOverrides::from_config(&config);
        assert_eq!(overrides.get(21), Some("https://example.com/e/custom"));
        assert_eq!(overrides.get(99999), None);
    }

    #[tokio::test]
    async fn test_override_skips_scraping() {
        let resolver = resolver(MockFetcher::new()).with_overrides(
            StreamOverrides::empty().extend([(21, "https://streamtape.com/e/direct".to_string())]),
        );

        let stream = resolver.resolve_entry(21, &one_piece(), 5).await.unwrap();

        assert_eq!(stream.url, "https://streamtape.com/e/direct");
        assert_eq!(stream.source, StreamSource::Override);
        assert!(resolver.fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_overrides_disabled_scrapes() {
        let config = StreamingConfig {
            use_overrides: false,
            ..StreamingConfig::default()
        };
        let fetcher = MockFetcher::new()
            .page(&candidate("5"), &page_with_player("https://vidmoly.to/embed-5.html"));
        let resolver = StreamResolver::with_fetcher(fetcher, &config);

        let stream = resolver.resolve_entry(21, &one_piece(), 5).await.unwrap();

        assert_eq!(stream.url, "https://vidmoly.to/embed-5.html");
        assert_eq!(resolver.fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_entry_without_override_scrapes() {
        let fetcher = MockFetcher::new()
            .page(&candidate("005"), &page_with_player("https://vidmoly.to/embed-005.html"));
        let resolver = resolver(fetcher);

        let stream = resolver.resolve_entry(123456, &one_piece(), 5).await.unwrap();
        assert_eq!(stream.url, "https://vidmoly.to/embed-005.html");
        assert_eq!(resolver.fetcher.calls().len(), 2);
    }

    // ── Against a real HTTP server ──────────────────────────────────────

    fn http_resolver(server: &MockServer) -> StreamResolver<HttpClient> {
        let config = StreamingConfig {
            base_url: server.uri(),
            requests_per_second: 100.0,
            timeout_secs: 5,
            use_overrides: false,
            ..StreamingConfig::default()
        };
        StreamResolver::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_http_short_circuit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/anime/one-piece/one-piece-5-vostfr/"))
            .and(query_param("host", "LECTEUR FHD1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(page_with_player("https://vidmoly.to/embed-5.html")),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/anime/one-piece/one-piece-005-vostfr/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/anime/one-piece/one-piece-05-vostfr/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let stream = http_resolver(&server).resolve(&one_piece(), 5).await.unwrap();
        assert_eq!(stream.url, "https://vidmoly.to/embed-5.html");
    }

    #[tokio::test]
    async fn test_http_full_miss() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/anime/one-piece/one-piece-5-vostfr/"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/anime/one-piece/one-piece-005-vostfr/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE_WITHOUT_PLAYER))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/anime/one-piece/one-piece-05-vostfr/"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let result = http_resolver(&server).resolve(&one_piece(), 5).await;
        assert!(matches!(result, Err(AnistreamError::NoStreamFound { .. })));
    }
}
