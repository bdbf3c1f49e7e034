use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

use crate::{
    error::{GameError, Result},
    models::{Card, Rank, Suit},
};

/// Request timeout for the card API
pub const API_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the engine gets its cards and puzzle targets from
#[async_trait]
pub trait CardSource: Send + Sync {
    /// Draw `count` cards. Never fails: implementations fall back locally.
    async fn draw(&self, count: usize) -> Vec<Card>;

    /// Pick a target number for `cards`
    fn target_for(&self, cards: &[Card]) -> i64 {
        random_target(cards, &mut rand::rng())
    }
}

/// Card source backed by the random.org integer API
pub struct ApiHandler {
    api_url: String,
    http_client: reqwest::Client,
}

impl ApiHandler {
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(API_TIMEOUT).build()?;

        Ok(Self {
            api_url: api_url.into(),
            http_client,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Ask the API for `count` integers in 1..=52 and turn them into cards
    pub async fn fetch_cards(&self, count: usize) -> Result<Vec<Card>> {
        let response = self
            .http_client
            .get(&self.api_url)
            .query(&[
                ("num", count.to_string()),
                ("min", "1".to_string()),
                ("max", "52".to_string()),
                ("col", "1".to_string()),
                ("base", "10".to_string()),
                ("format", "plain".to_string()),
                ("rnd", "new".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::debug!("Card API request failed: {} - {}", status, error_text.trim());
            return Err(GameError::Api {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_cards(&body, count)
    }
}

#[async_trait]
impl CardSource for ApiHandler {
    async fn draw(&self, count: usize) -> Vec<Card> {
        match self.fetch_cards(count).await {
            Ok(cards) => {
                tracing::debug!("Drew {} cards from {}", cards.len(), self.api_url);
                cards
            }
            Err(e) => {
                // Must stay below the default `warn` filter
                tracing::info!("Card API unavailable ({}), dealing locally", e);
                local_cards(count)
            }
        }
    }
}

/// Parse a plain-text body of one integer per line
pub fn parse_cards(body: &str, expected: usize) -> Result<Vec<Card>> {
    let cards = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<u32>()
                .ok()
                .and_then(Card::from_index)
                .ok_or_else(|| GameError::InvalidApiResponse(format!("bad card number '{}'", line)))
        })
        .collect::<Result<Vec<_>>>()?;

    if cards.len() != expected {
        return Err(GameError::InvalidApiResponse(format!(
            "expected {} cards, got {}",
            expected,
            cards.len()
        )));
    }

    Ok(cards)
}

/// Deal `count` random cards without the network
pub fn local_cards(count: usize) -> Vec<Card> {
    let mut rng = rand::rng();
    random_cards(count, &mut rng)
}

pub fn random_cards(count: usize, rng: &mut impl Rng) -> Vec<Card> {
    (0..count)
        .map(|_| {
            let suit = Suit::ALL[rng.random_range(0..Suit::ALL.len())];
            let rank = Rank::new(rng.random_range(1..=13)).unwrap_or(Rank::ACE);
            Card::new(suit, rank)
        })
        .collect()
}

/// A target between the smallest card value and the sum of all values
pub fn random_target(cards: &[Card], rng: &mut impl Rng) -> i64 {
    if cards.is_empty() {
        return 10;
    }

    let min = cards.iter().map(Card::value).min().unwrap_or(1);
    let sum: i64 = cards.iter().map(Card::value).sum();

    min + rng.random_range(0..(sum - min).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::{
        io,
        sync::{Arc, Mutex},
    };
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    /// Serve a single canned HTTP response on a local port
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/integers/", addr)
    }

    /// Collects formatted log output for inspection
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_parse_cards() {
        let cards = parse_cards("1\n14\n\n27\r\n52\n", 4).unwrap();
        assert_eq!(
            cards,
            vec![
                Card::new(Suit::Hearts, Rank::ACE),
                Card::new(Suit::Diamonds, Rank::ACE),
                Card::new(Suit::Clubs, Rank::ACE),
                Card::new(Suit::Spades, Rank::KING),
            ]
        );
    }

    #[test]
    fn test_parse_cards_rejects_garbage() {
        assert!(matches!(
            parse_cards("1\nfoo\n", 2),
            Err(GameError::InvalidApiResponse(_))
        ));
        assert!(parse_cards("53\n", 1).is_err());
        assert!(parse_cards("1\n2\n", 3).is_err());
    }

    #[test]
    fn test_random_cards_count() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(random_cards(5, &mut rng).len(), 5);
        assert!(random_cards(0, &mut rng).is_empty());
    }

    #[test]
    fn test_target_within_bounds() {
        let cards = vec![
            Card::new(Suit::Hearts, Rank::new(3).unwrap()),
            Card::new(Suit::Clubs, Rank::new(5).unwrap()),
            Card::new(Suit::Spades, Rank::new(9).unwrap()),
        ];
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let target = random_target(&cards, &mut rng);
            assert!((3..17).contains(&target), "target {} out of range", target);
        }
    }

    #[test]
    fn test_target_for_no_cards() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(random_target(&[], &mut rng), 10);
    }

    #[test]
    fn test_target_single_card() {
        let cards = vec![Card::new(Suit::Hearts, Rank::new(4).unwrap())];
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(random_target(&cards, &mut rng), 4);
    }

    #[tokio::test]
    async fn test_fetch_cards_from_api() {
        let url = serve_once("200 OK", "2\n15\n28\n41\n13\n").await;
        let api = ApiHandler::new(url).unwrap();

        let cards = api.fetch_cards(5).await.unwrap();
        assert_eq!(cards.len(), 5);
        assert_eq!(cards[0], Card::new(Suit::Hearts, Rank::new(2).unwrap()));
        assert_eq!(cards[4], Card::new(Suit::Hearts, Rank::KING));
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let url = serve_once("503 Service Unavailable", "busy").await;
        let api = ApiHandler::new(url).unwrap();

        let result = api.fetch_cards(5).await;
        assert!(matches!(result, Err(GameError::Api { status: 503 })));
    }

    #[tokio::test]
    async fn test_draw_falls_back_when_api_fails() {
        let url = serve_once("500 Internal Server Error", "").await;
        let api = ApiHandler::new(url).unwrap();

        let cards = api.draw(5).await;
        assert_eq!(cards.len(), 5);
    }

    #[tokio::test]
    async fn test_fallback_stays_below_warn() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let url = serve_once("500 Internal Server Error", "").await;
        let api = ApiHandler::new(url).unwrap();
        assert_eq!(api.draw(5).await.len(), 5);

        let output = logs.contents();
        assert!(output.contains("dealing locally"));
        assert!(!output.contains("WARN"));
        assert!(!output.contains("ERROR"));
    }
}
