// Poster enrichment — optional, best-effort decoration of recommendations.
//
// The PosterLookup trait is the seam; OmdbPosterLookup talks to the OMDb API
// and NoPosterLookup stands in when no API key is configured (and in tests).
// A failed lookup only ever means "no image".

pub mod omdb;
pub mod traits;

use futures::future::join_all;
use serde::Serialize;

use crate::recommend::ranking::Recommendation;
use traits::PosterLookup;

/// A recommendation with its poster URL, if one was found.
#[derive(Debug, Clone, Serialize)]
pub struct PosterCard {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub poster_url: Option<String>,
}

/// Look up posters for every recommendation concurrently, keeping order.
pub async fn attach_posters(
    lookup: &dyn PosterLookup,
    recommendations: Vec<Recommendation>,
) -> Vec<PosterCard> {
    let urls = join_all(
        recommendations
            .iter()
            .map(|rec| lookup.poster_url(&rec.title)),
    )
    .await;

    recommendations
        .into_iter()
        .zip(urls)
        .map(|(recommendation, poster_url)| PosterCard {
            recommendation,
            poster_url,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EvenOnly;

    #[async_trait]
    impl PosterLookup for EvenOnly {
        async fn poster_url(&self, title: &str) -> Option<String> {
            (title.len() % 2 == 0).then(|| format!("https://img.example/{title}.jpg"))
        }
    }

    fn rec(index: usize, title: &str) -> Recommendation {
        Recommendation {
            index,
            title: title.to_string(),
            score: 0.5,
        }
    }

    #[tokio::test]
    async fn test_attach_keeps_order_and_tolerates_misses() {
        let cards = attach_posters(&EvenOnly, vec![rec(1, "Up"), rec(2, "Heat!")]).await;
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].recommendation.title, "Up");
        assert_eq!(cards[0].poster_url.as_deref(), Some("https://img.example/Up.jpg"));
        assert_eq!(cards[1].recommendation.title, "Heat!");
        assert!(cards[1].poster_url.is_none());
    }

    #[tokio::test]
    async fn test_noop_lookup_never_returns_posters() {
        let cards = attach_posters(&traits::NoPosterLookup, vec![rec(0, "Up")]).await;
        assert!(cards[0].poster_url.is_none());
    }
}
