//! Dream responder
//!
//! The closing screen asks the reader for a dream and answers with one or
//! two encouraging sentences. The answer comes from a pluggable provider;
//! when there is no provider, or it fails, a hand-written line is picked
//! instead so the reader always gets a reply.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MSG_MISSING: &str = "Veuillez écrire votre rêve.";
pub const MSG_TOO_SHORT: &str = "Écrivez un rêve un peu plus long.";
pub const SOURCE_NO_PROVIDER: &str = "fallback-no-api-key";
pub const SOURCE_ERROR: &str = "error-fallback";

/// Minimum trimmed length, in characters
const MIN_DREAM_CHARS: usize = 2;

const ERROR_LINES: [&str; 3] = [
    "Ton rêve est valide même quand les étoiles clignotent. Continue d'y croire.",
    "Parfois, le silence des machines laisse plus de place à la voix du cœur. Ton rêve est entendu.",
    "Même sans réponse magique, ton aspiration reste réelle et précieuse.",
];

const CLIENT_LINES: [&str; 4] = [
    "Ton rêve est une graine. Arrose-le chaque jour.",
    "Les étoiles ne brillent que dans l'obscurité. Ton rêve aussi.",
    "Chaque grand voyage commence par un simple pas.",
    "Crois en toi comme tu crois en ton rêve.",
];

fn no_provider_lines(dream: &str) -> [String; 5] {
    [
        format!(
            "\"{dream}\" est un beau rêve. Chaque jour qui passe le rapproche un peu plus de toi."
        ),
        format!(
            "Je ressens beaucoup d'authenticité dans ton rêve de \"{dream}\". C'est prometteur."
        ),
        format!("\"{dream}\" n'est pas qu'une idée, c'est une direction que ton âme a choisie."),
        format!(
            "Ton ambition pour \"{dream}\" est comme une graine. Arrose-la avec patience et foi."
        ),
        format!(
            "\"{dream}\" résonne avec force. C'est le signe d'un chemin qui veut être parcouru."
        ),
    ]
}

#[derive(Debug, Error)]
pub enum DreamError {
    #[error("provider error: {0}")]
    Provider(String),
    #[error("provider returned an empty answer")]
    Empty,
}

/// What a provider produced for one dream
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderAnswer {
    pub text: String,
    /// Short provider/model tag echoed back to the client
    pub source: String,
    pub tokens: Option<u32>,
}

/// Seam for whatever writes the answer (a hosted model, a test double)
pub trait DreamProvider {
    fn respond(&self, dream: &str) -> Result<ProviderAnswer, DreamError>;
}

/// JSON body returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreamResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DreamReply {
    pub status: u16,
    pub body: DreamResponse,
}

impl DreamReply {
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.body).unwrap_or_else(|_| String::from("{}"))
    }
}

pub struct DreamService {
    provider: Option<Box<dyn DreamProvider>>,
    rng: Pcg32,
}

impl DreamService {
    pub fn new(provider: Option<Box<dyn DreamProvider>>, seed: u64) -> Self {
        if provider.is_none() {
            log::warn!("No dream provider configured, answering with fallback lines");
        }
        Self {
            provider,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Handle a `{"dream": "..."}` request body
    pub fn handle(&mut self, body: &str, timestamp_ms: u64) -> DreamReply {
        let dream = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("dream").and_then(|d| d.as_str()).map(str::to_owned));

        let Some(dream) = dream else {
            return bad_request(MSG_MISSING, "Dream text missing");
        };

        let trimmed = dream.trim();
        if trimmed.chars().count() < MIN_DREAM_CHARS {
            return bad_request(MSG_TOO_SHORT, "Dream too short");
        }

        log::info!("Dream request ({} chars)", trimmed.chars().count());

        let Some(provider) = self.provider.as_ref() else {
            let lines = no_provider_lines(trimmed);
            let line = lines[self.rng.random_range(0..lines.len())].clone();
            return DreamReply {
                status: 200,
                body: DreamResponse {
                    response: line,
                    error: None,
                    source: Some(SOURCE_NO_PROVIDER.into()),
                    timestamp: Some(timestamp_ms),
                    tokens: None,
                },
            };
        };

        let outcome = provider.respond(trimmed).and_then(|answer| {
            let text = answer.text.trim().to_string();
            if text.is_empty() {
                Err(DreamError::Empty)
            } else {
                Ok(ProviderAnswer { text, ..answer })
            }
        });

        match outcome {
            Ok(answer) => DreamReply {
                status: 200,
                body: DreamResponse {
                    response: answer.text,
                    error: None,
                    source: Some(answer.source),
                    timestamp: Some(timestamp_ms),
                    tokens: answer.tokens,
                },
            },
            Err(e) => {
                log::warn!("Dream provider failed: {e}");
                let line = ERROR_LINES[self.rng.random_range(0..ERROR_LINES.len())];
                DreamReply {
                    status: 500,
                    body: DreamResponse {
                        response: line.into(),
                        error: Some(e.to_string()),
                        source: Some(SOURCE_ERROR.into()),
                        timestamp: Some(timestamp_ms),
                        tokens: None,
                    },
                }
            }
        }
    }
}

fn bad_request(message: &str, error: &str) -> DreamReply {
    DreamReply {
        status: 400,
        body: DreamResponse {
            response: message.into(),
            error: Some(error.into()),
            source: None,
            timestamp: None,
            tokens: None,
        },
    }
}

/// Line the client shows when the request itself failed
pub fn client_fallback<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    CLIENT_LINES[rng.random_range(0..CLIENT_LINES.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<&'static str, &'static str>);

    impl DreamProvider for Fixed {
        fn respond(&self, _dream: &str) -> Result<ProviderAnswer, DreamError> {
            match self.0 {
                Ok(text) => Ok(ProviderAnswer {
                    text: text.into(),
                    source: "fixed".into(),
                    tokens: Some(12),
                }),
                Err(e) => Err(DreamError::Provider(e.into())),
            }
        }
    }

    #[test]
    fn test_missing_dream() {
        let mut service = DreamService::new(None, 1);
        for body in [r#"{}"#, r#"{"dream": 42}"#, "not json"] {
            let reply = service.handle(body, 0);
            assert_eq!(reply.status, 400);
            assert_eq!(reply.body.response, MSG_MISSING);
        }
    }

    #[test]
    fn test_too_short_dream() {
        let mut service = DreamService::new(None, 1);
        let reply = service.handle(r#"{"dream": "  a  "}"#, 0);
        assert_eq!(reply.status, 400);
        assert_eq!(reply.body.response, MSG_TOO_SHORT);
    }

    #[test]
    fn test_no_provider_fallback_quotes_dream() {
        let mut service = DreamService::new(None, 3);
        let reply = service.handle(r#"{"dream": "  devenir astronaute "}"#, 1234);
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body.source.as_deref(), Some(SOURCE_NO_PROVIDER));
        assert_eq!(reply.body.timestamp, Some(1234));
        assert!(reply.body.response.contains("\"devenir astronaute\""));
        assert!(no_provider_lines("devenir astronaute").contains(&reply.body.response));
    }

    #[test]
    fn test_provider_answer_passthrough() {
        let mut service = DreamService::new(Some(Box::new(Fixed(Ok("  Vas-y.  ")))), 1);
        let reply = service.handle(r#"{"dream": "voler"}"#, 5);
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body.response, "Vas-y.");
        assert_eq!(reply.body.source.as_deref(), Some("fixed"));
        assert_eq!(reply.body.tokens, Some(12));
    }

    #[test]
    fn test_provider_error_and_empty_answer() {
        let mut service = DreamService::new(Some(Box::new(Fixed(Err("timeout")))), 1);
        let reply = service.handle(r#"{"dream": "voler"}"#, 5);
        assert_eq!(reply.status, 500);
        assert_eq!(reply.body.source.as_deref(), Some(SOURCE_ERROR));
        assert!(ERROR_LINES.contains(&reply.body.response.as_str()));
        assert!(reply.body.error.as_deref().is_some_and(|e| e.contains("timeout")));

        let mut service = DreamService::new(Some(Box::new(Fixed(Ok("   ")))), 1);
        let reply = service.handle(r#"{"dream": "voler"}"#, 5);
        assert_eq!(reply.status, 500);
    }

    #[test]
    fn test_reply_json_omits_empty_fields() {
        let mut service = DreamService::new(None, 1);
        let json = service.handle("{}", 0).to_json();
        assert!(json.contains("\"response\""));
        assert!(!json.contains("timestamp"));
    }

    #[test]
    fn test_client_fallback() {
        let mut rng = Pcg32::seed_from_u64(4);
        for _ in 0..20 {
            assert!(CLIENT_LINES.contains(&client_fallback(&mut rng)));
        }
    }
}
