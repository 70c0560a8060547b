//! Intent classification for incoming messages.
//!
//! Three cheap heuristic classifiers run before any retrieval:
//! - contact detection (the message itself carries an email or phone),
//! - social/courtesy detection (greetings, thanks, acknowledgements),
//! - everything else is an information request.
//!
//! The priority order contact > social > retrieval is encoded in
//! [`classify`], so the orchestrator's transitions stay testable.

use crate::responses::{
    COURTESY_PATTERNS, GREETING_KEYWORDS, INFORMATIVE_MARKERS, SOCIAL_RESPONSES,
};
use charla_core::text::normalize;

/// A canned social reply with its greeting flag.
///
/// Greeting replies are sent as-is; other canned replies get the contact
/// suffix appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialReply {
    pub text: &'static str,
    pub greeting: bool,
}

/// Classified intent of one incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// The message itself contains contact data
    ContactShare,
    /// A greeting/courtesy message answered with a canned reply
    Social(SocialReply),
    /// A real question that flows into retrieval and generation
    InformationRequest,
}

/// Classify a message, applying the contact > social > retrieval priority.
pub fn classify(message: &str) -> Intent {
    if looks_like_contact(message) {
        return Intent::ContactShare;
    }
    if let Some(reply) = classify_social(message) {
        return Intent::Social(reply);
    }
    Intent::InformationRequest
}

/// Heuristic contact detection.
///
/// True when any whitespace-delimited token contains both "@" and "." (an
/// email-looking string), or the message holds at least 6 digits in total
/// (a phone-looking string). This triggers an acknowledgement path only;
/// validating the data belongs to the persistence collaborator.
pub fn looks_like_contact(message: &str) -> bool {
    let cleaned = message.replace([',', ';'], " ");
    let has_email = cleaned
        .split_whitespace()
        .any(|part| part.contains('@') && part.contains('.'));
    let digit_count = message.chars().filter(|c| c.is_ascii_digit()).count();
    has_email || digit_count >= 6
}

/// Detect a social/courtesy message and return its canned reply.
///
/// Stage 1 is an exact lookup of the normalized message, which wins even
/// when the message carries a question mark ("como estas?"). Stage 2 scans
/// the ordered courtesy patterns, but only for messages without a question
/// mark and without any informative marker: "gracias, pero quiero saber el
/// precio del curso" must reach retrieval.
pub fn classify_social(message: &str) -> Option<SocialReply> {
    let normalized = normalize(message);
    let greeting = GREETING_KEYWORDS.contains(&normalized.as_str());

    if let Some(reply) = SOCIAL_RESPONSES.get(normalized.as_str()).copied() {
        return Some(SocialReply {
            text: reply,
            greeting,
        });
    }

    if message.contains('?') || message.contains('¿') {
        return None;
    }
    if INFORMATIVE_MARKERS
        .iter()
        .any(|marker| normalized.contains(marker))
    {
        return None;
    }

    for &(keywords, reply) in COURTESY_PATTERNS {
        if keywords.iter().all(|kw| normalized.contains(kw)) {
            return Some(SocialReply {
                text: reply,
                greeting,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::{REPLY_BUENAS_TARDES, REPLY_GRACIAS, REPLY_HOLA};

    #[test]
    fn test_exact_greeting_with_elongation() {
        let reply = classify_social("Holaaaa!!").unwrap();
        assert_eq!(reply.text, REPLY_HOLA);
        assert!(reply.greeting);
    }

    #[test]
    fn test_thanks_is_not_a_greeting() {
        let reply = classify_social("Gracias!!").unwrap();
        assert_eq!(reply.text, REPLY_GRACIAS);
        assert!(!reply.greeting);
    }

    #[test]
    fn test_question_mark_blocks_courtesy_patterns() {
        assert!(classify_social("gracias, cuánto cuesta el curso?").is_none());
    }

    #[test]
    fn test_informative_marker_blocks_courtesy_patterns() {
        assert!(classify_social("gracias, pero quiero saber el precio del curso").is_none());
    }

    #[test]
    fn test_exact_match_wins_over_question_mark() {
        // stage 1 lookup runs before the question-mark gate
        let reply = classify_social("como estas?").unwrap();
        assert_eq!(reply.text, REPLY_HOLA);
    }

    #[test]
    fn test_courtesy_pattern_match() {
        let reply = classify_social("muchas gracias por la ayuda de hoy").unwrap();
        assert_eq!(reply.text, REPLY_GRACIAS);
        assert!(!reply.greeting);
    }

    #[test]
    fn test_time_of_day_greeting_is_not_in_greeting_set() {
        // "buenas tardes" answers with a canned reply but still gets the
        // contact suffix downstream
        let reply = classify_social("buenas tardes").unwrap();
        assert_eq!(reply.text, REPLY_BUENAS_TARDES);
        assert!(!reply.greeting);
    }

    #[test]
    fn test_plain_question_is_not_social() {
        assert!(classify_social("que cursos de estructuras ofrecen").is_none());
    }

    #[test]
    fn test_contact_detection_email() {
        assert!(looks_like_contact("mi correo es juan@ejemplo.com"));
        assert!(looks_like_contact("escribime,a@b.c"));
        assert!(!looks_like_contact("uso @usuario en redes"));
    }

    #[test]
    fn test_contact_detection_phone() {
        assert!(looks_like_contact("mi numero es 96 86 32"));
        assert!(!looks_like_contact("tengo 2 casas y 3 autos"));
    }

    #[test]
    fn test_contact_share_beats_course_keywords() {
        let intent = classify("quiero el curso de instalaciones, mi correo es x@y.com");
        assert_eq!(intent, Intent::ContactShare);
    }

    #[test]
    fn test_priority_order() {
        assert!(matches!(classify("Hola"), Intent::Social(_)));
        assert_eq!(classify("mi telefono es 968632571"), Intent::ContactShare);
        assert_eq!(
            classify("cuanto cuesta el curso de cype"),
            Intent::InformationRequest
        );
    }
}
