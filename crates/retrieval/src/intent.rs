//! Topic-intent detection from normalized message text.
//!
//! Maps keyword hits to source-path prefixes so the similarity search can be
//! narrowed to the categories the user is asking about. Filters are advisory:
//! a narrowed search that returns nothing is accepted as-is, trading recall
//! for precision within covered topics.

/// Source-path prefixes and the keywords that activate them.
const SOURCE_INTENT_KEYWORDS: &[(&str, &[&str])] = &[
    ("faq/", &["faq", "preguntas frecuentes", "pregunta frecuente"]),
    (
        "servicios/",
        &["servicio", "servicios", "contratar", "ofrecemos", "diseno", "proyecto"],
    ),
    (
        "cursos/",
        &["curso", "cursos", "capacitacion", "formacion", "taller", "educacion"],
    ),
    (
        "software/",
        &["software", "cype", "sap2000", "etabs", "modelacion", "cypeunext"],
    ),
];

/// Keywords that mark a message as course-related.
const COURSE_INTENT_KEYWORDS: &[&str] = &[
    "curso",
    "cursos",
    "capacitacion",
    "formacion",
    "taller",
    "instalaciones",
    "instalacion",
];

/// Infer source-prefix filters for the similarity search.
///
/// A prefix is included when any of its keywords appears as a substring of
/// the normalized message. Table order is preserved.
pub fn infer_source_filters(normalized_message: &str) -> Vec<String> {
    SOURCE_INTENT_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| normalized_message.contains(kw)))
        .map(|(prefix, _)| (*prefix).to_string())
        .collect()
}

/// Whether the message asks about courses.
pub fn is_course_request(normalized_message: &str) -> bool {
    COURSE_INTENT_KEYWORDS
        .iter()
        .any(|kw| normalized_message.contains(kw))
}
