//! Canned response tables and fixed reply texts.
//!
//! Immutable static configuration loaded once at startup; nothing here is
//! mutated at runtime. Lookup keys are stored in the normalized comparison
//! form produced by `charla_core::text::normalize`, so elongated or accented
//! variants ("Holaaaa!!", "qué tal") land on their canonical entry.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Suffix inviting the user to share contact data, appended to informative
/// answers and non-greeting canned replies.
pub const CONTACT_PROMPT: &str = "También podés hacer clic en “Enviar mis datos” o escribir tus datos en el chat \
para que coordinemos tu consulta, link de pago o llamada.";

/// Acknowledgement sent when the message itself contains contact data.
pub const CONTACT_ACK: &str =
    "Gracias, hemos recibido tus datos y te contactaremos a la brevedad posible.";

/// Reply used when retrieval produced no usable evidence.
pub const FALLBACK_RESPONSE: &str = "No tengo suficiente informacion en la base de conocimiento para responder eso. \
Por favor revisa www.medifestructuras.com o contactanos a eduardo.mediavilla@medifestructuras.com \
o por telefono al +357 96863257.";

pub const REPLY_HOLA: &str = "Hola, ¿cómo estás?";
pub const REPLY_BUENOS_DIAS: &str = "Buenos días, ¿en qué te puedo ayudar?";
pub const REPLY_BUENAS_TARDES: &str = "Buenas tardes, ¿en qué te ayudo?";
pub const REPLY_BUENAS_NOCHES: &str = "Buenas noches, ¿en qué puedo ayudarte?";
pub const REPLY_GENIAL: &str = "¡Genial! ¿En qué te puedo ayudar?";
pub const REPLY_PERFECTO: &str = "¡Perfecto! ¿En qué te ayudo?";
pub const REPLY_ATENTO: &str = "Perfecto, quedo atento.";
pub const REPLY_AVISAR: &str = "Perfecto, gracias por avisar.";
pub const REPLY_GRACIAS: &str = "¡Con gusto! Si necesitas algo más, aquí estaré.";
pub const REPLY_HASTA_LUEGO: &str = "¡Hasta luego! 😊";
pub const REPLY_HASTA_PRONTO: &str = "¡Hasta pronto! 😊";
pub const REPLY_BUEN_DIA: &str = "Que tengas un excelente día.";
pub const REPLY_ESTE_BIEN: &str = "Que estés muy bien.";

/// Exact-match table: normalized phrase → canned reply.
pub static SOCIAL_RESPONSES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        // greetings and slang
        ("hola", REPLY_HOLA),
        ("holi", REPLY_HOLA),
        ("holis", REPLY_HOLA),
        ("holita", REPLY_HOLA),
        ("ola", REPLY_HOLA),
        ("olas", REPLY_HOLA),
        ("helo", REPLY_HOLA),
        ("hey", REPLY_HOLA),
        ("ey", REPLY_HOLA),
        ("buenas", REPLY_HOLA),
        ("buenas buenas", REPLY_HOLA),
        ("que tal", REPLY_HOLA),
        ("q tal", REPLY_HOLA),
        ("como estas", REPLY_HOLA),
        ("como andas", REPLY_HOLA),
        ("como vas", REPLY_HOLA),
        ("que onda", REPLY_HOLA),
        ("onda", REPLY_HOLA),
        ("que mas", REPLY_HOLA),
        ("que mas pues", REPLY_HOLA),
        ("que hubo", REPLY_HOLA),
        ("quiubo", REPLY_HOLA),
        ("parce", REPLY_HOLA),
        ("parcero", REPLY_HOLA),
        ("wey", REPLY_HOLA),
        ("che", REPLY_HOLA),
        ("amigo", REPLY_HOLA),
        ("que pasa", REPLY_HOLA),
        ("todo bien tio", REPLY_HOLA),
        ("buenas tio", REPLY_HOLA),
        // time-of-day greetings
        ("buenos dias", REPLY_BUENOS_DIAS),
        ("buen dia", REPLY_BUENOS_DIAS),
        ("bd", REPLY_BUENOS_DIAS),
        ("b dias", REPLY_BUENOS_DIAS),
        ("buenas tardes", REPLY_BUENAS_TARDES),
        ("bt", REPLY_BUENAS_TARDES),
        ("b tardes", REPLY_BUENAS_TARDES),
        ("tardes", REPLY_BUENAS_TARDES),
        ("buenas noches", REPLY_BUENAS_NOCHES),
        ("bn", REPLY_BUENAS_NOCHES),
        ("noches", REPLY_BUENAS_NOCHES),
        // small talk
        ("todo bien", REPLY_GENIAL),
        ("todo ok", REPLY_GENIAL),
        ("todo tranqui", REPLY_PERFECTO),
        // thanks
        ("gracias", REPLY_GRACIAS),
        ("muchas gracias", REPLY_GRACIAS),
        ("mil gracias", REPLY_GRACIAS),
        ("gracias totales", REPLY_GRACIAS),
        ("thanks", REPLY_GRACIAS),
        ("ok gracias", REPLY_GRACIAS),
        ("gracias amigo", REPLY_GRACIAS),
        ("gracias bro", REPLY_GRACIAS),
        // acknowledgements
        ("ok", REPLY_ATENTO),
        ("okey", REPLY_ATENTO),
        ("oki", REPLY_ATENTO),
        ("okis", REPLY_ATENTO),
        ("vale", REPLY_ATENTO),
        ("ok vale", REPLY_ATENTO),
        ("perfecto", REPLY_ATENTO),
        ("excelente", REPLY_ATENTO),
        ("genial", REPLY_ATENTO),
        ("de acuerdo", REPLY_ATENTO),
        ("entendido", REPLY_AVISAR),
        ("listo", REPLY_ATENTO),
        ("dale", REPLY_ATENTO),
        ("va", REPLY_ATENTO),
        ("bien", REPLY_ATENTO),
        // farewells
        ("chau", REPLY_HASTA_LUEGO),
        ("chao", REPLY_HASTA_LUEGO),
        ("adios", REPLY_HASTA_LUEGO),
        ("nos vemos", REPLY_HASTA_LUEGO),
        ("hasta luego", REPLY_HASTA_LUEGO),
        ("hasta pronto", REPLY_HASTA_PRONTO),
        ("bye", REPLY_HASTA_LUEGO),
        ("bye bye", REPLY_HASTA_LUEGO),
    ])
});

/// Ordered courtesy patterns: every keyword must appear as a substring of
/// the normalized message. More specific patterns precede their
/// generalizations so the first hit wins.
pub const COURTESY_PATTERNS: &[(&[&str], &str)] = &[
    (&["agradecid"], REPLY_GRACIAS),
    (&["muchas", "gracias"], REPLY_GRACIAS),
    (&["con", "gusto"], REPLY_GRACIAS),
    (&["gracias"], REPLY_GRACIAS),
    (&["que", "pase", "buen", "dia"], REPLY_BUEN_DIA),
    (&["pase", "buen", "dia"], REPLY_BUEN_DIA),
    (&["que", "este", "bien"], REPLY_ESTE_BIEN),
    (&["que", "este", "muy"], REPLY_ESTE_BIEN),
    (&["todo", "claro"], REPLY_ATENTO),
    (&["perfecto"], REPLY_ATENTO),
    (&["excelente"], REPLY_ATENTO),
    (&["genial"], REPLY_ATENTO),
];

/// Markers that mean the message carries an actual request, so courtesy
/// patterns must not short-circuit it.
pub const INFORMATIVE_MARKERS: &[&str] = &[
    "precio",
    "costo",
    "cuesta",
    "curso",
    "servicio",
    "informacion",
    "detalle",
    "solicito",
    "saber",
    "necesito",
    "puedo",
    "puedes",
    "instalar",
    "disenar",
    "diseno",
    "calcular",
    "cotizacion",
    "presupuesto",
    "proyecto",
    "consulta",
    "contacto",
    "telefono",
    "email",
    "correo",
];

/// Normalized messages that count as greetings; greeting replies are sent
/// without the contact suffix.
pub const GREETING_KEYWORDS: &[&str] = &[
    "hola",
    "buen",
    "buenas",
    "buenos",
    "saludos",
    "hey",
    "holi",
    "buen dia",
    "que tal",
    "como estas",
];

/// Append the contact suffix to an answer, idempotently.
///
/// Adds a closing period when the answer does not already end in
/// sentence-final punctuation; a suffix already present is not duplicated.
pub fn append_contact_prompt(answer: &str) -> String {
    let stripped = answer.trim();
    if stripped.is_empty() {
        return CONTACT_PROMPT.to_string();
    }
    if stripped.contains(CONTACT_PROMPT) {
        return stripped.to_string();
    }
    if stripped.ends_with(['.', '!', '?']) {
        format!("{} {}", stripped, CONTACT_PROMPT)
    } else {
        format!("{}. {}", stripped, CONTACT_PROMPT)
    }
}
