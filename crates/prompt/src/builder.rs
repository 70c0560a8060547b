//! Prompt assembly.
//!
//! Joins the fixed system instructions, optional course guidance, optional
//! anti-repetition block, rendered history, evidence context, and the new
//! question into one prompt with an invariant section order. Sections are
//! rendered from Handlebars templates and blank-line separated; empty
//! sections are omitted.

use charla_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Fixed system instructions, always the first prompt section.
pub const SYSTEM_INSTRUCTIONS: &str = "Eres el asistente virtual oficial de Medifestructuras (www.medifestructuras.com). \
Responde siempre usando solo la informacion que aparece dentro del CONTEXTO y se muy conciso. \
Si no encuentras la respuesta en el CONTEXTO, deja claro que no la tienes y sugiere visitar \
la pagina web, escribir a eduardo.mediavilla@medifestructuras.com o llamar al +357 96863257. \
Evita inventar precios, cursos o servicios que no esten citados. \
Si el usuario vuelve a preguntar o dice que no entendio, reformula la respuesta con un lenguaje mas simple, ejemplos o pasos. \
El historial de la conversacion solo sirve para mantener el tono; no lo uses como fuente de hechos.";

/// Guideline injected when the question is course-related.
pub const COURSE_RESPONSE_GUIDELINES: &str = "Cuando la pregunta sea sobre cursos, confirma que Medif Estructuras ofrece 9 cursos en total \
(8 de estructuras y 1 de instalaciones), menciona primero esa visión general, luego describe un curso específico \
documentado en la base de conocimientos y cierra con el llamado a la acción sin negar cursos ni decir “no tengo información”.";

const PREVIOUS_ANSWER_TEMPLATE: &str = "Tu respuesta anterior fue:\n\"\"\"\n{{answer}}\n\"\"\"\n\
El usuario volvio a consultar o indico que no entendio. \
No repitas la misma redaccion ni estructura; explicalo con lenguaje mas simple, pasos o ejemplos, pero mantente preciso.";

const HISTORY_TEMPLATE: &str = "Conversacion hasta ahora:\n{{history}}";
const CONTEXT_TEMPLATE: &str = "CONTEXTO:\n{{context}}";
const QUESTION_TEMPLATE: &str = "NUEVA PREGUNTA DEL USUARIO:\n{{question}}";

/// Literal line marking where the model's answer starts.
const RESPONSE_MARKER: &str = "RESPUESTA:";

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<&str, &str>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text prompts, no HTML escaping
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("section", template)
        .map_err(|e| AppError::Serialization(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("section", variables)
        .map_err(|e| AppError::Serialization(format!("Failed to render template: {}", e)))
}

/// Build the anti-repetition block from the most recent assistant reply.
///
/// Returns an empty string when there is no previous reply, which drops the
/// section from the assembled prompt.
pub fn build_previous_answer_block(last_assistant_reply: Option<&str>) -> AppResult<String> {
    let Some(reply) = last_assistant_reply else {
        return Ok(String::new());
    };
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    render_template(
        PREVIOUS_ANSWER_TEMPLATE,
        &HashMap::from([("answer", trimmed)]),
    )
}

/// Assemble the final prompt.
///
/// Section order is invariant: system instructions, course guideline,
/// anti-repetition block, history, evidence context, question, response
/// marker. Empty sections are omitted; present sections are joined with a
/// blank line. The prompt is never mutated after construction.
pub fn build_prompt(
    previous_answer_block: &str,
    history_text: &str,
    context: &str,
    user_message: &str,
    course_instruction: Option<&str>,
) -> AppResult<String> {
    let mut sections: Vec<String> = vec![SYSTEM_INSTRUCTIONS.to_string()];

    if let Some(instruction) = course_instruction {
        if !instruction.is_empty() {
            sections.push(instruction.to_string());
        }
    }

    if !previous_answer_block.is_empty() {
        sections.push(previous_answer_block.to_string());
    }

    if !history_text.is_empty() {
        sections.push(render_template(
            HISTORY_TEMPLATE,
            &HashMap::from([("history", history_text)]),
        )?);
    }

    if !context.is_empty() {
        sections.push(render_template(
            CONTEXT_TEMPLATE,
            &HashMap::from([("context", context)]),
        )?);
    }

    if !user_message.is_empty() {
        sections.push(render_template(
            QUESTION_TEMPLATE,
            &HashMap::from([("question", user_message)]),
        )?);
    }

    sections.push(RESPONSE_MARKER.to_string());

    tracing::debug!("Assembled prompt with {} sections", sections.len());

    Ok(sections.join("\n\n").trim().to_string())
}
