//! Rule-based responder behind the chat endpoint.
//!
//! Each message is classified by [`intent::detect_intent`] and routed to one
//! of the tools:
//!
//! - [`math`]: arithmetic expressions (`12/4+3`, `sqrt(2)`)
//! - [`algebra`]: polynomial equations and linear systems (`solve x+5=10`)
//! - [`weather`]: dew point, heat index and wind chill (`weather 32 65 8`)
//! - [`faq`]: canned answers loaded from a JSON file
//!
//! Messages that match nothing fall through FAQ, math and algebra in turn
//! before giving up.
//!
//! # Example
//!
//! ```rust
//! use helpmate::agent::{Agent, AgentReply};
//!
//! let agent = Agent::default();
//! assert_eq!(
//!     agent.respond("12/4+3"),
//!     AgentReply::Text("The answer is 6.0".to_string())
//! );
//! ```

pub mod algebra;
pub mod expr;
pub mod faq;
pub mod intent;
pub mod math;
pub mod weather;

use serde_json::{Map, Value};

pub use faq::{FaqEntry, FaqStore};
pub use intent::{Intent, detect_intent};

const HELP_TEXT: &str = "Supported: math expressions (e.g. 12/4+3), algebra (solve x+5=10), \
weather calculations (type 'weather' and then provide numbers), and FAQ questions.";

const EMPTY_PROMPT: &str = "Please enter a question.";

const NOT_UNDERSTOOD: &str = "Sorry, I didn't understand that. Type 'help' for examples.";

/// A reply produced by the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentReply {
    /// Plain text answer.
    Text(String),
    /// Labelled values, in display order.
    Fields(Vec<(String, String)>),
}

impl AgentReply {
    /// JSON form used as the `response` member of the chat endpoint body.
    ///
    /// Fields become an object whose keys keep their order.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Fields(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

/// The chat agent.
#[derive(Debug, Clone, Default)]
pub struct Agent {
    faqs: FaqStore,
}

impl Agent {
    pub fn new(faqs: FaqStore) -> Self {
        Self { faqs }
    }

    /// Number of FAQ entries available to the agent.
    pub fn faq_count(&self) -> usize {
        self.faqs.len()
    }

    /// Produce a reply for one user message.
    pub fn respond(&self, input: &str) -> AgentReply {
        let input = input.trim();
        if input.is_empty() {
            return AgentReply::Text(EMPTY_PROMPT.to_string());
        }

        let intent = detect_intent(input);
        tracing::debug!(intent = ?intent, "Intent detected");

        match intent {
            Intent::Help => AgentReply::Text(HELP_TEXT.to_string()),
            Intent::Math => AgentReply::Text(match math::evaluate(input) {
                Ok(value) => format!("The answer is {}", format_float(value)),
                Err(e) => format!("Could not evaluate expression: {e}"),
            }),
            Intent::Algebra => AgentReply::Text(
                algebra::solve(input).unwrap_or_else(|| NOT_UNDERSTOOD.to_string()),
            ),
            Intent::Weather => match weather::report_from_text(input) {
                Some(report) => AgentReply::Fields(report.fields()),
                None => AgentReply::Text(weather::USAGE.to_string()),
            },
            Intent::Faq | Intent::Unknown => AgentReply::Text(self.fallback(input)),
        }
    }

    fn fallback(&self, input: &str) -> String {
        if let Some(answer) = self.faqs.answer(input) {
            return answer;
        }
        if let Ok(value) = math::evaluate(input) {
            return format!("The answer is {}", format_float(value));
        }
        if let Some(answer) = algebra::solve(input) {
            return answer;
        }
        NOT_UNDERSTOOD.to_string()
    }
}

/// Format a float the way Python's `str(float)` does: shortest round-trip
/// digits, whole numbers keep a trailing `.0`, and magnitudes outside
/// `1e-4..1e16` use a signed two-digit exponent (`1e+20`, `1.5e-07`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "inf" } else { "-inf" };
        return text.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{value:e}");
        let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{mantissa}e{sign}{digits:0>2}");
    }
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Format an equation root: whole numbers without a decimal point, others
/// rounded to ten places.
pub fn format_solution_value(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() < 1e-9 {
        // Avoid printing "-0".
        let rounded = if rounded == 0.0 { 0.0 } else { rounded };
        return format!("{rounded}");
    }
    let trimmed = (value * 1e10).round() / 1e10;
    format!("{trimmed}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(6.0), "6.0");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(1e15), "1000000000000000.0");
    }

    #[test]
    fn test_format_float_exponent_form() {
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1e20), "1e+20");
        assert_eq!(format_float(-2.5e300), "-2.5e+300");
        assert_eq!(format_float(1e-7), "1e-07");
        assert_eq!(format_float(1.5e-5), "1.5e-05");
        assert_eq!(format_float(3e-123), "3e-123");
    }

    #[test]
    fn test_format_solution_value() {
        assert_eq!(format_solution_value(5.0), "5");
        assert_eq!(format_solution_value(-0.0), "0");
        assert_eq!(format_solution_value(2.000_000_000_000_4), "2");
        assert_eq!(format_solution_value(2.5), "2.5");
    }

    #[test]
    fn test_empty_and_help() {
        let agent = Agent::default();
        assert_eq!(agent.respond("   "), AgentReply::Text(EMPTY_PROMPT.into()));
        assert_eq!(agent.respond("help"), AgentReply::Text(HELP_TEXT.into()));
    }

    #[test]
    fn test_math_routes() {
        let agent = Agent::default();
        assert_eq!(agent.respond("12/4+3"), AgentReply::Text("The answer is 6.0".into()));
        assert_eq!(
            agent.respond("1/0"),
            AgentReply::Text("Could not evaluate expression: division by zero".into())
        );
    }

    #[test]
    fn test_weather_reply_is_fields() {
        let agent = Agent::default();
        let AgentReply::Fields(fields) = agent.respond("weather 32 65 8") else {
            panic!("expected fields");
        };
        assert_eq!(fields[0], ("Temperature".to_string(), "32.0°C".to_string()));
        assert_eq!(fields[2], ("Dew Point".to_string(), "24.58°C".to_string()));
        assert_eq!(
            agent.respond("weather please"),
            AgentReply::Text(weather::USAGE.into())
        );
    }

    #[test]
    fn test_fallback_chain() {
        let agent = Agent::new(FaqStore::new(vec![FaqEntry {
            question: "opening times".into(),
            answer: "We never close.".into(),
        }]));
        assert_eq!(agent.faq_count(), 1);
        assert_eq!(
            agent.respond("what are the opening times"),
            AgentReply::Text("FAQ: We never close.".into())
        );
        assert_eq!(
            agent.respond("please solve x = 4"),
            AgentReply::Text("Solution: [4]".into())
        );
        assert_eq!(agent.respond("hello"), AgentReply::Text(NOT_UNDERSTOOD.into()));
    }

    #[test]
    fn test_oversized_input_is_an_error_reply() {
        let agent = Agent::default();
        assert_eq!(
            agent.respond(&format!("{}1", "-".repeat(20_000))),
            AgentReply::Text("Could not evaluate expression: expression is too long".into())
        );
        assert_eq!(
            agent.respond("solve ((a+b+c+d)^16)^4 = 0"),
            AgentReply::Text("Error solving algebra: the expression is too large to expand".into())
        );
    }

    #[test]
    fn test_fields_json_keeps_order() {
        let reply = AgentReply::Fields(vec![
            ("zeta".into(), "1".into()),
            ("alpha".into(), "2".into()),
        ]);
        assert_eq!(reply.to_json().to_string(), r#"{"zeta":"1","alpha":"2"}"#);
    }
}
