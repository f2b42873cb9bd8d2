//! Message translation: plain string in, string out

use std::collections::HashMap;
use std::rc::Rc;

pub trait Translator {
    fn translate(&self, text: &str) -> String;

    /// Translate, then substitute `{0}`, `{1}`, ... with `args`.
    fn format(&self, text: &str, args: &[&str]) -> String {
        let mut out = self.translate(text);
        for (i, arg) in args.iter().enumerate() {
            out = out.replace(&format!("{{{}}}", i), arg);
        }
        out
    }
}

pub type SharedTranslator = Rc<dyn Translator>;

/// Returns every message unchanged.
#[derive(Clone, Copy, Default)]
pub struct Untranslated;

impl Translator for Untranslated {
    fn translate(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Lookup table loaded from the boot payload; misses fall through.
#[derive(Clone, Default)]
pub struct Dictionary {
    messages: HashMap<String, String>,
}

impl Dictionary {
    pub fn new(messages: HashMap<String, String>) -> Self {
        Self { messages }
    }
}

impl Translator for Dictionary {
    fn translate(&self, text: &str) -> String {
        self.messages
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string())
    }
}
