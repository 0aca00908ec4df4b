//! Placeholder substitution
//!
//! The template carries literal identifiers ("Witty Audio", "ExamplePlugin", ...)
//! instead of {{PLACEHOLDER}} markers, so replacement is plain substring
//! matching. All tokens are matched in a single left-to-right pass: text that
//! was already replaced is never scanned again.

use anyhow::Result;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::identity::{Field, PluginIdentity};

/// Literal tokens present in the template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placeholders {
    pub vendor_name: String,
    pub vendor_id: String,
    pub plugin_name: String,
    pub plugin_id: String,
    pub bundle_id: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            vendor_name: "Witty Audio".to_string(),
            vendor_id: "Wity".to_string(),
            plugin_name: "ExamplePlugin".to_string(),
            plugin_id: "WiDi".to_string(),
            bundle_id: "com.wittyaudio".to_string(),
        }
    }
}

impl Placeholders {
    /// Token standing in for a field
    pub fn token(&self, field: Field) -> &str {
        match field {
            Field::VendorName => &self.vendor_name,
            Field::VendorId => &self.vendor_id,
            Field::PluginName => &self.plugin_name,
            Field::PluginId => &self.plugin_id,
            Field::BundleId => &self.bundle_id,
        }
    }
}

/// How replacement values are written into a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// Values go in verbatim
    Source,
    /// Values are escaped as JSON string content
    Json,
}

/// Result of rewriting one file's text
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub text: String,
    /// Replacements made per field
    pub counts: Vec<(Field, usize)>,
    /// Boolean flags switched from false to true
    pub flags_set: usize,
}

impl Rewrite {
    /// Total number of edits made
    pub fn replacements(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum::<usize>() + self.flags_set
    }

    /// Fields whose token did not occur in the text
    pub fn unmatched(&self) -> impl Iterator<Item = Field> + '_ {
        self.counts
            .iter()
            .filter(|(_, n)| *n == 0)
            .map(|(field, _)| *field)
    }
}

/// Substitution set: placeholder tokens mapped to the user's values
#[derive(Debug, Clone)]
pub struct Substitutions {
    /// token -> (field, value)
    map: HashMap<String, (Field, String)>,
    /// Alternation of all non-empty tokens, longest first
    matcher: Option<Regex>,
    plugin_name: (String, String),
    is_synth: bool,
    receives_midi: bool,
    synth_flag: Regex,
    midi_flag: Regex,
}

impl Substitutions {
    /// Build the substitution set for an identity
    pub fn new(identity: &PluginIdentity, placeholders: &Placeholders) -> Result<Self> {
        let mut map = HashMap::new();
        for field in Field::ALL {
            let token = placeholders.token(field);
            if token.is_empty() {
                continue;
            }
            // First field wins when two placeholders share a token
            map.entry(token.to_string())
                .or_insert_with(|| (field, identity.value(field).to_string()));
        }

        let mut tokens: Vec<&String> = map.keys().collect();
        tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let matcher = if tokens.is_empty() {
            None
        } else {
            let pattern = tokens
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&pattern)?)
        };

        Ok(Self {
            map,
            matcher,
            plugin_name: (
                placeholders.plugin_name.clone(),
                identity.plugin_name.clone(),
            ),
            is_synth: identity.is_synth,
            receives_midi: identity.receives_midi,
            synth_flag: flag_pattern("isSynth")?,
            midi_flag: flag_pattern("receivesMIDI")?,
        })
    }

    /// Replace every placeholder token, then apply the synth and MIDI flags
    pub fn apply(&self, content: &str, syntax: Syntax) -> Result<Rewrite> {
        let mut hits: HashMap<Field, usize> = HashMap::new();

        let mut text = match &self.matcher {
            Some(re) => {
                // Escape up front so the replacer closure stays infallible
                let mut values = HashMap::with_capacity(self.map.len());
                for (token, (field, value)) in &self.map {
                    values.insert(token.as_str(), (*field, escape(value, syntax)?));
                }

                re.replace_all(content, |caps: &Captures| {
                    let token = &caps[0];
                    match values.get(token) {
                        Some((field, value)) => {
                            *hits.entry(*field).or_default() += 1;
                            value.clone()
                        }
                        None => token.to_string(),
                    }
                })
                .into_owned()
            }
            None => content.to_string(),
        };

        let mut flags_set = 0;
        let flags = [
            (self.is_synth, &self.synth_flag),
            (self.receives_midi, &self.midi_flag),
        ];
        for (enabled, re) in flags {
            if enabled {
                flags_set += re.find_iter(&text).count();
                text = re.replace_all(&text, "${1}true").into_owned();
            }
        }

        let counts = Field::ALL
            .iter()
            .filter(|f| self.map.values().any(|(field, _)| field == *f))
            .map(|f| (*f, hits.get(f).copied().unwrap_or(0)))
            .collect();

        Ok(Rewrite {
            text,
            counts,
            flags_set,
        })
    }

    /// Replace only the plugin-name token
    pub fn apply_plugin_name_only(&self, content: &str, syntax: Syntax) -> Result<Rewrite> {
        let (token, value) = &self.plugin_name;
        if token.is_empty() {
            return Ok(Rewrite {
                text: content.to_string(),
                counts: Vec::new(),
                flags_set: 0,
            });
        }

        let count = content.matches(token.as_str()).count();
        let text = content.replace(token.as_str(), &escape(value, syntax)?);

        Ok(Rewrite {
            text,
            counts: vec![(Field::PluginName, count)],
            flags_set: 0,
        })
    }
}

/// Matches `key = false` (D) or `"key": false` (JSON), capturing everything before `false`
fn flag_pattern(key: &str) -> Result<Regex> {
    Ok(Regex::new(&format!(
        r#"(\b{}"?\s*[:=]\s*)false\b"#,
        regex::escape(key)
    ))?)
}

fn escape(value: &str, syntax: Syntax) -> Result<String> {
    match syntax {
        Syntax::Source => Ok(value.to_string()),
        Syntax::Json => {
            let quoted = serde_json::to_string(value)?;
            Ok(quoted[1..quoted.len() - 1].to_string())
        }
    }
}
