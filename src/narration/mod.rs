mod command;

use serde::{Deserialize, Serialize};

pub use command::CommandNarrator;

/// Accent tags offered in the menu. Narrators map these to their own voices.
pub const ACCENTS: [&str; 3] = ["en-US", "en-GB", "en-IN"];

#[derive(Clone, Debug, PartialEq)]
pub struct NarrationRequest {
    pub id: u64,
    pub text: String,
    pub accent: String,
    pub speed: f32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NarrationEvent {
    Started,
    Finished,
    Failed(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NarrationSignal {
    /// Id of the request this signal belongs to.
    pub id: u64,
    pub event: NarrationEvent,
}

pub type SignalSink = Box<dyn Fn(NarrationSignal) + Send + 'static>;

/// Speaks text aloud. Each request ends in exactly one `Finished` or `Failed`
/// unless it is cancelled first; `Started` precedes `Finished`.
pub trait Narrator: Send {
    fn narrate(&mut self, request: NarrationRequest, sink: SignalSink);
    fn cancel(&mut self);
    fn name(&self) -> &str;
}

/// Muted play. Every request finishes immediately.
#[derive(Debug, Default)]
pub struct SilentNarrator;

impl Narrator for SilentNarrator {
    fn narrate(&mut self, request: NarrationRequest, sink: SignalSink) {
        sink(NarrationSignal {
            id: request.id,
            event: NarrationEvent::Started,
        });
        sink(NarrationSignal {
            id: request.id,
            event: NarrationEvent::Finished,
        });
    }

    fn cancel(&mut self) {}

    fn name(&self) -> &str {
        "silent"
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarratorKind {
    #[default]
    Auto,
    Espeak,
    Say,
    None,
}

/// Build the configured narrator. `Auto` picks whichever speech program is
/// on the `PATH`, falling back to silence.
pub fn build(kind: NarratorKind, program: Option<&str>) -> Box<dyn Narrator> {
    let narrator = match kind {
        NarratorKind::None => None,
        NarratorKind::Espeak => Some(CommandNarrator::espeak(program)),
        NarratorKind::Say => Some(CommandNarrator::say(program)),
        NarratorKind::Auto => CommandNarrator::detect(),
    };
    match narrator {
        Some(narrator) => {
            tracing::info!(program = narrator.name(), "narration enabled");
            Box::new(narrator)
        }
        None => {
            if kind == NarratorKind::Auto {
                tracing::warn!("no speech program found, narration muted");
            }
            Box::new(SilentNarrator)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn silent_narrator_starts_and_finishes() {
        let (tx, rx) = mpsc::channel();
        let mut narrator = SilentNarrator;
        narrator.narrate(
            NarrationRequest {
                id: 4,
                text: "hello".into(),
                accent: "en-US".into(),
                speed: 1.0,
            },
            Box::new(move |signal| {
                let _ = tx.send(signal);
            }),
        );
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                NarrationSignal { id: 4, event: NarrationEvent::Started },
                NarrationSignal { id: 4, event: NarrationEvent::Finished },
            ]
        );
    }

    #[test]
    fn none_builds_silent_narrator() {
        assert_eq!(build(NarratorKind::None, None).name(), "silent");
    }

    #[test]
    fn narrator_kind_uses_lowercase_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            narrator: NarratorKind,
        }
        let parsed: Wrapper = toml::from_str("narrator = \"espeak\"").unwrap();
        assert_eq!(parsed.narrator, NarratorKind::Espeak);
        let parsed: Wrapper = toml::from_str("narrator = \"none\"").unwrap();
        assert_eq!(parsed.narrator, NarratorKind::None);
    }
}
