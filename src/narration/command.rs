use std::env;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use super::{NarrationEvent, NarrationRequest, NarrationSignal, Narrator, SignalSink};

const BASE_WORDS_PER_MINUTE: f32 = 175.0;
const MIN_SPEED: f32 = 0.7;
const MAX_SPEED: f32 = 1.3;
const LONG_TEXT_CHARS: usize = 15;
const LONG_TEXT_SLOWDOWN: f32 = 0.9;
const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    Espeak,
    Say,
}

impl Backend {
    fn default_program(self) -> &'static str {
        match self {
            Backend::Espeak => "espeak-ng",
            Backend::Say => "say",
        }
    }

    fn voice(self, accent: &str) -> &'static str {
        match (self, accent) {
            (Backend::Espeak, "en-GB") => "en-gb",
            (Backend::Espeak, "en-IN") => "en",
            (Backend::Espeak, _) => "en-us",
            (Backend::Say, "en-GB") => "Daniel",
            (Backend::Say, "en-IN") => "Rishi",
            (Backend::Say, _) => "Samantha",
        }
    }

    fn rate_flag(self) -> &'static str {
        match self {
            Backend::Espeak => "-s",
            Backend::Say => "-r",
        }
    }
}

/// Drives a system text-to-speech program, one child process per request.
pub struct CommandNarrator {
    backend: Backend,
    program: String,
    cancelled: Option<Arc<AtomicBool>>,
}

impl CommandNarrator {
    pub fn espeak(program: Option<&str>) -> Self {
        Self::new(Backend::Espeak, program)
    }

    pub fn say(program: Option<&str>) -> Self {
        Self::new(Backend::Say, program)
    }

    fn new(backend: Backend, program: Option<&str>) -> Self {
        Self {
            backend,
            program: program.unwrap_or(backend.default_program()).to_string(),
            cancelled: None,
        }
    }

    /// First speech program found on the `PATH`.
    pub fn detect() -> Option<Self> {
        [
            (Backend::Espeak, "espeak-ng"),
            (Backend::Espeak, "espeak"),
            (Backend::Say, "say"),
        ]
        .into_iter()
        .find(|(_, program)| on_path(program))
        .map(|(backend, program)| Self::new(backend, Some(program)))
    }

    fn args(&self, request: &NarrationRequest) -> Vec<String> {
        let text = clean_text(&request.text);
        let speed = effective_speed(&text, request.speed);
        vec![
            "-v".to_string(),
            self.backend.voice(&request.accent).to_string(),
            self.backend.rate_flag().to_string(),
            words_per_minute(speed).to_string(),
            text,
        ]
    }
}

impl Narrator for CommandNarrator {
    fn narrate(&mut self, request: NarrationRequest, sink: SignalSink) {
        self.cancel();

        let id = request.id;
        let child = Command::new(&self.program)
            .args(self.args(&request))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let child = match child {
            Ok(child) => child,
            Err(err) => {
                tracing::error!(program = %self.program, %err, "failed to start speech program");
                sink(NarrationSignal {
                    id,
                    event: NarrationEvent::Failed(format!("{}: {err}", self.program)),
                });
                return;
            }
        };

        tracing::debug!(request = id, program = %self.program, "narrating");
        sink(NarrationSignal {
            id,
            event: NarrationEvent::Started,
        });

        let cancelled = Arc::new(AtomicBool::new(false));
        self.cancelled = Some(Arc::clone(&cancelled));
        let program = self.program.clone();
        thread::spawn(move || watch(child, id, &program, &cancelled, sink));
    }

    fn cancel(&mut self) {
        if let Some(flag) = self.cancelled.take() {
            flag.store(true, Ordering::Relaxed);
        }
    }

    fn name(&self) -> &str {
        &self.program
    }
}

impl Drop for CommandNarrator {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn watch(mut child: Child, id: u64, program: &str, cancelled: &AtomicBool, sink: SignalSink) {
    loop {
        if cancelled.load(Ordering::Relaxed) {
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!(request = id, "narration cancelled");
            return;
        }
        let event = match child.try_wait() {
            Ok(None) => {
                thread::sleep(POLL_INTERVAL);
                continue;
            }
            Ok(Some(status)) if status.success() => NarrationEvent::Finished,
            Ok(Some(status)) => {
                tracing::warn!(request = id, %status, "speech program failed");
                NarrationEvent::Failed(format!("{program} exited with {status}"))
            }
            Err(err) => NarrationEvent::Failed(format!("{program}: {err}")),
        };
        sink(NarrationSignal { id, event });
        return;
    }
}

/// Trim and collapse whitespace runs.
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clamp to the range the speech programs stay intelligible in, and slow
/// long texts down a little more.
pub fn effective_speed(text: &str, speed: f32) -> f32 {
    let speed = if speed.is_finite() { speed } else { 1.0 };
    let clamped = speed.clamp(MIN_SPEED, MAX_SPEED);
    if text.chars().count() > LONG_TEXT_CHARS {
        clamped * LONG_TEXT_SLOWDOWN
    } else {
        clamped
    }
}

fn words_per_minute(speed: f32) -> u32 {
    (BASE_WORDS_PER_MINUTE * speed).round() as u32
}

fn on_path(program: &str) -> bool {
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
