//! Diagnostics emitted for non-fatal misuse.

use std::io;
use std::sync::Arc;

use latch_core::{LatchConfig, Noun, ToggleRegistry, Verb, VerbOutcome, apply, apply_verb};
use parking_lot::Mutex;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
	fn text(&self) -> String {
		String::from_utf8_lossy(&self.0.lock()).into_owned()
	}
}

impl io::Write for Capture {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.lock().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

fn captured<R>(f: impl FnOnce() -> R) -> (R, String) {
	let capture = Capture::default();
	let writer = capture.clone();
	let subscriber = tracing_subscriber::fmt()
		.with_writer(move || writer.clone())
		.with_ansi(false)
		.with_max_level(tracing::Level::TRACE)
		.finish();
	let result = tracing::subscriber::with_default(subscriber, f);
	(result, capture.text())
}

#[test]
fn verb_on_undefined_reports_no_setter() {
	let (outcome, logs) = captured(|| apply_verb("open", None));
	assert_eq!(outcome.unwrap(), VerbOutcome::NoSetter);
	assert!(logs.contains("No setter"), "{logs}");
	assert!(logs.contains("undefined"), "{logs}");
	assert!(logs.contains("WARN"), "{logs}");
}

#[test]
fn verb_on_read_only_noun_names_it_and_the_polarity() {
	let noun = Noun::read_only("banner", || false);
	let (outcome, logs) = captured(|| apply(Verb::Set(true), Some(&noun)));
	assert_eq!(outcome, VerbOutcome::NoSetter);
	assert!(logs.contains("No setter for banner"), "{logs}");
	assert!(logs.contains("polarity=true"), "{logs}");
	assert!(!noun.is_active());
}

#[test]
fn toggle_without_setter_reports_toggle() {
	let (_, logs) = captured(|| apply(Verb::Toggle, None));
	assert!(logs.contains("polarity=\"toggle\"") || logs.contains("polarity=toggle"), "{logs}");
}

#[test]
fn conflict_names_both_values_and_call_sites() {
	let registry = ToggleRegistry::new(LatchConfig::default());
	let (_, logs) = captured(|| {
		registry.get("ns:drawer", true);
		registry.get("ns:drawer", false);
	});

	let errors: Vec<_> = logs.lines().filter(|l| l.contains("ERROR")).collect();
	assert_eq!(errors.len(), 1, "{logs}");
	let line = errors[0];
	assert!(line.contains("existing=true"), "{line}");
	assert!(line.contains("requested=false"), "{line}");
	assert!(line.contains("first_site="), "{line}");
	assert!(line.contains("tests/diagnostics.rs"), "{line}");
}
