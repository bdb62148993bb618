//! Event rendering for the CLI

use kiln_events::{Event, EventReceiver};

/// Drains the event channel and renders progress lines
pub struct EventHandler {
    json: bool,
}

impl EventHandler {
    /// Create a new handler
    #[must_use]
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Render events until the sending side closes
    pub async fn run(self, mut receiver: EventReceiver) {
        while let Some(event) = receiver.recv().await {
            self.render(&event);
        }
    }

    fn render(&self, event: &Event) {
        if self.json {
            if let Ok(line) = serde_json::to_string(event) {
                println!("{line}");
            }
            return;
        }

        match event {
            Event::OperationStarted { operation } => println!("==> {operation}"),
            Event::OperationCompleted { operation, success } => {
                if *success {
                    println!("    {operation}");
                } else {
                    println!("    {operation} (failed)");
                }
            }
            Event::BuildStepStarted { package, step } => println!("    [{package}] {step}"),
            Event::DependencyResolved { package, version } => {
                println!("    resolved {package}/{version}");
            }
            Event::PatchApplied { patch } => println!("    patched {patch}"),
            Event::ArtifactsCopied { pattern, count } => {
                println!("    copied {count} file(s) for {pattern}");
            }
            Event::Warning { message } => eprintln!("warning: {message}"),
            Event::DebugLog { message } => tracing::debug!("{message}"),
        }
    }
}
