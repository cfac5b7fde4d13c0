use std::sync::Arc;

use iced::keyboard;
use iced::widget::text_editor;
use iced::{Element, Subscription, Task, Theme};

use crate::client::{self, ReviewError};
use crate::config::Config;
use crate::review::{Language, ReviewResult};
use crate::telemetry::{FailureSink, TracingSink};

use super::ui;

#[derive(Debug, Clone)]
pub enum Message {
    EditorAction(text_editor::Action),
    LanguageSelected(Language),
    SubmitPressed,
    ReviewCompleted {
        request_id: u64,
        outcome: Result<ReviewResult, String>,
    },
    HoverIssue(usize),
    ClearHoverIssue,
    OpenSettings,
    CloseSettings,
    TempBackendUrlChanged(String),
    SaveSettings,
}

pub struct State {
    pub(super) editor: text_editor::Content,
    pub(super) language: Language,
    /// Snapshot of the code at the moment of the last submission; markers are
    /// anchored to this text, and editing past it detaches them.
    pub(super) reviewed_code: String,
    pub(super) result: Option<ReviewResult>,
    pub(super) error: Option<String>,
    pub(super) is_loading: bool,
    pub(super) current_request_id: Option<u64>,
    pub(super) hovered_issue: Option<usize>,
    pub(super) config: Config,
    pub(super) show_settings: bool,
    pub(super) temp_backend_url: String,
    pub(super) telemetry: Arc<dyn FailureSink>,
}

impl State {
    pub(super) fn with_config(config: Config, telemetry: Arc<dyn FailureSink>) -> Self {
        Self {
            editor: text_editor::Content::new(),
            language: config.language,
            reviewed_code: String::new(),
            result: None,
            error: None,
            is_loading: false,
            current_request_id: None,
            hovered_issue: None,
            temp_backend_url: config.backend_url.clone(),
            config,
            show_settings: false,
            telemetry,
        }
    }
}

pub fn new() -> (State, Task<Message>) {
    let config = Config::load();
    tracing::debug!(backend_url = %config.backend_url, "app initialized");

    (
        State::with_config(config, Arc::new(TracingSink)),
        Task::none(),
    )
}

pub fn update(state: &mut State, message: Message) -> Task<Message> {
    match message {
        Message::EditorAction(action) => {
            state.editor.perform(action);
            Task::none()
        }
        Message::LanguageSelected(language) => {
            state.language = language;
            state.config.language = language;
            state.config.save();
            Task::none()
        }
        Message::SubmitPressed => submit(state),
        Message::ReviewCompleted {
            request_id,
            outcome,
        } => {
            if state.current_request_id != Some(request_id) {
                tracing::debug!(request_id, "discarding stale review completion");
                return Task::none();
            }

            state.is_loading = false;
            state.current_request_id = None;

            match outcome {
                Ok(result) => {
                    state.error = None;
                    state.hovered_issue = None;
                    state.result = Some(result);
                }
                Err(message) => {
                    state.error = Some(message);
                }
            }

            Task::none()
        }
        Message::HoverIssue(index) => {
            state.hovered_issue = Some(index);
            Task::none()
        }
        Message::ClearHoverIssue => {
            state.hovered_issue = None;
            Task::none()
        }
        Message::OpenSettings => {
            state.temp_backend_url = state.config.backend_url.clone();
            state.show_settings = true;
            Task::none()
        }
        Message::CloseSettings => {
            state.show_settings = false;
            Task::none()
        }
        Message::TempBackendUrlChanged(url) => {
            state.temp_backend_url = url;
            Task::none()
        }
        Message::SaveSettings => {
            let url = state.temp_backend_url.trim().trim_end_matches('/');
            if !url.is_empty() {
                state.config.backend_url = url.to_string();
            }
            state.config.save();
            state.show_settings = false;
            Task::none()
        }
    }
}

fn submit(state: &mut State) -> Task<Message> {
    if state.is_loading {
        return Task::none();
    }

    let code = state.editor.text();
    if code.trim().is_empty() {
        state.error = Some(ReviewError::EmptyCode.to_string());
        return Task::none();
    }

    let request_id = client::next_request_id();
    state.is_loading = true;
    state.current_request_id = Some(request_id);
    state.error = None;
    state.hovered_issue = None;
    state.reviewed_code = code.clone();

    let base_url = state.config.backend_url.clone();
    let language = state.language;
    let telemetry = Arc::clone(&state.telemetry);

    Task::perform(
        client::submit_review(base_url, code, language, request_id, telemetry),
        move |outcome| Message::ReviewCompleted {
            request_id,
            outcome: outcome.map_err(|e| e.to_string()),
        },
    )
}

pub fn view(state: &State) -> Element<'_, Message> {
    ui::view(state)
}

pub fn theme(_state: &State) -> Theme {
    Theme::Dark
}

pub fn settings() -> iced::Settings {
    iced::Settings::default()
}

pub fn subscription(_state: &State) -> Subscription<Message> {
    keyboard::listen().filter_map(|event| match event {
        keyboard::Event::KeyPressed { key, modifiers, .. } => match key.as_ref() {
            keyboard::Key::Named(keyboard::key::Named::Enter) if modifiers.command() => {
                Some(Message::SubmitPressed)
            }
            _ => None,
        },
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{Issue, Severity};

    struct NullSink;

    impl FailureSink for NullSink {
        fn capture(
            &self,
            _error: &ReviewError,
            _tags: &[(&'static str, String)],
            _extra: &[(&'static str, String)],
        ) {
        }
    }

    fn test_state() -> State {
        State::with_config(Config::default(), Arc::new(NullSink))
    }

    fn sample_result() -> ReviewResult {
        ReviewResult {
            issues: vec![Issue {
                line: 1,
                severity: Severity::Info,
                message: "add docstring".to_string(),
                suggestion: None,
            }],
            summary: Some("ok".to_string()),
            score: Some(90),
        }
    }

    #[test]
    fn empty_submission_is_rejected_locally() {
        let mut state = test_state();

        let _ = update(&mut state, Message::SubmitPressed);

        assert_eq!(
            state.error.as_deref(),
            Some("Please enter some code to review")
        );
        assert!(!state.is_loading);
        assert!(state.current_request_id.is_none());
    }

    #[test]
    fn submission_enters_loading_with_a_request_id() {
        let mut state = test_state();
        state.editor = text_editor::Content::with_text("def f():\n    pass");

        let _ = update(&mut state, Message::SubmitPressed);

        assert!(state.is_loading);
        assert!(state.current_request_id.is_some());
        assert!(state.error.is_none());
        assert_eq!(state.reviewed_code, state.editor.text());
    }

    #[test]
    fn successful_completion_updates_the_result() {
        let mut state = test_state();
        state.is_loading = true;
        state.current_request_id = Some(7);

        let _ = update(
            &mut state,
            Message::ReviewCompleted {
                request_id: 7,
                outcome: Ok(sample_result()),
            },
        );

        assert!(!state.is_loading);
        assert!(state.current_request_id.is_none());
        let result = state.result.as_ref().expect("result");
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.score, Some(90));
    }

    #[test]
    fn failed_completion_keeps_the_previous_result() {
        let mut state = test_state();
        state.result = Some(sample_result());
        state.is_loading = true;
        state.current_request_id = Some(3);

        let _ = update(
            &mut state,
            Message::ReviewCompleted {
                request_id: 3,
                outcome: Err("AI service unavailable".to_string()),
            },
        );

        assert!(!state.is_loading);
        assert_eq!(state.error.as_deref(), Some("AI service unavailable"));
        assert!(state.result.is_some());
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut state = test_state();
        state.is_loading = true;
        state.current_request_id = Some(5);

        let _ = update(
            &mut state,
            Message::ReviewCompleted {
                request_id: 4,
                outcome: Ok(sample_result()),
            },
        );

        // Still waiting for request 5
        assert!(state.is_loading);
        assert_eq!(state.current_request_id, Some(5));
        assert!(state.result.is_none());
    }

    #[test]
    fn resubmit_while_loading_is_ignored() {
        let mut state = test_state();
        state.editor = text_editor::Content::with_text("x = 1");

        let _ = update(&mut state, Message::SubmitPressed);
        let first = state.current_request_id;

        let _ = update(&mut state, Message::SubmitPressed);

        assert_eq!(state.current_request_id, first);
    }

    #[test]
    fn hover_tracking() {
        let mut state = test_state();

        let _ = update(&mut state, Message::HoverIssue(2));
        assert_eq!(state.hovered_issue, Some(2));

        let _ = update(&mut state, Message::ClearHoverIssue);
        assert!(state.hovered_issue.is_none());
    }

    #[test]
    fn settings_url_is_trimmed_and_kept_on_save() {
        let mut state = test_state();

        let _ = update(&mut state, Message::OpenSettings);
        let _ = update(
            &mut state,
            Message::TempBackendUrlChanged("  http://10.0.0.2:9000/  ".to_string()),
        );
        let _ = update(&mut state, Message::SaveSettings);

        assert!(!state.show_settings);
        assert_eq!(state.config.backend_url, "http://10.0.0.2:9000");
    }
}
