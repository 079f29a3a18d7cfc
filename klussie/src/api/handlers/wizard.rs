//! HTTP handlers for the job request wizard at `/gpt`.
//!
//! The whole wizard state travels in a hidden `state` field. Each post carries that state, the
//! answer typed so far, any newly chosen `images`, and the pressed button as `action`:
//! `next`, `skip`, `upload`, `reset` or `remove:<index>`.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Response,
};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::pages::render_page;
use crate::attachments::{self, UploadPolicy};
use crate::errors::Result;
use crate::forms::FormData;
use crate::i18n::{Locale, Messages};
use crate::wizard::{AnswerKey, ChatMessage, Outcome, QUESTIONS, QuestionKind, Urgency, WizardAction, WizardState};
use crate::AppState;

const PATH: &str = "/gpt";

#[derive(Debug, Serialize)]
struct ChoiceView {
    value: &'static str,
    label: String,
}

#[derive(Debug, Serialize)]
struct QuestionView {
    key: AnswerKey,
    kind: QuestionKind,
    prompt: String,
    placeholder: Option<String>,
    enter_submits: bool,
    options: Vec<ChoiceView>,
}

#[derive(Debug, Serialize)]
struct WizardView<'a> {
    state_json: String,
    transcript: &'a [ChatMessage],
    question: Option<QuestionView>,
    input: &'a str,
    error: Option<&'a str>,
    pending_images: Vec<&'a str>,
    is_last: bool,
}

#[derive(Debug, Serialize)]
struct WizardPage<'a> {
    /// `chat`, `success` or `error`
    view: &'static str,
    wizard: Option<WizardView<'a>>,
    error_message: Option<String>,
}

impl<'a> WizardView<'a> {
    fn new(state: &'a WizardState, messages: &Messages<'_>) -> Result<Self> {
        let question = state.question().map(|question| QuestionView {
            key: question.key,
            kind: question.kind,
            prompt: messages.get(question.prompt),
            placeholder: question.placeholder.map(|key| messages.get(key)),
            enter_submits: question.kind.enter_submits(),
            options: match question.kind {
                QuestionKind::Select => Urgency::ALL
                    .into_iter()
                    .map(|urgency| ChoiceView {
                        value: urgency.as_str(),
                        label: messages.get(urgency.label_key()),
                    })
                    .collect(),
                _ => Vec::new(),
            },
        });

        Ok(Self {
            state_json: serde_json::to_string(state).map_err(|e| anyhow::anyhow!("Failed to serialize wizard state: {e}"))?,
            transcript: &state.transcript,
            question,
            input: &state.input,
            error: state.error.as_deref(),
            pending_images: state.pending_images.iter().map(|image| image.name.as_str()).collect(),
            is_last: state.is_last_question(),
        })
    }
}

fn render_chat(state: &AppState, locale: Locale, wizard: &WizardState) -> Result<Response> {
    let messages = state.catalog.messages(locale.0);
    let page = WizardPage {
        view: "chat",
        wizard: Some(WizardView::new(wizard, &messages)?),
        error_message: None,
    };
    render_page(state, locale, StatusCode::OK, "gpt.html", PATH, page)
}

fn render_outcome(state: &AppState, locale: Locale, status: StatusCode, error_message: Option<String>) -> Result<Response> {
    let page = WizardPage {
        view: if error_message.is_some() { "error" } else { "success" },
        wizard: None,
        error_message,
    };
    render_page(state, locale, status, "gpt.html", PATH, page)
}

/// Map the pressed button to a wizard action.
fn parse_action(action: &str) -> Option<WizardAction> {
    match action.trim() {
        "" | "next" => Some(WizardAction::Next),
        "skip" => Some(WizardAction::SkipImages),
        "reset" => Some(WizardAction::Reset),
        "upload" => None,
        other => other
            .strip_prefix("remove:")
            .and_then(|index| index.parse().ok())
            .map(WizardAction::RemoveImage),
    }
}

#[instrument(skip_all)]
pub async fn wizard_page(State(state): State<AppState>, locale: Locale) -> Result<Response> {
    let messages = state.catalog.messages(locale.0);
    render_chat(&state, locale, &WizardState::new(&messages))
}

/// Apply one wizard step. Uploads are applied before the action, so choosing photos and pressing
/// "next" in one post records them.
#[instrument(skip_all)]
pub async fn wizard_step(State(state): State<AppState>, locale: Locale, multipart: Multipart) -> Result<Response> {
    let messages = state.catalog.messages(locale.0);

    let mut form = match FormData::from_multipart(multipart).await {
        Ok(form) => form,
        Err(err) => {
            return render_outcome(&state, locale, err.status_code(), Some(messages.get(err.ui_message_key())));
        }
    };

    let wizard = match serde_json::from_str::<WizardState>(&form.text("state")) {
        Ok(wizard) if wizard.step <= QUESTIONS.len() => wizard,
        Ok(wizard) => {
            debug!(step = wizard.step, "Starting a new wizard, posted step out of range");
            WizardState::new(&messages)
        }
        Err(e) => {
            debug!("Starting a new wizard, posted state unreadable: {}", e);
            WizardState::new(&messages)
        }
    };

    let mut transition = wizard.reduce(WizardAction::Input(form.text("answer")), &messages);

    let uploads = UploadPolicy::from_config(&state.config.uploads).filter(form.take_files("images"));
    if !uploads.is_empty() {
        match attachments::encode_all(uploads).await {
            Ok(images) => transition = transition.state.reduce(WizardAction::AddImages(images), &messages),
            Err(err) => {
                return render_outcome(&state, locale, err.status_code(), Some(messages.get(err.ui_message_key())));
            }
        }
    }

    if let Some(action) = parse_action(&form.text("action")) {
        transition = transition.state.reduce(action, &messages);
    }

    match transition.outcome {
        Outcome::Pending => render_chat(&state, locale, &transition.state),
        Outcome::Submit(request) => match state.relay.submit(&request).await {
            Ok(_) => render_outcome(&state, locale, StatusCode::OK, None),
            Err(err) => {
                warn!(error = %err, "Job request submission failed");
                render_outcome(&state, locale, err.status_code(), Some(messages.get("errors.submitFailed")))
            }
        },
    }
}
