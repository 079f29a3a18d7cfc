//! The chat-style job request wizard.
//!
//! The wizard asks a fixed sequence of questions and accumulates the answers into a
//! [`JobRequest`]. It is a pure state machine: [`WizardState::reduce`] takes the current state and
//! one [`WizardAction`] and returns a [`Transition`]. Nothing here touches the network; the caller
//! relays the request when the outcome is [`Outcome::Submit`].
//!
//! The state round-trips through the browser as JSON (a hidden form field), so every request
//! carries the whole conversation and the server keeps nothing between posts.
//!
//! ```text
//!   jobType ─► description ─► urgency ─► budget ─► images ─► name ─► email
//!        ─► phone ─► address ─► postalCode ─► city ─► Submit(JobRequest)
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::api::models::job_requests::JobRequest;
use crate::attachments::Attachment;
use crate::i18n::Messages;
use crate::validation::{is_blank, is_valid_dutch_phone, is_valid_email, is_valid_postal_code};

/// How a question is answered, which also decides how the answer is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Text,
    TextArea,
    Select,
    Image,
    Email,
    Tel,
}

impl QuestionKind {
    /// Whether pressing Enter in the input should move to the next question.
    ///
    /// Multi-line areas need Enter for new lines and dropdowns use it to open.
    pub fn enter_submits(&self) -> bool {
        !matches!(self, QuestionKind::TextArea | QuestionKind::Select)
    }
}

/// The [`JobRequest`] field a question fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnswerKey {
    JobType,
    Description,
    Urgency,
    Budget,
    Images,
    Name,
    Email,
    Phone,
    Address,
    PostalCode,
    City,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub key: AnswerKey,
    pub kind: QuestionKind,
    /// Translation key of the question text
    pub prompt: &'static str,
    pub placeholder: Option<&'static str>,
}

impl Question {
    const fn new(key: AnswerKey, kind: QuestionKind, prompt: &'static str, placeholder: Option<&'static str>) -> Self {
        Self {
            key,
            kind,
            prompt,
            placeholder,
        }
    }
}

pub static QUESTIONS: [Question; 11] = [
    Question::new(
        AnswerKey::JobType,
        QuestionKind::Text,
        "form.questions.jobType",
        Some("form.placeholders.jobType"),
    ),
    Question::new(
        AnswerKey::Description,
        QuestionKind::TextArea,
        "form.questions.description",
        Some("form.placeholders.description"),
    ),
    Question::new(
        AnswerKey::Urgency,
        QuestionKind::Select,
        "form.questions.urgency",
        Some("form.urgencyOptions.placeholder"),
    ),
    Question::new(
        AnswerKey::Budget,
        QuestionKind::Text,
        "form.questions.budget",
        Some("form.placeholders.budget"),
    ),
    Question::new(AnswerKey::Images, QuestionKind::Image, "form.questions.images", None),
    Question::new(AnswerKey::Name, QuestionKind::Text, "contactInfo.name", None),
    Question::new(AnswerKey::Email, QuestionKind::Email, "contactInfo.email", None),
    Question::new(AnswerKey::Phone, QuestionKind::Tel, "contactInfo.phone", None),
    Question::new(AnswerKey::Address, QuestionKind::Text, "contactInfo.address", None),
    Question::new(
        AnswerKey::PostalCode,
        QuestionKind::Text,
        "contactInfo.postalCode",
        Some("contactInfo.postalCodePlaceholder"),
    ),
    Question::new(AnswerKey::City, QuestionKind::Text, "contactInfo.city", None),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Urgency::Low, Urgency::Medium, Urgency::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            Urgency::Low => "form.urgencyOptions.low",
            Urgency::Medium => "form.urgencyOptions.medium",
            Urgency::High => "form.urgencyOptions.high",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Urgency::ALL.into_iter().find(|urgency| urgency.as_str() == s.trim()).ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Bot,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub content: String,
    /// File names of the images sent with this message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

impl ChatMessage {
    fn bot(content: String) -> Self {
        Self {
            speaker: Speaker::Bot,
            content,
            images: Vec::new(),
        }
    }

    fn user(content: String) -> Self {
        Self {
            speaker: Speaker::User,
            content,
            images: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    /// Index into [`QUESTIONS`]; equal to its length once the wizard is finished
    pub step: usize,
    pub transcript: Vec<ChatMessage>,
    /// Unsubmitted answer to the active question
    pub input: String,
    pub answers: JobRequest,
    /// Images chosen on the image step, already inlined
    pub pending_images: Vec<Attachment>,
    /// Translated validation message for the last rejected answer
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardAction {
    Input(String),
    AddImages(Vec<Attachment>),
    RemoveImage(usize),
    Next,
    SkipImages,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Pending,
    /// All questions answered; the request is ready to relay
    Submit(JobRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: WizardState,
    pub outcome: Outcome,
}

impl Transition {
    fn pending(state: WizardState) -> Self {
        Self {
            state,
            outcome: Outcome::Pending,
        }
    }
}

impl WizardState {
    pub fn new(messages: &Messages<'_>) -> Self {
        Self {
            step: 0,
            transcript: vec![
                ChatMessage::bot(messages.get("form.welcome")),
                ChatMessage::bot(messages.get(QUESTIONS[0].prompt)),
            ],
            input: String::new(),
            answers: JobRequest::default(),
            pending_images: Vec::new(),
            error: None,
        }
    }

    /// The question being asked, or `None` once every question is answered.
    pub fn question(&self) -> Option<&'static Question> {
        QUESTIONS.get(self.step)
    }

    pub fn is_finished(&self) -> bool {
        self.step >= QUESTIONS.len()
    }

    pub fn is_last_question(&self) -> bool {
        self.step.checked_add(1) == Some(QUESTIONS.len())
    }

    /// Apply one action. Every action on every state yields a state; on a finished wizard all
    /// actions are no-ops.
    pub fn reduce(mut self, action: WizardAction, messages: &Messages<'_>) -> Transition {
        let Some(question) = self.question() else {
            return Transition::pending(self);
        };

        match action {
            WizardAction::Input(text) => {
                self.input = text;
                Transition::pending(self)
            }
            WizardAction::AddImages(images) => {
                if question.kind == QuestionKind::Image {
                    self.pending_images.extend(images);
                    self.error = None;
                }
                Transition::pending(self)
            }
            WizardAction::RemoveImage(index) => {
                if index < self.pending_images.len() {
                    self.pending_images.remove(index);
                }
                Transition::pending(self)
            }
            WizardAction::Next => self.next(question, messages),
            WizardAction::SkipImages => {
                if question.kind != QuestionKind::Image {
                    return Transition::pending(self);
                }
                self.pending_images.clear();
                self.answers.images = Vec::new();
                self.transcript.push(ChatMessage::user(messages.get("noImages")));
                self.advance(messages)
            }
            WizardAction::Reset => Transition::pending(WizardState::new(messages)),
        }
    }

    fn next(mut self, question: &Question, messages: &Messages<'_>) -> Transition {
        if let Some(error_key) = rejection(question, &self.input) {
            self.error = Some(messages.get(error_key));
            return Transition::pending(self);
        }

        let answer = self.input.trim().to_string();
        let reply = match question.kind {
            QuestionKind::Image => {
                let images = std::mem::take(&mut self.pending_images);
                let reply = if images.is_empty() {
                    ChatMessage::user(messages.get("noImages"))
                } else {
                    ChatMessage {
                        speaker: Speaker::User,
                        content: format!("{} {}", images.len(), messages.get("form.imageUpload.added")),
                        images: images.iter().map(|image| image.name.clone()).collect(),
                    }
                };
                self.answers.images = images;
                reply
            }
            QuestionKind::Select => {
                let label = answer
                    .parse::<Urgency>()
                    .map(|urgency| messages.get(urgency.label_key()))
                    .unwrap_or_else(|_| answer.clone());
                self.record(question.key, answer);
                ChatMessage::user(label)
            }
            _ => {
                self.record(question.key, answer.clone());
                ChatMessage::user(answer)
            }
        };
        self.transcript.push(reply);

        self.advance(messages)
    }

    fn advance(mut self, messages: &Messages<'_>) -> Transition {
        self.input.clear();
        self.error = None;

        if self.is_last_question() {
            let request = self.answers.clone();
            return Transition {
                state: self,
                outcome: Outcome::Submit(request),
            };
        }

        self.step += 1;
        if let Some(question) = self.question() {
            self.transcript.push(ChatMessage::bot(messages.get(question.prompt)));
        }
        Transition::pending(self)
    }

    fn record(&mut self, key: AnswerKey, value: String) {
        let answers = &mut self.answers;
        let slot = match key {
            AnswerKey::JobType => &mut answers.job_type,
            AnswerKey::Description => &mut answers.description,
            AnswerKey::Urgency => &mut answers.urgency,
            AnswerKey::Budget => &mut answers.budget,
            AnswerKey::Name => &mut answers.name,
            AnswerKey::Email => &mut answers.email,
            AnswerKey::Phone => &mut answers.phone,
            AnswerKey::Address => &mut answers.address,
            AnswerKey::PostalCode => &mut answers.postal_code,
            AnswerKey::City => &mut answers.city,
            AnswerKey::Images => return,
        };
        *slot = value;
    }
}

/// Translation key of the validation message for `input`, or `None` when it is acceptable.
fn rejection(question: &Question, input: &str) -> Option<&'static str> {
    if question.kind == QuestionKind::Image {
        return None;
    }
    if is_blank(input) {
        return Some("validation.required");
    }

    let valid = match question.kind {
        QuestionKind::Email => is_valid_email(input.trim()),
        QuestionKind::Tel => is_valid_dutch_phone(input),
        QuestionKind::Select => input.parse::<Urgency>().is_ok(),
        _ if question.key == AnswerKey::PostalCode => is_valid_postal_code(input),
        _ => true,
    };

    if valid {
        return None;
    }

    Some(match question.kind {
        QuestionKind::Email => "validation.email",
        QuestionKind::Tel => "validation.phone",
        QuestionKind::Select => "validation.urgency",
        _ => "validation.postalCode",
    })
}
