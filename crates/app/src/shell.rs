//! Line-oriented hosting shell: renders the current screen and runs the
//! action a typed command maps to.

use std::fmt;

use aula_core::Navigator;
use aula_core::model::{
    GeneratedTextRequest, InputType, PersonalizationQuestion, QuestionCursor, Route, UserType,
};
use services::flows::{self, TEACHER_SETUP_PROMPTS};
use services::{AppServices, CaptureKind, CaptureSession, PersonalizationStore, SessionStore};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument { command: &'static str, what: &'static str },
    InvalidArgument { command: &'static str, raw: String },
    Invalid {
        command: &'static str,
        source: aula_core::Error,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "type a command, or `help`"),
            CommandError::Unknown(word) => write!(f, "unknown command: {word}"),
            CommandError::MissingArgument { command, what } => {
                write!(f, "{command} needs {what}")
            }
            CommandError::InvalidArgument { command, raw } => {
                write!(f, "invalid value for {command}: {raw}")
            }
            CommandError::Invalid { command, source } => write!(f, "{command}: {source}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Invalid { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Show,
    Status,
    Go(Route),
    Back,
    Role(UserType),
    Account(bool),
    Submit,
    Capture,
    Stop,
    Say(String),
    Register,
    Next,
    Previous,
    Answer(String),
    Finish,
    ClearAnswers,
    Level(String),
    Generate {
        slot_no: u32,
        paragraphs: u32,
        topic: Option<String>,
    },
    ClearCache,
    Logout,
}

fn parse_number(
    command: &'static str,
    raw: Option<&str>,
    what: &'static str,
) -> Result<u32, CommandError> {
    let raw = raw.ok_or(CommandError::MissingArgument { command, what })?;
    raw.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        raw: raw.to_string(),
    })
}

fn parse_value<T>(command: &'static str, raw: &str) -> Result<T, CommandError>
where
    T: std::str::FromStr,
    aula_core::Error: From<T::Err>,
{
    raw.parse::<T>().map_err(|err| CommandError::Invalid {
        command,
        source: aula_core::Error::from(err),
    })
}

fn rest(line: &str, word: &str) -> String {
    line[word.len()..].trim().to_string()
}

impl Command {
    /// Parses one input line.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` for blank input, unknown words, or bad arguments.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Err(CommandError::Empty);
        };
        let command = match word.to_ascii_lowercase().as_str() {
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "show" | "look" => Command::Show,
            "status" | "whoami" => Command::Status,
            "back" => Command::Back,
            "go" => {
                let raw = words.next().ok_or(CommandError::MissingArgument {
                    command: "go",
                    what: "a screen name",
                })?;
                Command::Go(parse_value("go", raw)?)
            }
            "role" => {
                let raw = words.next().ok_or(CommandError::MissingArgument {
                    command: "role",
                    what: "student or teacher",
                })?;
                Command::Role(parse_value("role", raw)?)
            }
            "account" => match words.next().map(str::to_ascii_lowercase).as_deref() {
                Some("yes" | "y" | "true") => Command::Account(true),
                Some("no" | "n" | "false") => Command::Account(false),
                Some(other) => {
                    return Err(CommandError::InvalidArgument {
                        command: "account",
                        raw: other.to_string(),
                    });
                }
                None => {
                    return Err(CommandError::MissingArgument {
                        command: "account",
                        what: "yes or no",
                    });
                }
            },
            "submit" => Command::Submit,
            "capture" | "record" => Command::Capture,
            "stop" => Command::Stop,
            "say" => {
                let text = rest(line, word);
                if text.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "say",
                        what: "some words",
                    });
                }
                Command::Say(text)
            }
            "register" => Command::Register,
            "next" => Command::Next,
            "prev" | "previous" => Command::Previous,
            "answer" => {
                let text = rest(line, word);
                if text.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "answer",
                        what: "an answer",
                    });
                }
                Command::Answer(text)
            }
            "finish" => Command::Finish,
            "clear" => Command::ClearAnswers,
            "level" => {
                let id = words.next().ok_or(CommandError::MissingArgument {
                    command: "level",
                    what: "a level id",
                })?;
                Command::Level(id.to_string())
            }
            "generate" => {
                let slot_no = parse_number("generate", words.next(), "a slot number")?;
                let paragraphs = parse_number("generate", words.next(), "a paragraph count")?;
                let topic = words.collect::<Vec<_>>().join(" ");
                Command::Generate {
                    slot_no,
                    paragraphs,
                    topic: (!topic.is_empty()).then_some(topic),
                }
            }
            "refresh" => Command::ClearCache,
            "logout" => Command::Logout,
            _ => return Err(CommandError::Unknown(word.to_string())),
        };
        Ok(command)
    }
}

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

pub const HELP: &str = "\
Commands:
  show | status | help | quit
  go <screen> | back
  role student|teacher       pick a role on the home screen
  account yes|no             choose login or registration
  submit                     send the login form
  capture | stop             start and finish a camera or microphone capture
  say <words>                speak to the voice screens
  register                   finish voice registration
  next | prev | answer <text|option number> | finish | clear
  level <id> | generate <slot> <paragraphs> [topic] | refresh
  logout";

/// Screen state plus the stores the screens act on.
pub struct Shell {
    services: AppServices,
    nav: Navigator,
    session: SessionStore,
    personalization: PersonalizationStore,
    cursor: QuestionCursor,
    recording: Option<CaptureSession>,
    transcript: Option<String>,
    teacher_answers: Vec<String>,
    selected_level: Option<String>,
}

impl Shell {
    /// Rehydrates both stores and opens the entry screen.
    pub async fn start(services: AppServices) -> Self {
        let session = services.load_session().await;
        let personalization = services.load_personalization().await;
        let cursor = QuestionCursor::new(services.questionnaire().len());
        Self {
            services,
            nav: Navigator::new(),
            session,
            personalization,
            cursor,
            recording: None,
            transcript: None,
            teacher_answers: Vec::new(),
            selected_level: None,
        }
    }

    #[must_use]
    pub fn route(&self) -> Route {
        self.nav.current()
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn personalization(&self) -> &PersonalizationStore {
        &self.personalization
    }

    pub async fn execute(&mut self, command: Command) -> Reply {
        let before = self.nav.current();
        debug!(?command, route = %before, "command");
        let message = match command {
            Command::Quit => return Reply::Quit,
            Command::Help => HELP.to_string(),
            Command::Show => String::new(),
            Command::Status => self.status(),
            Command::Go(route) => {
                self.nav.navigate(route);
                String::new()
            }
            Command::Back => {
                if self.nav.go_back() {
                    String::new()
                } else {
                    "Already on the first screen.".to_string()
                }
            }
            Command::Role(role) => self.on_route(&[Route::Home], |shell| {
                flows::select_role(&mut shell.nav, &mut shell.session, role);
                String::new()
            }),
            Command::Account(has_account) => {
                self.on_route(&[Route::StudentAuth, Route::TeacherAuth], |shell| {
                    match flows::choose_account(&mut shell.nav, &mut shell.session, has_account) {
                        Ok(_) => String::new(),
                        Err(err) => err.user_message(),
                    }
                })
            }
            Command::Submit => self.on_route(&[Route::Login], |shell| {
                shell.nav.navigate(Route::Home);
                String::new()
            }),
            Command::Capture => self.start_capture().await,
            Command::Stop => self.stop_capture().await,
            Command::Say(text) => self.say(&text).await,
            Command::Register => self.register().await,
            Command::Next => self.step(true),
            Command::Previous => self.step(false),
            Command::Answer(text) => self.answer(&text).await,
            Command::Finish => self.on_route(&[Route::Personalization], |shell| {
                let questionnaire = shell.services.questionnaire();
                if flows::finish_personalization(
                    &mut shell.nav,
                    &shell.personalization,
                    &questionnaire,
                ) {
                    "Profile saved.".to_string()
                } else {
                    format!(
                        "Answer at least {} questions to finish.",
                        questionnaire.finish_threshold()
                    )
                }
            }),
            Command::ClearAnswers => {
                self.personalization.clear_data().await;
                self.cursor = QuestionCursor::new(self.services.questionnaire().len());
                "Answers cleared.".to_string()
            }
            Command::Level(id) => {
                self.selected_level = Some(id);
                self.nav.navigate(Route::TextTemplates);
                String::new()
            }
            Command::Generate {
                slot_no,
                paragraphs,
                topic,
            } => self.generate(slot_no, paragraphs, topic).await,
            Command::ClearCache => {
                self.services.reference_cache().clear().await;
                "Reference data will be fetched again.".to_string()
            }
            Command::Logout => {
                flows::logout(&mut self.nav, &mut self.session).await;
                "Signed out.".to_string()
            }
        };

        if self.nav.current() != before {
            self.leave_screen(before);
        }
        let screen = self.render().await;
        if message.is_empty() {
            Reply::Text(screen)
        } else {
            Reply::Text(format!("{message}\n\n{screen}"))
        }
    }

    fn on_route(&mut self, routes: &[Route], action: impl FnOnce(&mut Self) -> String) -> String {
        if routes.contains(&self.nav.current()) {
            action(self)
        } else {
            format!("That does nothing on the {} screen.", self.nav.current())
        }
    }

    /// Drops per-screen state when a screen is left.
    fn leave_screen(&mut self, left: Route) {
        if let Some(mut recording) = self.recording.take() {
            recording.stop();
        }
        match left {
            Route::VoiceRegistration => self.transcript = None,
            Route::TeacherVoiceSetup => self.teacher_answers.clear(),
            _ => {}
        }
    }

    fn current_question(&self) -> Option<PersonalizationQuestion> {
        self.services
            .questionnaire()
            .get(self.cursor.index())
            .cloned()
    }

    fn status(&self) -> String {
        let mut lines = vec![format!("Screen: {}", self.nav.current())];
        match self.session().current_user() {
            Some(user) => lines.push(format!(
                "Signed in as {} <{}> ({})",
                user.name(),
                user.email(),
                user.user_type()
            )),
            None => lines.push("Not signed in.".to_string()),
        }
        if let Some(role) = self.session().user_type() {
            lines.push(format!("Role: {role}"));
        }
        lines.push(format!(
            "Personalization: {}% ({} answered)",
            self.personalization().completion_percentage(),
            self.personalization().answered_count()
        ));
        let history: Vec<&str> = self.nav.history().into_iter().map(Route::as_str).collect();
        lines.push(format!("History: {}", history.join(" > ")));
        lines.join("\n")
    }

    async fn start_capture(&mut self) -> String {
        if self.recording.is_some() {
            return "Already recording. Type `stop` to finish.".to_string();
        }
        let kind = match self.nav.current() {
            Route::BiometricLogin | Route::TeacherBiometric => CaptureKind::Image,
            Route::Personalization
                if self
                    .current_question()
                    .is_some_and(|q| q.accepts(InputType::Audio)) =>
            {
                CaptureKind::Audio
            }
            _ => return "Nothing to capture on this screen.".to_string(),
        };
        let device = &self.services.collaborators().capture;
        match flows::start_capture(device.as_ref(), kind).await {
            Ok(session) => {
                self.recording = Some(session);
                format!("Using the {kind}. Type `stop` when done.")
            }
            Err(err) => err.user_message(),
        }
    }

    async fn stop_capture(&mut self) -> String {
        let Some(recording) = self.recording.take() else {
            return "Nothing is being captured.".to_string();
        };
        let collaborators = self.services.collaborators().clone();
        match recording.kind() {
            CaptureKind::Image => {
                match flows::biometric_login(
                    &mut self.nav,
                    &mut self.session,
                    collaborators.verifier.as_ref(),
                    recording,
                )
                .await
                {
                    Ok(user) => format!("Welcome, {}!", user.name()),
                    Err(err) => err.user_message(),
                }
            }
            CaptureKind::Audio => {
                let Some(question) = self.current_question() else {
                    return "No question selected.".to_string();
                };
                let questionnaire = self.services.questionnaire();
                match flows::answer_by_audio(
                    &mut self.personalization,
                    &questionnaire,
                    collaborators.transcriber.as_ref(),
                    question.id.as_str(),
                    recording,
                )
                .await
                {
                    Ok(text) => format!("Heard: {text}"),
                    Err(err) => err.user_message(),
                }
            }
        }
    }

    async fn say(&mut self, text: &str) -> String {
        let route = self.nav.current();
        if !matches!(route, Route::VoiceRegistration | Route::TeacherVoiceSetup) {
            return "Nobody is listening on this screen.".to_string();
        }
        let speech = self.services.collaborators().speech.clone();
        speech.say(text);
        let transcript = match flows::listen_for_transcript(speech.as_ref()).await {
            Ok(transcript) => transcript,
            Err(err) => return err.user_message(),
        };

        if route == Route::VoiceRegistration {
            let combined = match self.transcript.take() {
                Some(previous) => format!("{previous} {transcript}"),
                None => transcript,
            };
            self.transcript = Some(combined);
            return "Recorded. Type `register` to finish or keep talking.".to_string();
        }

        self.teacher_answers.push(transcript);
        if self.teacher_answers.len() < TEACHER_SETUP_PROMPTS.len() {
            return String::new();
        }
        let answers = std::mem::take(&mut self.teacher_answers);
        let clock = self.services.clock();
        let user = flows::setup_teacher(&mut self.nav, &mut self.session, &answers, &clock).await;
        format!("Profile ready for {}.", user.name())
    }

    async fn register(&mut self) -> String {
        if self.nav.current() != Route::VoiceRegistration {
            return "Registration happens on the voice-registration screen.".to_string();
        }
        let transcript = self.transcript.clone().unwrap_or_default();
        let clock = self.services.clock();
        match flows::register_student(&mut self.nav, &mut self.session, &transcript, &clock).await {
            Ok(user) => format!("Welcome, {}!", user.name()),
            Err(err) => err.user_message(),
        }
    }

    fn step(&mut self, forward: bool) -> String {
        match self.nav.current() {
            Route::Personalization => {
                let moved = if forward {
                    self.cursor.next()
                } else {
                    self.cursor.previous()
                };
                if moved {
                    String::new()
                } else if forward {
                    "This is the last question.".to_string()
                } else {
                    "This is the first question.".to_string()
                }
            }
            Route::TeacherVoiceSetup if !forward => {
                if self.teacher_answers.pop().is_some() {
                    String::new()
                } else {
                    self.nav.navigate(Route::TeacherAuth);
                    String::new()
                }
            }
            _ => "Nothing to step through here.".to_string(),
        }
    }

    async fn answer(&mut self, text: &str) -> String {
        if self.nav.current() != Route::Personalization {
            return "Answers go on the personalization screen.".to_string();
        }
        let Some(question) = self.current_question() else {
            return "No question selected.".to_string();
        };
        let (answer, mode) = match question.input_type {
            InputType::Select => {
                let choice = text
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| question.options.get(i).cloned())
                    .unwrap_or_else(|| text.to_string());
                (choice, InputType::Select)
            }
            InputType::Text | InputType::Audio => (text.to_string(), InputType::Text),
        };
        let questionnaire = self.services.questionnaire();
        match flows::answer_question(
            &mut self.personalization,
            &questionnaire,
            question.id.as_str(),
            &answer,
            mode,
        )
        .await
        {
            Ok(()) => {
                self.cursor.next();
                String::new()
            }
            Err(err) => err.user_message(),
        }
    }

    async fn generate(&mut self, slot_no: u32, paragraphs: u32, topic: Option<String>) -> String {
        if self.nav.current() != Route::TextTemplates {
            return "Texts are generated on the text-templates screen.".to_string();
        }
        let Some(level_id) = self.selected_level.clone() else {
            return "Pick a level first with `level <id>`.".to_string();
        };
        let request = GeneratedTextRequest {
            level_id,
            slot_no,
            paragraphs,
            topic,
        };
        let source = &self.services.collaborators().reference;
        match source.generate_text(&request).await {
            Ok(text) => {
                self.services
                    .reference_cache()
                    .push_example_text(source.as_ref(), &text)
                    .await;
                format!("Generated {}.", text.id)
            }
            Err(err) => format!("Could not generate a text: {err}"),
        }
    }

    /// Text of the current screen.
    pub async fn render(&self) -> String {
        let route = self.nav.current();
        let mut lines = vec![format!("== {route} ==")];
        match route {
            Route::Home => {
                lines.push("Reading comprehension by voice.".to_string());
                lines.push("Who are you? `role student` or `role teacher`.".to_string());
            }
            Route::Login => {
                lines.push("Sign in with your e-mail, then `submit`.".to_string());
            }
            Route::StudentAuth | Route::TeacherAuth => {
                lines.push(
                    "Do you already have an account? `account yes` or `account no`.".to_string(),
                );
            }
            Route::BiometricLogin | Route::TeacherBiometric => {
                if self.recording.is_some() {
                    lines.push("Camera on. Type `stop` to take the photo.".to_string());
                } else {
                    lines.push("Look at the camera: `capture`.".to_string());
                }
            }
            Route::VoiceRegistration => {
                lines.push("Tell us about yourself: `say <words>`.".to_string());
                if let Some(transcript) = &self.transcript {
                    lines.push(format!("Transcript: {transcript}"));
                }
            }
            Route::TeacherVoiceSetup => {
                let step = self.teacher_answers.len();
                if let Some(prompt) = TEACHER_SETUP_PROMPTS.get(step) {
                    lines.push(format!(
                        "Step {} of {}: {prompt}",
                        step + 1,
                        TEACHER_SETUP_PROMPTS.len()
                    ));
                    lines.push("Answer with `say <words>`.".to_string());
                }
            }
            Route::Personalization => self.render_question(&mut lines),
            Route::Levels => self.render_levels(&mut lines).await,
            Route::TeacherDashboard => self.render_dashboard(&mut lines).await,
            Route::StudentDetail => self.render_students(&mut lines).await,
            Route::TextTemplates => self.render_texts(&mut lines).await,
        }
        if self.nav.can_go_back() {
            lines.push("(`back` to return)".to_string());
        }
        lines.join("\n")
    }

    fn render_question(&self, lines: &mut Vec<String>) {
        let total = self.services.questionnaire().len();
        lines.push(format!(
            "Progress: {}% ({} of {total} answered)",
            self.personalization.completion_percentage(),
            self.personalization.answered_count()
        ));
        let Some(question) = self.current_question() else {
            return;
        };
        let marker = if question.required { " *" } else { "" };
        lines.push(format!(
            "Question {} of {total}{marker}: {}",
            self.cursor.index() + 1,
            question.question
        ));
        for (i, option) in question.options.iter().enumerate() {
            lines.push(format!("  {}. {option}", i + 1));
        }
        if let Some(answer) = self.personalization.get_answer(question.id.as_str()) {
            lines.push(format!("Your answer: {answer}"));
        } else if let Some(placeholder) = &question.placeholder {
            lines.push(format!("({placeholder})"));
        }
        if question.accepts(InputType::Audio) {
            lines.push(
                "Type `answer <text>`, or answer by voice: `capture`, then `stop`.".to_string(),
            );
        }
    }

    async fn render_levels(&self, lines: &mut Vec<String>) {
        if let Some(user) = self.session.current_user() {
            lines.push(format!("Hello, {}.", user.name()));
        }
        let source = &self.services.collaborators().reference;
        match self
            .services
            .reference_cache()
            .levels_cached_or_fetch(source.as_ref())
            .await
        {
            Ok(levels) => {
                for level in levels {
                    lines.push(format!(
                        "  {:<15} {} ({:?}): {}",
                        level.id, level.name, level.difficulty, level.description
                    ));
                }
                lines.push("Open a level with `level <id>`.".to_string());
            }
            Err(err) => lines.push(format!("Levels unavailable: {err}")),
        }
    }

    async fn render_dashboard(&self, lines: &mut Vec<String>) {
        let source = &self.services.collaborators().reference;
        match self
            .services
            .reference_cache()
            .system_summary_cached_or_fetch(source.as_ref())
            .await
        {
            Ok(summary) => lines.push(format!(
                "{} students, {} passages, {} levels, {:.1}% average completion",
                summary.total_students,
                summary.total_passages,
                summary.total_levels,
                summary.average_completion_rate
            )),
            Err(err) => lines.push(format!("Summary unavailable: {err}")),
        }
        lines.push("`go student-detail`, `go levels` or `go teacher-voice-setup`.".to_string());
    }

    async fn render_students(&self, lines: &mut Vec<String>) {
        match self.services.collaborators().reference.student_stats().await {
            Ok(stats) => {
                for student in stats {
                    lines.push(format!(
                        "  {}: {}/{} passages ({:.0}%), score {:.1}, last seen {}",
                        student.student_id,
                        student.completed_passages,
                        student.total_passages,
                        student.completion_rate(),
                        student.average_score,
                        student.last_activity
                    ));
                }
            }
            Err(err) => lines.push(format!("Student stats unavailable: {err}")),
        }
    }

    async fn render_texts(&self, lines: &mut Vec<String>) {
        let Some(level_id) = &self.selected_level else {
            lines.push("Pick a level first with `level <id>`.".to_string());
            return;
        };
        lines.push(format!("Level {level_id}"));
        let source = &self.services.collaborators().reference;
        match self
            .services
            .reference_cache()
            .example_texts_cached_or_fetch(source.as_ref(), level_id)
            .await
        {
            Ok(texts) if texts.is_empty() => lines.push("No texts yet.".to_string()),
            Ok(texts) => {
                for text in texts {
                    let preview: String = text.content.chars().take(60).collect();
                    lines.push(format!(
                        "  [{}] slot {} ({} paragraphs): {preview}...",
                        text.id, text.slot_no, text.paragraphs
                    ));
                }
            }
            Err(err) => lines.push(format!("Texts unavailable: {err}")),
        }
        lines.push("`generate <slot> <paragraphs> [topic]` adds a text.".to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use aula_core::time::fixed_clock;
    use services::Collaborators;

    use super::*;

    async fn shell() -> Shell {
        let clock = fixed_clock();
        let services =
            AppServices::in_memory(clock, Collaborators::simulated(Duration::ZERO, clock));
        Shell::start(services).await
    }

    async fn run(shell: &mut Shell, line: &str) -> String {
        match shell.execute(Command::parse(line).unwrap()).await {
            Reply::Text(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(Command::parse("go levels"), Ok(Command::Go(Route::Levels)));
        assert_eq!(Command::parse(" role Teacher "), Ok(Command::Role(UserType::Teacher)));
        assert_eq!(Command::parse("account no"), Ok(Command::Account(false)));
        assert_eq!(
            Command::parse("say hola  amigo"),
            Ok(Command::Say("hola  amigo".to_string()))
        );
        assert_eq!(
            Command::parse("generate 2 3 the sea"),
            Ok(Command::Generate {
                slot_no: 2,
                paragraphs: 3,
                topic: Some("the sea".to_string())
            })
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("dance"),
            Err(CommandError::Unknown("dance".to_string()))
        );
        assert!(matches!(
            Command::parse("go nowhere"),
            Err(CommandError::Invalid {
                command: "go",
                source: aula_core::Error::Route(_),
            })
        ));
        assert!(matches!(
            Command::parse("role admin"),
            Err(CommandError::Invalid {
                command: "role",
                source: aula_core::Error::UserType(_),
            })
        ));
        assert!(matches!(
            Command::parse("generate x 1"),
            Err(CommandError::InvalidArgument { .. })
        ));
        assert!(matches!(
            Command::parse("answer"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[tokio::test]
    async fn student_logs_in_with_camera() {
        let mut shell = shell().await;
        run(&mut shell, "role student").await;
        run(&mut shell, "account yes").await;
        assert_eq!(shell.route(), Route::BiometricLogin);
        run(&mut shell, "capture").await;
        let output = run(&mut shell, "stop").await;
        assert!(output.contains("Welcome, Ana Garcia!"));
        assert_eq!(shell.route(), Route::Levels);
        assert!(output.contains("beginner-1"));
    }

    #[tokio::test]
    async fn teacher_setup_walks_every_prompt() {
        let mut shell = shell().await;
        run(&mut shell, "role teacher").await;
        run(&mut shell, "account no").await;
        assert_eq!(shell.route(), Route::TeacherVoiceSetup);
        run(&mut shell, "say Laura Perez").await;
        run(&mut shell, "say Reading").await;
        run(&mut shell, "say Short stories").await;
        let output = run(&mut shell, "say Faster reading").await;
        assert!(output.contains("Profile ready for Laura Perez."));
        assert_eq!(shell.route(), Route::TeacherDashboard);
        assert!(output.contains("25 students"));
    }

    #[tokio::test]
    async fn voice_registration_then_logout() {
        let mut shell = shell().await;
        run(&mut shell, "role student").await;
        run(&mut shell, "account no").await;
        let output = run(&mut shell, "register").await;
        assert!(output.contains("Nothing was recorded"));
        run(&mut shell, "say Hola. Me llamo Pablo.").await;
        run(&mut shell, "register").await;
        assert_eq!(shell.route(), Route::Levels);
        assert!(shell.session().is_authenticated());

        run(&mut shell, "logout").await;
        assert_eq!(shell.route(), Route::Home);
        assert!(!shell.session().is_authenticated());
        assert!(run(&mut shell, "back").await.contains("Already on the first screen."));
    }

    #[tokio::test]
    async fn questionnaire_select_by_number() {
        let mut shell = shell().await;
        run(&mut shell, "go personalization").await;
        run(&mut shell, "answer Ana").await;
        let output = run(&mut shell, "answer 1").await;
        assert_eq!(shell.personalization().answered_count(), 2);
        assert!(output.contains("Question 3 of 7"));
        assert!(run(&mut shell, "finish").await.contains("Answer at least 5"));
        assert_eq!(shell.route(), Route::Personalization);
    }

    #[tokio::test]
    async fn audio_question_takes_a_typed_answer() {
        let mut shell = shell().await;
        run(&mut shell, "go personalization").await;
        for _ in 0..3 {
            run(&mut shell, "next").await;
        }
        let output = run(&mut shell, "answer read faster").await;
        assert!(!output.contains("expects"));
        let stored = shell.personalization().data().get("goals").unwrap();
        assert_eq!(stored.answer(), "read faster");
        assert_eq!(stored.input_type(), InputType::Text);
    }

    #[tokio::test]
    async fn text_question_takes_a_voice_answer() {
        let mut shell = shell().await;
        run(&mut shell, "go personalization").await;
        let output = run(&mut shell, "capture").await;
        assert!(output.contains("Type `stop` when done."));
        let output = run(&mut shell, "stop").await;
        assert!(output.contains("Heard: "));
        let stored = shell.personalization().data().get("name").unwrap();
        assert_eq!(stored.answer(), services::transcription::SIMULATED_TRANSCRIPT);
        assert_eq!(stored.input_type(), InputType::Audio);
    }

    #[tokio::test]
    async fn select_question_cannot_be_recorded() {
        let mut shell = shell().await;
        run(&mut shell, "go personalization").await;
        run(&mut shell, "next").await;
        let output = run(&mut shell, "capture").await;
        assert!(output.starts_with("Nothing to capture"));
    }

    #[tokio::test]
    async fn role_only_works_at_home() {
        let mut shell = shell().await;
        run(&mut shell, "go levels").await;
        let output = run(&mut shell, "role teacher").await;
        assert!(output.starts_with("That does nothing"));
        assert_eq!(shell.session().user_type(), None);
    }

    #[tokio::test]
    async fn generated_text_joins_level_list() {
        let mut shell = shell().await;
        run(&mut shell, "level advanced-1").await;
        assert_eq!(shell.route(), Route::TextTemplates);
        let output = run(&mut shell, "generate 1 2 music").await;
        assert!(output.contains("Generated generated-"));
        assert!(output.contains("slot 1 (2 paragraphs)"));
    }

    #[tokio::test]
    async fn quit_stops_the_loop() {
        let mut shell = shell().await;
        assert_eq!(shell.execute(Command::Quit).await, Reply::Quit);
    }
}
