//! Screen actions: the steps a screen runs when the user acts.
//!
//! Every flow awaits its collaborators before touching the navigator or a
//! store, so a failed call leaves route and state unchanged.

use aula_core::model::{
    InputType, QuestionId, Questionnaire, Route, UserId, UserProfile, UserType, email_from_name,
};
use aula_core::{Clock, Navigator};
use tracing::{debug, info};

use crate::capture::{CaptureDevice, CaptureKind, CaptureSession};
use crate::error::FlowError;
use crate::identity::BiometricVerifier;
use crate::personalization_store::PersonalizationStore;
use crate::session_store::SessionStore;
use crate::speech::{LiveSpeech, collect_transcript};
use crate::transcription::Transcriber;

pub const NEW_STUDENT_NAME: &str = "New Student";
pub const DEFAULT_TEACHER_NAME: &str = "Prof. Demo";
pub const STUDENT_EMAIL_DOMAIN: &str = "student.example";
pub const TEACHER_EMAIL_DOMAIN: &str = "example.com";

/// Prompts walked through by the teacher voice setup. The first answer is the name.
pub const TEACHER_SETUP_PROMPTS: [&str; 4] = [
    "Please tell us your full name.",
    "What subject or class do you teach?",
    "Briefly describe your teaching method and the texts you use.",
    "What do you hope your students achieve with this tool?",
];

/// Auth screen shown for a role.
#[must_use]
pub fn auth_route(user_type: UserType) -> Route {
    match user_type {
        UserType::Student => Route::StudentAuth,
        UserType::Teacher => Route::TeacherAuth,
    }
}

/// Landing screen after a successful login or registration.
#[must_use]
pub fn home_route(user_type: UserType) -> Route {
    match user_type {
        UserType::Student => Route::Levels,
        UserType::Teacher => Route::TeacherDashboard,
    }
}

pub fn select_role(nav: &mut Navigator, session: &mut SessionStore, user_type: UserType) {
    session.set_user_type(user_type);
    nav.navigate(auth_route(user_type));
}

/// Records whether the user already has an account and opens the matching screen.
///
/// # Errors
///
/// Returns `FlowError::NoRoleSelected` when no role was chosen yet.
pub fn choose_account(
    nav: &mut Navigator,
    session: &mut SessionStore,
    has_account: bool,
) -> Result<Route, FlowError> {
    let user_type = session.user_type().ok_or(FlowError::NoRoleSelected)?;
    let route = match (user_type, has_account) {
        (UserType::Student, true) => Route::BiometricLogin,
        (UserType::Student, false) => Route::VoiceRegistration,
        (UserType::Teacher, true) => Route::TeacherBiometric,
        (UserType::Teacher, false) => Route::TeacherVoiceSetup,
    };
    session.set_has_account(has_account);
    nav.navigate(route);
    Ok(route)
}

/// Runs the live recognizer until it ends and returns the trimmed transcript.
///
/// # Errors
///
/// Returns `FlowError::Speech` when recognition fails and
/// `FlowError::EmptyTranscript` when nothing was heard.
pub async fn listen_for_transcript(speech: &dyn LiveSpeech) -> Result<String, FlowError> {
    let events = speech.start_listening().await?;
    let buffer = collect_transcript(events).await?;
    if buffer.is_blank() {
        return Err(FlowError::EmptyTranscript);
    }
    Ok(buffer.text().trim().to_string())
}

/// Creates a student from a voice sample and opens the level list.
///
/// # Errors
///
/// Returns `FlowError::EmptyTranscript` for a blank transcript.
pub async fn register_student(
    nav: &mut Navigator,
    session: &mut SessionStore,
    transcript: &str,
    clock: &Clock,
) -> Result<UserProfile, FlowError> {
    let transcript = transcript.trim();
    if transcript.is_empty() {
        return Err(FlowError::EmptyTranscript);
    }
    let user = UserProfile::new(
        UserId::generate("student-new"),
        NEW_STUDENT_NAME,
        format!("new@{STUDENT_EMAIL_DOMAIN}"),
        UserType::Student,
        false,
        clock.now(),
    )
    .with_voice_profile(transcript);

    info!(user = %user.id(), "registered student by voice");
    session.set_user(user.clone()).await;
    nav.navigate(Route::Levels);
    Ok(user)
}

/// Creates a teacher from the setup answers and opens the dashboard.
pub async fn setup_teacher(
    nav: &mut Navigator,
    session: &mut SessionStore,
    answers: &[String],
    clock: &Clock,
) -> UserProfile {
    let name = answers
        .first()
        .map(|answer| answer.trim())
        .filter(|answer| !answer.is_empty())
        .unwrap_or(DEFAULT_TEACHER_NAME);
    let mut user = UserProfile::new(
        UserId::generate("teacher"),
        name,
        email_from_name(name, TEACHER_EMAIL_DOMAIN),
        UserType::Teacher,
        false,
        clock.now(),
    );
    let profile = answers
        .iter()
        .map(|answer| answer.trim())
        .filter(|answer| !answer.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !profile.is_empty() {
        user = user.with_voice_profile(profile);
    }

    info!(user = %user.id(), "teacher voice setup complete");
    session.set_user(user.clone()).await;
    nav.navigate(Route::TeacherDashboard);
    user
}

/// Acquires the device for `kind`.
///
/// # Errors
///
/// Returns `FlowError::Capture` when the device is missing or access is denied.
pub async fn start_capture(
    device: &dyn CaptureDevice,
    kind: CaptureKind,
) -> Result<CaptureSession, FlowError> {
    Ok(device.begin(kind).await?)
}

/// Verifies a face capture for the selected role and logs the user in.
///
/// # Errors
///
/// Returns `FlowError::NoRoleSelected`, or the capture/verification failure.
pub async fn biometric_login(
    nav: &mut Navigator,
    session: &mut SessionStore,
    verifier: &dyn BiometricVerifier,
    capture: CaptureSession,
) -> Result<UserProfile, FlowError> {
    let Some(user_type) = session.user_type() else {
        let mut capture = capture;
        capture.stop();
        return Err(FlowError::NoRoleSelected);
    };
    let media = capture.finish().await?;
    let user = verifier.verify(&media, user_type).await?;

    info!(user = %user.id(), role = %user.user_type(), "biometric login");
    let route = home_route(user.user_type());
    session.set_user(user.clone()).await;
    nav.navigate(route);
    Ok(user)
}

/// Records a typed or selected answer.
///
/// # Errors
///
/// Returns `FlowError::Questionnaire` when the answer does not fit the question.
pub async fn answer_question(
    store: &mut PersonalizationStore,
    questionnaire: &Questionnaire,
    question_id: &str,
    answer: &str,
    input_type: InputType,
) -> Result<(), FlowError> {
    questionnaire.validate_answer(question_id, answer, input_type)?;
    store
        .update_answer(QuestionId::new(question_id), answer, input_type)
        .await;
    Ok(())
}

/// Stops a recording, transcribes it and stores the text as an audio answer.
/// Any free-form question can be answered this way.
///
/// # Errors
///
/// Returns the capture or transcription failure; nothing is stored then.
pub async fn answer_by_audio(
    store: &mut PersonalizationStore,
    questionnaire: &Questionnaire,
    transcriber: &dyn Transcriber,
    question_id: &str,
    capture: CaptureSession,
) -> Result<String, FlowError> {
    if let Err(err) = questionnaire.validate_answer(question_id, "", InputType::Audio) {
        let mut capture = capture;
        capture.stop();
        return Err(err.into());
    }
    let media = capture.finish().await?;
    let transcript = transcriber.transcribe(&media).await?;
    debug!(question = question_id, "transcribed audio answer");
    store
        .update_answer(QuestionId::new(question_id), transcript.clone(), InputType::Audio)
        .await;
    Ok(transcript)
}

/// Leaves the questionnaire once enough questions are answered.
pub fn finish_personalization(
    nav: &mut Navigator,
    store: &PersonalizationStore,
    questionnaire: &Questionnaire,
) -> bool {
    if !questionnaire.can_finish(store.data()) {
        return false;
    }
    nav.navigate(Route::Home);
    true
}

pub async fn logout(nav: &mut Navigator, session: &mut SessionStore) {
    session.logout().await;
    nav.reset();
}
