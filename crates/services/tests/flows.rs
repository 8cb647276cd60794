use std::sync::Arc;
use std::time::Duration;

use aula_core::Navigator;
use aula_core::model::{InputType, Questionnaire, Route, UserType};
use aula_core::time::fixed_clock;
use services::flows;
use services::{
    CaptureError, CaptureKind, FlowError, PersonalizationStore, ScriptedCapture,
    ScriptedCaptureDevice, ScriptedSpeech, SessionStore, SimulatedTranscriber, SimulatedVerifier,
    SpeechEvent,
};
use storage::repository::{InMemoryStore, KeyValueStore};

fn session(records: &InMemoryStore) -> SessionStore {
    SessionStore::new(Arc::new(records.clone()))
}

#[tokio::test]
async fn student_with_account_logs_in_by_face() {
    let records = InMemoryStore::new();
    let mut nav = Navigator::new();
    let mut session = session(&records);

    flows::select_role(&mut nav, &mut session, UserType::Student);
    assert_eq!(nav.current(), Route::StudentAuth);

    let route = flows::choose_account(&mut nav, &mut session, true).unwrap();
    assert_eq!(route, Route::BiometricLogin);
    assert!(session.has_account());

    let device = ScriptedCaptureDevice::new(Duration::ZERO);
    let capture = flows::start_capture(&device, CaptureKind::Image).await.unwrap();
    let verifier = SimulatedVerifier::new(fixed_clock(), Duration::ZERO);
    let user = flows::biometric_login(&mut nav, &mut session, &verifier, capture)
        .await
        .unwrap();

    assert_eq!(user.user_type(), UserType::Student);
    assert!(user.biometric_data().unwrap().starts_with("data:image/jpeg;base64,"));
    assert_eq!(nav.current(), Route::Levels);
    assert_eq!(
        nav.history(),
        vec![
            Route::Home,
            Route::StudentAuth,
            Route::BiometricLogin,
            Route::Levels
        ]
    );
    assert!(records.get(services::SESSION_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn account_choice_needs_a_role() {
    let records = InMemoryStore::new();
    let mut nav = Navigator::new();
    let mut session = session(&records);

    let err = flows::choose_account(&mut nav, &mut session, false).unwrap_err();
    assert!(matches!(err, FlowError::NoRoleSelected));
    assert_eq!(nav.current(), Route::Home);
    assert!(!session.has_account());
}

#[tokio::test]
async fn teacher_paths_open_teacher_screens() {
    let records = InMemoryStore::new();
    let mut nav = Navigator::new();
    let mut session = session(&records);

    flows::select_role(&mut nav, &mut session, UserType::Teacher);
    assert_eq!(nav.current(), Route::TeacherAuth);
    assert_eq!(
        flows::choose_account(&mut nav, &mut session, false).unwrap(),
        Route::TeacherVoiceSetup
    );

    let answers = vec!["Laura Perez".to_string(), "Reading".to_string()];
    let teacher = flows::setup_teacher(&mut nav, &mut session, &answers, &fixed_clock()).await;
    assert_eq!(teacher.name(), "Laura Perez");
    assert_eq!(teacher.email(), "laura.perez@example.com");
    assert_eq!(teacher.voice_profile(), Some("Laura Perez Reading"));
    assert_eq!(nav.current(), Route::TeacherDashboard);
    assert_eq!(session.user_type(), Some(UserType::Teacher));
}

#[tokio::test]
async fn teacher_without_answers_gets_demo_name() {
    let records = InMemoryStore::new();
    let mut nav = Navigator::new();
    let mut session = session(&records);

    let teacher = flows::setup_teacher(&mut nav, &mut session, &[], &fixed_clock()).await;
    assert_eq!(teacher.name(), flows::DEFAULT_TEACHER_NAME);
    assert!(teacher.voice_profile().is_none());
}

#[tokio::test]
async fn denied_camera_leaves_state_alone() {
    let records = InMemoryStore::new();
    let mut nav = Navigator::new();
    let mut session = session(&records);
    flows::select_role(&mut nav, &mut session, UserType::Student);
    flows::choose_account(&mut nav, &mut session, true).unwrap();

    let device = ScriptedCaptureDevice::new(Duration::ZERO).with_image(ScriptedCapture::Denied);
    let err = flows::start_capture(&device, CaptureKind::Image)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FlowError::Capture(CaptureError::PermissionDenied(CaptureKind::Image))
    ));
    assert_eq!(nav.current(), Route::BiometricLogin);
    assert!(!session.is_authenticated());
    assert!(records.is_empty());
}

#[tokio::test]
async fn voice_registration_uses_transcript() {
    let records = InMemoryStore::new();
    let mut nav = Navigator::new();
    let mut session = session(&records);
    flows::select_role(&mut nav, &mut session, UserType::Student);
    flows::choose_account(&mut nav, &mut session, false).unwrap();
    assert_eq!(nav.current(), Route::VoiceRegistration);

    let speech = ScriptedSpeech::new(Duration::ZERO);
    speech.say("Me llamo Pablo. Me gusta leer.");
    let transcript = flows::listen_for_transcript(&speech).await.unwrap();
    assert_eq!(transcript, "Me llamo Pablo Me gusta leer");

    let user = flows::register_student(&mut nav, &mut session, &transcript, &fixed_clock())
        .await
        .unwrap();
    assert!(user.id().as_str().starts_with("student-new-"));
    assert!(!user.has_account());
    assert_eq!(user.voice_profile(), Some(transcript.as_str()));
    assert_eq!(nav.current(), Route::Levels);
}

#[tokio::test]
async fn recognition_error_aborts_registration() {
    let speech = ScriptedSpeech::new(Duration::ZERO);
    speech.set_script(vec![SpeechEvent::Error("no-speech".into())]);
    let err = flows::listen_for_transcript(&speech).await.unwrap_err();
    assert!(matches!(err, FlowError::Speech(_)));

    let silent = ScriptedSpeech::new(Duration::ZERO);
    let err = flows::listen_for_transcript(&silent).await.unwrap_err();
    assert!(matches!(err, FlowError::EmptyTranscript));
}

#[tokio::test]
async fn blank_transcript_is_not_registered() {
    let records = InMemoryStore::new();
    let mut nav = Navigator::starting_at(Route::VoiceRegistration);
    let mut session = session(&records);
    let err = flows::register_student(&mut nav, &mut session, "   ", &fixed_clock())
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::EmptyTranscript));
    assert_eq!(nav.current(), Route::VoiceRegistration);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn questionnaire_answers_feed_the_store() {
    let records = InMemoryStore::new();
    let questionnaire = Questionnaire::default_catalog();
    let mut store =
        PersonalizationStore::new(Arc::new(records.clone()), questionnaire.len(), fixed_clock());
    let mut nav = Navigator::starting_at(Route::Personalization);

    flows::answer_question(&mut store, &questionnaire, "name", "Ana", InputType::Text)
        .await
        .unwrap();
    let err = flows::answer_question(
        &mut store,
        &questionnaire,
        "interests",
        "Knitting",
        InputType::Select,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, FlowError::Questionnaire(_)));
    assert_eq!(store.answers().len(), 1);
    assert!(!flows::finish_personalization(&mut nav, &store, &questionnaire));
    assert_eq!(nav.current(), Route::Personalization);

    let device = ScriptedCaptureDevice::new(Duration::ZERO);
    let transcriber =
        SimulatedTranscriber::with_transcript("I want to read faster", Duration::ZERO);
    let capture = flows::start_capture(&device, CaptureKind::Audio).await.unwrap();
    let text = flows::answer_by_audio(&mut store, &questionnaire, &transcriber, "goals", capture)
        .await
        .unwrap();
    assert_eq!(text, "I want to read faster");
    assert_eq!(store.get_answer("goals"), Some("I want to read faster"));
    assert_eq!(store.answers()[1].input_type(), InputType::Audio);
}

#[tokio::test]
async fn answers_record_how_they_were_entered() {
    let records = InMemoryStore::new();
    let questionnaire = Questionnaire::default_catalog();
    let mut store =
        PersonalizationStore::new(Arc::new(records), questionnaire.len(), fixed_clock());

    flows::answer_question(&mut store, &questionnaire, "goals", "read faster", InputType::Text)
        .await
        .unwrap();
    assert_eq!(store.get_answer("goals"), Some("read faster"));
    assert_eq!(store.answers()[0].input_type(), InputType::Text);

    let device = ScriptedCaptureDevice::new(Duration::ZERO);
    let transcriber = SimulatedTranscriber::with_transcript("Ana", Duration::ZERO);
    let capture = flows::start_capture(&device, CaptureKind::Audio).await.unwrap();
    flows::answer_by_audio(&mut store, &questionnaire, &transcriber, "name", capture)
        .await
        .unwrap();
    assert_eq!(store.get_answer("name"), Some("Ana"));
    assert_eq!(store.answers()[1].input_type(), InputType::Audio);

    flows::answer_question(
        &mut store,
        &questionnaire,
        "learning_style",
        "",
        InputType::Select,
    )
    .await
    .unwrap();
    assert_eq!(store.answers().len(), 3);
    assert!(!store.is_question_answered("learning_style"));

    let capture = flows::start_capture(&device, CaptureKind::Audio).await.unwrap();
    let err = flows::answer_by_audio(
        &mut store,
        &questionnaire,
        &transcriber,
        "communication_style",
        capture,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, FlowError::Questionnaire(_)));
    assert_eq!(store.answers().len(), 3);
}

#[tokio::test]
async fn enough_answers_allow_finishing() {
    let records = InMemoryStore::new();
    let questionnaire = Questionnaire::default_catalog();
    let mut store =
        PersonalizationStore::new(Arc::new(records), questionnaire.len(), fixed_clock());
    let mut nav = Navigator::starting_at(Route::Personalization);

    for question in questionnaire.questions().iter().take(questionnaire.finish_threshold()) {
        let answer = question
            .options
            .first()
            .cloned()
            .unwrap_or_else(|| "something".to_string());
        store
            .update_answer(question.id.clone(), answer, question.input_type)
            .await;
    }
    assert!(flows::finish_personalization(&mut nav, &store, &questionnaire));
    assert_eq!(nav.current(), Route::Home);
    assert!(nav.can_go_back());
}

#[tokio::test]
async fn failed_recording_stores_nothing() {
    let records = InMemoryStore::new();
    let questionnaire = Questionnaire::default_catalog();
    let mut store =
        PersonalizationStore::new(Arc::new(records.clone()), questionnaire.len(), fixed_clock());
    let device = ScriptedCaptureDevice::new(Duration::ZERO)
        .with_audio(ScriptedCapture::Fail(CaptureError::NoData));
    let transcriber = SimulatedTranscriber::new(Duration::ZERO);

    let capture = flows::start_capture(&device, CaptureKind::Audio).await.unwrap();
    let err = flows::answer_by_audio(&mut store, &questionnaire, &transcriber, "goals", capture)
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::Capture(CaptureError::NoData)));
    assert!(store.answers().is_empty());
    assert!(records.is_empty());
}

#[tokio::test]
async fn logout_returns_home_with_no_history() {
    let records = InMemoryStore::new();
    let mut nav = Navigator::new();
    let mut session = session(&records);
    flows::select_role(&mut nav, &mut session, UserType::Student);
    flows::register_student(&mut nav, &mut session, "hola", &fixed_clock())
        .await
        .unwrap();

    flows::logout(&mut nav, &mut session).await;
    assert_eq!(nav.current(), Route::Home);
    assert!(!nav.can_go_back());
    assert!(!session.is_authenticated());
    assert!(records.is_empty());
}
