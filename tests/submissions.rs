use flavor_studio::api::fixture::{DEMO_EMAIL, DEMO_PASSWORD};
use flavor_studio::api::{
    ApiError, AuthSession, FileSessionStore, FixtureBackend, SubmissionService,
};
use flavor_studio::design::DesignConfig;
use pollster::block_on;

#[test]
fn voting_twice_conflicts() {
    let mut backend = FixtureBackend::new();
    let mut session = AuthSession::init(Box::new(flavor_studio::api::MemorySessionStore::default()));
    block_on(session.login(&mut backend, DEMO_EMAIL, DEMO_PASSWORD)).unwrap();
    let token = session.require_token().unwrap().to_string();

    let first = block_on(backend.vote(&token, "sub-004")).unwrap();
    assert_eq!(first.votes, 204);
    assert!(matches!(
        block_on(backend.vote(&token, "sub-004")),
        Err(ApiError::Conflict { .. })
    ));
}

#[test]
fn submitting_requires_a_session() {
    let mut backend = FixtureBackend::new();
    let session = AuthSession::init(Box::new(flavor_studio::api::MemorySessionStore::default()));
    let design = DesignConfig::default();

    let result = session
        .require_token()
        .and_then(|token| block_on(backend.submit_design(token, &design.to_submission())));
    assert!(matches!(result, Err(ApiError::AuthRequired)));
}

#[test]
fn session_survives_restart_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auth.json");
    let mut backend = FixtureBackend::new();

    let mut session = AuthSession::init(Box::new(FileSessionStore::new(&path)));
    block_on(session.signup(&mut backend, "crunch", "crunch@example.com", "pw")).unwrap();
    let token = session.token().unwrap().to_string();
    drop(session.teardown());

    let restored = AuthSession::init(Box::new(FileSessionStore::new(&path)));
    assert_eq!(restored.token(), Some(token.as_str()));
    assert_eq!(restored.user().unwrap().email, "crunch@example.com");

    let mut design = DesignConfig::default();
    design.set_name("Pepper Party");
    let id = block_on(backend.submit_design(&token, &design.to_submission())).unwrap();
    let mine = block_on(backend.user_submissions(&token, &restored.user().unwrap().id)).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, id);
}

#[test]
fn corrupt_session_file_means_signed_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auth.json");
    std::fs::write(&path, "{\"token\": 42").unwrap();

    let session = AuthSession::init(Box::new(FileSessionStore::new(&path)));
    assert!(!session.is_logged_in());
    assert!(!path.exists());
}
