use std::sync::Arc;

use quiz_core::model::{GuessOutcome, Item, QuizSettingsDraft};
use quiz_core::time::fixed_clock;
use services::{Advance, QuizLoopError, QuizLoopService, QuizSession, SessionError, SettingsService};
use storage::catalog::StaticCatalog;
use storage::repository::Storage;

fn loop_service(catalog: StaticCatalog) -> QuizLoopService {
    let settings = SettingsService::new(Storage::in_memory().settings);
    QuizLoopService::new(settings, Arc::new(catalog))
}

#[tokio::test]
async fn full_round_with_a_stumble() {
    let service = loop_service(StaticCatalog::builtin());
    service
        .settings()
        .save(QuizSettingsDraft::new(4, ["Europe"]))
        .await
        .unwrap();

    let mut session = QuizSession::seeded(2024).with_clock(fixed_clock());
    let first = service.start_round(&mut session).await.unwrap();
    assert_eq!(first.round_size, 10);
    assert_eq!(first.choices.len(), 4);
    assert_eq!(first.item.region().as_str(), "Europe");

    // First item: two wrong answers, then the right one.
    let wrong = first
        .choices
        .iter()
        .find(|name| *name != first.item.name())
        .unwrap()
        .to_string();
    assert_eq!(session.submit_guess(&wrong).unwrap(), GuessOutcome::Incorrect);
    assert_eq!(session.submit_guess(&wrong).unwrap(), GuessOutcome::Incorrect);
    assert_eq!(
        session.submit_guess(first.item.name()).unwrap(),
        GuessOutcome::Correct
    );

    let mut current: Item = first.item;
    let summary = loop {
        match session.advance().unwrap() {
            Advance::Next(handle) => {
                assert_ne!(handle.item, current);
                current = handle.item;
                session.submit_guess(current.name()).unwrap();
            }
            Advance::Complete(summary) => break summary,
        }
    };

    assert_eq!(summary.total_guesses(), 12);
    assert_eq!(summary.correct_count(), 10);
    assert!((summary.average() - 1000.0 / 12.0).abs() < 1e-9);
    assert!(session.is_complete());
}

#[tokio::test]
async fn undersized_region_fails_to_start() {
    let tiny = StaticCatalog::new(
        ["Oceania-Fiji", "Oceania-Samoa", "Oceania-Tonga"]
            .iter()
            .map(|id| Item::parse_id(id).unwrap()),
    );
    let service = loop_service(tiny);
    service
        .settings()
        .save(QuizSettingsDraft::new(2, ["Oceania"]))
        .await
        .unwrap();

    let mut session = QuizSession::seeded(1);
    let err = service.start_round(&mut session).await.unwrap_err();
    assert!(matches!(
        err,
        QuizLoopError::Session(SessionError::InsufficientItems {
            available: 3,
            required: 10
        })
    ));
}

#[tokio::test]
async fn round_size_is_configurable() {
    let service = loop_service(StaticCatalog::builtin()).with_round_size(3);
    let mut session = QuizSession::seeded(5);
    let first = service.start_round(&mut session).await.unwrap();
    assert_eq!(first.round_size, 3);
    // Default settings: four choices drawn from every region.
    assert_eq!(first.choices.len(), 4);
    assert!(service.current_catalog().await.unwrap().len() >= 60);
}
