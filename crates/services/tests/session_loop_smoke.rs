use std::collections::HashSet;
use std::sync::Arc;

use quiz_core::model::{CategoryId, Difficulty, PreferencesDraft, UserId};
use quiz_core::session::{Advance, AnswerOutcome};
use quiz_core::time::fixed_now;
use services::{AppServices, Clock, Identity, SessionError, SessionLoopService};
use storage::bank::builtin_questions;
use storage::repository::{InMemoryRepository, PreferenceStore, Storage};

fn loop_service(repo: &InMemoryRepository, identity: Identity) -> SessionLoopService {
    SessionLoopService::new(
        Clock::fixed(fixed_now()),
        Arc::new(repo.clone()),
        services::PreferencesService::new(Arc::new(repo.clone())),
        Arc::new(identity),
    )
    .with_seed(42)
}

fn draft(categories: &[&str], count: u32) -> PreferencesDraft {
    let mut draft = PreferencesDraft::new();
    draft.categories = categories.iter().map(|c| CategoryId::new(*c)).collect();
    draft.question_count = count;
    draft
}

#[tokio::test]
async fn session_loop_runs_to_summary() {
    let repo = InMemoryRepository::with_questions(builtin_questions().unwrap());
    let loop_svc = loop_service(&repo, Identity::guest());

    let update = loop_svc
        .save_preferences(draft(&["cardiology", "neurology", "endocrinology"], 5))
        .await
        .unwrap();
    assert!(update.persisted);

    let mut session = loop_svc.start_session().await.unwrap();
    assert_eq!(session.state().total(), 5);

    let mut seen = HashSet::new();
    let mut prompted = 0;
    loop {
        let presented = session.current().unwrap().expect("question on screen").clone();
        assert!(seen.insert(presented.question().id().clone()));

        let result = session.answer(presented.question().correct_answer()).unwrap();
        assert_eq!(result.outcome, AnswerOutcome::Correct);
        prompted += usize::from(result.prompt_sign_up);

        if session.advance().unwrap() == Advance::Completed {
            break;
        }
    }

    assert_eq!(prompted, 1);
    let report = session.report();
    assert_eq!(report.correct, 5);
    assert_eq!(report.rounded_percentage(), 100);
    assert_eq!(report.completed_at, Some(fixed_now()));
    let category_total: usize = report.categories.iter().map(|c| c.total).sum();
    assert_eq!(category_total, 5);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["overallPercentage"], serde_json::json!(100.0));
    assert_eq!(json["completedAt"], serde_json::to_value(fixed_now()).unwrap());
    assert_eq!(json["startedAt"], serde_json::to_value(fixed_now()).unwrap());
    assert!(json.get("overall_percentage").is_none());
    assert_eq!(json["categories"].as_array().map(Vec::len), Some(report.categories.len()));
}

#[tokio::test]
async fn start_without_preferences_requires_onboarding() {
    let repo = InMemoryRepository::with_questions(builtin_questions().unwrap());
    let loop_svc = loop_service(&repo, Identity::signed_in(UserId::new("ana")));

    let err = loop_svc.start_session().await.unwrap_err();
    assert!(matches!(err, SessionError::MissingPreferences { .. }));
}

#[tokio::test]
async fn applying_preferences_persists_and_redraws() {
    let repo = InMemoryRepository::with_questions(builtin_questions().unwrap());
    let user = UserId::new("ana");
    let loop_svc = loop_service(&repo, Identity::signed_in(user.clone()));

    loop_svc
        .save_preferences(draft(&["cardiology"], 3))
        .await
        .unwrap();
    let mut session = loop_svc.start_session().await.unwrap();
    session.skip();

    let mut next = draft(&["neurology"], 3);
    next.difficulties = [Difficulty::Hard].into_iter().collect();
    loop_svc.apply_preferences(&mut session, next).await.unwrap();

    assert_eq!(session.progress().attempted, 0);
    for question in session.state().questions() {
        assert_eq!(question.category().id().as_str(), "neurology");
        assert_eq!(question.difficulty(), Difficulty::Hard);
    }

    let stored = repo.load_preferences(&user).await.unwrap().unwrap();
    assert_eq!(stored.categories().len(), 1);
    assert!(stored.categories().contains(&CategoryId::new("neurology")));
}

#[tokio::test]
async fn seeded_loops_draw_the_same_sessions() {
    let repo = InMemoryRepository::with_questions(builtin_questions().unwrap());
    let prefs = draft(&["cardiology", "neurology", "endocrinology"], 4)
        .validate()
        .unwrap();

    let ids = |s: &services::PracticeSession| {
        s.state()
            .questions()
            .iter()
            .map(|q| q.id().clone())
            .collect::<Vec<_>>()
    };

    let a = loop_service(&repo, Identity::guest())
        .start_with(prefs.clone())
        .await
        .unwrap();
    let b = loop_service(&repo, Identity::guest())
        .start_with(prefs)
        .await
        .unwrap();
    assert_eq!(ids(&a), ids(&b));
}

#[tokio::test]
async fn app_services_seed_an_empty_bank_once() {
    let storage = Storage::in_memory(Vec::new());
    let identity: Arc<Identity> = Arc::new(Identity::guest());

    let first = AppServices::from_storage(storage.clone(), Clock::fixed(fixed_now()), identity.clone())
        .await
        .unwrap();
    assert!(first.seeded_bank());

    let second = AppServices::from_storage(storage, Clock::fixed(fixed_now()), identity)
        .await
        .unwrap();
    assert!(!second.seeded_bank());
    assert_eq!(
        second.questions().all_questions().await.unwrap().len(),
        builtin_questions().unwrap().len()
    );
}
