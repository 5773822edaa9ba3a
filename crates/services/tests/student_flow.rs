use career_core::model::Grade;
use career_core::time::fixed_now;
use serde_json::json;
use services::{AppServices, AuthError, Clock, CredentialHasher, ProfileChanges};
use storage::repository::Storage;

fn services() -> AppServices {
    AppServices::new(
        Storage::in_memory(),
        Clock::fixed(fixed_now()),
        CredentialHasher::with_cost(8, 1, 1).expect("params"),
    )
}

#[tokio::test]
async fn register_quiz_roadmap_and_retake() {
    let app = services();

    let user = app
        .auth()
        .register("A", "a@x.com", "p", Some(Grade::Tenth))
        .await
        .expect("register");
    let session = app.sessions().start(&user).await.expect("session");
    let me = session.user.clone();

    app.quiz()
        .save(&me, json!({ "interests": ["biology"] }), json!(["Nurse", "Doctor"]))
        .await
        .expect("save quiz");
    assert!(app.quiz().has_completed("a@x.com").await.expect("check"));

    app.roadmap()
        .complete(me.id, "Nurse", Some(2))
        .await
        .expect("complete");
    assert_eq!(
        app.roadmap().completed_steps(me.id, "Nurse").await.expect("list"),
        vec![2]
    );
    app.roadmap()
        .uncomplete(me.id, "Nurse", Some(2))
        .await
        .expect("uncomplete");
    assert!(app
        .roadmap()
        .completed_steps(me.id, "Nurse")
        .await
        .expect("list")
        .is_empty());

    let retake = app
        .quiz()
        .clear(&me, Some(Grade::Eleventh))
        .await
        .expect("clear");
    app.sessions()
        .update_user(&session.id, retake.clone())
        .await
        .expect("session update");
    assert!(!app.quiz().has_completed("a@x.com").await.expect("check"));

    let loaded = app
        .sessions()
        .load(&session.id)
        .await
        .expect("load")
        .expect("live session");
    assert_eq!(loaded.user.grade, Grade::Eleventh);
    assert_eq!(
        app.auth().login("a@x.com", "p").await.expect("login").grade(),
        Grade::Eleventh
    );
}

#[tokio::test]
async fn profile_and_favorites_follow_the_session_user() {
    let app = services();
    let user = app
        .auth()
        .register("A", "a@x.com", "p", Some(Grade::Twelfth))
        .await
        .expect("register");
    let session = app.sessions().start(&user).await.expect("session");

    let updated = app
        .profile()
        .update(
            &session.user,
            ProfileChanges {
                name: Some("Alex".into()),
                grade: None,
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.name.as_str(), "Alex");
    assert_eq!(updated.grade, Grade::Twelfth);

    app.favorites()
        .add(user.id(), "Software Engineer")
        .await
        .expect("favorite");
    assert_eq!(
        app.favorites().list(user.id()).await.expect("list"),
        vec!["Software Engineer".to_string()]
    );
}

#[tokio::test]
async fn duplicate_registration_creates_no_second_account() {
    let app = services();
    let first = app
        .auth()
        .register("A", "a@x.com", "p", Some(Grade::Tenth))
        .await
        .expect("register");
    let err = app
        .auth()
        .register("A", "a@x.com", "other", Some(Grade::Tenth))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, AuthError::AlreadyRegistered));
    assert_eq!(err.to_string(), "User already exists");

    // The original password still works, so the row was not replaced.
    let again = app.auth().login("a@x.com", "p").await.expect("login");
    assert_eq!(again.id(), first.id());
}

#[tokio::test]
async fn viewed_careers_and_searches_are_per_user() {
    let app = services();
    let a = app
        .auth()
        .register("A", "a@x.com", "p", Some(Grade::Tenth))
        .await
        .expect("register a");
    let b = app
        .auth()
        .register("B", "b@x.com", "p", Some(Grade::Tenth))
        .await
        .expect("register b");
    assert_ne!(a.id(), b.id());

    app.activity().record_view(a.id(), "Nurse").await.expect("view");
    app.activity().record_view(a.id(), "Pilot").await.expect("view");
    app.activity()
        .record_search(b.id(), "engineering")
        .await
        .expect("search");

    assert_eq!(
        app.activity().viewed_careers(a.id()).await.expect("views"),
        vec!["Pilot".to_string(), "Nurse".to_string()]
    );
    assert!(app
        .activity()
        .viewed_careers(b.id())
        .await
        .expect("views")
        .is_empty());
    assert_eq!(
        app.activity().search_history(b.id()).await.expect("searches"),
        vec!["engineering".to_string()]
    );
}
