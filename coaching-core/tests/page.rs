use coaching_core::list::ListView;
use coaching_core::memory::{InMemoryApplications, InMemorySessions};
use coaching_core::view::SUCCESS_MESSAGE;
use coaching_core::{ApplicationFeed, CoachingPage, RefreshPolicy, RemoteError, Screen, Session};
use futures::StreamExt;

fn ada() -> Session {
    Session {
        identity: "Ada".into(),
        avatar_url: Some("https://cdn.example/ada.png".into()),
    }
}

#[tokio::test]
async fn anonymous_mount_shows_only_login() {
    let api = InMemoryApplications::new();
    let page = CoachingPage::new(InMemorySessions::signed_out(), api.clone(), RefreshPolicy::Patch);
    page.mount().await;

    let Screen::SignedOut(view) = page.render() else {
        panic!("expected login screen");
    };
    assert_eq!(view.login.len(), 1);
    assert_eq!(view.login[0].label, "Login with Discord");
    assert!(page.render().submit_control().is_none());
    assert!(api.calls().is_empty(), "no list query without a session");
}

#[tokio::test]
async fn signed_in_with_no_applications() {
    let page = CoachingPage::new(
        InMemorySessions::signed_in(ada()),
        InMemoryApplications::new(),
        RefreshPolicy::Patch,
    );
    page.mount().await;

    let Screen::SignedIn(view) = page.render() else {
        panic!("expected dashboard");
    };
    assert_eq!(view.identity, "Ada");
    assert_eq!(
        view.list,
        ListView::Empty {
            message: "No applications from you yet"
        }
    );
    assert!(!view.form.submit_enabled);
}

#[tokio::test]
async fn submit_then_delete_with_each_policy() {
    for policy in [RefreshPolicy::Patch, RefreshPolicy::Refetch] {
        let api = InMemoryApplications::new();
        api.seed("Ada", "older request");
        let page = CoachingPage::new(InMemorySessions::signed_in(ada()), api.clone(), policy);
        page.mount().await;
        assert_eq!(page.view().applications().len(), 1);

        page.set_draft("feeling stuck");
        assert!(page.submit().await);

        let Screen::SignedIn(view) = page.render() else {
            panic!("expected dashboard");
        };
        assert_eq!(view.toast, Some(SUCCESS_MESSAGE));
        assert_eq!(view.form.draft, "");
        assert_eq!(page.view().applications().len(), 2);
        let created = page
            .view()
            .applications()
            .iter()
            .find(|a| a.description == "feeling stuck")
            .cloned()
            .expect("new entry");

        assert!(page.delete(&created.id).await);
        assert!(page.view().applications().iter().all(|a| a.id != created.id));
        assert_eq!(api.rows().len(), 1);

        let expected_lists = if policy == RefreshPolicy::Refetch { 3 } else { 1 };
        let lists = api.calls().iter().filter(|c| c.starts_with("list:")).count();
        assert_eq!(lists, expected_lists, "{policy:?}");
    }
}

#[tokio::test]
async fn delete_of_unknown_id_is_local_noop() {
    let api = InMemoryApplications::new();
    api.seed("Ada", "keep me");
    let page = CoachingPage::new(InMemorySessions::signed_in(ada()), api.clone(), RefreshPolicy::Patch);
    page.mount().await;
    let before = page.view().applications().to_vec();

    assert!(!page.delete(&"does-not-exist".into()).await);
    assert_eq!(page.view().applications(), before.as_slice());
    assert!(api.calls().iter().all(|c| !c.starts_with("delete:")));
}

#[tokio::test]
async fn remote_failures_surface_as_alert() {
    let api = InMemoryApplications::new();
    let page = CoachingPage::new(InMemorySessions::signed_in(ada()), api.clone(), RefreshPolicy::Patch);
    page.mount().await;

    page.set_draft("feeling stuck");
    api.fail_next(RemoteError::Graphql("Uniqueness violation".into()));
    assert!(!page.submit().await);

    assert_eq!(page.view_mut().take_alert().as_deref(), Some("Uniqueness violation"));
    assert!(page.render().submit_control().expect("form").submit_enabled);
    assert!(page.view().applications().is_empty());
}

#[tokio::test]
async fn sign_in_and_out() {
    let sessions = InMemorySessions::signed_in(ada());
    let page = CoachingPage::new(sessions.clone(), InMemoryApplications::new(), RefreshPolicy::Patch);
    page.mount().await;

    page.sign_out().await;
    assert!(matches!(page.render(), Screen::SignedOut(_)));

    page.sign_in("discord").await;
    assert_eq!(sessions.redirects(), vec!["/api/auth/signin/discord"]);
}

#[tokio::test]
async fn follow_applies_live_snapshots() {
    let api = InMemoryApplications::new();
    let page = CoachingPage::new(InMemorySessions::signed_in(ada()), api.clone(), RefreshPolicy::Patch);
    page.mount().await;

    let feed = api.watch("Ada");
    api.seed("Ada", "pushed from elsewhere");
    page.follow(feed.take(2)).await;

    assert_eq!(page.view().applications().len(), 1);
    assert_eq!(page.view().applications()[0].description, "pushed from elsewhere");
}
