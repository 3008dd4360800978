//! Integration tests for catalog navigation: drill down, go back, switch tabs.
//!
//! The network-backed tests run the app's listing fetches against a local
//! mock server and apply the results exactly as the event loop would.

use coursenav::api::{CatalogClient, CatalogNode, ClientOptions};
use coursenav::app::{App, Effect, Listing, LoadOutcome, LoadRequest, Section};
use coursenav::nav::{ScreenState, Tab};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PLAYER_PAGE: &str = "https://player.test/pwplayer.html";

async fn mock_catalog() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/pw/batches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Arjuna JEE 2025", "url": "/api/pw/subjects?batchId=arjuna"},
            {"name": "Lakshya NEET", "url": "/api/pw/subjects?batchId=lakshya"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/pw/subjects"))
        .and(query_param("batchId", "arjuna"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Physics", "url": "/api/pw/chapters?subjectId=phy"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/pw/todayclass"))
        .and(query_param("batchId", "arjuna"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"title": "Live: Kinematics", "url": "live-kinematics"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/pw/chapters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Optics", "url": "/api/pw/lectures?chapterId=optics%2Fvideos"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/pw/lectures"))
        .and(query_param("chapterId", "optics/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"title": "Lecture 1", "url": "lecture-1"},
            {"title": "Lecture 2", "url": "lecture-2"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/pw/notes"))
        .and(query_param("chapterId", "optics/notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"title": "Optics Notes", "url": "https://cdn.test/optics.pdf"}
        ])))
        .mount(&server)
        .await;

    server
}

fn app_for(server: &MockServer) -> App {
    let client = CatalogClient::new(&server.uri(), ClientOptions::default()).unwrap();
    App::new(client, PLAYER_PAGE)
}

/// Run a listing fetch and apply it, as the event loop does.
async fn settle(app: &mut App, request: Option<LoadRequest>) {
    if let Some(req) = request {
        let outcome = req.target.execute(&app.client).await;
        assert!(app.apply_load(req.generation, outcome));
    }
}

async fn select_and_settle(app: &mut App) {
    match app.select() {
        Some(Effect::Load(req)) => settle(app, Some(req)).await,
        other => panic!("expected a listing load, got {:?}", other),
    }
}

fn node_names(app: &App) -> Vec<String> {
    match app.listing.ready() {
        Some(Listing::Nodes(nodes)) => nodes.iter().map(|n| n.name.clone()).collect(),
        other => panic!("expected catalog nodes, got {:?}", other),
    }
}

fn media_titles(app: &App) -> Vec<String> {
    match app.listing.ready() {
        Some(Listing::Media(items)) => items.iter().map(|i| i.title.clone()).collect(),
        other => panic!("expected media items, got {:?}", other),
    }
}

// ============================================================================
// Drill-down against the mock catalog
// ============================================================================

#[tokio::test]
async fn test_drill_down_to_lectures() {
    let server = mock_catalog().await;
    let mut app = app_for(&server);

    let start = app.start();
    settle(&mut app, start).await;
    assert_eq!(node_names(&app), vec!["Arjuna JEE 2025", "Lakshya NEET"]);

    select_and_settle(&mut app).await;
    assert_eq!(app.stack.depth(), 1);
    assert_eq!(node_names(&app), vec!["Physics"]);
    let today = app.today_classes.ready().expect("today's classes loaded");
    assert_eq!(today[0].title, "Live: Kinematics");

    select_and_settle(&mut app).await;
    assert_eq!(app.stack.depth(), 2);
    assert_eq!(node_names(&app), vec!["Optics"]);
    assert_eq!(app.today_classes, Section::Hidden);

    select_and_settle(&mut app).await;
    assert_eq!(app.stack.depth(), 3);
    assert_eq!(
        app.screen,
        ScreenState::Content {
            tab: Tab::Lectures,
            chapter_id: "optics/videos".to_string(),
            title: "Optics".to_string(),
        }
    );
    assert_eq!(media_titles(&app), vec!["Lecture 1", "Lecture 2"]);
}

#[tokio::test]
async fn test_today_classes_failure_does_not_block_subjects() {
    let server = mock_catalog().await;
    Mock::given(method("GET"))
        .and(path("/api/pw/subjects"))
        .and(query_param("batchId", "lakshya"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Biology", "url": "/api/pw/chapters?subjectId=bio"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/pw/todayclass"))
        .and(query_param("batchId", "lakshya"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut app = app_for(&server);
    let start = app.start();
    settle(&mut app, start).await;
    app.nav_down();
    select_and_settle(&mut app).await;

    assert_eq!(node_names(&app), vec!["Biology"]);
    assert_eq!(app.today_classes, Section::Unavailable);
    assert_eq!(app.alert, None);
}

#[tokio::test]
async fn test_tab_switch_keeps_depth_and_back_returns_to_chapters() {
    let server = mock_catalog().await;
    let mut app = app_for(&server);

    let start = app.start();
    settle(&mut app, start).await;
    for _ in 0..3 {
        select_and_settle(&mut app).await;
    }
    assert_eq!(app.stack.depth(), 3);

    let req = app.switch_tab(Tab::Notes);
    settle(&mut app, req).await;
    assert_eq!(app.stack.depth(), 3);
    assert_eq!(media_titles(&app), vec!["Optics Notes"]);

    // Unmocked tab: the listing fails but navigation is unaffected
    let req = app.next_tab();
    settle(&mut app, req).await;
    assert_eq!(app.stack.depth(), 3);
    assert_eq!(app.listing, Section::Unavailable);
    assert!(matches!(
        app.screen,
        ScreenState::Content {
            tab: Tab::DppNotes,
            ..
        }
    ));

    let req = app.go_back();
    settle(&mut app, req).await;
    assert_eq!(app.stack.depth(), 2);
    assert!(matches!(app.screen, ScreenState::Chapters { .. }));
    assert_eq!(node_names(&app), vec!["Optics"]);
}

#[tokio::test]
async fn test_back_to_root_uses_cached_batches() {
    let server = mock_catalog().await;
    let mut app = app_for(&server);

    let start = app.start();
    settle(&mut app, start).await;
    select_and_settle(&mut app).await;

    assert_eq!(app.go_back(), None);
    assert!(app.screen.is_root());
    assert_eq!(node_names(&app).len(), 2);

    let batch_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/pw/batches")
        .count();
    assert_eq!(batch_requests, 1);
}

#[tokio::test]
async fn test_stale_listing_is_dropped() {
    let server = mock_catalog().await;
    let mut app = app_for(&server);

    let first = app.start().unwrap();
    let outcome = first.target.execute(&app.client).await;
    // The user reloads before the first fetch lands
    let second = app.reload().unwrap();

    assert!(!app.apply_load(first.generation, outcome));
    assert_eq!(app.listing, Section::Loading);
    settle(&mut app, Some(second)).await;
    assert_eq!(node_names(&app).len(), 2);
}

// ============================================================================
// Stack restoration
// ============================================================================

fn offline_app() -> App {
    let client = CatalogClient::new("http://127.0.0.1:9", ClientOptions::default()).unwrap();
    App::new(client, PLAYER_PAGE)
}

fn nodes(names: &[&str], url: &str) -> Listing {
    Listing::Nodes(
        names
            .iter()
            .map(|name| CatalogNode {
                name: name.to_string(),
                url: url.to_string(),
                image: None,
            })
            .collect(),
    )
}

/// Apply a canned listing for whatever the current screen asked for.
fn fake_settle(app: &mut App, req: LoadRequest) {
    let listing = match app.screen {
        ScreenState::Root { .. } => nodes(&["alpha", "beta"], "/api/pw/subjects?batchId=b1"),
        ScreenState::Subjects { .. } => nodes(&["Physics"], "/api/pw/chapters?subjectId=s1"),
        ScreenState::Chapters { .. } => {
            nodes(&["Optics"], "/api/pw/lectures?chapterId=c1%2Fvideos")
        }
        ScreenState::Content { .. } => Listing::Media(Vec::new()),
    };
    let today_classes = matches!(app.screen, ScreenState::Subjects { .. }).then_some(None);
    assert!(app.apply_load(
        req.generation,
        LoadOutcome {
            listing: Ok(listing),
            today_classes,
        }
    ));
}

proptest! {
    #[test]
    fn drill_down_then_back_restores_root(filter in "[ab]?", depth in 0usize..=3) {
        let mut app = offline_app();
        let req = app.start().unwrap();
        fake_settle(&mut app, req);

        if app.enter_search() {
            for c in filter.chars() {
                app.push_search_char(c);
            }
            app.commit_search();
        }
        let initial = app.screen.clone();

        for _ in 0..depth {
            match app.select() {
                Some(Effect::Load(req)) => fake_settle(&mut app, req),
                other => panic!("expected a listing load, got {:?}", other),
            }
        }
        prop_assert_eq!(app.stack.depth(), depth);

        for _ in 0..depth {
            if let Some(req) = app.go_back() {
                fake_settle(&mut app, req);
            }
        }

        prop_assert!(app.stack.is_empty());
        prop_assert_eq!(&app.screen, &initial);
        prop_assert_eq!(app.current_filter(), filter.as_str());
        prop_assert_eq!(app.search_input.as_str(), filter.as_str());
    }

    #[test]
    fn tab_switches_never_touch_the_stack(tabs in proptest::collection::vec(0usize..4, 0..8)) {
        let mut app = offline_app();
        let req = app.start().unwrap();
        fake_settle(&mut app, req);
        for _ in 0..3 {
            match app.select() {
                Some(Effect::Load(req)) => fake_settle(&mut app, req),
                other => panic!("expected a listing load, got {:?}", other),
            }
        }

        for i in tabs {
            if let Some(req) = app.switch_tab(Tab::ALL[i]) {
                fake_settle(&mut app, req);
            }
            prop_assert_eq!(app.stack.depth(), 3);
        }
    }
}
