use std::sync::Arc;
use std::time::Duration;

use bookbay::testing::{fixtures, MockAdapter};
use bookbay::{
    Controller, Event, MagnetLink, Response, SearchQuery, SessionState, SessionStore, UNAVAILABLE,
};

const HASH: &str = "c9e15763f722f23e98a29decdfae341b98d53056";

fn controller(adapter: &Arc<MockAdapter>) -> Controller {
    Controller::new(adapter.clone(), Arc::new(SessionStore::new()), 1024)
}

#[tokio::test]
async fn test_new_query_then_next_fetches_page_two() {
    let adapter = Arc::new(MockAdapter::new());
    adapter
        .set_page("dune", 1, fixtures::items(&["Dune", "Dune Messiah"]))
        .await;
    adapter
        .set_page("dune", 2, fixtures::items(&["Children of Dune"]))
        .await;
    let controller = controller(&adapter);

    let response = controller.handle(1, Event::NewQuery("  Dune ".into())).await;
    match response {
        Response::Results { query, page, items } => {
            assert_eq!(query, "Dune");
            assert_eq!(page, 1);
            assert_eq!(items.len(), 2);
        }
        other => panic!("unexpected response: {:?}", other),
    }

    let response = controller.handle(1, Event::Next).await;
    match response {
        Response::Results { page, items, .. } => {
            assert_eq!(page, 2);
            assert_eq!(items[0].title, "Children of Dune");
        }
        other => panic!("unexpected response: {:?}", other),
    }

    assert_eq!(
        adapter.listing_calls().await,
        vec![("dune".to_string(), 1), ("dune".to_string(), 2)]
    );
    let session = controller.sessions().get(1).await.unwrap();
    assert_eq!(session.page(), 2);
}

#[tokio::test]
async fn test_next_increments_on_empty_pages() {
    let adapter = Arc::new(MockAdapter::new());
    adapter.set_page("dune", 1, fixtures::items(&["Dune"])).await;
    let controller = controller(&adapter);

    controller.handle(1, Event::NewQuery("dune".into())).await;
    for expected in 2..=4 {
        match controller.handle(1, Event::Next).await {
            Response::Results { page, items, .. } => {
                assert_eq!(page, expected);
                assert!(items.is_empty());
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }
    assert_eq!(controller.sessions().get(1).await.unwrap().page(), 4);
}

#[tokio::test]
async fn test_next_on_last_representable_page_stays_put() {
    let adapter = Arc::new(MockAdapter::new());
    let controller = controller(&adapter);

    let mut state = SessionState::new(SearchQuery::normalize("dune"), Vec::new());
    state.show_page(u32::MAX, Vec::new());
    controller.sessions().put(1, state).await;

    match controller.handle(1, Event::Next).await {
        Response::Results { page, .. } => assert_eq!(page, u32::MAX),
        other => panic!("unexpected response: {:?}", other),
    }
    assert_eq!(controller.sessions().get(1).await.unwrap().page(), u32::MAX);
}

#[tokio::test]
async fn test_prev_on_first_page_is_noop_without_fetch() {
    let adapter = Arc::new(MockAdapter::new());
    adapter.set_page("dune", 1, fixtures::items(&["Dune"])).await;
    let controller = controller(&adapter);

    controller.handle(1, Event::NewQuery("dune".into())).await;
    assert_eq!(controller.handle(1, Event::Prev).await, Response::Unchanged);
    assert_eq!(controller.sessions().get(1).await.unwrap().page(), 1);
    assert_eq!(adapter.listing_calls().await.len(), 1);
}

#[tokio::test]
async fn test_prev_refetches_previous_page() {
    let adapter = Arc::new(MockAdapter::new());
    adapter.set_page("dune", 1, fixtures::items(&["Dune"])).await;
    let controller = controller(&adapter);

    controller.handle(1, Event::NewQuery("dune".into())).await;
    controller.handle(1, Event::Next).await;
    match controller.handle(1, Event::Prev).await {
        Response::Results { page, items, .. } => {
            assert_eq!(page, 1);
            assert_eq!(items[0].title, "Dune");
        }
        other => panic!("unexpected response: {:?}", other),
    }
    assert_eq!(adapter.listing_calls().await.len(), 3);
}

#[tokio::test]
async fn test_select_without_hash_then_reveal_has_no_magnet() {
    let adapter = Arc::new(MockAdapter::new());
    let results = fixtures::items(&["Dune"]);
    adapter
        .set_detail(&results[0].detail_link, fixtures::detail("Dune", None, &[]))
        .await;
    adapter.set_page("dune", 1, results).await;
    let controller = controller(&adapter);

    controller.handle(1, Event::NewQuery("dune".into())).await;
    match controller.handle(1, Event::Select(0)).await {
        Response::Item { detail, caption } => {
            assert_eq!(detail.magnet, MagnetLink::Unavailable);
            assert_eq!(caption, "Dune\n\nDune read in full.");
        }
        other => panic!("unexpected response: {:?}", other),
    }

    let session = controller.sessions().get(1).await.unwrap();
    assert_eq!(session.selected.unwrap().magnet.as_str(), UNAVAILABLE);
    assert_eq!(controller.handle(1, Event::RevealMagnet).await, Response::NoMagnet);
}

#[tokio::test]
async fn test_select_then_reveal_returns_cached_magnet() {
    let adapter = Arc::new(MockAdapter::new());
    let results = fixtures::items(&["Dune"]);
    let detail = fixtures::detail("Dune", Some(HASH), &["udp://tracker.example:1337"]);
    let expected = detail.magnet.uri().unwrap().to_string();
    adapter.set_detail(&results[0].detail_link, detail).await;
    adapter.set_page("dune", 1, results).await;
    let controller = controller(&adapter);

    controller.handle(1, Event::NewQuery("dune".into())).await;
    controller.handle(1, Event::Select(0)).await;
    assert_eq!(
        controller.handle(1, Event::RevealMagnet).await,
        Response::Magnet { uri: expected }
    );
    // Revealing reads the cache; no further fetches.
    assert_eq!(adapter.detail_calls().await.len(), 1);
}

#[tokio::test]
async fn test_reveal_before_any_selection() {
    let adapter = Arc::new(MockAdapter::new());
    adapter.set_page("dune", 1, fixtures::items(&["Dune"])).await;
    let controller = controller(&adapter);

    controller.handle(1, Event::NewQuery("dune".into())).await;
    assert_eq!(controller.handle(1, Event::RevealMagnet).await, Response::NoMagnet);
}

#[tokio::test]
async fn test_page_change_closes_open_item() {
    let adapter = Arc::new(MockAdapter::new());
    let results = fixtures::items(&["Dune"]);
    adapter
        .set_detail(&results[0].detail_link, fixtures::detail("Dune", Some(HASH), &[]))
        .await;
    adapter.set_page("dune", 1, results).await;
    let controller = controller(&adapter);

    controller.handle(1, Event::NewQuery("dune".into())).await;
    controller.handle(1, Event::Select(0)).await;
    controller.handle(1, Event::Next).await;
    assert_eq!(controller.handle(1, Event::RevealMagnet).await, Response::NoMagnet);
}

#[tokio::test]
async fn test_out_of_range_select_leaves_state() {
    let adapter = Arc::new(MockAdapter::new());
    adapter.set_page("dune", 1, fixtures::items(&["Dune"])).await;
    let controller = controller(&adapter);

    controller.handle(1, Event::NewQuery("dune".into())).await;
    let before = controller.sessions().get(1).await;
    assert_eq!(
        controller.handle(1, Event::Select(5)).await,
        Response::InvalidSelection {
            index: 5,
            available: 1
        }
    );
    assert_eq!(controller.sessions().get(1).await, before);
    assert!(adapter.detail_calls().await.is_empty());
}

#[tokio::test]
async fn test_detail_failure_keeps_prior_selection() {
    let adapter = Arc::new(MockAdapter::new());
    let results = fixtures::items(&["Dune", "Missing"]);
    adapter
        .set_detail(&results[0].detail_link, fixtures::detail("Dune", Some(HASH), &[]))
        .await;
    adapter.set_page("dune", 1, results).await;
    let controller = controller(&adapter);

    controller.handle(1, Event::NewQuery("dune".into())).await;
    controller.handle(1, Event::Select(0)).await;
    let before = controller.sessions().get(1).await;

    match controller.handle(1, Event::Select(1)).await {
        Response::FetchFailed { reason } => assert!(reason.contains("404")),
        other => panic!("unexpected response: {:?}", other),
    }
    assert_eq!(controller.sessions().get(1).await, before);
}

#[tokio::test]
async fn test_events_without_session_are_expired() {
    let adapter = Arc::new(MockAdapter::new());
    let controller = controller(&adapter);

    for event in [Event::Next, Event::Prev, Event::Select(0), Event::RevealMagnet] {
        assert_eq!(controller.handle(42, event).await, Response::Expired);
    }
    assert_eq!(adapter.total_calls().await, 0);
    assert!(controller.sessions().is_empty().await);
    assert!(controller.sessions().get(42).await.is_none());
}

#[tokio::test]
async fn test_new_query_replaces_session() {
    let adapter = Arc::new(MockAdapter::new());
    adapter.set_page("dune", 1, fixtures::items(&["Dune"])).await;
    adapter.set_page("emma", 1, fixtures::items(&["Emma"])).await;
    let controller = controller(&adapter);

    controller.handle(1, Event::NewQuery("dune".into())).await;
    controller.handle(1, Event::Next).await;
    controller.handle(1, Event::NewQuery("Emma".into())).await;

    let session = controller.sessions().get(1).await.unwrap();
    assert_eq!(session.query.normalized(), "emma");
    assert_eq!(session.page(), 1);
    assert_eq!(session.results[0].title, "Emma");
    assert!(session.selected.is_none());
}

#[tokio::test]
async fn test_empty_first_page_is_no_results_but_session_exists() {
    let adapter = Arc::new(MockAdapter::new());
    let controller = controller(&adapter);

    assert_eq!(
        controller.handle(1, Event::NewQuery("zzz".into())).await,
        Response::NoResults {
            query: "zzz".to_string()
        }
    );
    assert!(controller.sessions().get(1).await.is_some());
}

#[tokio::test]
async fn test_listing_transport_failure_keeps_page() {
    let adapter = Arc::new(MockAdapter::new());
    adapter.set_page("dune", 1, fixtures::items(&["Dune"])).await;
    let controller = controller(&adapter);

    controller.handle(1, Event::NewQuery("dune".into())).await;
    adapter.fail_listings(true).await;
    assert!(matches!(
        controller.handle(1, Event::Next).await,
        Response::FetchFailed { .. }
    ));
    assert_eq!(controller.sessions().get(1).await.unwrap().page(), 1);
}

#[tokio::test]
async fn test_double_tap_is_serialized_per_user() {
    let adapter = Arc::new(MockAdapter::new());
    adapter.set_page("dune", 1, fixtures::items(&["Dune"])).await;
    let controller = Arc::new(controller(&adapter));
    controller.handle(1, Event::NewQuery("dune".into())).await;
    adapter.set_delay(Duration::from_millis(10)).await;

    let (a, b) = futures::join!(
        controller.handle(1, Event::Next),
        controller.handle(1, Event::Next)
    );
    let mut pages: Vec<u32> = [a, b]
        .into_iter()
        .map(|r| match r {
            Response::Results { page, .. } => page,
            other => panic!("unexpected response: {:?}", other),
        })
        .collect();
    pages.sort();
    assert_eq!(pages, vec![2, 3]);
    assert_eq!(controller.sessions().get(1).await.unwrap().page(), 3);
}

#[tokio::test]
async fn test_users_do_not_share_state() {
    let adapter = Arc::new(MockAdapter::new());
    adapter.set_page("dune", 1, fixtures::items(&["Dune"])).await;
    adapter.set_page("emma", 1, fixtures::items(&["Emma"])).await;
    let controller = controller(&adapter);
    adapter.set_delay(Duration::from_millis(5)).await;

    futures::join!(
        controller.handle(1, Event::NewQuery("dune".into())),
        controller.handle(2, Event::NewQuery("emma".into()))
    );
    controller.handle(1, Event::Next).await;

    assert_eq!(controller.sessions().get(1).await.unwrap().page(), 2);
    let other = controller.sessions().get(2).await.unwrap();
    assert_eq!(other.page(), 1);
    assert_eq!(other.results[0].title, "Emma");
}
