mod common;

use common::{fast_expansion, products, MockPage, MockSession};
use shelf_config::ExpansionConfig;
use shelf_web::{DynamicContentExpander, SessionError, Termination};

fn expander() -> DynamicContentExpander {
    DynamicContentExpander::new(&fast_expansion())
}

#[tokio::test]
async fn absent_trigger_finishes_after_one_lookup() {
    let session = MockSession::loaded(MockPage::with_items(products("p", 3)));

    let report = expander().expand(&session).await.unwrap();

    assert_eq!(report.activations, 0);
    assert_eq!(report.termination, Termination::TriggerAbsent);
    session.with_calls(|c| {
        assert_eq!(c.interactable_waits, 1);
        assert_eq!(c.trigger_activations, 0);
    });
}

#[tokio::test]
async fn trigger_vanishing_after_two_loads_means_two_activations() {
    let page = MockPage::with_items(products("p", 3))
        .batches(vec![products("a", 3), products("b", 2)]);
    let session = MockSession::loaded(page);

    let report = expander().expand(&session).await.unwrap();

    assert_eq!(report.activations, 2);
    assert_eq!(report.termination, Termination::TriggerAbsent);
    assert_eq!(session.item_count(), 8);
    session.with_calls(|c| {
        assert_eq!(c.trigger_activations, 2);
        assert_eq!(c.interactable_waits, 3);
    });
}

#[tokio::test]
async fn terminates_for_any_number_of_batches() {
    for k in 0..6 {
        let page = MockPage::with_items(products("p", 1))
            .batches((0..k).map(|i| products(&format!("b{i}"), 1)).collect());
        let session = MockSession::loaded(page);

        let report = expander().expand(&session).await.unwrap();

        assert_eq!(report.activations, k as u32, "k = {k}");
        assert_eq!(session.item_count(), 1 + k);
    }
}

#[tokio::test]
async fn click_without_new_items_ends_the_loop() {
    let page = MockPage {
        stuck_trigger: true,
        ..MockPage::with_items(products("p", 2)).batches(vec![products("a", 2)])
    };
    let session = MockSession::loaded(page);

    let report = expander().expand(&session).await.unwrap();

    assert_eq!(report.activations, 2);
    assert_eq!(report.termination, Termination::NoNewContent);
    assert_eq!(session.item_count(), 4);
}

#[tokio::test]
async fn refused_click_is_exhaustion_not_failure() {
    let page = MockPage {
        reject_clicks: true,
        ..MockPage::with_items(products("p", 2))
    };
    let session = MockSession::loaded(page);

    let report = expander().expand(&session).await.unwrap();

    assert_eq!(report.activations, 0);
    assert_eq!(report.termination, Termination::TriggerRejected);
}

#[tokio::test]
async fn endless_page_stops_at_round_limit() {
    let page = MockPage {
        endless: true,
        ..MockPage::with_items(products("p", 1))
    };
    let session = MockSession::loaded(page);
    let expander = DynamicContentExpander::new(&ExpansionConfig {
        max_rounds: Some(7),
        ..fast_expansion()
    });

    let report = expander.expand(&session).await.unwrap();

    assert_eq!(report.activations, 7);
    assert_eq!(report.termination, Termination::RoundLimit);
    assert_eq!(session.item_count(), 8);
}

#[tokio::test]
async fn lost_session_is_propagated() {
    let session = MockSession::loaded(MockPage::with_items(products("p", 1)));
    session.lose_session();

    let result = expander().expand(&session).await;

    assert!(matches!(result, Err(SessionError::Driver(_))));
}
