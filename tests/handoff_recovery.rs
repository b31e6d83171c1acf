//! Mobile deep-link handoff and its recovery on the next page load.

use std::sync::Arc;

use wallet_bridge::config::WalletConfig;
use wallet_bridge::wallet::{
    Collaborators, ConnectionStatus, FileStore, KeyValueStore, MemoryStore, Outcome,
    PendingConnectionRecovery, ProviderError, RecoveryReport, Selection, WalletContext,
    WalletError,
};

mod common;
use common::{
    desktop_page, metamask, mobile_page, CountingModal, FailingNavigator, ScriptedConnector,
    UndeletableStore, IPHONE_UA,
};

const KEY: &str = "wallet-bridge.pending-handoff";

#[tokio::test]
async fn test_mobile_selection_hands_off_and_resumes() {
    let store = Arc::new(MemoryStore::new());

    // First load: plain mobile browser, nothing injected.
    let page = mobile_page(store.clone(), &[]);
    assert_eq!(page.context.on_page_load().await.unwrap(), RecoveryReport::NoRecord);
    let selection = page.context.select_wallet("trust").await.unwrap();

    let expected = "https://link.trustwallet.com/open_url?url=https%3A%2F%2Flocalhost%3A5173%2F";
    assert_eq!(
        selection,
        Selection::HandedOff(url::Url::parse(expected).unwrap())
    );
    assert_eq!(page.navigator.visited().len(), 1);
    assert_eq!(page.modal.opened(), 0);
    let pending = page.context.recovery().peek().unwrap().unwrap();
    assert_eq!(pending.wallet_id, "trust");

    // Second load: inside the wallet's browser.
    let trust = Arc::new(ScriptedConnector::new("com.trustwallet", "Trust Wallet"));
    let page = mobile_page(store.clone(), &[trust.clone()]);
    let report = page.context.on_page_load().await.unwrap();

    assert_eq!(
        report,
        RecoveryReport::Attempted {
            wallet_id: "trust".into(),
            outcome: Outcome::Success(trust.address),
        }
    );
    assert_eq!(trust.calls(), 1);
    assert!(store.get(KEY).unwrap().is_none());
    assert_eq!(page.context.snapshot().status, ConnectionStatus::Connected);

    // Reload: the record is gone, nothing is replayed.
    let page = mobile_page(store.clone(), &[trust.clone()]);
    assert_eq!(page.context.on_page_load().await.unwrap(), RecoveryReport::NoRecord);
    assert_eq!(trust.calls(), 1);
}

#[tokio::test]
async fn test_metamask_path_deep_link() {
    let page = mobile_page(Arc::new(MemoryStore::new()), &[]);

    let selection = page.context.select_wallet("metaMask").await.unwrap();

    assert_eq!(
        selection,
        Selection::HandedOff(url::Url::parse("https://metamask.app.link/dapp/localhost:5173/").unwrap())
    );
}

#[tokio::test]
async fn test_injected_provider_on_mobile_connects_directly() {
    let mm = metamask();
    let page = mobile_page(Arc::new(MemoryStore::new()), &[mm.clone()]);

    let selection = page.context.select_wallet("metaMask").await.unwrap();

    assert!(matches!(selection, Selection::Attempted(Outcome::Success(_))));
    assert!(page.navigator.visited().is_empty());
    assert!(page.context.recovery().peek().unwrap().is_none());
}

#[tokio::test]
async fn test_wallet_without_deep_link_falls_back_to_modal() {
    let page = mobile_page(Arc::new(MemoryStore::new()), &[]);

    let selection = page.context.select_wallet("rainbow").await.unwrap();

    assert_eq!(selection, Selection::FallbackModal);
    assert_eq!(page.modal.opened(), 1);
    assert!(page.store.is_empty());
}

#[tokio::test]
async fn test_failed_navigation_discards_record() {
    let store = Arc::new(MemoryStore::new());
    let modal = Arc::new(CountingModal::default());
    let context = WalletContext::new(
        Arc::new(WalletConfig::default()),
        Collaborators {
            store: store.clone(),
            navigator: Arc::new(FailingNavigator),
            modal: modal.clone(),
            device: wallet_bridge::wallet::DeviceKind::from_user_agent(IPHONE_UA),
        },
    )
    .unwrap();

    let err = context.select_wallet("trust").await.unwrap_err();

    assert!(matches!(err, WalletError::Navigation(_)));
    assert!(store.get(KEY).unwrap().is_none());
    assert_eq!(modal.opened(), 0);
}

#[tokio::test]
async fn test_failed_navigation_reported_when_discard_fails() {
    let store = Arc::new(UndeletableStore::default());
    let context = WalletContext::new(
        Arc::new(WalletConfig::default()),
        Collaborators {
            store: store.clone(),
            navigator: Arc::new(FailingNavigator),
            modal: Arc::new(CountingModal::default()),
            device: wallet_bridge::wallet::DeviceKind::from_user_agent(IPHONE_UA),
        },
    )
    .unwrap();

    let err = context.select_wallet("trust").await.unwrap_err();

    assert!(matches!(err, WalletError::Navigation(ref reason) if reason.starts_with("blocked")));
    // The record could not be removed; the next load drops it through recovery.
    assert!(store.inner.get(KEY).unwrap().is_some());
}

#[tokio::test]
async fn test_no_record_touches_nothing() {
    let mm = metamask();
    let page = desktop_page(&[mm.clone()]);

    let report = page.context.on_page_load().await.unwrap();

    assert_eq!(report, RecoveryReport::NoRecord);
    assert_eq!(mm.calls(), 0);
    assert_eq!(page.context.snapshot().status, ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_record_while_connected_is_discarded() {
    let mm = metamask();
    let page = desktop_page(&[mm.clone()]);
    page.context.select_wallet("metaMask").await.unwrap();
    assert_eq!(mm.calls(), 1);

    page.context.recovery().record("metamask").unwrap();
    let report = page.context.on_page_load().await.unwrap();

    assert_eq!(
        report,
        RecoveryReport::AlreadyConnected {
            wallet_id: "metamask".into()
        }
    );
    assert_eq!(mm.calls(), 1);
    assert!(page.store.get(KEY).unwrap().is_none());
}

#[tokio::test]
async fn test_failed_recovery_is_not_retried() {
    let store = Arc::new(MemoryStore::new());
    let mm = metamask();
    mm.fail_with(ProviderError::Rejected("User rejected the request.".into()));

    let page = mobile_page(store.clone(), &[mm.clone()]);
    page.context.recovery().record("metaMask").unwrap();
    let report = page.context.on_page_load().await.unwrap();

    assert!(matches!(
        report,
        RecoveryReport::Attempted {
            outcome: Outcome::Failure(ProviderError::Rejected(_)),
            ..
        }
    ));
    assert_eq!(page.context.snapshot().status, ConnectionStatus::Error);

    let page = mobile_page(store, &[mm.clone()]);
    assert_eq!(page.context.on_page_load().await.unwrap(), RecoveryReport::NoRecord);
    assert_eq!(mm.calls(), 1);
}

#[tokio::test]
async fn test_unresolved_wallet_is_abandoned() {
    let page = desktop_page(&[]);
    page.context.recovery().record("trust").unwrap();

    let report = page.context.on_page_load().await.unwrap();

    assert_eq!(
        report,
        RecoveryReport::Unresolved {
            wallet_id: "trust".into()
        }
    );
    assert!(page.store.is_empty());
    assert_eq!(page.modal.opened(), 0);
    assert_eq!(page.context.snapshot().status, ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_stale_and_corrupt_records_are_dropped() {
    let mm = metamask();
    let page = desktop_page(&[mm.clone()]);

    page.store
        .set(KEY, r#"{"walletId":"metaMask","createdAt":0}"#)
        .unwrap();
    let report = page.context.on_page_load().await.unwrap();
    assert!(matches!(report, RecoveryReport::Stale { ref wallet_id, .. } if wallet_id == "metaMask"));

    page.store.set(KEY, "not json").unwrap();
    assert_eq!(page.context.on_page_load().await.unwrap(), RecoveryReport::Corrupt);

    assert!(page.store.is_empty());
    assert_eq!(mm.calls(), 0);
}

#[tokio::test]
async fn test_record_survives_reload_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&path).unwrap());
    PendingConnectionRecovery::new(store, KEY, None)
        .record("metaMask")
        .unwrap();

    let reopened: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&path).unwrap());
    let recovery = PendingConnectionRecovery::new(reopened.clone(), KEY, None);
    let pending = recovery.peek().unwrap().unwrap();
    assert_eq!(pending.wallet_id, "metaMask");

    let page = desktop_page(&[]);
    let mm = metamask();
    page.context.registry().announce(mm.clone());
    let report = recovery
        .consume_and_recover(page.context.registry(), page.context.orchestrator())
        .await
        .unwrap();

    assert!(matches!(report, RecoveryReport::Attempted { outcome: Outcome::Success(_), .. }));
    assert_eq!(mm.calls(), 1);
    assert!(reopened.get(KEY).unwrap().is_none());
    assert!(FileStore::open(&path).unwrap().get(KEY).unwrap().is_none());
}
