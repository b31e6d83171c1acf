//! Shared fakes for integration testing: scripted connectors and sessions,
//! a counting modal and page builders.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use url::Url;

use wallet_bridge::chain::ChainId;
use wallet_bridge::config::WalletConfig;
use wallet_bridge::wallet::{
    Collaborators, ConnectModal, Connector, DeviceKind, EstablishedSession, KeyValueStore,
    MemoryStore, Navigator, ProviderError, RecordingNavigator, SessionTransport, WalletContext,
    WalletError, WalletResult,
};

pub const IPHONE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";

/// One programmed provider answer.
struct Reply<T> {
    delay: Duration,
    result: Result<T, ProviderError>,
}

fn pop<T>(queue: &Mutex<VecDeque<Reply<T>>>) -> Option<Reply<T>> {
    queue.lock().unwrap().pop_front()
}

/// Session transport answering from per-kind queues. An empty queue
/// approves immediately.
#[derive(Default)]
pub struct ScriptedTransport {
    switches: Mutex<VecDeque<Reply<()>>>,
    signatures: Mutex<VecDeque<Reply<Bytes>>>,
    transactions: Mutex<VecDeque<Reply<TxHash>>>,
    pub switch_calls: AtomicUsize,
    pub sign_calls: AtomicUsize,
    pub tx_calls: AtomicUsize,
    pub closed: AtomicBool,
}

impl ScriptedTransport {
    pub fn script_switch(&self, delay_ms: u64, result: Result<(), ProviderError>) {
        self.switches.lock().unwrap().push_back(Reply {
            delay: Duration::from_millis(delay_ms),
            result,
        });
    }

    pub fn script_signature(&self, delay_ms: u64, result: Result<Bytes, ProviderError>) {
        self.signatures.lock().unwrap().push_back(Reply {
            delay: Duration::from_millis(delay_ms),
            result,
        });
    }

    pub fn script_transaction(&self, delay_ms: u64, result: Result<TxHash, ProviderError>) {
        self.transactions.lock().unwrap().push_back(Reply {
            delay: Duration::from_millis(delay_ms),
            result,
        });
    }

    pub fn switch_calls(&self) -> usize {
        self.switch_calls.load(Ordering::SeqCst)
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    pub fn tx_calls(&self) -> usize {
        self.tx_calls.load(Ordering::SeqCst)
    }
}

async fn answer<T>(reply: Option<Reply<T>>, default: T) -> Result<T, ProviderError> {
    match reply {
        Some(reply) => {
            if !reply.delay.is_zero() {
                tokio::time::sleep(reply.delay).await;
            }
            reply.result
        }
        None => Ok(default),
    }
}

#[async_trait]
impl SessionTransport for ScriptedTransport {
    async fn request_chain_switch(&self, _chain_id: ChainId) -> Result<(), ProviderError> {
        self.switch_calls.fetch_add(1, Ordering::SeqCst);
        answer(pop(&self.switches), ()).await
    }

    async fn request_signature(&self, _payload: &str) -> Result<Bytes, ProviderError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        answer(pop(&self.signatures), Bytes::from_static(&[0xaa; 65])).await
    }

    async fn request_transaction(&self, _to: Address, _value: U256) -> Result<TxHash, ProviderError> {
        self.tx_calls.fetch_add(1, Ordering::SeqCst);
        answer(pop(&self.transactions), TxHash::repeat_byte(0x11)).await
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Connector with a programmable result, counting every invocation.
pub struct ScriptedConnector {
    id: String,
    name: String,
    pub address: Address,
    pub chain_id: ChainId,
    delay: Duration,
    failure: Mutex<Option<ProviderError>>,
    calls: AtomicUsize,
    pub transport: Arc<ScriptedTransport>,
}

impl ScriptedConnector {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            address: Address::repeat_byte(0x42),
            chain_id: ChainId::SEPOLIA,
            delay: Duration::ZERO,
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
            transport: Arc::new(ScriptedTransport::default()),
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay = Duration::from_millis(delay_ms);
        self
    }

    pub fn with_chain(mut self, chain_id: ChainId) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn fail_with(&self, reason: ProviderError) {
        *self.failure.lock().unwrap() = Some(reason);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn initiate_session(&self) -> Result<EstablishedSession, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(reason);
        }
        Ok(EstablishedSession {
            address: self.address,
            chain_id: self.chain_id,
            transport: self.transport.clone(),
        })
    }
}

/// Modal that counts how often it was opened.
#[derive(Default)]
pub struct CountingModal {
    opened: AtomicUsize,
}

impl CountingModal {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl ConnectModal for CountingModal {
    fn open(&self) {
        self.opened.fetch_add(1, Ordering::SeqCst);
    }
}

/// Navigator whose every navigation fails.
pub struct FailingNavigator;

impl Navigator for FailingNavigator {
    fn navigate(&self, url: &Url) -> WalletResult<()> {
        Err(WalletError::Navigation(format!("blocked: {}", url)))
    }
}

/// Store that accepts writes but refuses every delete.
#[derive(Default)]
pub struct UndeletableStore {
    pub inner: MemoryStore,
}

impl KeyValueStore for UndeletableStore {
    fn get(&self, key: &str) -> WalletResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> WalletResult<()> {
        self.inner.set(key, value)
    }

    fn delete(&self, _key: &str) -> WalletResult<()> {
        Err(WalletError::Storage("disk is read-only".to_string()))
    }
}

/// One simulated page instance and its collaborators.
pub struct Page {
    pub context: WalletContext,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub modal: Arc<CountingModal>,
}

/// Build a page over `store` (shared across reloads) with `connectors`
/// announced in order. Recovery is left to the test.
pub fn load_page(
    device: DeviceKind,
    store: Arc<MemoryStore>,
    connectors: &[Arc<ScriptedConnector>],
) -> Page {
    let navigator = Arc::new(RecordingNavigator::new());
    let modal = Arc::new(CountingModal::default());
    let context = WalletContext::new(
        Arc::new(WalletConfig::default()),
        Collaborators {
            store: store.clone(),
            navigator: navigator.clone(),
            modal: modal.clone(),
            device,
        },
    )
    .expect("default config builds a context");
    for connector in connectors {
        context.registry().announce(connector.clone());
    }
    Page {
        context,
        store,
        navigator,
        modal,
    }
}

/// Desktop page over a fresh store.
pub fn desktop_page(connectors: &[Arc<ScriptedConnector>]) -> Page {
    load_page(DeviceKind::Desktop, Arc::new(MemoryStore::new()), connectors)
}

/// Mobile page over `store`.
pub fn mobile_page(store: Arc<MemoryStore>, connectors: &[Arc<ScriptedConnector>]) -> Page {
    load_page(DeviceKind::from_user_agent(IPHONE_UA), store, connectors)
}

pub fn metamask() -> Arc<ScriptedConnector> {
    Arc::new(ScriptedConnector::new("io.metamask", "MetaMask SDK"))
}
