use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};
use wv_api_types::{FilterId, TxHash, WalletAddress, WaveRecord};
use wv_chain_client::{Receipt, WalletProvider, WavePortal, authorized_accounts, request_accounts};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::state::{LoadingGuard, SharedState, WaveState};
use crate::view::WaveView;

/// A wave that the provider accepted but that is not yet mined. Keeps the
/// loading indicator on until it is confirmed or dropped.
#[derive(Debug)]
pub struct PendingWave {
    tx_hash: TxHash,
    _loading: LoadingGuard,
}

impl PendingWave {
    pub fn tx_hash(&self) -> &TxHash {
        &self.tx_hash
    }
}

/// Orchestrates wallet connection, contract reads, wave submission and the
/// live `NewWave` feed. The provider is injected; `None` means no wallet is
/// installed.
pub struct WaveClient<P> {
    config: ClientConfig,
    portal: Option<WavePortal<P>>,
    state: SharedState,
    filter: Mutex<Option<FilterId>>,
}

impl<P: WalletProvider> WaveClient<P> {
    pub fn new(config: ClientConfig, provider: Option<Arc<P>>) -> Self {
        let portal = provider.map(|p| WavePortal::new(config.contract_address.clone(), p));
        Self {
            config,
            portal,
            state: SharedState::default(),
            filter: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn has_provider(&self) -> bool {
        self.portal.is_some()
    }

    pub fn account(&self) -> Option<WalletAddress> {
        self.state.lock().account.clone()
    }

    pub fn snapshot(&self) -> WaveState {
        self.state.snapshot()
    }

    pub fn view(&self) -> WaveView {
        WaveView::from(&*self.state.lock())
    }

    fn portal(&self) -> ClientResult<&WavePortal<P>> {
        self.portal.as_ref().ok_or(ClientError::ProviderMissing)
    }

    /// Page-load sequence: wave count, silent account check, live feed.
    /// Failures are logged and leave the client disconnected.
    pub async fn mount(&self) {
        if !self.has_provider() {
            info!("no wallet provider found; make sure you have MetaMask installed");
            return;
        }
        let _ = logged("read total wave count", self.refresh_count().await);
        let _ = logged("check connected account", self.check_connected().await);
        let _ = logged("subscribe to NewWave", self.subscribe().await);
    }

    /// Picks up an account the user authorized earlier, without prompting.
    pub async fn check_connected(&self) -> ClientResult<Option<WalletAddress>> {
        let Ok(portal) = self.portal() else {
            info!("no wallet provider found; make sure you have MetaMask installed");
            return Ok(None);
        };

        let accounts = authorized_accounts(portal.provider().as_ref()).await?;
        let Some(account) = accounts.into_iter().next() else {
            info!("no authorized account found");
            return Ok(None);
        };

        info!(%account, "found an authorized account");
        self.state.lock().account = Some(account.clone());
        let _ = logged("read all waves", self.refresh_waves().await);
        Ok(Some(account))
    }

    /// Asks the wallet for authorization. On approval the first account is
    /// used and the count and history are loaded.
    pub async fn connect(&self) -> ClientResult<WalletAddress> {
        let portal = logged("connect wallet", self.portal())?;
        let accounts = logged(
            "connect wallet",
            request_accounts(portal.provider().as_ref())
                .await
                .map_err(ClientError::from),
        )?;
        let account = logged(
            "connect wallet",
            accounts.into_iter().next().ok_or(ClientError::NoAccounts),
        )?;

        info!(%account, "account connected");
        self.state.lock().account = Some(account.clone());
        let _ = logged("refresh after connect", self.refresh().await);
        Ok(account)
    }

    pub async fn refresh_count(&self) -> ClientResult<u64> {
        let count = self.portal()?.get_total_wave_count().await?;
        self.state.lock().total_waves = Some(count);
        Ok(count)
    }

    /// Reloads the full history, replacing what is shown only on success.
    pub async fn refresh_waves(&self) -> ClientResult<usize> {
        let raw = self.portal()?.get_all_waves().await?;
        let records: Vec<WaveRecord> = raw
            .into_iter()
            .filter_map(|wave| match WaveRecord::try_from(wave) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("skipping stored wave: {err}");
                    None
                }
            })
            .collect();

        debug!(count = records.len(), "fetched waves");
        let loaded = records.len();
        self.state.lock().feed.replace_from_storage_order(records);
        Ok(loaded)
    }

    pub async fn refresh(&self) -> ClientResult<()> {
        self.refresh_count().await?;
        self.refresh_waves().await?;
        Ok(())
    }

    /// Submits `wave(message)` and returns as soon as the wallet has handed
    /// the transaction to the network. The message is forwarded unvalidated.
    pub async fn send_wave(&self, message: &str) -> ClientResult<PendingWave> {
        let portal = logged("send wave", self.portal())?;
        let from = logged("send wave", self.account().ok_or(ClientError::NotConnected))?;

        let count = logged(
            "read total wave count",
            portal.get_total_wave_count().await.map_err(ClientError::from),
        )?;
        info!(count, "total wave count before waving");

        let tx_hash = logged(
            "send wave",
            portal
                .send_wave(&from, message, self.config.gas_limit)
                .await
                .map_err(ClientError::from),
        )?;

        info!(%tx_hash, "mining");
        Ok(PendingWave {
            tx_hash,
            _loading: LoadingGuard::acquire(&self.state),
        })
    }

    /// Waits for `pending` to be mined, releases the loading indicator, then
    /// refreshes count and history. Any failure releases the indicator too.
    pub async fn confirm_wave(&self, pending: PendingWave) -> ClientResult<Receipt> {
        let portal = logged("confirm wave", self.portal())?;
        let receipt = logged(
            "confirm wave",
            portal
                .wait_for_confirmation(&pending.tx_hash, self.config.poll_interval)
                .await
                .map_err(ClientError::from),
        )?;
        drop(pending);

        info!(tx_hash = %receipt.tx_hash, "mined");
        if let Ok(count) = logged("read total wave count", self.refresh_count().await) {
            info!(count, "total wave count after waving");
        }
        let _ = logged("read all waves", self.refresh_waves().await);
        Ok(receipt)
    }

    /// Full write path. `on_submitted` runs right after the wallet accepts the
    /// transaction, before confirmation (front ends clear the input there).
    pub async fn submit_wave<F>(&self, message: &str, on_submitted: F) -> ClientResult<Receipt>
    where
        F: FnOnce(&TxHash),
    {
        let pending = self.send_wave(message).await?;
        on_submitted(pending.tx_hash());
        self.confirm_wave(pending).await
    }

    pub fn is_subscribed(&self) -> bool {
        self.filter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Installs the `NewWave` log filter. Returns false when already
    /// subscribed.
    pub async fn subscribe(&self) -> ClientResult<bool> {
        if self.is_subscribed() {
            return Ok(false);
        }
        let filter = self.portal()?.install_new_wave_filter().await?;
        debug!(filter = %filter.0, "listening for NewWave");
        *self.filter.lock().unwrap_or_else(PoisonError::into_inner) = Some(filter);
        Ok(true)
    }

    /// Drains new `NewWave` logs into the feed. Returns how many records
    /// were appended; waves already shown are skipped.
    pub async fn poll_live(&self) -> ClientResult<usize> {
        let Some(filter) = self
            .filter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        else {
            return Ok(0);
        };

        let events = self.portal()?.poll_new_waves(&filter).await?;
        let mut appended = 0;
        for event in events {
            debug!(from = %event.from, timestamp = event.timestamp, "NewWave");
            let log = event.log_id();
            match WaveRecord::try_from(event) {
                Ok(record) => {
                    if self.state.lock().feed.append(record, log) {
                        appended += 1;
                    }
                }
                Err(err) => warn!("skipping NewWave event: {err}"),
            }
        }
        Ok(appended)
    }

    /// Removes the log filter installed by `subscribe`.
    pub async fn unsubscribe(&self) -> ClientResult<()> {
        let Some(filter) = self
            .filter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return Ok(());
        };

        let removed = self.portal()?.uninstall_filter(&filter).await?;
        if !removed {
            warn!(filter = %filter.0, "provider did not know the NewWave filter");
        }
        Ok(())
    }
}

fn logged<T>(operation: &str, result: ClientResult<T>) -> ClientResult<T> {
    if let Err(err) = &result {
        warn!("{operation} failed: {err}");
    }
    result
}
