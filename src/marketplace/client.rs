//! The `Marketplace` facade.
//!
//! Every operation comes in two forms. `try_*` returns a
//! `MarketplaceResult` for callers that want the error. The plain form
//! catches it: the failure is logged and counted, the user is notified,
//! creations roll back their backend record, and `None` or `false` is
//! returned.
//!
//! Rollbacks run in the background so the failure is reported without
//! waiting on the backend. They are owned by the `Marketplace` and are
//! aborted when it is dropped, so callers that exit right after a failed
//! creation should await `flush_rollbacks` first.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, U256};
use alloy::rpc::types::TransactionReceipt;
use alloy::sol_types::SolCall;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::backend::{BackendClient, RollbackResource};
use crate::config::{validate_config, MarketplaceConfig};
use crate::contract::abi::IMarketplace;
use crate::contract::{hash, GasStrategy, NftData, ProjectData, Royalty, TxBuilder};
use crate::marketplace::types::{parse_eth, CreatedNft, CreatedProject, MintedNfts, NewProject};
use crate::notify::Notifier;
use crate::observability::metrics;
use crate::provider::{detect_provider, WalletProvider};
use crate::transaction::{EventExtractor, ReceiptPoller, TransactionSubmitter};
use crate::types::{MarketplaceError, MarketplaceResult};
use crate::wallet::{MessageSigner, WalletConnector, WalletSession};

const CREATE_NFT_FAILED: &str = "Sorry, unable to create an item/NFT for you";
const MINT_FAILED: &str = "Sorry, unable to purchase an item/NFT for you";
const GENERIC_FAILED: &str = "Sorry, something went wrong";
const NO_WALLET: &str = "Please install a wallet in order to use all features of Marketplace";

/// Wallet and contract integration for the marketplace.
pub struct Marketplace {
    provider: Option<Arc<dyn WalletProvider>>,
    contract: Address,
    config: MarketplaceConfig,
    notifier: Arc<dyn Notifier>,
    backend: Option<BackendClient>,
    session: Arc<WalletSession>,
    rollbacks: Mutex<JoinSet<()>>,
}

impl Marketplace {
    /// Create a marketplace client over an explicit provider.
    ///
    /// `provider` may be `None`; every operation then fails with
    /// `ProviderUnavailable`. The configuration is validated first.
    pub fn new(
        config: MarketplaceConfig,
        provider: Option<Arc<dyn WalletProvider>>,
        notifier: Arc<dyn Notifier>,
    ) -> MarketplaceResult<Self> {
        validate_config(&config).map_err(|errors| {
            let errors: Vec<String> = errors.iter().map(ToString::to_string).collect();
            MarketplaceError::Config(errors.join("; "))
        })?;
        let contract: Address = config
            .contract
            .address
            .parse()
            .map_err(|e| MarketplaceError::Decode(format!("contract.address: {}", e)))?;
        let backend = BackendClient::new(&config.backend)?;
        let session = Arc::new(WalletSession::new(config.network.clone()));

        Ok(Self {
            provider,
            contract,
            config,
            notifier,
            backend,
            session,
            rollbacks: Mutex::new(JoinSet::new()),
        })
    }

    /// Create a marketplace client with the provider detected from `config`.
    pub fn from_config(
        config: MarketplaceConfig,
        notifier: Arc<dyn Notifier>,
    ) -> MarketplaceResult<Self> {
        let provider = detect_provider(&config)?;
        Self::new(config, provider, notifier)
    }

    pub fn config(&self) -> &MarketplaceConfig {
        &self.config
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    /// Wallet status shared with provider event handling.
    pub fn session(&self) -> &Arc<WalletSession> {
        &self.session
    }

    /// The provider handle, if a wallet is available.
    pub fn provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.provider.clone()
    }

    fn require_provider(&self) -> MarketplaceResult<Arc<dyn WalletProvider>> {
        match &self.provider {
            Some(provider) => Ok(provider.clone()),
            None => {
                self.session.set_error(Some(NO_WALLET.to_string()));
                Err(MarketplaceError::ProviderUnavailable)
            }
        }
    }

    fn connector(&self, provider: Arc<dyn WalletProvider>) -> WalletConnector {
        WalletConnector::new(provider, self.config.network.clone(), self.notifier.clone())
    }

    fn signer(&self, provider: Arc<dyn WalletProvider>) -> MessageSigner {
        MessageSigner::new(provider, self.config.app.name.clone())
    }

    /// Build, submit and wait for a contract call.
    async fn send(
        &self,
        provider: &Arc<dyn WalletProvider>,
        from: Address,
        value: Option<U256>,
        data: Vec<u8>,
        gas: GasStrategy,
    ) -> MarketplaceResult<TransactionReceipt> {
        let tx = TxBuilder::new(provider.clone(), self.contract, &self.config.contract)
            .build(from, value, Bytes::from(data), gas)
            .await?;
        let tx_hash = TransactionSubmitter::new(provider.clone()).submit(&tx).await?;

        let interval = Duration::from_millis(self.config.contract.receipt_poll_interval_ms);
        Ok(ReceiptPoller::new(provider.clone(), interval).wait(tx_hash).await)
    }

    fn extractor(&self, provider: Arc<dyn WalletProvider>) -> EventExtractor {
        EventExtractor::new(provider, self.contract)
    }

    fn succeed(&self, operation: &'static str) {
        metrics::record_operation(operation, "success");
    }

    fn fail(&self, operation: &'static str, error: &MarketplaceError, message: &str) {
        metrics::record_operation(operation, "error");
        if error.is_user_rejection() {
            tracing::info!(operation, "Request rejected in the wallet");
        } else {
            tracing::error!(operation, error = %error, "Marketplace operation failed");
        }
        self.notifier.error(message);
    }

    async fn rollback(&self, resource: RollbackResource, id: &str) {
        let Some(backend) = self.backend.clone() else {
            tracing::debug!(resource = resource.as_str(), id, "No backend configured, skipping rollback");
            return;
        };
        let id = id.to_string();
        self.rollbacks
            .lock()
            .await
            .spawn(async move { backend.rollback(resource, &id).await });
    }

    /// Wait for every backend rollback started so far.
    pub async fn flush_rollbacks(&self) {
        let mut pending = std::mem::take(&mut *self.rollbacks.lock().await);
        while let Some(result) = pending.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Rollback task did not complete");
            }
        }
    }

    // Wallet

    /// Request account access and check the network.
    pub async fn try_connect_wallet(&self) -> MarketplaceResult<Address> {
        let provider = self.require_provider()?;
        let account = self.connector(provider).connect().await?;
        self.session.set_account(account);
        Ok(account)
    }

    pub async fn connect_wallet(&self) -> Option<Address> {
        match self.try_connect_wallet().await {
            Ok(account) => {
                self.succeed("connect_wallet");
                Some(account)
            }
            Err(e) => {
                self.fail("connect_wallet", &e, &e.user_message(GENERIC_FAILED));
                None
            }
        }
    }

    /// Revoke the application's account permission. Failures land in the
    /// session's wallet error.
    pub async fn disconnect_wallet(&self) -> bool {
        let result = match self.require_provider() {
            Ok(provider) => self.connector(provider).disconnect().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Wallet disconnect failed");
                self.session.set_error(Some(e.user_message(GENERIC_FAILED)));
                false
            }
        }
    }

    /// Whether the wallet exposes an account. Notifies the user when not.
    pub async fn is_connected(&self) -> bool {
        let Ok(provider) = self.require_provider() else {
            return false;
        };
        match self.connector(provider).is_connected().await {
            Ok(connected) => connected,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to query wallet accounts");
                false
            }
        }
    }

    /// Sign the login message with the connected account.
    pub async fn try_sign_request(&self) -> MarketplaceResult<Bytes> {
        let provider = self.require_provider()?;
        self.signer(provider).sign_login().await
    }

    pub async fn sign_request(&self) -> Option<Bytes> {
        match self.try_sign_request().await {
            Ok(signature) => Some(signature),
            Err(e) => {
                self.fail("sign_request", &e, &e.user_message(GENERIC_FAILED));
                None
            }
        }
    }

    /// Balance of the connected account as `"<ether> ETH"`.
    pub async fn try_balance(&self) -> MarketplaceResult<String> {
        let provider = self.require_provider()?;
        self.connector(provider).balance().await
    }

    pub async fn balance(&self) -> Option<String> {
        match self.try_balance().await {
            Ok(balance) => Some(balance),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read balance");
                None
            }
        }
    }

    // Items

    /// Create an item. The creator is set to the connected account.
    pub async fn try_create_nft(
        &self,
        mut nft: NftData,
        royalties: Vec<Royalty>,
    ) -> MarketplaceResult<CreatedNft> {
        let provider = self.require_provider()?;
        // Prompts for account access when the app is not yet authorised.
        let from = self.connector(provider.clone()).connect().await?;
        nft.creator = from;

        let content_hash = hash::nft_hash(&nft);
        let signature = self.signer(provider.clone()).sign_hash(content_hash, from).await?;
        let data = IMarketplace::createNFTCall {
            nftData: nft,
            royalties,
            hash: content_hash,
            signature,
        }
        .abi_encode();

        let receipt = self
            .send(&provider, from, None, data, GasStrategy::Estimate)
            .await?;
        if !receipt.status() {
            return Err(MarketplaceError::Reverted(receipt.transaction_hash));
        }

        let event: IMarketplace::NewNFT = self.extractor(provider).for_receipt(&receipt).await?;
        tracing::info!(token_id = %event.tokenId, tx_hash = %receipt.transaction_hash, "Item created");
        Ok(CreatedNft {
            token_id: event.tokenId,
            tx_hash: receipt.transaction_hash,
        })
    }

    /// Create an item for the backend record `backend_id`, rolling the
    /// record back on failure.
    pub async fn create_nft(
        &self,
        backend_id: &str,
        nft: NftData,
        royalties: Vec<Royalty>,
    ) -> Option<CreatedNft> {
        match self.try_create_nft(nft, royalties).await {
            Ok(created) => {
                self.succeed("create_nft");
                Some(created)
            }
            Err(e) => {
                self.rollback(RollbackResource::Nfts, backend_id).await;
                self.fail("create_nft", &e, CREATE_NFT_FAILED);
                None
            }
        }
    }

    /// Mint copies of an item, paying `amount` ether when given and non-zero.
    pub async fn try_mint_nfts(
        &self,
        nft: NftData,
        amount: Option<&str>,
    ) -> MarketplaceResult<MintedNfts> {
        let value = match amount {
            Some(amount) => Some(parse_eth(amount)?).filter(|wei| !wei.is_zero()),
            None => None,
        };

        let provider = self.require_provider()?;
        let from = self.connector(provider.clone()).connect().await?;

        let content_hash = hash::nft_hash(&nft);
        let signature = self.signer(provider.clone()).sign_hash(content_hash, from).await?;
        let data = IMarketplace::mintNFTsCall {
            nftData: nft,
            hash: content_hash,
            signature,
        }
        .abi_encode();

        let receipt = self
            .send(&provider, from, value, data, GasStrategy::WalletDefault)
            .await?;
        if !receipt.status() {
            return Err(MarketplaceError::Reverted(receipt.transaction_hash));
        }

        let event: IMarketplace::mintedNFTs =
            self.extractor(provider).for_receipt(&receipt).await?;
        tracing::info!(count = event.tokenIds.len(), tx_hash = %receipt.transaction_hash, "Items minted");
        Ok(MintedNfts {
            token_ids: event.tokenIds,
            tx_hash: receipt.transaction_hash,
        })
    }

    pub async fn mint_nfts(&self, nft: NftData, amount: Option<&str>) -> Option<MintedNfts> {
        match self.try_mint_nfts(nft, amount).await {
            Ok(minted) => {
                self.succeed("mint_nfts");
                Some(minted)
            }
            Err(e) => {
                self.fail("mint_nfts", &e, MINT_FAILED);
                None
            }
        }
    }

    /// List or delist a token and set its price in ether. Returns the
    /// receipt status.
    pub async fn try_change_selling_config(
        &self,
        token_id: U256,
        for_sale: bool,
        new_price: &str,
    ) -> MarketplaceResult<bool> {
        let new_price = parse_eth(new_price)?;
        let provider = self.require_provider()?;
        let from = self.connector(provider.clone()).connect().await?;

        let data = IMarketplace::changeTokenPriceAndSellingCall {
            tokenId: token_id,
            status: for_sale,
            newPrice: new_price,
        }
        .abi_encode();

        let receipt = self
            .send(&provider, from, None, data, GasStrategy::Estimate)
            .await?;
        Ok(receipt.status())
    }

    pub async fn change_selling_config(&self, token_id: U256, for_sale: bool, new_price: &str) -> bool {
        match self
            .try_change_selling_config(token_id, for_sale, new_price)
            .await
        {
            Ok(status) => {
                self.succeed("change_selling_config");
                status
            }
            Err(e) => {
                self.fail("change_selling_config", &e, CREATE_NFT_FAILED);
                false
            }
        }
    }

    /// Buy an item from `owner`, paying `amount` ether. Returns the receipt
    /// status.
    pub async fn try_buy_nft(
        &self,
        nft_id: U256,
        owner: Address,
        creator: Address,
        amount: &str,
    ) -> MarketplaceResult<bool> {
        let value = parse_eth(amount)?;
        let provider = self.require_provider()?;
        let from = self.connector(provider.clone()).connect().await?;

        let content_hash = hash::purchase_hash(nft_id, owner, creator);
        let signature = self.signer(provider.clone()).sign_hash(content_hash, from).await?;
        let data = IMarketplace::buyNFTCall {
            nftId: nft_id,
            owner,
            creator,
            hash: content_hash,
            signature,
        }
        .abi_encode();

        let receipt = self
            .send(&provider, from, Some(value), data, GasStrategy::WalletDefault)
            .await?;
        Ok(receipt.status())
    }

    pub async fn buy_nft(&self, nft_id: U256, owner: Address, creator: Address, amount: &str) -> bool {
        match self.try_buy_nft(nft_id, owner, creator, amount).await {
            Ok(status) => {
                self.succeed("buy_nft");
                status
            }
            Err(e) => {
                self.fail("buy_nft", &e, &e.user_message(GENERIC_FAILED));
                false
            }
        }
    }

    // Projects

    /// Create a funding project owned by the connected account.
    pub async fn try_create_project(&self, project: NewProject) -> MarketplaceResult<CreatedProject> {
        let budget = parse_eth(&project.budget)?;
        let provider = self.require_provider()?;
        let from = self.connector(provider.clone()).connect().await?;

        let project = ProjectData {
            owner: from,
            metaData: project.meta_data,
            budget,
            deadline: project.deadline,
        };
        let content_hash = hash::project_hash(&project);
        let signature = self.signer(provider.clone()).sign_hash(content_hash, from).await?;
        let data = IMarketplace::createProjectCall {
            projectData: project,
            hash: content_hash,
            signature,
        }
        .abi_encode();

        let receipt = self
            .send(&provider, from, None, data, GasStrategy::WalletDefault)
            .await?;
        if !receipt.status() {
            return Err(MarketplaceError::Reverted(receipt.transaction_hash));
        }

        let event: IMarketplace::NewProject =
            self.extractor(provider).for_receipt(&receipt).await?;
        tracing::info!(project_id = %event.projectId, tx_hash = %receipt.transaction_hash, "Project created");
        Ok(CreatedProject {
            project_id: event.projectId,
            tx_hash: receipt.transaction_hash,
        })
    }

    /// Create a project for the backend record `backend_id`, rolling the
    /// record back on failure.
    pub async fn create_project(&self, backend_id: &str, project: NewProject) -> Option<CreatedProject> {
        match self.try_create_project(project).await {
            Ok(created) => {
                self.succeed("create_project");
                Some(created)
            }
            Err(e) => {
                self.rollback(RollbackResource::Projects, backend_id).await;
                self.fail("create_project", &e, &e.user_message(GENERIC_FAILED));
                None
            }
        }
    }

    /// Fund a project with `amount` ether. Returns the full receipt.
    pub async fn try_fund_project(&self, project_id: U256, amount: &str) -> MarketplaceResult<TransactionReceipt> {
        let value = parse_eth(amount)?;
        let provider = self.require_provider()?;
        let from = self.connector(provider.clone()).connect().await?;

        let content_hash = hash::project_action_hash(project_id, from);
        let signature = self.signer(provider.clone()).sign_hash(content_hash, from).await?;
        let data = IMarketplace::fundProjectCall {
            projectId: project_id,
            hash: content_hash,
            signature,
        }
        .abi_encode();

        self.send(&provider, from, Some(value), data, GasStrategy::WalletDefault)
            .await
    }

    pub async fn fund_project(&self, project_id: U256, amount: &str) -> Option<TransactionReceipt> {
        match self.try_fund_project(project_id, amount).await {
            Ok(receipt) => {
                self.succeed("fund_project");
                Some(receipt)
            }
            Err(e) => {
                self.fail("fund_project", &e, &e.user_message(GENERIC_FAILED));
                None
            }
        }
    }

    /// Withdraw a project's raised funds. Returns the receipt status.
    pub async fn try_withdraw_project_funds(&self, project_id: U256) -> MarketplaceResult<bool> {
        let provider = self.require_provider()?;
        let from = self.connector(provider.clone()).connect().await?;

        let content_hash = hash::project_action_hash(project_id, from);
        let signature = self.signer(provider.clone()).sign_hash(content_hash, from).await?;
        let data = IMarketplace::withdrawProjectFundsCall {
            projectId: project_id,
            hash: content_hash,
            signature,
        }
        .abi_encode();

        let receipt = self
            .send(&provider, from, None, data, GasStrategy::Estimate)
            .await?;
        Ok(receipt.status())
    }

    pub async fn withdraw_project_funds(&self, project_id: U256) -> bool {
        match self.try_withdraw_project_funds(project_id).await {
            Ok(status) => {
                self.succeed("withdraw_project_funds");
                status
            }
            Err(e) => {
                self.fail("withdraw_project_funds", &e, &e.user_message(GENERIC_FAILED));
                false
            }
        }
    }
}

impl std::fmt::Debug for Marketplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marketplace")
            .field("provider", &self.provider)
            .field("contract", &self.contract)
            .field("backend", &self.backend)
            .finish()
    }
}
