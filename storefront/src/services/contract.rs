//! # MusicShop Contract Facade
//!
//! Typed reads and writes against the deployed `MusicShop` contract.
//!
//! ## Reads
//!
//! `list_items`, `current_index`, `owner_address` and `balance_of` have no side
//! effects and may be repeated freely. Each one is a snapshot of whatever
//! block the node answered from. Two reads are never assumed to observe the
//! same block.
//!
//! ## Writes
//!
//! `add_item` and `buy` return a [`SubmittedWrite`] as soon as the wallet
//! accepts the transaction. The write is complete only once
//! [`SubmittedWrite::confirmed`] resolves. `buy` forwards the payment it is
//! given; the contract enforces that it equals the album price.

use std::sync::Arc;

use alloy_primitives::{Address, TxHash, B256, U256};
use alloy_sol_types::{sol, SolCall};
use shared::Item;

use crate::core::error::{AppError, Result};
use crate::core::service::{TxReceipt, TxRequest, WalletProvider};

sol! {
    interface IMusicShop {
        struct Album {
            uint256 index;
            bytes32 uid;
            string title;
            uint256 price;
            uint256 quantity;
        }

        function owner() external view returns (address);

        function currentIndex() external view returns (uint256);

        function allAlbums() external view returns (Album[] memory);

        function addAlbum(bytes32 uid, string calldata title, uint256 price, uint256 quantity) external;

        function buy(uint256 index) external payable;
    }
}

impl TryFrom<IMusicShop::Album> for Item {
    type Error = AppError;

    fn try_from(album: IMusicShop::Album) -> Result<Self> {
        let index = u64::try_from(album.index).map_err(|_| {
            AppError::RemoteCallFailure(format!("Album index {} does not fit in u64", album.index))
        })?;

        Ok(Item {
            index,
            uid: album.uid,
            title: album.title,
            unit_price: album.price,
            quantity_available: album.quantity,
        })
    }
}

/// Contract handle bound to one signer.
#[derive(Clone)]
pub struct ShopContract {
    provider: Arc<dyn WalletProvider>,
    address: Address,
    signer: Address,
}

impl std::fmt::Debug for ShopContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopContract")
            .field("address", &self.address)
            .field("signer", &self.signer)
            .finish()
    }
}

impl ShopContract {
    pub fn new(provider: Arc<dyn WalletProvider>, address: Address, signer: Address) -> Self {
        Self {
            provider,
            address,
            signer,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return> {
        let data = self.provider.call(self.address, call.abi_encode().into()).await?;
        Ok(C::abi_decode_returns(&data)?)
    }

    /// Full catalogue in contract order.
    pub async fn list_items(&self) -> Result<Vec<Item>> {
        let albums = self.read(IMusicShop::allAlbumsCall {}).await?;
        tracing::debug!(count = albums.len(), "Catalogue read");
        albums.into_iter().map(Item::try_from).collect()
    }

    /// Index the contract will assign to the next album.
    pub async fn current_index(&self) -> Result<u64> {
        let index = self.read(IMusicShop::currentIndexCall {}).await?;
        u64::try_from(index)
            .map_err(|_| AppError::RemoteCallFailure(format!("Current index {} does not fit in u64", index)))
    }

    pub async fn owner_address(&self) -> Result<Address> {
        self.read(IMusicShop::ownerCall {}).await
    }

    /// Native balance of `address`, in wei.
    pub async fn balance_of(&self, address: Address) -> Result<U256> {
        Ok(self.provider.get_balance(address).await?)
    }

    /// Submit `addAlbum`. Only the contract owner can succeed.
    pub async fn add_item(&self, uid: B256, title: &str, price: U256, quantity: U256) -> Result<SubmittedWrite> {
        let call = IMusicShop::addAlbumCall {
            uid,
            title: title.to_string(),
            price,
            quantity,
        };
        let tx = TxRequest::new(self.signer, self.address, call.abi_encode());
        self.submit(tx, "addAlbum").await
    }

    /// Submit `buy(index)` paying `payment` wei.
    pub async fn buy(&self, index: u64, payment: U256) -> Result<SubmittedWrite> {
        let call = IMusicShop::buyCall {
            index: U256::from(index),
        };
        let tx = TxRequest::new(self.signer, self.address, call.abi_encode()).with_value(payment);
        self.submit(tx, "buy").await
    }

    async fn submit(&self, tx: TxRequest, method: &'static str) -> Result<SubmittedWrite> {
        let hash = self.provider.send_transaction(tx).await.map_err(|e| {
            tracing::warn!(method, code = e.code, error = %e.message, "Transaction submission rejected");
            AppError::from(e)
        })?;

        tracing::info!(method, tx_hash = %hash, signer = %self.signer, "Transaction submitted");

        Ok(SubmittedWrite {
            hash,
            provider: Arc::clone(&self.provider),
        })
    }
}

/// A write accepted by the wallet but not yet mined.
pub struct SubmittedWrite {
    pub hash: TxHash,
    provider: Arc<dyn WalletProvider>,
}

impl SubmittedWrite {
    /// Wait for the receipt. A mined-but-reverted transaction is a `RemoteCallFailure`.
    pub async fn confirmed(self) -> Result<TxReceipt> {
        let receipt = self.provider.wait_for_receipt(self.hash).await?;

        if !receipt.success {
            tracing::warn!(tx_hash = %self.hash, "Transaction reverted");
            return Err(AppError::RemoteCallFailure(format!(
                "Transaction {} reverted",
                self.hash
            )));
        }

        tracing::info!(tx_hash = %self.hash, block = ?receipt.block_number, "Transaction confirmed");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::RpcError;
    use crate::core::mock::{album, MockWallet, OWNER, SHOP};
    use alloy_primitives::address;

    fn contract(mock: &Arc<MockWallet>) -> ShopContract {
        ShopContract::new(mock.clone(), SHOP, OWNER)
    }

    #[tokio::test]
    async fn test_list_items_decodes_albums() {
        let mock = MockWallet::new();
        mock.set_albums(vec![album(0, "Kind of Blue", 100, 3), album(1, "Blue Train", 200, 0)]);

        let items = contract(&mock).list_items().await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Item::new(0, "Kind of Blue", U256::from(100), U256::from(3)));
        assert_eq!(items[1].index, 1);
        assert!(!items[1].in_stock());
    }

    #[test]
    fn test_all_albums_return_data_decodes() {
        let albums = vec![album(0, "Kind of Blue", 100, 3), album(1, "Blue Train", 200, 0)];
        let encoded = IMusicShop::allAlbumsCall::abi_encode_returns(&albums);

        let decoded = IMusicShop::allAlbumsCall::abi_decode_returns(&encoded).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].title, "Kind of Blue");
        assert_eq!(decoded[0].uid, albums[0].uid);
        assert_eq!(decoded[1].price, U256::from(200));
        assert_eq!(decoded[1].quantity, U256::ZERO);
    }

    #[tokio::test]
    async fn test_owner_and_current_index() {
        let mock = MockWallet::new();
        mock.set_current_index(7);

        let shop = contract(&mock);
        assert_eq!(shop.owner_address().await.unwrap(), OWNER);
        assert_eq!(shop.current_index().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_buy_attaches_payment() {
        let mock = MockWallet::new();
        let shop = contract(&mock);

        let write = shop.buy(5, U256::from(1234)).await.unwrap();
        let sent = mock.sent_transactions();

        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].value, U256::from(1234));
        assert_eq!(sent[0].to, SHOP);
        assert_eq!(sent[0].from, OWNER);
        assert_eq!(&sent[0].data[..4], &IMusicShop::buyCall::SELECTOR[..]);
        assert!(write.confirmed().await.is_ok());
    }

    #[tokio::test]
    async fn test_add_item_encodes_call() {
        let mock = MockWallet::new();
        let uid = shared::item_uid("Giant Steps");

        contract(&mock)
            .add_item(uid, "Giant Steps", U256::from(10), U256::from(4))
            .await
            .unwrap();

        let sent = mock.sent_transactions();
        let decoded = IMusicShop::addAlbumCall::abi_decode(&sent[0].data).unwrap();
        assert_eq!(decoded.uid, uid);
        assert_eq!(decoded.title, "Giant Steps");
        assert_eq!(decoded.quantity, U256::from(4));
        assert_eq!(sent[0].value, U256::ZERO);
    }

    #[tokio::test]
    async fn test_reverted_receipt_is_remote_failure() {
        let mock = MockWallet::new();
        mock.revert_receipts(true);

        let write = contract(&mock).buy(0, U256::from(1)).await.unwrap();
        let err = write.confirmed().await.unwrap_err();
        assert!(matches!(err, AppError::RemoteCallFailure(msg) if msg.contains("reverted")));
    }

    #[tokio::test]
    async fn test_rejected_submission_surfaces_data_message() {
        let mock = MockWallet::new();
        mock.fail_next_send(
            RpcError::new(-32603, "Internal JSON-RPC error.")
                .with_data(serde_json::json!({ "message": "Not enough ether" })),
        );

        let err = contract(&mock)
            .buy(0, U256::ZERO)
            .await
            .err()
            .unwrap();
        assert_eq!(err, AppError::RemoteCallFailure("Not enough ether".to_string()));
    }

    #[tokio::test]
    async fn test_balance_of_reads_provider() {
        let mock = MockWallet::new();
        let other = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");
        mock.set_balance(U256::from(99));

        assert_eq!(contract(&mock).balance_of(other).await.unwrap(), U256::from(99));
    }
}
