//! Filling, signing and submitting `eth_sendTransaction` requests.

use alloy_network::{Ethereum, EthereumWallet, TransactionBuilder, eip2718::Encodable2718};
use alloy_primitives::{Address, TxHash, TxKind};
use alloy_provider::{DynProvider, Provider};
use alloy_rpc_types::TransactionRequest;

use crate::error::{ExecutionError, WalletError};

/// Fills the fields the dApp left out, signs the transaction with `wallet` and submits it as a
/// raw transaction.
///
/// A request without `to` deploys a contract from its `data`.
///
/// Omitted fields are requested from the transport:
/// - the nonce from the pending transaction count of `from`
/// - the gas limit from `eth_estimateGas`
/// - EIP-1559 fees, unless a legacy `gasPrice` was given
pub(crate) async fn sign_and_submit(
    provider: &DynProvider,
    wallet: &EthereumWallet,
    from: Address,
    mut request: TransactionRequest,
    chain_id: u64,
) -> Result<TxHash, WalletError> {
    if request.chain_id.is_none() {
        request.chain_id = Some(chain_id);
    }
    if request.to.is_none() {
        request.to = Some(TxKind::Create);
    }

    if request.nonce.is_none() {
        let nonce = provider.get_transaction_count(from).pending().await?;
        request.nonce = Some(nonce);
    }

    if request.gas.is_none() {
        let gas = provider.estimate_gas(request.clone()).await?;
        request.gas = Some(gas);
    }

    let needs_fees = request.gas_price.is_none()
        && (request.max_fee_per_gas.is_none() || request.max_priority_fee_per_gas.is_none());
    if needs_fees {
        let estimate = provider.estimate_eip1559_fees().await?;
        let max_fee = *request.max_fee_per_gas.get_or_insert(estimate.max_fee_per_gas);
        let priority =
            request.max_priority_fee_per_gas.get_or_insert(estimate.max_priority_fee_per_gas);
        *priority = (*priority).min(max_fee);
    }

    trace!(target: "mock_wallet::tx", ?request, "signing transaction");
    let envelope = <TransactionRequest as TransactionBuilder<Ethereum>>::build(request, wallet)
        .await
        .map_err(|err| ExecutionError::Build(err.to_string()))?;

    let pending = provider.send_raw_transaction(&envelope.encoded_2718()).await?;
    Ok(*pending.tx_hash())
}

/// Hands the request to the node behind the transport, which holds the keys of `from`.
pub(crate) async fn submit_to_node(
    provider: &DynProvider,
    request: TransactionRequest,
) -> Result<TxHash, WalletError> {
    let pending = provider.send_transaction(request).await?;
    Ok(*pending.tx_hash())
}
