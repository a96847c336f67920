use crate::utils::RecordingTarget;
use alloy_primitives::{TxHash, hex};
use alloy_signer::Signer;
use mock_wallet::{
    InstallOptions, MockWallet, WalletError,
    error::{DISCONNECTED, INVALID_PARAMS, UNSUPPORTED_METHOD},
};
use mock_wallet_test_utils::{DEV_ADDRESSES, ScriptedTransport, dev_signer, init_tracing};
use serde_json::{Value, json};

const SEPOLIA: u64 = 11155111;

#[tokio::test]
async fn can_install_and_use_wallet() {
    init_tracing();
    let mainnet = ScriptedTransport::new();
    let sepolia = ScriptedTransport::new();
    sepolia.hash_raw_transactions();

    let wallet = MockWallet::new();
    let page = RecordingTarget::default();
    let options = InstallOptions::new(dev_signer(0))
        .transport(1, mainnet.provider())
        .transport(SEPOLIA, sepolia.provider());
    let id = wallet.install(&page, options).await.unwrap();

    assert_eq!(page.exposed(), vec!["__mockWalletBridge".to_string()]);
    assert_eq!(page.session_id(), id);
    let script = page.scripts().pop().unwrap().render();
    assert!(script.starts_with("(({ sessionId, debug, info, bridge }) =>"));
    assert!(script.contains(id.as_str()));

    let accounts = page.request("eth_accounts", Value::Null).await.unwrap();
    assert_eq!(accounts, json!([DEV_ADDRESSES[0]]));
    assert_eq!(page.request("eth_chainId", json!([])).await.unwrap(), json!("0x1"));

    let switched =
        page.request("wallet_switchEthereumChain", json!([{ "chainId": "0xaa36a7" }])).await;
    assert_eq!(switched.unwrap(), Value::Null);
    assert_eq!(page.request("eth_chainId", json!([])).await.unwrap(), json!("0xaa36a7"));

    let tx = json!({
        "from": DEV_ADDRESSES[0],
        "to": DEV_ADDRESSES[1],
        "value": "0x1",
        "nonce": "0x0",
        "gas": "0x5208",
        "maxFeePerGas": "0x77359400",
        "maxPriorityFeePerGas": "0x3b9aca00",
    });
    let hash = page.request("eth_sendTransaction", json!([tx])).await.unwrap();
    let hash: TxHash = serde_json::from_value(hash).unwrap();
    assert_ne!(hash, TxHash::ZERO);
    assert_eq!(sepolia.calls_to("eth_sendRawTransaction"), 1);
    assert_eq!(mainnet.call_count(), 0);

    let mut foreign = tx.clone();
    foreign["from"] = json!(DEV_ADDRESSES[1]);
    let err = page.request("eth_sendTransaction", json!([foreign])).await.unwrap_err();
    assert_eq!(err.code, INVALID_PARAMS);
    assert_eq!(sepolia.calls_to("eth_sendRawTransaction"), 1);
}

#[tokio::test]
async fn personal_sign_matches_signer() {
    let wallet = MockWallet::new();
    let page = RecordingTarget::default();
    wallet.install(&page, InstallOptions::new(dev_signer(0))).await.unwrap();

    let message = b"hello mock wallet";
    let signature = page
        .request("personal_sign", json!([hex::encode_prefixed(message), DEV_ADDRESSES[0]]))
        .await
        .unwrap();

    let expected = dev_signer(0).sign_message(message).await.unwrap();
    assert_eq!(signature, json!(hex::encode_prefixed(expected.as_bytes())));
}

#[tokio::test]
async fn installations_are_independent() {
    let wallet = MockWallet::new();
    let page_a = RecordingTarget::default();
    let page_b = RecordingTarget::default();

    let a = wallet.install(&page_a, InstallOptions::new(dev_signer(0))).await.unwrap();
    let b = wallet
        .install(&page_b, InstallOptions::new(dev_signer(1)).default_chain(SEPOLIA))
        .await
        .unwrap();
    assert_ne!(a, b);
    assert_eq!(wallet.registry().len(), 2);

    page_a.request("wallet_switchEthereumChain", json!([{ "chainId": "0x2105" }])).await.unwrap();
    assert_eq!(page_a.request("eth_chainId", json!([])).await.unwrap(), json!("0x2105"));
    assert_eq!(page_b.request("eth_chainId", json!([])).await.unwrap(), json!("0xaa36a7"));

    assert_eq!(page_a.request("eth_accounts", json!([])).await.unwrap(), json!([DEV_ADDRESSES[0]]));
    assert_eq!(page_b.request("eth_accounts", json!([])).await.unwrap(), json!([DEV_ADDRESSES[1]]));
}

#[tokio::test]
async fn pages_can_share_a_session() {
    let wallet = MockWallet::with_bridge_name("__sharedBridge");
    let page_a = RecordingTarget::default();
    let page_b = RecordingTarget::default();

    let a = wallet.install(&page_a, InstallOptions::new(dev_signer(0))).await.unwrap();
    let session = wallet.registry().get(&a).unwrap();
    let b = wallet.install(&page_b, InstallOptions::shared(session)).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(page_b.exposed(), vec![wallet.bridge_name().to_string()]);

    page_a.request("wallet_switchEthereumChain", json!([{ "chainId": "0x2105" }])).await.unwrap();
    assert_eq!(page_b.request("eth_chainId", json!([])).await.unwrap(), json!("0x2105"));

    assert!(wallet.uninstall(&a));
    assert_eq!(page_b.request("eth_chainId", json!([])).await.unwrap_err().code, DISCONNECTED);
}

#[tokio::test]
async fn unknown_chain_falls_back_to_default() {
    let wallet = MockWallet::new();
    let page = RecordingTarget::default();
    wallet.install(&page, InstallOptions::new(dev_signer(0)).default_chain(SEPOLIA)).await.unwrap();

    page.request("wallet_switchEthereumChain", json!([{ "chainId": "0x1" }])).await.unwrap();
    assert_eq!(page.request("eth_chainId", json!([])).await.unwrap(), json!("0x1"));

    let res = page.request("wallet_switchEthereumChain", json!([{ "chainId": "0x539" }])).await;
    assert_eq!(res.unwrap(), Value::Null);
    assert_eq!(page.request("eth_chainId", json!([])).await.unwrap(), json!("0xaa36a7"));
}

#[tokio::test]
async fn forwards_unknown_methods() {
    let transport = ScriptedTransport::new();
    transport
        .on_result("eth_blockNumber", "0x10")
        .on_error("eth_call", 3, "execution reverted");

    let wallet = MockWallet::new();
    let page = RecordingTarget::default();
    let options = InstallOptions::new(dev_signer(0)).transport(1, transport.provider()).debug(true);
    wallet.install(&page, options).await.unwrap();

    assert_eq!(page.request("eth_blockNumber", json!([])).await.unwrap(), json!("0x10"));

    let err = page.request("eth_call", json!([{ "to": DEV_ADDRESSES[1] }, "latest"])).await;
    let err = err.unwrap_err();
    assert_eq!(err.code, 3);
    assert_eq!(err.message, "execution reverted");

    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].method, "eth_call");
    assert_eq!(calls[1].params[1], json!("latest"));
}

#[tokio::test]
async fn typed_data_is_not_supported() {
    let wallet = MockWallet::new();
    let page = RecordingTarget::default();
    wallet.install(&page, InstallOptions::new(dev_signer(0))).await.unwrap();

    let err = page
        .request("eth_signTypedData_v4", json!([DEV_ADDRESSES[0], "{}"]))
        .await
        .unwrap_err();
    assert_eq!(err.code, UNSUPPORTED_METHOD);
}

#[tokio::test]
async fn uninstalled_wallet_is_disconnected() {
    let wallet = MockWallet::new();
    let page = RecordingTarget::default();
    let id = wallet.install(&page, InstallOptions::new(dev_signer(0))).await.unwrap();

    assert!(wallet.uninstall(&id));
    let err = page.request("eth_accounts", json!([])).await.unwrap_err();
    assert_eq!(err.code, DISCONNECTED);

    let err = wallet.registry().lookup(&id).unwrap_err();
    assert!(matches!(err, WalletError::SessionNotFound(missing) if missing == id));
}
