use futures::future::join_all;
use mock_wallet::{
    BridgeCall, BridgeResponse, BridgeServer, InstallOptions, MockWallet,
    bridge::BridgeMessage,
    error::DISCONNECTED,
    server::SESSION_TOKEN_HEADER,
};
use mock_wallet_test_utils::{DEV_ADDRESSES, dev_signer};
use serde_json::json;

#[tokio::test]
async fn can_call_http_bridge_from_script_args() {
    let client = reqwest::Client::new();
    let wallet = MockWallet::new();
    let mut server = BridgeServer::new(wallet.bridge().clone(), 0);
    server.start().await.unwrap();

    let (id, script) = wallet
        .install_http(InstallOptions::new(dev_signer(1)), server.url(), server.token())
        .unwrap();
    let bridge = &script.args["bridge"];
    assert_eq!(bridge["kind"], json!("http"));

    // what the provider script sends for `request({ method: "eth_requestAccounts" })`
    let resp = client
        .post(bridge["url"].as_str().unwrap())
        .header(SESSION_TOKEN_HEADER, bridge["token"].as_str().unwrap())
        .json(&json!({
            "sessionId": script.args["sessionId"],
            "method": "eth_requestAccounts",
            "params": [],
            "debug": false,
        }))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap();
    let response: BridgeResponse = resp.json().await.unwrap();
    assert_eq!(response, BridgeResponse::Result(json!([DEV_ADDRESSES[1]])));

    wallet.uninstall(&id);
    let resp = client
        .post(server.url())
        .header(SESSION_TOKEN_HEADER, server.token())
        .json(&BridgeCall::new(id, "eth_accounts", vec![]))
        .send()
        .await
        .unwrap();
    let response: BridgeResponse = resp.json().await.unwrap();
    assert_eq!(response.into_result().unwrap_err().code, DISCONNECTED);

    server.stop().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn channel_serves_sessions_concurrently() {
    let wallet = MockWallet::new();
    let (a, _) =
        wallet.install_http(InstallOptions::new(dev_signer(0)), "http://unused", "t").unwrap();
    let (b, _) = wallet
        .install_http(InstallOptions::new(dev_signer(1)).default_chain(8453), "http://unused", "t")
        .unwrap();

    let (tx, handle) = wallet.bridge().spawn_channel(16);

    let mut replies = Vec::new();
    for _ in 0..8 {
        for (id, method) in [(&a, "eth_accounts"), (&b, "eth_accounts"), (&b, "eth_chainId")] {
            let (message, reply) = BridgeMessage::new(BridgeCall::new(id.clone(), method, vec![]));
            tx.send(message).await.unwrap();
            replies.push((id.clone(), method, reply));
        }
    }

    let results = join_all(replies.into_iter().map(|(id, method, reply)| async move {
        (id, method, reply.await.unwrap().into_result().unwrap())
    }))
    .await;

    for (id, method, result) in results {
        let expected = match (id == a, method) {
            (true, _) => json!([DEV_ADDRESSES[0]]),
            (false, "eth_accounts") => json!([DEV_ADDRESSES[1]]),
            (false, _) => json!("0x2105"),
        };
        assert_eq!(result, expected);
    }

    drop(tx);
    handle.await.unwrap();
}
