//! End-to-end summary scenarios over JSON fixtures for every chain family

use num_bigint::BigInt;
use serde_json::{json, Value};

use rustymcc::config::SummarySettings;
use rustymcc::hashing::{standard_address_hash, Bytes32};
use rustymcc::merkle::{verify_proof, MerkleTree};
use rustymcc::summary::{
    BalanceDecreasingSummaryStatus, PaymentNonexistenceSummaryStatus, PaymentSummaryStatus,
};
use rustymcc::types::{total_amount, ChainType, TransactionSuccessStatus};
use rustymcc::{AnyTransaction, SummaryComposer, Transaction};

fn settings() -> SummarySettings {
    SummarySettings { trace_calls: true }
}

fn index_indicator(index: u32) -> String {
    let mut raw = [0u8; 32];
    raw[28..].copy_from_slice(&index.to_be_bytes());
    Bytes32(raw).to_hex()
}

// ========== UTXO fixtures ==========

fn doge_vout(n: u32, value: f64, address: &str) -> Value {
    json!({ "n": n, "value": value, "scriptPubKey": { "address": address } })
}

fn doge_payment(vout: Vec<Value>) -> AnyTransaction {
    let raw = json!({
        "txid": "5f1c0d5e",
        "blocktime": 1700000000,
        "vin": [
            { "txid": "ab01", "vout": 1,
              "prevout": { "value": 10000.0, "scriptPubKey": { "address": "X" } } }
        ],
        "vout": vout
    });
    AnyTransaction::from_json(ChainType::Doge, raw).unwrap()
}

fn doge_simple() -> AnyTransaction {
    // 10000 DOGE in, 1000 to Y, 8999.99666 back to X
    let raw = r#"{
        "txid": "5f1c0d5e",
        "blocktime": 1700000000,
        "vin": [
            { "txid": "ab01", "vout": 1,
              "prevout": { "value": 10000.00000000, "scriptPubKey": { "address": "X" } } }
        ],
        "vout": [
            { "n": 0, "value": 1000.00000000, "scriptPubKey": { "address": "Y" } },
            { "n": 1, "value": 8999.99666000, "scriptPubKey": { "address": "X" } }
        ]
    }"#;
    AnyTransaction::from_raw(ChainType::Doge, raw).unwrap()
}

fn btc_coinbase() -> AnyTransaction {
    AnyTransaction::from_json(
        ChainType::Btc,
        json!({
            "txid": "cb00",
            "blocktime": 1600000000,
            "vin": [ { "coinbase": "03a0bb0d" } ],
            "vout": [ { "n": 0, "value": 6.25, "scriptPubKey": { "address": "M" } } ]
        }),
    )
    .unwrap()
}

#[test]
fn test_doge_payment_summary() {
    let tx = doge_simple();
    let composer = SummaryComposer::new(&tx, &settings());
    let summary = composer.payment_summary(0, 0).unwrap();
    assert_eq!(summary.status, PaymentSummaryStatus::Success);

    let response = summary.response.unwrap();
    assert_eq!(response.source_address, "X");
    assert_eq!(response.receiving_address, "Y");
    assert_eq!(response.source_address_hash, standard_address_hash("X"));
    assert_eq!(response.receiving_address_hash, standard_address_hash("Y"));
    assert_eq!(response.spent_amount, BigInt::from(100_000_334_000i64));
    assert_eq!(response.received_amount, BigInt::from(100_000_000_000i64));
    assert_eq!(response.intended_spent_amount, response.spent_amount);
    assert_eq!(response.intended_received_amount, response.received_amount);
    assert!(response.one_to_one);
    assert_eq!(response.transaction_status, TransactionSuccessStatus::Success);
    assert_eq!(response.block_timestamp, 1700000000);
    assert!(response.payment_reference.is_zero());
    assert_eq!(response.source_addresses_root, Some(standard_address_hash("X")));

    // spent − received over the whole transaction is the fee
    let fee = total_amount(&tx.spent_amounts().unwrap()) - total_amount(&tx.received_amounts().unwrap());
    assert_eq!(fee, tx.fee().unwrap());
    assert_eq!(fee, BigInt::from(334_000));
}

#[test]
fn test_doge_balance_decreasing_by_hash_and_index() {
    let tx = doge_simple();
    let composer = SummaryComposer::new(&tx, &settings());

    let by_hash = composer
        .balance_decreasing_summary(&standard_address_hash("X").to_hex())
        .unwrap();
    assert_eq!(by_hash.status, BalanceDecreasingSummaryStatus::Success);
    let response = by_hash.response.unwrap();
    assert_eq!(response.spent_amount, BigInt::from(100_000_334_000i64));
    assert_eq!(response.source_address, "X");
    assert!(response.is_full);

    let by_index = composer.balance_decreasing_summary(&index_indicator(0)).unwrap();
    assert_eq!(by_index.status, BalanceDecreasingSummaryStatus::Success);
    assert_eq!(by_index.response.unwrap().spent_amount, BigInt::from(100_000_334_000i64));

    let out_of_range = composer.balance_decreasing_summary(&index_indicator(5)).unwrap();
    assert_eq!(out_of_range.status, BalanceDecreasingSummaryStatus::InvalidInUtxo);

    let unknown = composer
        .balance_decreasing_summary(&standard_address_hash("Y").to_hex())
        .unwrap();
    assert_eq!(unknown.status, BalanceDecreasingSummaryStatus::NoSourceAddress);

    let malformed = composer.balance_decreasing_summary("0x1234").unwrap();
    assert_eq!(malformed.status, BalanceDecreasingSummaryStatus::NotValidSourceAddressFormat);
    assert!(malformed.response.is_none());
}

#[test]
fn test_doge_nonexistence_summary() {
    let tx = doge_simple();
    let composer = SummaryComposer::new(&tx, &settings());

    let summary = composer.payment_nonexistence_summary(0).unwrap();
    assert_eq!(summary.status, PaymentNonexistenceSummaryStatus::Success);
    let response = summary.response.unwrap();
    assert_eq!(response.receiving_address, "Y");
    assert_eq!(response.received_amount, BigInt::from(100_000_000_000i64));
    assert_eq!(response.intended_received_amount, BigInt::from(100_000_000_000i64));

    // Change output nets out against the input
    let change = composer.payment_nonexistence_summary(1).unwrap();
    assert_eq!(
        change.response.unwrap().received_amount,
        BigInt::from(899_999_666_000i64) - BigInt::from(1_000_000_000_000i64)
    );
}

#[test]
fn test_out_of_range_indices() {
    let tx = doge_simple();
    let composer = SummaryComposer::new(&tx, &settings());

    assert_eq!(
        composer.payment_summary(0, -1).unwrap().status,
        PaymentSummaryStatus::InvalidOutUtxo
    );
    assert_eq!(
        composer.payment_summary(0, 2).unwrap().status,
        PaymentSummaryStatus::InvalidOutUtxo
    );
    assert_eq!(
        composer.payment_summary(1, 0).unwrap().status,
        PaymentSummaryStatus::InvalidInUtxo
    );
    assert_eq!(
        composer.payment_nonexistence_summary(-1).unwrap().status,
        PaymentNonexistenceSummaryStatus::InvalidOutUtxo
    );
}

#[test]
fn test_coinbase_short_circuits_every_summary() {
    let tx = btc_coinbase();
    let composer = SummaryComposer::new(&tx, &settings());

    assert_eq!(composer.payment_summary(0, 0).unwrap().status, PaymentSummaryStatus::Coinbase);
    assert_eq!(composer.payment_summary(7, -1).unwrap().status, PaymentSummaryStatus::Coinbase);
    assert_eq!(
        composer.balance_decreasing_summary(&index_indicator(0)).unwrap().status,
        BalanceDecreasingSummaryStatus::Coinbase
    );
    assert_eq!(
        composer.payment_nonexistence_summary(-1).unwrap().status,
        PaymentNonexistenceSummaryStatus::Coinbase
    );
}

#[test]
fn test_one_to_one_breaks_with_third_party_output() {
    let direct = doge_payment(vec![doge_vout(0, 1000.0, "Y"), doge_vout(1, 8999.0, "X")]);
    let split = doge_payment(vec![
        doge_vout(0, 1000.0, "Y"),
        doge_vout(1, 4000.0, "Z"),
        doge_vout(2, 4999.0, "X"),
    ]);

    let direct = SummaryComposer::new(&direct, &settings()).payment_summary(0, 0).unwrap();
    let split = SummaryComposer::new(&split, &settings()).payment_summary(0, 0).unwrap();
    assert!(direct.response.unwrap().one_to_one);
    assert!(!split.response.unwrap().one_to_one);
}

#[test]
fn test_unresolved_input() {
    let tx = AnyTransaction::from_json(
        ChainType::Ltc,
        json!({
            "txid": "11aa",
            "vin": [
                { "txid": "aa", "vout": 0,
                  "prevout": { "value": 1.0, "scriptPubKey": { "address": "X" } } },
                { "txid": "bb", "vout": 3 }
            ],
            "vout": [ { "n": 0, "value": 1.5, "scriptPubKey": { "address": "Y" } } ]
        }),
    )
    .unwrap();
    assert!(!tx.is_full());
    assert_eq!(tx.fee().unwrap_err().kind(), "missing_metadata");

    let composer = SummaryComposer::new(&tx, &settings());
    assert_eq!(
        composer.balance_decreasing_summary(&index_indicator(1)).unwrap().status,
        BalanceDecreasingSummaryStatus::InvalidTransactionDataObject
    );
    assert_eq!(
        composer.payment_summary(1, 0).unwrap().status,
        PaymentSummaryStatus::NoSpentAmountAddress
    );

    let resolved = composer.balance_decreasing_summary(&index_indicator(0)).unwrap();
    let response = resolved.response.unwrap();
    assert!(!response.is_full);
    assert_eq!(response.spent_amount, BigInt::from(100_000_000));

    let payment = composer.payment_summary(0, 0).unwrap().response.unwrap();
    assert!(!payment.one_to_one);
}

#[test]
fn test_data_output_has_no_receiving_address() {
    let tx = AnyTransaction::from_json(
        ChainType::Btc,
        json!({
            "txid": "0d47",
            "blocktime": 1650000000,
            "vin": [
                { "txid": "aa", "vout": 0,
                  "prevout": { "value": 0.5, "scriptPubKey": { "address": "X" } } }
            ],
            "vout": [
                { "n": 0, "value": 0.0,
                  "scriptPubKey": { "asm": "OP_RETURN 68656c6c6f", "hex": "6a0568656c6c6f" } },
                { "n": 1, "value": 0.4999, "scriptPubKey": { "address": "Y" } }
            ]
        }),
    )
    .unwrap();
    let composer = SummaryComposer::new(&tx, &settings());

    assert_eq!(
        composer.payment_summary(0, 0).unwrap().status,
        PaymentSummaryStatus::NoReceiveAmountAddress
    );
    assert_eq!(
        composer.payment_nonexistence_summary(0).unwrap().status,
        PaymentNonexistenceSummaryStatus::NoReceiveAmountAddress
    );

    // The data output is address-less with a non-negative amount
    let payment = composer.payment_summary(0, 1).unwrap().response.unwrap();
    assert!(!payment.one_to_one);
    assert_eq!(payment.received_amount, BigInt::from(49_990_000));
}

// ========== Ledger-diff fixtures ==========

fn xrp_payment(result: &str, nodes: Value) -> AnyTransaction {
    AnyTransaction::from_json(
        ChainType::Xrp,
        json!({
            "result": {
                "hash": "C53ECF838647FA5A4C780377025FEC7999AB4182590510CA461444B207AB74A9",
                "Account": "rSender",
                "Destination": "rReceiver",
                "Amount": "1000000",
                "Fee": "12",
                "TransactionType": "Payment",
                "date": 700000000,
                "Memos": [ { "Memo": { "MemoData": "AB".repeat(32) } } ],
                "meta": { "TransactionResult": result, "AffectedNodes": nodes }
            }
        }),
    )
    .unwrap()
}

fn account_root(account: &str, previous: &str, current: &str) -> Value {
    json!({ "ModifiedNode": {
        "LedgerEntryType": "AccountRoot",
        "FinalFields": { "Account": account, "Balance": current },
        "PreviousFields": { "Balance": previous }
    }})
}

#[test]
fn test_xrp_successful_payment() {
    let tx = xrp_payment(
        "tesSUCCESS",
        json!([
            account_root("rSender", "5000000", "3999988"),
            account_root("rReceiver", "20000000", "21000000"),
        ]),
    );
    let composer = SummaryComposer::new(&tx, &settings());
    let summary = composer.payment_summary(0, 0).unwrap();
    assert_eq!(summary.status, PaymentSummaryStatus::Success);

    let response = summary.response.unwrap();
    assert_eq!(response.spent_amount, BigInt::from(1_000_012));
    assert_eq!(response.received_amount, BigInt::from(1_000_000));
    assert_eq!(response.intended_spent_amount, BigInt::from(1_000_012));
    assert_eq!(response.intended_received_amount, BigInt::from(1_000_000));
    assert!(response.one_to_one);
    assert_eq!(response.payment_reference, Bytes32([0xab; 32]));
    assert_eq!(response.block_timestamp, 700000000 + 946684800);
    assert!(response.source_addresses_root.is_none());
}

#[test]
fn test_xrp_receiver_failure() {
    let tx = xrp_payment("tecNO_DST", json!([account_root("rSender", "5000000", "4999988")]));
    let composer = SummaryComposer::new(&tx, &settings());

    let payment = composer.payment_summary(0, 0).unwrap().response.unwrap();
    assert_eq!(payment.transaction_status, TransactionSuccessStatus::ReceiverFailure);
    assert_eq!(payment.spent_amount, BigInt::from(12));
    assert_eq!(payment.received_amount, BigInt::from(0));
    assert_eq!(payment.intended_spent_amount, BigInt::from(1_000_012));
    assert_eq!(payment.intended_received_amount, BigInt::from(1_000_000));

    let decreasing = composer
        .balance_decreasing_summary(&standard_address_hash("rSender").to_hex())
        .unwrap();
    assert_eq!(decreasing.status, BalanceDecreasingSummaryStatus::Success);
    assert_eq!(decreasing.response.unwrap().spent_amount, BigInt::from(12));

    let nonexistence = composer.payment_nonexistence_summary(0).unwrap().response.unwrap();
    assert_eq!(nonexistence.received_amount, BigInt::from(0));
    assert_eq!(nonexistence.intended_received_amount, BigInt::from(1_000_000));
}

#[test]
fn test_xrp_sender_failure_and_non_payment() {
    let failed = xrp_payment("tecUNFUNDED_PAYMENT", json!([account_root("rSender", "100", "88")]));
    assert_eq!(failed.success_status().unwrap(), TransactionSuccessStatus::SenderFailure);

    let offer = AnyTransaction::from_json(
        ChainType::Xrp,
        json!({
            "hash": "0FFE", "Account": "rSender", "Fee": "10", "TransactionType": "OfferCreate",
            "meta": { "TransactionResult": "tesSUCCESS",
                      "AffectedNodes": [ account_root("rSender", "100", "90") ] }
        }),
    )
    .unwrap();
    let composer = SummaryComposer::new(&offer, &settings());
    assert_eq!(
        composer.payment_summary(0, 0).unwrap().status,
        PaymentSummaryStatus::NotNativePayment
    );
    assert_eq!(
        composer.payment_nonexistence_summary(0).unwrap().status,
        PaymentNonexistenceSummaryStatus::NotNativePayment
    );

    // Balance decreasing applies to any transaction type
    let decreasing = composer
        .balance_decreasing_summary(&standard_address_hash("rSender").to_hex())
        .unwrap();
    assert_eq!(decreasing.response.unwrap().spent_amount, BigInt::from(10));
}

#[test]
fn test_xrp_success_without_receiver_credit() {
    let tx = xrp_payment("tesSUCCESS", json!([account_root("rSender", "5000000", "3999988")]));
    let composer = SummaryComposer::new(&tx, &settings());

    assert_eq!(
        composer.payment_summary(0, 0).unwrap().status,
        PaymentSummaryStatus::NoIntendedReceiveAmountAddress
    );
    assert_eq!(
        composer.payment_nonexistence_summary(0).unwrap().status,
        PaymentNonexistenceSummaryStatus::NoIntendedReceiveAmountAddress
    );
}

#[test]
fn test_xrp_success_without_sender_debit() {
    let tx = xrp_payment(
        "tesSUCCESS",
        json!([account_root("rReceiver", "20000000", "21000000")]),
    );
    let composer = SummaryComposer::new(&tx, &settings());

    assert_eq!(
        composer.payment_summary(0, 0).unwrap().status,
        PaymentSummaryStatus::NoIntendedSpentAmountAddress
    );
    // Nonexistence only looks at the receiving side
    let nonexistence = composer.payment_nonexistence_summary(0).unwrap();
    assert_eq!(nonexistence.status, PaymentNonexistenceSummaryStatus::Success);
    assert_eq!(nonexistence.response.unwrap().received_amount, BigInt::from(1_000_000));
}

#[test]
fn test_missing_meta_is_an_error() {
    let tx = AnyTransaction::from_json(
        ChainType::Xrp,
        json!({
            "hash": "AAAA", "Account": "rA", "Destination": "rB", "Amount": "5",
            "Fee": "10", "TransactionType": "Payment"
        }),
    )
    .unwrap();
    let err = SummaryComposer::new(&tx, &settings()).payment_summary(0, 0).unwrap_err();
    assert_eq!(err.kind(), "missing_metadata");
}

// ========== Account-single fixtures ==========

fn algo(payment: Value, tx_type: &str) -> AnyTransaction {
    AnyTransaction::from_json(
        ChainType::Algo,
        json!({
            "current-round": 30000000,
            "transaction": {
                "id": "ALGOTXID",
                "sender": "SENDER",
                "fee": 1000,
                "tx-type": tx_type,
                "round-time": 1650000000,
                "payment-transaction": payment
            }
        }),
    )
    .unwrap()
}

#[test]
fn test_algo_payment() {
    let tx = algo(json!({ "receiver": "RECEIVER", "amount": 2500000 }), "pay");
    let composer = SummaryComposer::new(&tx, &settings());

    let summary = composer.payment_summary(0, 0).unwrap();
    assert_eq!(summary.status, PaymentSummaryStatus::Success);
    let response = summary.response.unwrap();
    assert_eq!(response.spent_amount, BigInt::from(2_501_000));
    assert_eq!(response.received_amount, BigInt::from(2_500_000));
    assert!(response.one_to_one);

    let decreasing = composer
        .balance_decreasing_summary(&standard_address_hash("SENDER").to_hex())
        .unwrap();
    assert_eq!(decreasing.response.unwrap().spent_amount, BigInt::from(2_501_000));

    let stranger = composer
        .balance_decreasing_summary(&standard_address_hash("RECEIVER").to_hex())
        .unwrap();
    assert_eq!(stranger.status, BalanceDecreasingSummaryStatus::NoSourceAddress);
}

#[test]
fn test_algo_participant_cardinality() {
    let closing = algo(
        json!({
            "receiver": "RECEIVER", "amount": 10,
            "close-remainder-to": "CLOSER", "close-amount": 500
        }),
        "pay",
    );
    let composer = SummaryComposer::new(&closing, &settings());
    assert_eq!(
        composer.payment_summary(0, 0).unwrap().status,
        PaymentSummaryStatus::UnexpectedNumberOfParticipants
    );
    assert_eq!(
        composer.payment_nonexistence_summary(0).unwrap().status,
        PaymentNonexistenceSummaryStatus::UnexpectedNumberOfParticipants
    );

    let key_reg = algo(Value::Null, "keyreg");
    assert_eq!(
        SummaryComposer::new(&key_reg, &settings()).payment_summary(0, 0).unwrap().status,
        PaymentSummaryStatus::NotNativePayment
    );
}

// ========== Commitments ==========

#[test]
fn test_merkle_root_is_order_independent() {
    let forward = MerkleTree::from_addresses(&["alpha", "beta", "gamma", "delta", "epsilon"]);
    let shuffled = MerkleTree::from_addresses(&["delta", "alpha", "epsilon", "gamma", "beta", "alpha"]);
    assert_eq!(forward.root(), shuffled.root());
    assert_eq!(forward.hash_count(), 5);

    let root = forward.root().unwrap();
    for i in 0..forward.hash_count() {
        let leaf = forward.sorted_hashes()[i];
        let proof = forward.get_proof(i).unwrap();
        assert!(verify_proof(&leaf, &proof, &root));
    }
}

#[test]
fn test_summary_json_shape() {
    let tx = doge_simple();
    let summary = SummaryComposer::new(&tx, &settings()).payment_summary(0, 0).unwrap();
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["response"]["spentAmount"], "100000334000");
    assert_eq!(json["response"]["transactionStatus"], "SUCCESS");
    assert_eq!(json["response"]["oneToOne"], true);
    assert_eq!(
        json["response"]["sourceAddressHash"],
        standard_address_hash("X").to_hex()
    );
}
