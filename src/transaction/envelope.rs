//! Transaction envelope construction, resource assembly, and hashing.

use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
    DecoratedSignature, Hash, Limits, Memo, Operation, OperationBody, Preconditions, ReadXdr,
    SequenceNumber, SorobanAuthorizationEntry, SorobanTransactionData, TimeBounds, TimePoint,
    Transaction, TransactionEnvelope, TransactionExt, TransactionSignaturePayload,
    TransactionSignaturePayloadTaggedTransaction, TransactionV1Envelope, VecM, WriteXdr,
};

use crate::codec::address::muxed_account;
use crate::codec::{CodecError, EncodedOperation};
use crate::rpc::SimulateResponse;

/// Fee and validity window applied to every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeSettings {
    pub base_fee: u32,
    pub timeout_secs: u64,
}

impl Default for EnvelopeSettings {
    fn default() -> Self {
        Self {
            base_fee: 100_000,
            timeout_secs: 300,
        }
    }
}

/// Build an unsigned envelope wrapping exactly one operation.
///
/// `current_sequence` is the account's on-chain sequence; the envelope
/// uses the next one.
pub fn build_envelope(
    source: &str,
    current_sequence: i64,
    operation: &EncodedOperation,
    settings: &EnvelopeSettings,
    now_unix: u64,
) -> Result<TransactionEnvelope, CodecError> {
    let operations: Vec<Operation> = vec![operation.decode()?];
    let tx = Transaction {
        source_account: muxed_account(source)?,
        fee: settings.base_fee,
        seq_num: SequenceNumber(current_sequence.saturating_add(1)),
        cond: Preconditions::Time(TimeBounds {
            min_time: TimePoint(0),
            max_time: TimePoint(now_unix.saturating_add(settings.timeout_secs)),
        }),
        memo: Memo::None,
        operations: operations.try_into()?,
        ext: TransactionExt::V0,
    };

    Ok(TransactionEnvelope::Tx(TransactionV1Envelope {
        tx,
        signatures: VecM::default(),
    }))
}

pub fn encode(envelope: &TransactionEnvelope) -> Result<String, CodecError> {
    Ok(envelope.to_xdr_base64(Limits::none())?)
}

pub fn decode(encoded: &str) -> Result<TransactionEnvelope, CodecError> {
    Ok(TransactionEnvelope::from_xdr_base64(encoded, Limits::none())?)
}

fn v1(envelope: TransactionEnvelope) -> Result<TransactionV1Envelope, CodecError> {
    match envelope {
        TransactionEnvelope::Tx(v1) => Ok(v1),
        other => Err(CodecError::UnexpectedType {
            expected: "v1 transaction envelope",
            found: other.name().to_string(),
        }),
    }
}

/// Apply simulated resources, fee and authorization to an envelope.
///
/// Existing signatures are dropped since the transaction body changes.
pub fn assemble(
    envelope: TransactionEnvelope,
    simulation: &SimulateResponse,
) -> Result<TransactionEnvelope, CodecError> {
    let mut v1 = v1(envelope)?;

    if let Some(data) = simulation.transaction_data.as_deref() {
        let data = SorobanTransactionData::from_xdr_base64(data, Limits::none())?;
        v1.tx.ext = TransactionExt::V1(data);
    }

    let resource_fee = u32::try_from(simulation.min_resource_fee()).unwrap_or(u32::MAX);
    v1.tx.fee = v1.tx.fee.saturating_add(resource_fee);

    let auth = simulation
        .first_result()
        .and_then(|r| r.auth.clone())
        .unwrap_or_default()
        .iter()
        .map(|entry| SorobanAuthorizationEntry::from_xdr_base64(entry, Limits::none()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut operations: Vec<Operation> = v1.tx.operations.to_vec();
    for operation in operations.iter_mut() {
        if let OperationBody::InvokeHostFunction(invoke) = &mut operation.body {
            if invoke.auth.is_empty() && !auth.is_empty() {
                invoke.auth = auth.clone().try_into()?;
            }
        }
    }
    v1.tx.operations = operations.try_into()?;
    v1.signatures = VecM::default();

    Ok(TransactionEnvelope::Tx(v1))
}

/// SHA-256 of the network passphrase.
pub fn network_id(passphrase: &str) -> Hash {
    Hash(Sha256::digest(passphrase.as_bytes()).into())
}

/// The hash that is signed and that identifies the transaction on chain.
pub fn transaction_hash(
    envelope: &TransactionEnvelope,
    passphrase: &str,
) -> Result<[u8; 32], CodecError> {
    let tx = match envelope {
        TransactionEnvelope::Tx(v1) => v1.tx.clone(),
        other => {
            return Err(CodecError::UnexpectedType {
                expected: "v1 transaction envelope",
                found: other.name().to_string(),
            })
        }
    };
    let payload = TransactionSignaturePayload {
        network_id: network_id(passphrase),
        tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(tx),
    };
    Ok(Sha256::digest(payload.to_xdr(Limits::none())?).into())
}

/// Append a signature to a v1 envelope.
pub fn add_signature(
    envelope: TransactionEnvelope,
    signature: DecoratedSignature,
) -> Result<TransactionEnvelope, CodecError> {
    let mut v1 = v1(envelope)?;
    let mut signatures = v1.signatures.to_vec();
    signatures.push(signature);
    v1.signatures = signatures.try_into()?;
    Ok(TransactionEnvelope::Tx(v1))
}

/// Number of signatures on the envelope.
pub fn signature_count(envelope: &TransactionEnvelope) -> usize {
    match envelope {
        TransactionEnvelope::Tx(v1) => v1.signatures.len(),
        TransactionEnvelope::TxV0(v0) => v0.signatures.len(),
        TransactionEnvelope::TxFeeBump(fb) => fb.signatures.len(),
    }
}
