//! Encoded operations: the unit handed from action views to the pipeline.

use serde::{Deserialize, Serialize};
use stellar_xdr::curr::{
    HostFunction, InvokeContractArgs, InvokeHostFunctionOp, Limits, Operation, OperationBody,
    ReadXdr, ScSymbol, ScVal, VecM, WriteXdr,
};

use crate::codec::address::contract_address;
use crate::codec::CodecError;

/// Base64 XDR of a single `Operation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedOperation(String);

impl EncodedOperation {
    pub fn from_operation(operation: &Operation) -> Result<Self, CodecError> {
        Ok(Self(operation.to_xdr_base64(Limits::none())?))
    }

    /// Wrap already-encoded XDR, checking that it decodes.
    pub fn from_base64(encoded: &str) -> Result<Self, CodecError> {
        Operation::from_xdr_base64(encoded, Limits::none())?;
        Ok(Self(encoded.to_string()))
    }

    pub fn decode(&self) -> Result<Operation, CodecError> {
        Ok(Operation::from_xdr_base64(&self.0, Limits::none())?)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EncodedOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wrap a host function in an operation with no explicit source account.
pub fn host_function_op(host_function: HostFunction) -> Result<EncodedOperation, CodecError> {
    let operation = Operation {
        source_account: None,
        body: OperationBody::InvokeHostFunction(InvokeHostFunctionOp {
            host_function,
            auth: VecM::default(),
        }),
    };
    EncodedOperation::from_operation(&operation)
}

/// `contract.method(args...)` as an encoded operation.
pub fn invoke_contract(
    contract_id: &str,
    method: &str,
    args: Vec<ScVal>,
) -> Result<EncodedOperation, CodecError> {
    let host_function = HostFunction::InvokeContract(InvokeContractArgs {
        contract_address: contract_address(contract_id)?,
        function_name: ScSymbol(method.to_string().try_into()?),
        args: args.try_into()?,
    });
    host_function_op(host_function)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::address::contract_id_to_string;
    use crate::codec::scval::i128_val;

    #[test]
    fn test_invoke_contract_encodes_method() {
        let vault = contract_id_to_string(&[1u8; 32]);
        let op = invoke_contract(&vault, "total_shares", vec![]).unwrap();

        let decoded = op.decode().unwrap();
        let OperationBody::InvokeHostFunction(invoke) = decoded.body else {
            panic!("expected invoke host function");
        };
        let HostFunction::InvokeContract(args) = invoke.host_function else {
            panic!("expected contract call");
        };
        assert_eq!(args.function_name.0.to_utf8_string_lossy(), "total_shares");
        assert!(args.args.is_empty());
    }

    #[test]
    fn test_method_name_limit() {
        let vault = contract_id_to_string(&[1u8; 32]);
        let long = "x".repeat(33);
        assert!(invoke_contract(&vault, &long, vec![i128_val(1)]).is_err());
    }

    #[test]
    fn test_from_base64_rejects_garbage() {
        assert!(EncodedOperation::from_base64("AAAA!!").is_err());
    }
}
