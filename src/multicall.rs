//! Batched read-only calls.
//!
//! Every read the mirror performs (bootstrap config, state seeding, the
//! reader fallback) goes through [`BatchCaller`]: an ordered list of calls in,
//! an ordered list of raw return payloads out. Results are positional, so the
//! caller that built the batch is the only one that can decode it.

use alloy::{
    primitives::{Address, Bytes},
    providers::Provider,
    rpc::types::{BlockId, TransactionRequest},
    sol_types::SolCall,
};
use async_trait::async_trait;
use tracing::debug;

use crate::{abi::IMulticall, consts::MULTICALL_ADDRESS, prelude::*, Error};

/// A single encoded read against `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub target: Address,
    pub call_data: Bytes,
}

impl Call {
    pub fn new(target: Address, call: impl SolCall) -> Self {
        Self {
            target,
            call_data: call.abi_encode().into(),
        }
    }
}

/// Block at which a batch is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockTag {
    Latest,
    Number(u64),
}

impl From<u64> for BlockTag {
    fn from(number: u64) -> Self {
        BlockTag::Number(number)
    }
}

impl From<BlockTag> for BlockId {
    fn from(tag: BlockTag) -> Self {
        match tag {
            BlockTag::Latest => BlockId::latest(),
            BlockTag::Number(n) => BlockId::number(n),
        }
    }
}

/// Executes an ordered batch of read calls at a given block.
///
/// Implementations must return exactly one payload per call, in call order.
#[async_trait]
pub trait BatchCaller: Send + Sync {
    async fn aggregate(&self, calls: &[Call], block: BlockTag) -> Result<Vec<Bytes>>;
}

/// Check that a batch response lines up with the request that produced it.
pub(crate) fn ensure_batch_len(
    context: &'static str,
    expected: usize,
    outputs: &[Bytes],
) -> Result<()> {
    if outputs.len() != expected {
        return Err(Error::BatchSizeMismatch {
            context,
            expected,
            actual: outputs.len(),
        });
    }
    Ok(())
}

/// [`BatchCaller`] backed by a Multicall contract reached through an alloy provider.
#[derive(Debug, Clone)]
pub struct ProviderMulticall<P> {
    provider: P,
    multicall: Address,
}

impl<P> ProviderMulticall<P> {
    pub fn new(provider: P) -> Self {
        Self::with_address(provider, MULTICALL_ADDRESS)
    }

    pub fn with_address(provider: P, multicall: Address) -> Self {
        Self {
            provider,
            multicall,
        }
    }
}

#[async_trait]
impl<P> BatchCaller for ProviderMulticall<P>
where
    P: Provider + Send + Sync,
{
    async fn aggregate(&self, calls: &[Call], block: BlockTag) -> Result<Vec<Bytes>> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        let aggregate = IMulticall::aggregateCall {
            calls: calls
                .iter()
                .map(|c| IMulticall::Call {
                    target: c.target,
                    callData: c.call_data.clone(),
                })
                .collect(),
        };
        let tx = TransactionRequest::default()
            .to(self.multicall)
            .input(Bytes::from(aggregate.abi_encode()).into());

        let raw = self
            .provider
            .call(tx)
            .block(block.into())
            .await
            .map_err(|e| Error::Rpc(e.to_string()))?;

        let decoded = IMulticall::aggregateCall::abi_decode_returns(&raw)
            .map_err(|e| Error::Rpc(format!("multicall decode: {e}")))?;

        debug!(
            target: "handlefi::multicall",
            calls = calls.len(),
            block = ?block,
            chain_block = %decoded.blockNumber,
            "Multicall batch executed"
        );

        ensure_batch_len("multicall", calls.len(), &decoded.returnData)?;
        Ok(decoded.returnData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::IVault;
    use alloy::primitives::address;

    #[test]
    fn test_call_encodes_selector() {
        let token = address!("82af49447d8a07e3bd95bd0d56f35241523fbab1");
        let call = Call::new(Address::ZERO, IVault::usdgAmountsCall { token });
        assert_eq!(&call.call_data[..4], IVault::usdgAmountsCall::SELECTOR.as_slice());
        assert_eq!(call.call_data.len(), 4 + 32);
    }

    #[test]
    fn test_ensure_batch_len() {
        let outputs = vec![Bytes::new(), Bytes::new()];
        assert!(ensure_batch_len("test", 2, &outputs).is_ok());
        let err = ensure_batch_len("test", 3, &outputs).unwrap_err();
        assert!(matches!(
            err,
            Error::BatchSizeMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_block_tag_into_block_id() {
        assert_eq!(BlockId::from(BlockTag::Number(7)), BlockId::number(7));
        assert_eq!(BlockId::from(BlockTag::Latest), BlockId::latest());
    }
}
