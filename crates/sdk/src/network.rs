//! Network resolution and factory deployment verification.

use alloy::{eips::BlockId, primitives::Address};

use crate::{
    config::DeploymentConfig, error::LaunchpadError, factory::FactoryHandle, source::ChainSource,
    types::StateInstant,
};

/// Factory deployment resolved for the connected chain, not verified yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deployment {
    pub chain_id: u64,
    pub factory: Address,
}

/// Queries the connected chain ID and looks up the factory configured for
/// it.
///
/// Absence of configuration results in [`LaunchpadError::UnsupportedNetwork`],
/// which is not retried.
pub async fn resolve_deployment<S: ChainSource>(
    source: &S,
    config: &DeploymentConfig,
) -> Result<Deployment, LaunchpadError> {
    let chain_id = source.chain_id().await?;
    let factory = config
        .factory_address(chain_id)
        .ok_or(LaunchpadError::UnsupportedNetwork { chain_id })?;
    tracing::debug!(chain_id, %factory, "resolved factory deployment");
    Ok(Deployment { chain_id, factory })
}

/// Checks the resolved factory address carries deployed code at the given
/// instant and binds a [`FactoryHandle`] to it.
pub async fn verify_deployment<S: ChainSource>(
    source: &S,
    deployment: Deployment,
    instant: StateInstant,
) -> Result<FactoryHandle, LaunchpadError> {
    if deployment.factory.is_zero() {
        return Err(LaunchpadError::InvalidArgument(format!(
            "zero factory address for chain {}",
            deployment.chain_id
        )));
    }
    let code = source
        .code_at(deployment.factory, BlockId::number(instant.block_number()))
        .await?;
    tracing::debug!(
        chain_id = deployment.chain_id,
        factory = %deployment.factory,
        code_len = code.len(),
        "fetched factory code"
    );
    if code.is_empty() {
        return Err(LaunchpadError::ContractNotDeployed {
            chain_id: deployment.chain_id,
            address: deployment.factory,
        });
    }
    Ok(FactoryHandle::new(deployment.chain_id, deployment.factory, instant))
}
