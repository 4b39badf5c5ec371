//! Scriptable wallet provider
//!
//! Behaves like `LocalWallet` unless told to refuse something, and records
//! every request so tests can assert the exact connect sequence.

use async_trait::async_trait;
use ballot_core::effects::{TransactionSigner, WalletEffects, WalletError};
use ballot_core::{Address, ChainId, NetworkConfig};
use ballot_effects::LocalSigner;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// One request received by a [`ScriptedWallet`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletCall {
    /// `request_accounts`
    RequestAccounts,
    /// `signer`
    Signer,
    /// `chain_id`
    ChainId,
    /// `switch_chain`
    SwitchChain(ChainId),
    /// `add_chain`
    AddChain(ChainId),
}

#[derive(Debug)]
struct Script {
    active: ChainId,
    known: HashSet<ChainId>,
    reject_accounts: bool,
    reject_switch: bool,
    reject_add: bool,
    signer_unavailable: bool,
    calls: Vec<WalletCall>,
}

/// Wallet whose refusals are configured up front
#[derive(Debug)]
pub struct ScriptedWallet {
    signer: Arc<LocalSigner>,
    script: Mutex<Script>,
}

impl ScriptedWallet {
    /// Wallet for `signer`, starting on (and only knowing) `chain_id`
    pub fn new(signer: LocalSigner, chain_id: ChainId) -> Self {
        Self {
            signer: Arc::new(signer),
            script: Mutex::new(Script {
                active: chain_id,
                known: HashSet::from([chain_id]),
                reject_accounts: false,
                reject_switch: false,
                reject_add: false,
                signer_unavailable: false,
                calls: Vec::new(),
            }),
        }
    }

    fn edit(self, f: impl FnOnce(&mut Script)) -> Self {
        if let Ok(mut script) = self.script.lock() {
            f(&mut script);
        }
        self
    }

    /// Also know `chain_id`, so switching to it succeeds directly
    pub fn knowing(self, chain_id: ChainId) -> Self {
        self.edit(|s| {
            s.known.insert(chain_id);
        })
    }

    /// Refuse account access
    pub fn rejecting_accounts(self) -> Self {
        self.edit(|s| s.reject_accounts = true)
    }

    /// Refuse network switches
    pub fn rejecting_switch(self) -> Self {
        self.edit(|s| s.reject_switch = true)
    }

    /// Refuse network registration
    pub fn rejecting_add(self) -> Self {
        self.edit(|s| s.reject_add = true)
    }

    /// Fail signer acquisition
    pub fn without_signer(self) -> Self {
        self.edit(|s| s.signer_unavailable = true)
    }

    /// Account address
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Requests received so far, oldest first
    pub fn calls(&self) -> Vec<WalletCall> {
        self.script
            .lock()
            .map(|s| s.calls.clone())
            .unwrap_or_default()
    }

    /// Currently active chain
    pub fn active_chain(&self) -> Option<ChainId> {
        self.script.lock().ok().map(|s| s.active)
    }

    fn with_script<T>(
        &self,
        call: WalletCall,
        f: impl FnOnce(&mut Script) -> Result<T, WalletError>,
    ) -> Result<T, WalletError> {
        let mut script = self.script.lock().map_err(|_| WalletError::Unavailable {
            reason: "wallet script poisoned".to_string(),
        })?;
        script.calls.push(call);
        f(&mut script)
    }
}

#[async_trait]
impl WalletEffects for ScriptedWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let address = self.signer.address();
        self.with_script(WalletCall::RequestAccounts, |s| {
            if s.reject_accounts {
                return Err(WalletError::UserRejected);
            }
            Ok(vec![address])
        })
    }

    async fn signer(&self) -> Result<Arc<dyn TransactionSigner>, WalletError> {
        self.with_script(WalletCall::Signer, |s| {
            if s.signer_unavailable {
                return Err(WalletError::Unavailable {
                    reason: "signer locked".to_string(),
                });
            }
            Ok(())
        })?;
        let signer: Arc<dyn TransactionSigner> = self.signer.clone();
        Ok(signer)
    }

    async fn chain_id(&self) -> Result<ChainId, WalletError> {
        self.with_script(WalletCall::ChainId, |s| Ok(s.active))
    }

    async fn switch_chain(&self, chain_id: ChainId) -> Result<(), WalletError> {
        self.with_script(WalletCall::SwitchChain(chain_id), |s| {
            if s.reject_switch {
                return Err(WalletError::UserRejected);
            }
            if !s.known.contains(&chain_id) {
                return Err(WalletError::UnrecognizedChain { chain_id });
            }
            s.active = chain_id;
            Ok(())
        })
    }

    async fn add_chain(&self, network: &NetworkConfig) -> Result<(), WalletError> {
        self.with_script(WalletCall::AddChain(network.chain_id), |s| {
            if s.reject_add {
                return Err(WalletError::UserRejected);
            }
            s.known.insert(network.chain_id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn records_calls_in_order() {
        let wallet = ScriptedWallet::new(LocalSigner::from_seed([1; 32]), ChainId(1));
        wallet.request_accounts().await.unwrap();
        assert_matches!(
            wallet.switch_chain(ChainId(2)).await,
            Err(WalletError::UnrecognizedChain { .. })
        );
        wallet.add_chain(&NetworkConfig::default()).await.unwrap();
        assert_eq!(
            wallet.calls(),
            vec![
                WalletCall::RequestAccounts,
                WalletCall::SwitchChain(ChainId(2)),
                WalletCall::AddChain(ChainId(9000)),
            ]
        );
    }

    #[tokio::test]
    async fn rejections_are_user_rejected() {
        let wallet = ScriptedWallet::new(LocalSigner::from_seed([1; 32]), ChainId(1))
            .knowing(ChainId(2))
            .rejecting_switch()
            .rejecting_accounts();
        assert_matches!(
            wallet.request_accounts().await,
            Err(WalletError::UserRejected)
        );
        assert_matches!(
            wallet.switch_chain(ChainId(2)).await,
            Err(WalletError::UserRejected)
        );
        assert_eq!(wallet.active_chain(), Some(ChainId(1)));
    }
}
